//! Adapter registry: picks the adapter for an arbitrary host object.
//!
//! The registry holds two ordered tables, one for request hosts and one for
//! response hosts. Each entry pairs a [`HostDescriptor`] with a factory that
//! binds a matching host to its adapter. Lookups scan the table in
//! registration order and the **first** matching descriptor wins. A caller
//! supplied adapter ([`RequestHost::Adapter`] / [`ResponseHost::Adapter`]) is
//! always used as-is and never reaches the tables.
//!
//! ## Process-wide registry
//! [`capture`](crate::UtmParameters::capture) and friends use a process-wide
//! registry, created on first use with the default entries. Additional
//! adapters should be registered with [`register_request_adapter`] and
//! [`register_response_adapter`] during startup, before the first request is
//! handled. Registering later is synchronized, but requests already in flight
//! may or may not observe the new entry.
//!
//! ## Example: registering a custom host
//! ```rust
//! use utm_parameters::adapters::bind_request;
//! use utm_parameters::host::{CookieBearing, QueryBearing};
//! use utm_parameters::registry::{register_request_adapter, HostDescriptor};
//!
//! struct MyRequest;
//!
//! impl QueryBearing for MyRequest {
//!     fn query_param(&self, key: &str) -> Option<String> {
//!         (key == "utm_source").then(|| "my-framework".to_string())
//!     }
//! }
//!
//! impl CookieBearing for MyRequest {
//!     fn cookie(&self, _key: &str) -> Option<String> {
//!         None
//!     }
//! }
//!
//! register_request_adapter(HostDescriptor::of::<MyRequest>(), bind_request::<MyRequest>);
//!
//! let params = utm_parameters::UtmParameters::capture(&MyRequest).unwrap().unwrap();
//! assert_eq!(params.source(), "my-framework");
//! ```

use crate::adapters::{bind_direct, bind_message, bind_queue, bind_request, RequestAdapter, ResponseAdapter};
use crate::cookies::CookieQueue;
use crate::errors::UtmError;
use lazy_static::lazy_static;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

/// Binds a matched request host to its adapter.
pub type RequestAdapterFactory = for<'a> fn(&'a dyn Any) -> Option<Box<dyn RequestAdapter + 'a>>;

/// Binds a matched response host to its adapter.
pub type ResponseAdapterFactory = for<'a> fn(&'a mut dyn Any) -> Option<Box<dyn ResponseAdapter + 'a>>;

/// Describes which host objects an adapter accepts.
#[derive(Clone, Copy)]
pub struct HostDescriptor {
    name: &'static str,
    matches: fn(&dyn Any) -> bool,
}

impl HostDescriptor {
    /// Matches hosts of the concrete type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            name: type_name::<T>(),
            matches: is::<T>,
        }
    }

    /// Matches every host accepted by `matches`.
    pub fn matching(name: &'static str, matches: fn(&dyn Any) -> bool) -> Self {
        Self { name, matches }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, host: &dyn Any) -> bool {
        (self.matches)(host)
    }
}

impl fmt::Debug for HostDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostDescriptor").field(&self.name).finish()
    }
}

fn is<T: Any>(host: &dyn Any) -> bool {
    host.is::<T>()
}

/// A request host handed to the registry.
pub enum RequestHost<'a> {
    /// A framework object, resolved through the registry
    Object {
        host: &'a dyn Any,
        type_name: &'static str,
    },
    /// A caller supplied adapter, used as-is
    Adapter(&'a dyn RequestAdapter),
}

impl<'a, T: Any> From<&'a T> for RequestHost<'a> {
    fn from(host: &'a T) -> Self {
        RequestHost::Object {
            host,
            type_name: type_name::<T>(),
        }
    }
}

/// A response host handed to the registry.
pub enum ResponseHost<'a> {
    /// A framework object, resolved through the registry
    Object {
        host: &'a mut dyn Any,
        type_name: &'static str,
    },
    /// A caller supplied adapter, used as-is
    Adapter(&'a mut dyn ResponseAdapter),
}

impl<'a, T: Any> From<&'a mut T> for ResponseHost<'a> {
    fn from(host: &'a mut T) -> Self {
        ResponseHost::Object {
            host,
            type_name: type_name::<T>(),
        }
    }
}

/// Ordered request and response adapter tables.
#[derive(Clone)]
pub struct AdapterRegistry {
    request_adapters: Vec<(HostDescriptor, RequestAdapterFactory)>,
    response_adapters: Vec<(HostDescriptor, ResponseAdapterFactory)>,
}

impl AdapterRegistry {
    /// Registry without any entries.
    pub fn empty() -> Self {
        Self {
            request_adapters: Vec::new(),
            response_adapters: Vec::new(),
        }
    }

    /// Registry with the default entries for the `http` crate types,
    /// [`cookie::CookieJar`] and [`CookieQueue`].
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_request_adapter(HostDescriptor::of::<http::Request<()>>(), bind_request::<http::Request<()>>);
        registry.register_request_adapter(
            HostDescriptor::of::<http::Request<String>>(),
            bind_request::<http::Request<String>>,
        );
        registry.register_request_adapter(
            HostDescriptor::of::<http::Request<Vec<u8>>>(),
            bind_request::<http::Request<Vec<u8>>>,
        );
        registry.register_request_adapter(
            HostDescriptor::of::<http::request::Parts>(),
            bind_request::<http::request::Parts>,
        );
        registry.register_request_adapter(HostDescriptor::of::<cookie::CookieJar>(), bind_request::<cookie::CookieJar>);

        registry.register_response_adapter(HostDescriptor::of::<http::Response<()>>(), bind_message::<http::Response<()>>);
        registry.register_response_adapter(
            HostDescriptor::of::<http::Response<String>>(),
            bind_message::<http::Response<String>>,
        );
        registry.register_response_adapter(
            HostDescriptor::of::<http::Response<Vec<u8>>>(),
            bind_message::<http::Response<Vec<u8>>>,
        );
        registry.register_response_adapter(HostDescriptor::of::<cookie::CookieJar>(), bind_direct::<cookie::CookieJar>);
        registry.register_response_adapter(HostDescriptor::of::<CookieQueue>(), bind_queue::<CookieQueue>);

        registry
    }

    /// Appends a request adapter. Earlier entries take precedence.
    pub fn register_request_adapter(&mut self, descriptor: HostDescriptor, factory: RequestAdapterFactory) {
        self.request_adapters.push((descriptor, factory));
    }

    /// Appends a response adapter. Earlier entries take precedence.
    pub fn register_response_adapter(&mut self, descriptor: HostDescriptor, factory: ResponseAdapterFactory) {
        self.response_adapters.push((descriptor, factory));
    }

    /// Returns the adapter for `request`.
    pub fn resolve_request_adapter<'a>(
        &self,
        request: RequestHost<'a>,
    ) -> Result<Box<dyn RequestAdapter + 'a>, UtmError> {
        bind_request_host(request, |host| self.select_request(host))
    }

    /// Returns the adapter for `response`.
    pub fn resolve_response_adapter<'a>(
        &self,
        response: ResponseHost<'a>,
    ) -> Result<Box<dyn ResponseAdapter + 'a>, UtmError> {
        bind_response_host(response, |host| self.select_response(host))
    }

    fn select_request(&self, host: &dyn Any) -> Option<(HostDescriptor, RequestAdapterFactory)> {
        self.request_adapters
            .iter()
            .copied()
            .find(|(descriptor, _)| descriptor.matches(host))
    }

    fn select_response(&self, host: &dyn Any) -> Option<(HostDescriptor, ResponseAdapterFactory)> {
        self.response_adapters
            .iter()
            .copied()
            .find(|(descriptor, _)| descriptor.matches(host))
    }
}

// `select` only picks the table entry; binding happens after it returns.
fn bind_request_host<'a>(
    request: RequestHost<'a>,
    select: impl FnOnce(&dyn Any) -> Option<(HostDescriptor, RequestAdapterFactory)>,
) -> Result<Box<dyn RequestAdapter + 'a>, UtmError> {
    let (host, type_name) = match request {
        RequestHost::Adapter(adapter) => return Ok(Box::new(adapter)),
        RequestHost::Object { host, type_name } => (host, type_name),
    };

    let (descriptor, factory) =
        select(host).ok_or_else(|| UtmError::UnsupportedHostType(type_name.to_string()))?;

    log::debug!("request host {type_name} resolved by {}", descriptor.name());
    factory(host).ok_or_else(|| UtmError::UnsupportedHostType(type_name.to_string()))
}

fn bind_response_host<'a>(
    response: ResponseHost<'a>,
    select: impl FnOnce(&dyn Any) -> Option<(HostDescriptor, ResponseAdapterFactory)>,
) -> Result<Box<dyn ResponseAdapter + 'a>, UtmError> {
    let (host, type_name) = match response {
        ResponseHost::Adapter(adapter) => return Ok(Box::new(adapter)),
        ResponseHost::Object { host, type_name } => (host, type_name),
    };

    let (descriptor, factory) =
        select(&*host).ok_or_else(|| UtmError::UnsupportedHostType(type_name.to_string()))?;

    log::debug!("response host {type_name} resolved by {}", descriptor.name());
    factory(host).ok_or_else(|| UtmError::UnsupportedHostType(type_name.to_string()))
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref REGISTRY: RwLock<AdapterRegistry> = RwLock::new(AdapterRegistry::new());
}

static LOOKED_UP: AtomicBool = AtomicBool::new(false);

/// Registers a request adapter in the process-wide registry.
pub fn register_request_adapter(descriptor: HostDescriptor, factory: RequestAdapterFactory) {
    warn_if_late(descriptor);
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_request_adapter(descriptor, factory);
}

/// Registers a response adapter in the process-wide registry.
pub fn register_response_adapter(descriptor: HostDescriptor, factory: ResponseAdapterFactory) {
    warn_if_late(descriptor);
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_response_adapter(descriptor, factory);
}

/// Returns the adapter for `request` from the process-wide registry.
///
/// The registry lock is released before the adapter is bound, so adapters
/// may use the registry themselves.
pub fn resolve_request_adapter(request: RequestHost<'_>) -> Result<Box<dyn RequestAdapter + '_>, UtmError> {
    bind_request_host(request, |host| with_registry(|registry| registry.select_request(host)))
}

/// Returns the adapter for `response` from the process-wide registry.
pub fn resolve_response_adapter(response: ResponseHost<'_>) -> Result<Box<dyn ResponseAdapter + '_>, UtmError> {
    bind_response_host(response, |host| with_registry(|registry| registry.select_response(host)))
}

fn with_registry<R>(f: impl FnOnce(&AdapterRegistry) -> R) -> R {
    LOOKED_UP.store(true, Ordering::Relaxed);
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    f(&registry)
}

fn warn_if_late(descriptor: HostDescriptor) {
    if LOOKED_UP.load(Ordering::Relaxed) {
        log::warn!(
            "adapter for {} registered after the registry was first used",
            descriptor.name()
        );
    }
}
