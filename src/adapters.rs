// src/adapters.rs
//! Adapters: [`RequestAdapter`], [`ResponseAdapter`] and one implementation per host family.
//!
//! An adapter translates the attribution operations into one host's concrete
//! API. Adapters are *bound* to a host: the registry matches a host object,
//! then calls a factory (one of the `bind_*` functions below) which downcasts
//! the host and wraps the reference.
//!
//! | adapter                | host capability              | write style |
//! |------------------------|------------------------------|-------------|
//! | [`HostRequestAdapter`] | `QueryBearing + CookieBearing` | -         |
//! | [`MessageAdapter`]     | `HeaderAppending`            | replaced    |
//! | [`DirectAdapter`]      | `CookieSetting`              | in place    |
//! | [`QueueingAdapter`]    | `CookieQueueing`             | in place    |
//!
//! Callers may also implement the traits on their own types and hand them in
//! directly, see [`RequestHost::Adapter`](crate::registry::RequestHost::Adapter).

mod direct;
mod message;
mod queueing;
mod request;

use crate::errors::UtmError;
use crate::parameters::{UtmParameters, KEYS};
use std::any::Any;
use time::OffsetDateTime;

pub use direct::DirectAdapter;
pub use message::MessageAdapter;
pub use queueing::QueueingAdapter;
pub use request::HostRequestAdapter;

use crate::host::{CookieBearing, CookieQueueing, CookieSetting, HeaderAppending, QueryBearing};

/// Reads raw parameter values out of a request host.
pub trait RequestAdapter {
    /// Returns the query parameter `key`, if present.
    fn query_param(&self, key: &str) -> Option<String>;

    /// Returns the cookie `key`, if present.
    fn cookie(&self, key: &str) -> Option<String>;

    /// Builds parameters from the query string. `None` when no usable source is present.
    fn capture(&self) -> Option<UtmParameters> {
        UtmParameters::from_lookup(|key| self.query_param(key)).ok()
    }

    /// Builds parameters from stored cookies. `None` when no usable source is present.
    fn retrieve(&self) -> Option<UtmParameters> {
        UtmParameters::from_lookup(|key| self.cookie(key)).ok()
    }
}

/// How a response adapter handed the host back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    /// The host object was mutated in place
    InPlace,
    /// The host is an immutable message and was replaced by a rebuilt one
    Replaced,
}

/// Writes cookies to a response host.
pub trait ResponseAdapter {
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime) -> Result<(), UtmError>;

    fn delete_cookie(&mut self, name: &str) -> Result<(), UtmError>;

    /// Write style of this adapter.
    fn written(&self) -> Written {
        Written::InPlace
    }

    /// Stores every parameter; absent ones are deleted.
    fn remember(&mut self, params: &UtmParameters, expires: OffsetDateTime) -> Result<Written, UtmError> {
        for (key, value) in params {
            match value {
                Some(value) => self.set_cookie(key, value, expires)?,
                None => self.delete_cookie(key)?,
            }
        }
        Ok(self.written())
    }

    /// Deletes all five parameter cookies regardless of their current value.
    fn forget(&mut self) -> Result<Written, UtmError> {
        for key in KEYS {
            self.delete_cookie(key)?;
        }
        Ok(self.written())
    }
}

impl<A: RequestAdapter + ?Sized> RequestAdapter for &A {
    fn query_param(&self, key: &str) -> Option<String> {
        (**self).query_param(key)
    }

    fn cookie(&self, key: &str) -> Option<String> {
        (**self).cookie(key)
    }

    fn capture(&self) -> Option<UtmParameters> {
        (**self).capture()
    }

    fn retrieve(&self) -> Option<UtmParameters> {
        (**self).retrieve()
    }
}

impl<A: ResponseAdapter + ?Sized> ResponseAdapter for &mut A {
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime) -> Result<(), UtmError> {
        (**self).set_cookie(name, value, expires)
    }

    fn delete_cookie(&mut self, name: &str) -> Result<(), UtmError> {
        (**self).delete_cookie(name)
    }

    fn written(&self) -> Written {
        (**self).written()
    }

    fn remember(&mut self, params: &UtmParameters, expires: OffsetDateTime) -> Result<Written, UtmError> {
        (**self).remember(params, expires)
    }

    fn forget(&mut self) -> Result<Written, UtmError> {
        (**self).forget()
    }
}

/// Binds a query and cookie bearing request host.
pub fn bind_request<'a, H>(host: &'a dyn Any) -> Option<Box<dyn RequestAdapter + 'a>>
where
    H: QueryBearing + CookieBearing + Any,
{
    let request = host.downcast_ref::<H>()?;
    Some(Box::new(HostRequestAdapter::new(request)))
}

/// Binds an immutable message host.
pub fn bind_message<'a, M>(host: &'a mut dyn Any) -> Option<Box<dyn ResponseAdapter + 'a>>
where
    M: HeaderAppending + Default + Any,
{
    let message = host.downcast_mut::<M>()?;
    Some(Box::new(MessageAdapter::new(message)))
}

/// Binds a host with a direct cookie API.
pub fn bind_direct<'a, S>(host: &'a mut dyn Any) -> Option<Box<dyn ResponseAdapter + 'a>>
where
    S: CookieSetting + Any,
{
    let setter = host.downcast_mut::<S>()?;
    Some(Box::new(DirectAdapter::new(setter)))
}

/// Binds a cookie queueing host.
pub fn bind_queue<'a, Q>(host: &'a mut dyn Any) -> Option<Box<dyn ResponseAdapter + 'a>>
where
    Q: CookieQueueing + Any,
{
    let queue = host.downcast_mut::<Q>()?;
    Some(Box::new(QueueingAdapter::new(queue)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl ResponseAdapter for Recorder {
        fn set_cookie(&mut self, name: &str, value: &str, _expires: OffsetDateTime) -> Result<(), UtmError> {
            self.ops.push(format!("set {name}={value}"));
            Ok(())
        }

        fn delete_cookie(&mut self, name: &str) -> Result<(), UtmError> {
            self.ops.push(format!("delete {name}"));
            Ok(())
        }
    }

    struct Lookup(&'static [(&'static str, &'static str)]);

    impl RequestAdapter for Lookup {
        fn query_param(&self, key: &str) -> Option<String> {
            self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        }

        fn cookie(&self, _key: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn remember_issues_all_five_operations() {
        let params = UtmParameters::new(Some("newsletter".into()), None, Some("spring".into()), None, None).unwrap();
        let mut recorder = Recorder::default();

        let written = recorder.remember(&params, OffsetDateTime::now_utc()).unwrap();

        assert_eq!(written, Written::InPlace);
        assert_eq!(
            recorder.ops,
            vec![
                "set utm_source=newsletter",
                "delete utm_medium",
                "set utm_campaign=spring",
                "delete utm_term",
                "delete utm_content",
            ]
        );
    }

    #[test]
    fn forget_deletes_every_key() {
        let mut recorder = Recorder::default();
        recorder.forget().unwrap();

        assert_eq!(recorder.ops.len(), 5);
        assert!(recorder.ops.iter().zip(KEYS).all(|(op, key)| *op == format!("delete {key}")));
    }

    #[test]
    fn capture_absorbs_missing_source() {
        assert!(Lookup(&[("utm_medium", "email")]).capture().is_none());
        assert!(Lookup(&[("utm_source", "")]).capture().is_none());
        assert!(Lookup(&[("utm_source", "x")]).retrieve().is_none());

        let params = Lookup(&[("utm_source", "x"), ("utm_term", "ducks")]).capture().unwrap();
        assert_eq!(params.source(), "x");
        assert_eq!(params.term(), Some("ducks"));
    }

    #[test]
    fn bind_rejects_other_host_types() {
        let request = http::Request::new(());
        assert!(bind_request::<http::Request<()>>(&request).is_some());
        assert!(bind_request::<http::Request<String>>(&request).is_none());

        let mut jar = cookie::CookieJar::new();
        assert!(bind_direct::<cookie::CookieJar>(&mut jar).is_some());
        assert!(bind_message::<http::Response<()>>(&mut jar).is_none());
        assert!(bind_queue::<crate::cookies::CookieQueue>(&mut jar).is_none());
    }

    #[test]
    fn references_forward_to_the_adapter() {
        fn issue(mut adapter: impl ResponseAdapter) -> Written {
            adapter.forget().unwrap()
        }

        fn captured(adapter: impl RequestAdapter) -> Option<UtmParameters> {
            adapter.capture()
        }

        let mut recorder = Recorder::default();
        assert_eq!(issue(&mut recorder), Written::InPlace);
        assert_eq!(recorder.ops.len(), 5);

        let lookup = Lookup(&[("utm_source", "ref")]);
        let by_ref: &dyn RequestAdapter = &lookup;
        assert_eq!(captured(by_ref).unwrap().source(), "ref");
    }
}
