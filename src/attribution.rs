//! Capturing, retrieving, remembering and forgetting attribution.
//!
//! The operations exist twice: as methods on an [`AdapterRegistry`] value, and
//! as the [`UtmParameters`] facade which uses the process-wide registry.
//!
//! ```rust
//! use utm_parameters::{Expiry, UtmParameters};
//!
//! let request = http::Request::builder()
//!     .uri("https://example.com/?utm_source=newsletter&utm_medium=email")
//!     .body(())
//!     .unwrap();
//!
//! let params = UtmParameters::capture(&request).unwrap().expect("source is present");
//! let response = params.remember_into(http::Response::new(()), Expiry::Days(30)).unwrap();
//! assert_eq!(response.headers().get_all("set-cookie").iter().count(), 5);
//! ```

use crate::adapters::{RequestAdapter, ResponseAdapter, Written};
use crate::config::UtmConfig;
use crate::errors::UtmError;
use crate::expiry::Expiry;
use crate::parameters::UtmParameters;
use crate::registry::{self, AdapterRegistry, RequestHost, ResponseHost};
use std::any::Any;

impl AdapterRegistry {
    /// Captures parameters from the query string of `request`.
    ///
    /// `Ok(None)` when the request carries no usable `utm_source`.
    pub fn capture(&self, request: RequestHost<'_>) -> Result<Option<UtmParameters>, UtmError> {
        Ok(captured(&*self.resolve_request_adapter(request)?))
    }

    /// Retrieves previously remembered parameters from the cookies of `request`.
    pub fn retrieve(&self, request: RequestHost<'_>) -> Result<Option<UtmParameters>, UtmError> {
        Ok(retrieved(&*self.resolve_request_adapter(request)?))
    }

    /// Stores `params` as cookies on `response` until `expires`.
    pub fn remember(
        &self,
        params: &UtmParameters,
        response: ResponseHost<'_>,
        expires: Expiry,
    ) -> Result<Written, UtmError> {
        remembered(params, self.resolve_response_adapter(response)?, expires)
    }

    /// Clears all parameter cookies on `response`.
    pub fn forget(&self, response: ResponseHost<'_>) -> Result<Written, UtmError> {
        self.resolve_response_adapter(response)?.forget()
    }
}

impl UtmParameters {
    /// Captures parameters from the query string of `request`.
    pub fn capture<'a>(request: impl Into<RequestHost<'a>>) -> Result<Option<Self>, UtmError> {
        Ok(captured(&*registry::resolve_request_adapter(request.into())?))
    }

    /// Retrieves remembered parameters from the cookies of `request`.
    pub fn retrieve<'a>(request: impl Into<RequestHost<'a>>) -> Result<Option<Self>, UtmError> {
        Ok(retrieved(&*registry::resolve_request_adapter(request.into())?))
    }

    /// Stores the parameters as cookies on `response`.
    ///
    /// Absent parameters are deleted. Fails with [`UtmError::InvalidExpiry`]
    /// when `expires` does not lie in the future; use [`forget`](Self::forget)
    /// to clear stored parameters instead.
    pub fn remember<'a>(
        &self,
        response: impl Into<ResponseHost<'a>>,
        expires: impl Into<Expiry>,
    ) -> Result<Written, UtmError> {
        remembered(self, registry::resolve_response_adapter(response.into())?, expires.into())
    }

    /// Like [`remember`](Self::remember) for owned hosts, returning the (possibly rebuilt) host.
    pub fn remember_into<R: Any>(&self, mut response: R, expires: impl Into<Expiry>) -> Result<R, UtmError> {
        self.remember(&mut response, expires)?;
        Ok(response)
    }

    /// Clears all five parameter cookies on `response`.
    pub fn forget<'a>(&self, response: impl Into<ResponseHost<'a>>) -> Result<Written, UtmError> {
        registry::resolve_response_adapter(response.into())?.forget()
    }

    /// Like [`forget`](Self::forget) for owned hosts, returning the (possibly rebuilt) host.
    pub fn forget_into<R: Any>(&self, mut response: R) -> Result<R, UtmError> {
        self.forget(&mut response)?;
        Ok(response)
    }
}

fn captured(adapter: &dyn RequestAdapter) -> Option<UtmParameters> {
    let captured = adapter.capture();
    if captured.is_none() {
        log::debug!("no UTM parameters in request query");
    }
    captured
}

fn retrieved(adapter: &dyn RequestAdapter) -> Option<UtmParameters> {
    let retrieved = adapter.retrieve();
    if retrieved.is_none() {
        log::debug!("no UTM parameters in request cookies");
    }
    retrieved
}

fn remembered(
    params: &UtmParameters,
    mut adapter: Box<dyn ResponseAdapter + '_>,
    expires: Expiry,
) -> Result<Written, UtmError> {
    let expires = expires.resolve()?;
    adapter.remember(params, expires)
}

/// Captures parameters from `request` and, when present, remembers them on
/// `response` for the configured lifetime.
///
/// This is the per-request step of a "store UTM parameters in cookies"
/// middleware. Returns the captured parameters.
pub fn capture_and_remember<'a, 'b>(
    request: impl Into<RequestHost<'a>>,
    response: impl Into<ResponseHost<'b>>,
    config: &UtmConfig,
) -> Result<Option<UtmParameters>, UtmError> {
    let Some(params) = UtmParameters::capture(request)? else {
        return Ok(None);
    };

    params.remember(response, Expiry::Days(config.lifetime_days))?;
    Ok(Some(params))
}
