use crate::adapters::RequestAdapter;
use crate::host::{CookieBearing, QueryBearing};

/// Request adapter over any host exposing query parameters and cookies.
pub struct HostRequestAdapter<'a, H> {
    request: &'a H,
}

impl<'a, H> HostRequestAdapter<'a, H> {
    pub fn new(request: &'a H) -> Self {
        Self { request }
    }
}

impl<H: QueryBearing + CookieBearing> RequestAdapter for HostRequestAdapter<'_, H> {
    fn query_param(&self, key: &str) -> Option<String> {
        self.request.query_param(key)
    }

    fn cookie(&self, key: &str) -> Option<String> {
        self.request.cookie(key)
    }
}
