//! Raw header adapter.
//!
//! Used for hosts that offer no cookie API at all, only an immutable message
//! whose `append_header` returns a new value. Cookies are rendered with the
//! `Set-Cookie` codec and the caller's message is replaced by the rebuilt one.

use crate::adapters::{ResponseAdapter, Written};
use crate::cookies::{build_set_cookie_value_at, header_value};
use crate::errors::UtmError;
use crate::parameters::{UtmParameters, KEYS};
use crate::host::HeaderAppending;
use http::header::SET_COOKIE;
use http::HeaderValue;
use time::OffsetDateTime;

pub struct MessageAdapter<'a, M> {
    message: &'a mut M,
}

impl<'a, M: HeaderAppending + Default> MessageAdapter<'a, M> {
    pub fn new(message: &'a mut M) -> Self {
        Self { message }
    }

    fn append_all(&mut self, values: Vec<HeaderValue>) {
        let message = std::mem::take(self.message);
        *self.message = values
            .into_iter()
            .fold(message, |message, value| message.append_header(SET_COOKIE, value));
    }

    // All values are rendered before the message is touched, so a failure
    // leaves it unchanged.
    fn write(&mut self, cookies: &[(&str, Option<&str>)], expires: Option<OffsetDateTime>) -> Result<Written, UtmError> {
        let now = OffsetDateTime::now_utc();
        let values = cookies
            .iter()
            .map(|&(name, value)| build_set_cookie_value_at(name, value, expires, now).and_then(header_value))
            .collect::<Result<Vec<_>, _>>()?;

        self.append_all(values);
        Ok(Written::Replaced)
    }
}

impl<M: HeaderAppending + Default> ResponseAdapter for MessageAdapter<'_, M> {
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime) -> Result<(), UtmError> {
        self.write(&[(name, Some(value))], Some(expires)).map(|_| ())
    }

    fn delete_cookie(&mut self, name: &str) -> Result<(), UtmError> {
        self.write(&[(name, None::<&str>)], None).map(|_| ())
    }

    fn written(&self) -> Written {
        Written::Replaced
    }

    fn remember(&mut self, params: &UtmParameters, expires: OffsetDateTime) -> Result<Written, UtmError> {
        self.write(&params.to_map(), Some(expires))
    }

    fn forget(&mut self) -> Result<Written, UtmError> {
        self.write(&KEYS.map(|key| (key, None::<&str>)), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::set_cookie_headers;
    use time::Duration;

    #[test]
    fn remember_appends_one_header_per_key() {
        let mut response = http::Response::new(String::from("hello"));
        let expires = OffsetDateTime::now_utc() + Duration::days(30);
        let params = UtmParameters::new(Some("newsletter".into()), None, Some("Free Ducks".into()), None, None).unwrap();

        let written = MessageAdapter::new(&mut response).remember(&params, expires).unwrap();
        assert_eq!(written, Written::Replaced);

        let headers = set_cookie_headers(&response);
        assert_eq!(headers.len(), 5);
        assert!(headers[0].starts_with("utm_source=newsletter; expires="));
        assert!(headers[0].ends_with("; path=/"));
        assert!(headers[1].starts_with("utm_medium=; expires="));
        assert!(headers[1].contains("; max-age=0; "));
        assert!(headers[2].starts_with("utm_campaign=Free%20Ducks; "));
        assert_eq!(response.body(), "hello");
    }

    #[test]
    fn forget_appends_removal_headers() {
        let mut response = http::Response::new(());
        MessageAdapter::new(&mut response).forget().unwrap();

        let headers = set_cookie_headers(&response);
        assert_eq!(headers.len(), 5);
        for (header, key) in headers.iter().zip(KEYS) {
            assert!(header.starts_with(&format!("{key}=; expires=")));
            assert!(header.ends_with("; max-age=0; path=/"));
        }
    }

    #[test]
    fn invalid_cookie_leaves_the_message_untouched() {
        let mut response = http::Response::new(());
        let mut adapter = MessageAdapter::new(&mut response);

        let result = adapter.set_cookie("bad\nname", "x", OffsetDateTime::now_utc() + Duration::hours(1));
        assert!(matches!(result, Err(UtmError::InvalidHeaderValue(_))));
        assert!(set_cookie_headers(&response).is_empty());
    }
}
