//! Host capabilities.
//!
//! A **host** is the framework object the caller hands in: a request, a
//! response, a cookie jar or a cookie queue. Hosts are described by the small
//! set of capabilities below; adapters are written against capabilities, never
//! against a concrete framework.
//!
//! | capability          | shape                                             |
//! |---------------------|---------------------------------------------------|
//! | [`QueryBearing`]    | request with query parameters                     |
//! | [`CookieBearing`]   | request carrying cookies                          |
//! | [`CookieSetting`]   | response object with a direct cookie API          |
//! | [`CookieQueueing`]  | jar that queues cookie directives for later       |
//! | [`HeaderAppending`] | immutable message, appending returns a new value  |
//!
//! Implementations are provided for the `http` crate request/response types,
//! for [`cookie::CookieJar`] and for [`CookieQueue`](crate::cookies::CookieQueue).

use crate::cookies::{encode_value, CookieDirective};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Uri};
use percent_encoding::percent_decode_str;
use time::OffsetDateTime;

/// Request exposing its query parameters.
pub trait QueryBearing {
    /// Returns the first query parameter named `key`, if any.
    fn query_param(&self, key: &str) -> Option<String>;
}

/// Request exposing the cookies sent by the client.
pub trait CookieBearing {
    /// Returns the value of the cookie named `key`, if any.
    fn cookie(&self, key: &str) -> Option<String>;
}

/// Response object with a direct, mutating cookie API.
pub trait CookieSetting {
    /// Sets cookie `name` to `value`, expiring at `expires`.
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime);

    /// Instructs the client to drop cookie `name`.
    fn delete_cookie(&mut self, name: &str);
}

/// Cookie jar which accumulates directives to be applied later.
pub trait CookieQueueing {
    fn queue(&mut self, directive: CookieDirective);
}

/// Immutable message: appending a header yields a new message.
pub trait HeaderAppending: Sized {
    fn append_header(self, name: HeaderName, value: HeaderValue) -> Self;
}

impl<B> QueryBearing for http::Request<B> {
    fn query_param(&self, key: &str) -> Option<String> {
        query_from_uri(self.uri(), key)
    }
}

impl<B> CookieBearing for http::Request<B> {
    fn cookie(&self, key: &str) -> Option<String> {
        cookie_from_headers(self.headers(), key)
    }
}

impl QueryBearing for http::request::Parts {
    fn query_param(&self, key: &str) -> Option<String> {
        query_from_uri(&self.uri, key)
    }
}

impl CookieBearing for http::request::Parts {
    fn cookie(&self, key: &str) -> Option<String> {
        cookie_from_headers(&self.headers, key)
    }
}

impl<B> HeaderAppending for http::Response<B> {
    fn append_header(self, name: HeaderName, value: HeaderValue) -> Self {
        let (mut parts, body) = self.into_parts();
        parts.headers.append(name, value);
        http::Response::from_parts(parts, body)
    }
}

impl CookieSetting for cookie::CookieJar {
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime) {
        self.add(
            cookie::Cookie::build((name.to_owned(), encode_value(value)))
                .path("/")
                .expires(expires),
        );
    }

    fn delete_cookie(&mut self, name: &str) {
        self.remove(cookie::Cookie::build((name.to_owned(), "")).path("/"));
    }
}

// A jar doubles as a retrieve host: it holds the cookies of the incoming request.
impl QueryBearing for cookie::CookieJar {
    fn query_param(&self, _key: &str) -> Option<String> {
        None
    }
}

impl CookieBearing for cookie::CookieJar {
    fn cookie(&self, key: &str) -> Option<String> {
        self.get(key).map(|cookie| decode_value(cookie.value()))
    }
}

/// Collects the `Set-Cookie` values of a response.
///
/// An inspection helper for callers and tests; the adapters never read back
/// what they wrote.
pub fn set_cookie_headers<B>(response: &http::Response<B>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn query_from_uri(uri: &Uri, key: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

// Only `name=value` pairs of the `Cookie` header are looked at.
fn cookie_from_headers(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == key)
        .map(|(_, value)| decode_value(value))
}

// Undoes `encode_value`. A surrounding DQUOTE pair is not part of the value.
fn decode_value(value: &str) -> String {
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value);

    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, cookie: Option<&str>) -> http::Request<()> {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn query_params_are_decoded() {
        let req = request(
            "https://example.com/landing?utm_source=news+letter&utm_content=Free%20Ducks&utm_source=second",
            None,
        );

        assert_eq!(req.query_param("utm_source").as_deref(), Some("news letter"));
        assert_eq!(req.query_param("utm_content").as_deref(), Some("Free Ducks"));
        assert_eq!(req.query_param("utm_term"), None);
        assert_eq!(request("/no-query", None).query_param("utm_source"), None);
    }

    #[test]
    fn cookies_are_looked_up_by_name() {
        let req = request(
            "/",
            Some("session=abc; utm_source=newsletter; utm_content=Free%20Ducks"),
        );

        assert_eq!(req.cookie("utm_source").as_deref(), Some("newsletter"));
        assert_eq!(req.cookie("utm_content").as_deref(), Some("Free Ducks"));
        assert_eq!(req.cookie("utm_medium"), None);
        assert_eq!(req.cookie("session").as_deref(), Some("abc"));
    }

    #[test]
    fn quoted_cookie_values_are_unquoted() {
        let req = request("/", Some(r#"utm_source="newsletter"; utm_term="Free%20Ducks"; utm_medium=""#));

        assert_eq!(req.cookie("utm_source").as_deref(), Some("newsletter"));
        assert_eq!(req.cookie("utm_term").as_deref(), Some("Free Ducks"));
        assert_eq!(req.cookie("utm_medium").as_deref(), Some("\""));
    }

    #[test]
    fn cookies_across_multiple_headers() {
        let req = http::Request::builder()
            .uri("/")
            .header(COOKIE, "a=1")
            .header(COOKIE, "utm_term=ducks")
            .body(())
            .unwrap();

        assert_eq!(req.cookie("utm_term").as_deref(), Some("ducks"));
    }

    #[test]
    fn request_parts_behave_like_requests() {
        let (parts, _) = request("/?utm_medium=email", Some("utm_source=bing")).into_parts();

        assert_eq!(parts.query_param("utm_medium").as_deref(), Some("email"));
        assert_eq!(parts.cookie("utm_source").as_deref(), Some("bing"));
    }

    #[test]
    fn appending_a_header_returns_a_new_response() {
        let response = http::Response::new(String::from("body"))
            .append_header(SET_COOKIE, HeaderValue::from_static("a=1"))
            .append_header(SET_COOKIE, HeaderValue::from_static("b=2"));

        assert_eq!(set_cookie_headers(&response), vec!["a=1", "b=2"]);
        assert_eq!(response.body(), "body");
    }

    #[test]
    fn cookie_jar_set_and_delete() {
        let mut jar = cookie::CookieJar::new();
        let expires = OffsetDateTime::now_utc() + time::Duration::days(1);

        jar.set_cookie("utm_source", "newsletter", expires);
        assert_eq!(jar.cookie("utm_source").as_deref(), Some("newsletter"));
        assert_eq!(jar.get("utm_source").unwrap().path(), Some("/"));

        jar.delete_cookie("utm_source");
        assert_eq!(jar.cookie("utm_source"), None);
    }

    #[test]
    fn cookie_jar_stores_encoded_values() {
        let mut jar = cookie::CookieJar::new();
        let expires = OffsetDateTime::now_utc() + time::Duration::days(1);

        jar.set_cookie("utm_content", "50%25 off; a", expires);

        let stored = jar.get("utm_content").unwrap();
        assert_eq!(stored.value(), "50%2525%20off%3B%20a");
        assert!(stored.to_string().starts_with("utm_content=50%2525%20off%3B%20a; "));
        assert_eq!(jar.cookie("utm_content").as_deref(), Some("50%25 off; a"));
        assert_eq!(jar.query_param("utm_source"), None);
    }
}
