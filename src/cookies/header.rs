//! `Set-Cookie` header values for hosts that only expose raw headers.
//!
//! Every value has the same attribute layout:
//!
//! ```text
//! name=value; expires=Fri, 01 Mar 2024 13:00:00 GMT; max-age=3600; path=/
//! ```
//!
//! When the value is absent or empty, or no expiry is given, the cookie is
//! written in **removal mode**: an empty value, `max-age=0` and an `expires`
//! date [`REMOVAL_OFFSET`] before now.
//!
//! ## Notes
//! - Values are percent-encoded so a cookie always stays a single token; only
//!   `A-Z a-z 0-9 - _ . ~` are kept as-is.
//! - Dates are always rendered in GMT.
//! - Names are written verbatim.

use crate::errors::UtmError;
use http::HeaderValue;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

/// How far in the past removal cookies expire: one year plus two seconds.
pub const REMOVAL_OFFSET: Duration = Duration::seconds(31_536_002);

const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds a `Set-Cookie` header value, using the current time as "now".
pub fn build_set_cookie_value(
    name: &str,
    value: Option<&str>,
    expires: Option<OffsetDateTime>,
) -> Result<String, UtmError> {
    build_set_cookie_value_at(name, value, expires, OffsetDateTime::now_utc())
}

/// Builds a `Set-Cookie` header value relative to `now`.
pub fn build_set_cookie_value_at(
    name: &str,
    value: Option<&str>,
    expires: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Result<String, UtmError> {
    let (value, expires, max_age) = match (value.filter(|value| !value.is_empty()), expires) {
        (Some(value), Some(expires)) => (
            encode_value(value),
            expires,
            (expires - now).whole_seconds().max(0),
        ),
        _ => (String::new(), now - REMOVAL_OFFSET, 0),
    };

    let header = format!(
        "{name}={value}; expires={}; max-age={max_age}; path=/",
        http_date(expires)?
    );
    log::trace!("Set-Cookie: {header}");

    Ok(header)
}

/// Builds a removal `Set-Cookie` header value for `name`.
pub fn build_remove_cookie_value(name: &str) -> Result<String, UtmError> {
    build_set_cookie_value(name, None, None)
}

/// Builds a removal `Set-Cookie` header value for `name` relative to `now`.
pub fn build_remove_cookie_value_at(name: &str, now: OffsetDateTime) -> Result<String, UtmError> {
    build_set_cookie_value_at(name, None, None, now)
}

/// Percent-encodes a cookie value the way every write path stores it.
pub(crate) fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COOKIE_VALUE).to_string()
}

/// Converts a codec output into a header value.
pub(crate) fn header_value(value: String) -> Result<HeaderValue, UtmError> {
    HeaderValue::from_str(&value).map_err(|_| UtmError::InvalidHeaderValue(value))
}

fn http_date(at: OffsetDateTime) -> Result<String, UtmError> {
    let formatted = at.to_offset(UtcOffset::UTC).format(format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    ))?;
    Ok(formatted)
}
