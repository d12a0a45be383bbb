//! Deferred cookie directives.
//!
//! A [`CookieQueue`] is the queueing host: adapters push [`CookieDirective`]s
//! into it while a request is handled, and the surrounding application flushes
//! them onto the outgoing response (or into a [`cookie::CookieJar`]) once the
//! response exists. Queueing a directive replaces any earlier directive for the
//! same cookie name, so the last write wins.

use crate::cookies::header::{build_set_cookie_value_at, header_value};
use crate::errors::UtmError;
use crate::host::{CookieQueueing, CookieSetting, HeaderAppending};
use http::header::SET_COOKIE;
use time::OffsetDateTime;

/// A single queued cookie operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieDirective {
    /// Store `value` under `name` until `expires`
    Set {
        name: String,
        value: String,
        expires: OffsetDateTime,
    },
    /// Expire cookie `name` on the client
    Forget { name: String },
}

impl CookieDirective {
    pub fn name(&self) -> &str {
        match self {
            CookieDirective::Set { name, .. } | CookieDirective::Forget { name } => name,
        }
    }

    /// Renders the directive as a `Set-Cookie` header value relative to `now`.
    pub fn header_value_at(&self, now: OffsetDateTime) -> Result<String, UtmError> {
        match self {
            CookieDirective::Set { name, value, expires } => {
                build_set_cookie_value_at(name, Some(value.as_str()), Some(*expires), now)
            }
            CookieDirective::Forget { name } => build_set_cookie_value_at(name, None, None, now),
        }
    }
}

/// Cookie directives waiting to be attached to a response.
#[derive(Debug, Clone, Default)]
pub struct CookieQueue {
    directives: Vec<CookieDirective>,
}

impl CookieQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the queued directives in queueing order.
    pub fn queued(&self) -> &[CookieDirective] {
        &self.directives
    }

    /// Returns the directive queued for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&CookieDirective> {
        self.directives.iter().find(|directive| directive.name() == name)
    }

    /// Drops the directive queued for `name`.
    pub fn unqueue(&mut self, name: &str) {
        self.directives.retain(|directive| directive.name() != name);
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Renders all directives as `Set-Cookie` header values.
    pub fn header_values(&self) -> Result<Vec<String>, UtmError> {
        let now = OffsetDateTime::now_utc();
        self.directives
            .iter()
            .map(|directive| directive.header_value_at(now))
            .collect()
    }

    /// Appends every queued directive to `message` and empties the queue.
    ///
    /// On error the queue and the message are left untouched.
    pub fn flush_into<M: HeaderAppending>(&mut self, message: M) -> Result<M, UtmError> {
        let values = self
            .header_values()?
            .into_iter()
            .map(header_value)
            .collect::<Result<Vec<_>, _>>()?;

        self.directives.clear();
        Ok(values
            .into_iter()
            .fold(message, |message, value| message.append_header(SET_COOKIE, value)))
    }

    /// Applies every queued directive to `jar` and empties the queue.
    pub fn flush_into_jar<J: CookieSetting>(&mut self, jar: &mut J) {
        for directive in self.directives.drain(..) {
            match directive {
                CookieDirective::Set { name, value, expires } => jar.set_cookie(&name, &value, expires),
                CookieDirective::Forget { name } => jar.delete_cookie(&name),
            }
        }
    }
}

impl CookieQueueing for CookieQueue {
    fn queue(&mut self, directive: CookieDirective) {
        self.unqueue(directive.name());
        self.directives.push(directive);
    }
}
