// src/cookies.rs
//! Cookies: the `Set-Cookie` header codec and the [`CookieQueue`] host.

mod header;
mod queue;

pub use header::build_remove_cookie_value;
pub use header::build_remove_cookie_value_at;
pub use header::build_set_cookie_value;
pub use header::build_set_cookie_value_at;
pub use header::REMOVAL_OFFSET;
pub(crate) use header::encode_value;
pub(crate) use header::header_value;

pub use queue::CookieDirective;
pub use queue::CookieQueue;
