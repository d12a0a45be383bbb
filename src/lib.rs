pub mod adapters;
pub mod attribution;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod expiry;
pub mod host;
pub mod parameters;
pub mod registry;

pub use adapters::{RequestAdapter, ResponseAdapter, Written};
pub use attribution::capture_and_remember;
pub use config::UtmConfig;
pub use cookies::{CookieDirective, CookieQueue};
pub use errors::UtmError;
pub use expiry::Expiry;
pub use parameters::UtmParameters;
pub use registry::{AdapterRegistry, HostDescriptor, RequestHost, ResponseHost};
