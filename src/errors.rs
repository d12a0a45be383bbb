#[derive(Debug, thiserror::Error)]
pub enum UtmError {
    #[error("Invalid UTM parameters, source is required")]
    MissingSource,

    #[error("Unsupported host \"{0}\", no adapter available")]
    UnsupportedHostType(String),

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),

    #[error("Date formatting error: {0}")]
    DateFormat(#[from] time::error::Format),
}
