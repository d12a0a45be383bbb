//! The attribution value object: [`UtmParameters`].
//!
//! A set always carries a non-empty `utm_source`; the four other parameters
//! are optional. Instances are immutable, a new one is built for every
//! capture or retrieval.
//!
//! ```rust
//! use utm_parameters::UtmParameters;
//!
//! let params = UtmParameters::new(Some("newsletter".into()), Some("email".into()), None, None, None).unwrap();
//! assert_eq!(params.source(), "newsletter");
//! assert_eq!(params.to_map()[1], ("utm_medium", Some("email")));
//! assert!(UtmParameters::new(None, Some("email".into()), None, None, None).is_err());
//! ```

use crate::errors::UtmError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Query/cookie key of the source parameter.
pub const SOURCE: &str = "utm_source";
/// Query/cookie key of the medium parameter.
pub const MEDIUM: &str = "utm_medium";
/// Query/cookie key of the campaign parameter.
pub const CAMPAIGN: &str = "utm_campaign";
/// Query/cookie key of the term parameter.
pub const TERM: &str = "utm_term";
/// Query/cookie key of the content parameter.
pub const CONTENT: &str = "utm_content";

/// All five keys, in mapping order.
pub const KEYS: [&str; 5] = [SOURCE, MEDIUM, CAMPAIGN, TERM, CONTENT];

/// One captured set of UTM parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UtmRecord")]
pub struct UtmParameters {
    #[serde(rename = "utm_source")]
    source: String,
    #[serde(rename = "utm_medium")]
    medium: Option<String>,
    #[serde(rename = "utm_campaign")]
    campaign: Option<String>,
    #[serde(rename = "utm_term")]
    term: Option<String>,
    #[serde(rename = "utm_content")]
    content: Option<String>,
}

impl UtmParameters {
    /// Creates a new set. Fails with [`UtmError::MissingSource`] when `source` is absent or empty.
    ///
    /// Empty optional values are stored as `None`.
    pub fn new(
        source: Option<String>,
        medium: Option<String>,
        campaign: Option<String>,
        term: Option<String>,
        content: Option<String>,
    ) -> Result<Self, UtmError> {
        let source = source
            .filter(|source| !source.is_empty())
            .ok_or(UtmError::MissingSource)?;

        Ok(Self {
            source,
            medium: non_empty(medium),
            campaign: non_empty(campaign),
            term: non_empty(term),
            content: non_empty(content),
        })
    }

    /// Builds a set by looking up each of the five keys with `lookup`.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, UtmError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self::new(
            lookup(SOURCE),
            lookup(MEDIUM),
            lookup(CAMPAIGN),
            lookup(TERM),
            lookup(CONTENT),
        )
    }

    /// Sample parameters for tests and demos.
    pub fn fake() -> Self {
        let now = OffsetDateTime::now_utc();
        let campaign = format!("spam-{}-{}", now.month().to_string().to_lowercase(), now.year());

        Self {
            source: "newsletter".to_string(),
            medium: Some("email".to_string()),
            campaign: Some(campaign),
            term: Some("ducks".to_string()),
            content: Some("Free Ducks".to_string()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn medium(&self) -> Option<&str> {
        self.medium.as_deref()
    }

    pub fn campaign(&self) -> Option<&str> {
        self.campaign.as_deref()
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns all parameters as ordered `(key, value)` pairs.
    ///
    /// `None` means "no value": adapters delete the matching cookie instead of
    /// storing an empty one.
    pub fn to_map(&self) -> [(&'static str, Option<&str>); 5] {
        [
            (SOURCE, Some(self.source.as_str())),
            (MEDIUM, self.medium()),
            (CAMPAIGN, self.campaign()),
            (TERM, self.term()),
            (CONTENT, self.content()),
        ]
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

impl<'a> IntoIterator for &'a UtmParameters {
    type Item = (&'static str, Option<&'a str>);
    type IntoIter = std::array::IntoIter<Self::Item, 5>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_map().into_iter()
    }
}

/// Unvalidated shape used for deserialization.
#[derive(Deserialize)]
struct UtmRecord {
    #[serde(rename = "utm_source", default)]
    source: Option<String>,
    #[serde(rename = "utm_medium", default)]
    medium: Option<String>,
    #[serde(rename = "utm_campaign", default)]
    campaign: Option<String>,
    #[serde(rename = "utm_term", default)]
    term: Option<String>,
    #[serde(rename = "utm_content", default)]
    content: Option<String>,
}

impl TryFrom<UtmRecord> for UtmParameters {
    type Error = UtmError;

    fn try_from(record: UtmRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.source,
            record.medium,
            record.campaign,
            record.term,
            record.content,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn source_is_required() {
        assert!(matches!(
            UtmParameters::new(None, s("email"), None, None, None),
            Err(UtmError::MissingSource)
        ));
        assert!(matches!(
            UtmParameters::new(s(""), None, None, None, None),
            Err(UtmError::MissingSource)
        ));
    }

    #[test]
    fn empty_optional_values_are_absent() {
        let params = UtmParameters::new(s("google"), s(""), s("spring"), s(""), None).unwrap();
        assert_eq!(params.medium(), None);
        assert_eq!(params.campaign(), Some("spring"));
        assert_eq!(params.term(), None);
    }

    #[test]
    fn to_map_keeps_fixed_key_order() {
        let params = UtmParameters::new(s("google"), None, s("spring"), None, s("banner")).unwrap();

        assert_eq!(
            params.to_map(),
            [
                ("utm_source", Some("google")),
                ("utm_medium", None),
                ("utm_campaign", Some("spring")),
                ("utm_term", None),
                ("utm_content", Some("banner")),
            ]
        );

        let keys: Vec<_> = (&params).into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, KEYS);
    }

    #[test]
    fn from_lookup_reads_every_key() {
        let mut asked = Vec::new();
        let params = UtmParameters::from_lookup(|key| {
            asked.push(key.to_string());
            (key == SOURCE).then(|| "bing".to_string())
        })
        .unwrap();

        assert_eq!(asked, KEYS);
        assert_eq!(params.source(), "bing");
        assert_eq!(params.medium(), None);
    }

    #[test]
    fn fake_is_a_complete_set() {
        let params = UtmParameters::fake();
        assert_eq!(params.source(), "newsletter");
        assert_eq!(params.medium(), Some("email"));
        assert!(params.campaign().unwrap().starts_with("spam-"));
        assert_eq!(params.campaign().unwrap(), params.campaign().unwrap().to_lowercase());
        assert_eq!(params.term(), Some("ducks"));
        assert_eq!(params.content(), Some("Free Ducks"));
    }

    #[test]
    fn serializes_with_fixed_keys() {
        let params = UtmParameters::new(s("newsletter"), s("email"), None, None, None).unwrap();
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "utm_source": "newsletter",
                "utm_medium": "email",
                "utm_campaign": null,
                "utm_term": null,
                "utm_content": null,
            })
        );

        let back: UtmParameters = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn deserialization_validates_source() {
        let missing = serde_json::from_str::<UtmParameters>(r#"{"utm_medium":"email"}"#);
        assert!(missing.is_err());

        let empty = serde_json::from_str::<UtmParameters>(r#"{"utm_source":""}"#);
        assert!(empty.is_err());
    }
}
