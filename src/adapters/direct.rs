use crate::adapters::ResponseAdapter;
use crate::errors::UtmError;
use crate::host::CookieSetting;
use time::OffsetDateTime;

/// Response adapter for hosts with a direct cookie API, mutated in place.
pub struct DirectAdapter<'a, S> {
    setter: &'a mut S,
}

impl<'a, S> DirectAdapter<'a, S> {
    pub fn new(setter: &'a mut S) -> Self {
        Self { setter }
    }
}

impl<S: CookieSetting> ResponseAdapter for DirectAdapter<'_, S> {
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime) -> Result<(), UtmError> {
        self.setter.set_cookie(name, value, expires);
        Ok(())
    }

    fn delete_cookie(&mut self, name: &str) -> Result<(), UtmError> {
        self.setter.delete_cookie(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Written;
    use crate::host::CookieBearing;
    use crate::UtmParameters;
    use time::Duration;

    #[test]
    fn remember_and_forget_on_a_cookie_jar() {
        let mut jar = cookie::CookieJar::new();
        let expires = OffsetDateTime::now_utc() + Duration::days(30);
        let params = UtmParameters::new(Some("newsletter".into()), Some("email".into()), None, None, None).unwrap();

        let written = DirectAdapter::new(&mut jar).remember(&params, expires).unwrap();
        assert_eq!(written, Written::InPlace);

        let source = jar.get("utm_source").unwrap();
        assert_eq!(source.value(), "newsletter");
        assert_eq!(source.path(), Some("/"));
        assert_eq!(source.expires_datetime().map(|at| at.unix_timestamp()), Some(expires.unix_timestamp()));
        assert_eq!(jar.cookie("utm_medium").as_deref(), Some("email"));
        assert_eq!(jar.cookie("utm_campaign"), None);

        DirectAdapter::new(&mut jar).forget().unwrap();
        assert_eq!(jar.cookie("utm_source"), None);
        assert_eq!(jar.cookie("utm_medium"), None);
    }

    #[test]
    fn forget_expires_cookies_the_client_already_has() {
        let mut jar = cookie::CookieJar::new();
        jar.add_original(cookie::Cookie::new("utm_source", "newsletter"));

        DirectAdapter::new(&mut jar).forget().unwrap();

        assert!(jar.get("utm_source").is_none());
        let removal = jar.delta().find(|cookie| cookie.name() == "utm_source").unwrap();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.path(), Some("/"));
    }
}
