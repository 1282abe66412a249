//! Session cookie attributes

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use clinic_core::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TokenPair};
use time::{Duration, OffsetDateTime};

/// How session cookies are written. Only login, logout and the session
/// gate use this; every other handler only reads the access token.
#[derive(Clone, Copy, Debug)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Add both tokens of `pair` to the jar.
    pub fn store(&self, jar: CookieJar, pair: &TokenPair) -> CookieJar {
        let max_age = Duration::seconds(pair.max_age_secs());
        jar.add(self.build(ACCESS_TOKEN_COOKIE, pair.access_token.clone(), max_age))
            .add(self.build(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone(), max_age))
    }

    /// Overwrite both tokens with empty, already-expired cookies.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.expired(ACCESS_TOKEN_COOKIE))
            .add(self.expired(REFRESH_TOKEN_COOKIE))
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(max_age)
            .build()
    }

    fn expired(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }
}

/// Non-empty value of a cookie
pub fn read(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(jar: &CookieJar, name: &str) -> String {
        jar.get(name).unwrap().to_string()
    }

    #[test]
    fn stores_pair_with_expiry_as_max_age() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: Some(3600),
        };
        let jar = CookiePolicy::new(false).store(CookieJar::new(), &pair);

        let access = rendered(&jar, ACCESS_TOKEN_COOKIE);
        assert!(access.starts_with("accessToken=a;"));
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("SameSite=Lax"));
        assert!(access.contains("Path=/"));
        assert!(access.contains("Max-Age=3600"));
        assert!(!access.contains("Secure"));
        assert!(rendered(&jar, REFRESH_TOKEN_COOKIE).starts_with("refreshToken=r;"));
    }

    #[test]
    fn secure_flag_follows_policy() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: None,
        };
        let jar = CookiePolicy::new(true).store(CookieJar::new(), &pair);
        let access = rendered(&jar, ACCESS_TOKEN_COOKIE);
        assert!(access.contains("Secure"));
        assert!(access.contains("Max-Age=604800"));
    }

    #[test]
    fn clearing_expires_both_at_epoch() {
        let jar = CookiePolicy::new(false).clear(CookieJar::new());
        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            let cookie = rendered(&jar, name);
            assert!(cookie.starts_with(&format!("{name}=;")));
            assert!(cookie.contains("Max-Age=0"));
            assert!(cookie.contains("1970"));
        }
    }

    #[test]
    fn empty_cookie_reads_as_absent() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, ""));
        assert_eq!(read(&jar, ACCESS_TOKEN_COOKIE), None);
        let jar = jar.add(Cookie::new(ACCESS_TOKEN_COOKIE, "tok"));
        assert_eq!(read(&jar, ACCESS_TOKEN_COOKIE).as_deref(), Some("tok"));
    }
}
