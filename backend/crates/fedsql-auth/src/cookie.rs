// Cookie handling for the HttpOnly session cookie

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};

use crate::session::SessionId;

/// Configuration for the session cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    /// Whether to set the Secure flag (requires HTTPS)
    pub secure: bool,
    pub path: String,
    pub same_site: SameSite,
    /// Lifetime of the cookie in the browser
    pub max_age_hours: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "fedsql_session".to_string(),
            secure: false,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            max_age_hours: 24 * 7,
        }
    }
}

/// Create the HttpOnly cookie carrying `session`.
pub fn create_session_cookie<'a>(session: &SessionId, config: &CookieConfig) -> Cookie<'a> {
    Cookie::build(config.name.clone(), session.as_str().to_string())
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(CookieDuration::hours(config.max_age_hours))
        .finish()
}

/// Create a cookie that clears the session cookie.
pub fn create_logout_cookie<'a>(config: &CookieConfig) -> Cookie<'a> {
    Cookie::build(config.name.clone(), "")
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .max_age(CookieDuration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish()
}

/// Extract the session token from request cookies.
pub fn extract_session_token<'a, I>(cookies: I, config: &CookieConfig) -> Option<String>
where
    I: IntoIterator<Item = &'a Cookie<'static>>,
{
    cookies
        .into_iter()
        .find(|c| c.name() == config.name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_cookie() {
        let config = CookieConfig::default();
        let id = SessionId::generate();
        let cookie = create_session_cookie(&id, &config);

        assert_eq!(cookie.name(), "fedsql_session");
        assert_eq!(cookie.value(), id.as_str());
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_create_logout_cookie() {
        let config = CookieConfig::default();
        let cookie = create_logout_cookie(&config);

        assert_eq!(cookie.name(), "fedsql_session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }

    #[test]
    fn test_extract_session_token() {
        let config = CookieConfig::default();
        let cookies = vec![
            Cookie::new("other", "x"),
            Cookie::new("fedsql_session", "abc"),
        ];
        assert_eq!(extract_session_token(&cookies, &config).as_deref(), Some("abc"));

        let empty = vec![Cookie::new("fedsql_session", "")];
        assert_eq!(extract_session_token(&empty, &config), None);
    }
}
