//! Reading the session cookie from a request and writing `Set-Cookie`.

use crate::config::{CookieOptions, SameSite};
use crate::error::SessionResult;
use cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use time::{Duration, OffsetDateTime};

impl From<SameSite> for cookie::SameSite {
    fn from(same_site: SameSite) -> Self {
        match same_site {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

/// Value of the first cookie called `name` across all `Cookie` headers.
///
/// Unparseable headers and pairs are skipped.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Build the cookie carrying an encoded session ID.
///
/// Non-positive `max_age` produces the same cookie as [`expired_cookie`].
/// `Expires` is left out when `now + max_age` is past the largest
/// representable date; `Max-Age` still bounds the cookie.
pub fn session_cookie(name: &str, value: &str, options: &CookieOptions) -> Cookie<'static> {
    if options.max_age <= 0 {
        return expired_cookie(name, options);
    }

    let max_age = Duration::seconds(options.max_age);
    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .path(options.path.clone())
        .max_age(max_age)
        .secure(options.secure)
        .http_only(options.http_only);

    if let Some(expires) = OffsetDateTime::now_utc().checked_add(max_age) {
        builder = builder.expires(expires);
    }
    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(same_site) = options.same_site {
        builder = builder.same_site(same_site.into());
    }

    builder.build()
}

/// Build an empty cookie that tells the browser to drop `name` now.
pub fn expired_cookie(name: &str, options: &CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_string(), String::new()))
        .path(options.path.clone())
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH + Duration::seconds(1))
        .secure(options.secure)
        .http_only(options.http_only);

    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(same_site) = options.same_site {
        builder = builder.same_site(same_site.into());
    }

    builder.build()
}

/// Append `cookie` as a `Set-Cookie` header.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) -> SessionResult<()> {
    let value = HeaderValue::from_str(&cookie.to_string())?;
    headers.append(SET_COOKIE, value);
    Ok(())
}
