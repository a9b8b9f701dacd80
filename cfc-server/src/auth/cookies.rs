//! Cookie header helpers

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

pub const SESSION_COOKIE: &str = "session";
pub const STATE_COOKIE: &str = "oauth_state";

/// `Set-Cookie` value with the attributes every auth cookie carries
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=Lax",
        name, value, max_age_secs
    )
}

/// `Set-Cookie` value that removes the cookie
pub fn clear_cookie(name: &str) -> String {
    set_cookie(name, "", 0)
}

/// Value of the named cookie from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn set_cookie_attributes() {
        let cookie = set_cookie(SESSION_COOKIE, "abc", 86400);
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(clear_cookie(STATE_COOKIE).contains("Max-Age=0"));
    }

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; session=tok.en.sig"));
        headers.append(COOKIE, HeaderValue::from_static("oauth_state=st"));

        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("tok.en.sig"));
        assert_eq!(read_cookie(&headers, STATE_COOKIE).as_deref(), Some("st"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
