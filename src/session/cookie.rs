//! Cookie input and output for the session manager.
//!
//! Parsing request headers and emitting `Set-Cookie` is the HTTP layer's job.
//! [`CookiePool`] is the read-only input the manager needs, [`SessionCookie`]
//! describes the cookie the HTTP layer should send back.

use std::collections::HashMap;

use super::SameSite;

/// The cookies of the incoming request.
#[derive(Debug, Clone, Default)]
pub struct CookiePool {
    cookies: HashMap<String, String>,
}

impl CookiePool {
    pub fn new(cookies: HashMap<String, String>) -> Self {
        Self { cookies }
    }

    /// Parses the value of a `Cookie` request header.
    ///
    /// Pairs without `=` are skipped. If a name repeats, the first value
    /// wins, matching how browsers order more specific cookies first.
    ///
    /// ```rust
    /// use warden::session::CookiePool;
    ///
    /// let pool = CookiePool::from_header("theme=dark; warden_session=abc");
    /// assert_eq!(pool.get("warden_session"), Some("abc"));
    /// ```
    pub fn from_header(header: &str) -> Self {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            cookies
                .entry(name.to_owned())
                .or_insert_with(|| value.to_owned());
        }
        Self { cookies }
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for CookiePool
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// The session cookie an HTTP layer should set on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    pub same_site: SameSite,
    pub secure_only: bool,
    pub http_only: bool,
    /// Unix timestamp the cookie expires at, `0` for a browser-session cookie.
    pub expiry_timestamp: i64,
    /// Lifetime in seconds, `None` for a browser-session cookie.
    pub lifetime: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header() {
        let pool = CookiePool::from_header("a=1; b = 2 ;c=\"3\"; broken; =x; a=ignored");
        assert_eq!(pool.get("a"), Some("1"));
        assert_eq!(pool.get("b"), Some("2"));
        assert_eq!(pool.get("c"), Some("3"));
        assert!(!pool.has("broken"));
        assert!(!pool.has(""));
    }

    #[test]
    fn test_from_iter() {
        let pool: CookiePool = [("session", "value")].into_iter().collect();
        assert!(pool.has("session"));
        assert_eq!(pool.get("missing"), None);
    }

    #[test]
    fn test_empty_pool() {
        let pool = CookiePool::default();
        assert!(!pool.has("anything"));
    }
}
