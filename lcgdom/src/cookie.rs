//! Client-side cookie jar.

use std::collections::BTreeMap;

use crate::error::CookieError;

/// Persisted string key/value storage.
pub trait CookieStore {
    /// The decoded value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;
    /// Store `value` under `name`.
    fn set(&mut self, name: &str, value: &str) -> Result<(), CookieError>;
    /// Forget `name`.
    fn clear(&mut self, name: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredCookie {
    /// Percent-encoded value as it would appear in `document.cookie`.
    encoded: String,
    /// The full `Set-Cookie` style string of the last write.
    header: String,
}

/// An in-memory equivalent of `document.cookie` scoped to a path and domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookies {
    path: String,
    domain: Option<String>,
    jar: BTreeMap<String, StoredCookie>,
}

impl Default for Cookies {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            jar: BTreeMap::new(),
        }
    }
}

impl Cookies {
    /// Create a jar writing cookies for `path` (default `/`) and `domain`.
    pub fn new(path: Option<&str>, domain: Option<&str>) -> Result<Self, CookieError> {
        let path = path.unwrap_or("/");
        if !path.starts_with('/') || path.contains(';') {
            return Err(CookieError::InvalidPath(path.to_string()));
        }
        Ok(Self {
            path: path.to_string(),
            domain: domain.map(str::to_string),
            jar: BTreeMap::new(),
        })
    }

    /// Add the pairs of a `document.cookie` style string to this jar.
    pub fn seed(&mut self, cookies: &str) {
        for pair in cookies.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }
            self.jar.insert(
                name.to_string(),
                StoredCookie {
                    encoded: value.to_string(),
                    header: format!("{name}={value}"),
                },
            );
        }
    }

    /// Store `value` for `days` days. A negative count expires the cookie.
    pub fn set_for_days(&mut self, name: &str, value: &str, days: Option<i64>) -> Result<(), CookieError> {
        validate_name(name)?;
        if days.is_some_and(|d| d < 0) {
            self.jar.remove(name);
            return Ok(());
        }
        let encoded = urlencoding::encode(value).into_owned();
        let mut header = format!(
            "{name}={encoded}; SameSite=Lax; Path={}",
            urlencoding::encode(&self.path).replace("%2F", "/")
        );
        if let Some(days) = days {
            header.push_str(&format!("; Max-Age={}", days.saturating_mul(24 * 60 * 60)));
        }
        if let Some(domain) = &self.domain {
            header.push_str(&format!("; Domain={}", urlencoding::encode(domain)));
        }
        log::trace!("[cookies] {header}");
        self.jar.insert(name.to_string(), StoredCookie { encoded, header });
        Ok(())
    }

    /// The `Set-Cookie` style string of the last write to `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(|c| c.header.as_str())
    }

    /// All cookies as `document.cookie` would report them.
    pub fn cookie_string(&self) -> String {
        self.jar
            .iter()
            .map(|(name, c)| format!("{name}={}", c.encoded))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn clear_all(&mut self) {
        self.jar.clear();
    }
}

impl CookieStore for Cookies {
    fn get(&self, name: &str) -> Option<String> {
        let cookie = self.jar.get(name)?;
        match urlencoding::decode(&cookie.encoded) {
            Ok(value) => Some(value.into_owned()),
            Err(e) => {
                log::debug!("[cookies] undecodable value for {name}: {e}");
                None
            }
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), CookieError> {
        self.set_for_days(name, value, None)
    }

    fn clear(&mut self, name: &str) {
        self.jar.remove(name);
    }
}

fn validate_name(name: &str) -> Result<(), CookieError> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '=' | ';' | ','));
    if invalid {
        Err(CookieError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
