//! Cookie storage, the client's only persisted state.
//!
//! The jar maps cookie names to values and, when opened from a file, writes
//! itself back to disk after every change so the login survives between
//! CLI invocations.

use chrono::Utc;
use cookie::Cookie;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Value written to the auth cookie on logout
pub const LOGGED_OUT: &str = "loggedout";

/// Name of the cookie carrying the auth token
pub const DEFAULT_AUTH_COOKIE: &str = "jwt";

/// What the jar knows about the auth cookie.
///
/// `Absent` and `LoggedOut` both mean "not authenticated"; they are kept
/// apart so callers can tell a fresh client from an explicit logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCookie {
    Absent,
    LoggedOut,
    Token(String),
}

#[derive(Debug)]
pub struct CookieJar {
    auth_cookie: String,
    path: Option<PathBuf>,
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieJar {
    /// A jar that lives only as long as the process
    pub fn in_memory(auth_cookie: impl Into<String>) -> Self {
        Self {
            auth_cookie: auth_cookie.into(),
            path: None,
            cookies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open a file-backed jar; a missing file is an empty jar
    pub fn open(path: impl Into<PathBuf>, auth_cookie: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let cookies = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    ClientError::Config(format!(
                        "cookie file {} is corrupt: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), count = cookies.len(), "Opened cookie jar");

        Ok(Self {
            auth_cookie: auth_cookie.into(),
            path: Some(path),
            cookies: RwLock::new(cookies),
        })
    }

    pub fn auth_cookie_name(&self) -> &str {
        &self.auth_cookie
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.read().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut cookies = self.cookies.write();
        cookies.insert(name.to_string(), value.to_string());
        self.persist(&cookies)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut cookies = self.cookies.write();
        if cookies.remove(name).is_some() {
            self.persist(&cookies)?;
        }
        Ok(())
    }

    /// Apply a `Set-Cookie` response header.
    ///
    /// An expired cookie (`Max-Age<=0` or an `Expires` date in the past) is
    /// removed; unparseable headers are ignored.
    pub fn store_set_cookie(&self, header: &str) -> Result<()> {
        let parsed = match Cookie::parse(header) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed Set-Cookie header");
                return Ok(());
            }
        };

        let expired = match parsed.max_age() {
            Some(age) => age.is_zero() || age.is_negative(),
            None => parsed
                .expires_datetime()
                .map(|at| at.unix_timestamp() <= Utc::now().timestamp())
                .unwrap_or(false),
        };

        if expired {
            self.remove(parsed.name())
        } else {
            self.set(parsed.name(), parsed.value())
        }
    }

    pub fn auth_cookie(&self) -> AuthCookie {
        match self.get(&self.auth_cookie) {
            None => AuthCookie::Absent,
            Some(v) if v.is_empty() || v == LOGGED_OUT => AuthCookie::LoggedOut,
            Some(v) => AuthCookie::Token(v),
        }
    }

    /// The live auth token, if any
    pub fn auth_token(&self) -> Option<String> {
        match self.auth_cookie() {
            AuthCookie::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn set_auth_token(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() || token == LOGGED_OUT {
            return Err(ClientError::Decode(
                "server returned an empty auth token".to_string(),
            ));
        }
        self.set(&self.auth_cookie, token)
    }

    /// Overwrite the auth cookie with the logged-out sentinel
    pub fn mark_logged_out(&self) -> Result<()> {
        self.set(&self.auth_cookie, LOGGED_OUT)
    }

    fn persist(&self, cookies: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(cookies)
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content)?;

        // The jar holds the bearer token (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&tmp)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&tmp, perms)?;
        }

        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_jar_is_absent() {
        let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
        assert_eq!(jar.auth_cookie(), AuthCookie::Absent);
        assert!(jar.auth_token().is_none());
    }

    #[test]
    fn test_sentinel_is_not_a_token() {
        let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
        jar.set_auth_token("abc.def.ghi").unwrap();
        assert_eq!(jar.auth_token().as_deref(), Some("abc.def.ghi"));

        jar.mark_logged_out().unwrap();
        assert_eq!(jar.auth_cookie(), AuthCookie::LoggedOut);
        assert!(jar.auth_token().is_none());
    }

    #[test]
    fn test_other_cookies_do_not_authenticate() {
        let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
        jar.set("theme", "dark").unwrap();
        assert_eq!(jar.auth_cookie(), AuthCookie::Absent);
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
        assert!(jar.set_auth_token("").is_err());
        assert!(jar.set_auth_token(LOGGED_OUT).is_err());
    }

    #[test]
    fn test_set_cookie_header() {
        let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
        jar.store_set_cookie("jwt=token123; Path=/; HttpOnly; SameSite=Lax")
            .unwrap();
        assert_eq!(jar.auth_token().as_deref(), Some("token123"));

        jar.store_set_cookie("jwt=gone; Max-Age=0").unwrap();
        assert_eq!(jar.auth_cookie(), AuthCookie::Absent);

        jar.store_set_cookie("not a cookie").unwrap();
    }

    #[test]
    fn test_set_cookie_with_past_expiry_is_removed() {
        let jar = CookieJar::in_memory(DEFAULT_AUTH_COOKIE);
        jar.store_set_cookie("jwt=token123; Expires=Wed, 01 Jan 2099 00:00:00 GMT")
            .unwrap();
        assert_eq!(jar.auth_token().as_deref(), Some("token123"));

        jar.store_set_cookie("jwt=gone; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
            .unwrap();
        assert_eq!(jar.auth_cookie(), AuthCookie::Absent);
    }

    #[cfg(unix)]
    #[test]
    fn test_cookie_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        let jar = CookieJar::open(&path, DEFAULT_AUTH_COOKIE).unwrap();
        jar.set_auth_token("secret").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_backed_jar_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("cookies.json");

        let jar = CookieJar::open(&path, DEFAULT_AUTH_COOKIE).unwrap();
        jar.set_auth_token("persisted").unwrap();
        drop(jar);

        let reopened = CookieJar::open(&path, DEFAULT_AUTH_COOKIE).unwrap();
        assert_eq!(reopened.auth_token().as_deref(), Some("persisted"));
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = CookieJar::open(&path, DEFAULT_AUTH_COOKIE).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
