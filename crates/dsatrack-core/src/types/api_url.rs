//! API origin URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API origin URL.
///
/// This type ensures the URL is absolute, uses HTTPS (or HTTP for localhost),
/// and carries no trailing separators, so that endpoint paths can be appended
/// without producing `//`.
///
/// # Example
///
/// ```
/// use dsatrack_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.example.com/").unwrap();
/// assert_eq!(api.endpoint("api/users/me/"),
///            "https://api.example.com/api/users/me/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl {
    url: Url,
    base: String,
}

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        Self::parse(s.as_ref(), false)
    }

    /// Like [`ApiUrl::new`], but accepts plain HTTP for any host, e.g. a dev
    /// server on the local network.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn allow_http(s: impl AsRef<str>) -> Result<Self, Error> {
        Self::parse(s.as_ref(), true)
    }

    fn parse(s: &str, allow_http: bool) -> Result<Self, Error> {
        let s = s.trim();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s, allow_http)?;

        // The url crate renders an empty path as "/", so keep the
        // trimmed string form for endpoint construction.
        let base = url.as_str().trim_end_matches('/').to_string();

        Ok(Self { url, base })
    }

    /// Returns the full URL for a resource path.
    ///
    /// The path is normalized to exactly one leading `/`, however many the
    /// caller supplied. Query strings are kept as-is.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, normalize_path(path))
    }

    /// Returns the origin as a string, without trailing separators.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    fn validate(url: &Url, original: &str, allow_http: bool) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        // Bearer tokens only travel in the clear to a local dev server,
        // unless plain HTTP was explicitly allowed.
        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && (is_localhost || allow_http)) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Normalize a resource path to a single leading `/`.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.base)
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        &self.base
    }
}
