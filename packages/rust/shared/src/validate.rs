//! URL validation.
//!
//! A [`ValidatedUrl`] can only be obtained through [`validate_url`], so any
//! function taking one may assume an absolute `http`/`https` URL with a host.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::{QuickstartError, Result};

/// Longest URL accepted, matching the common browser limit.
pub const MAX_URL_LENGTH: usize = 2083;

/// An absolute URL known to use an HTTP or HTTPS scheme and to have a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    /// Borrow the underlying [`Url`].
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The URL as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Host component (always present).
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a raw, user-supplied URL string.
///
/// Surrounding whitespace is ignored. Fails with
/// [`QuickstartError::InvalidUrlFormat`] (carrying the untrimmed `raw` input) when the
/// input is not an absolute `http`/`https` URL with a non-empty host.
pub fn validate_url(raw: &str) -> Result<ValidatedUrl> {
    let candidate = raw.trim();

    if candidate.is_empty() {
        return Err(QuickstartError::invalid_url(raw, "URL is empty"));
    }

    if candidate.chars().count() > MAX_URL_LENGTH {
        return Err(QuickstartError::invalid_url(
            raw,
            format!("URL is longer than {MAX_URL_LENGTH} characters"),
        ));
    }

    let url = Url::parse(candidate).map_err(|e| QuickstartError::invalid_url(raw, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(QuickstartError::invalid_url(
                raw,
                format!("URL scheme should be 'http' or 'https', got '{other}'"),
            ));
        }
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(ValidatedUrl(url)),
        _ => Err(QuickstartError::invalid_url(raw, "URL has no host")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn rejects(raw: &str) {
        let err = validate_url(raw).expect_err(raw);
        assert_eq!(err.kind(), ErrorKind::InvalidUrlFormat, "{raw}");
        match err {
            QuickstartError::InvalidUrlFormat { raw: carried, .. } => assert_eq!(carried, raw),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn accepts_path_query_and_fragment() {
        let url = validate_url("https://hub.docker.com/_/redis?tab=description#how-to-use")
            .expect("valid url");
        assert_eq!(url.host(), "hub.docker.com");
        assert_eq!(url.as_url().query(), Some("tab=description"));
        assert_eq!(url.as_url().fragment(), Some("how-to-use"));
    }

    #[test]
    fn accepts_http_with_port() {
        let url = validate_url("http://localhost:8080/docs").expect("valid url");
        assert_eq!(url.as_url().port(), Some(8080));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let url = validate_url("  https://example.com/  ").expect("valid url");
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn rejects_missing_scheme() {
        rejects("not a url");
        rejects("example.com/path");
        rejects("//example.com/path");
    }

    #[test]
    fn rejects_missing_host() {
        rejects("http://");
        rejects("http://:8080/");
    }

    #[test]
    fn rejects_non_http_schemes() {
        rejects("ftp://example.com/file");
        rejects("mailto:someone@example.com");
        rejects("file:///etc/passwd");
    }

    #[test]
    fn rejects_empty_and_oversized() {
        rejects("");
        rejects("   ");
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        rejects(&long);
    }

    #[test]
    fn length_limit_counts_characters() {
        let prefix = "https://example.com/";
        let fits = format!("{prefix}{}", "é".repeat(MAX_URL_LENGTH - prefix.len()));
        assert_eq!(fits.chars().count(), MAX_URL_LENGTH);
        assert!(fits.len() > MAX_URL_LENGTH);
        validate_url(&fits).expect("multibyte URL at the limit");

        let over = format!("{fits}é");
        rejects(&over);
    }
}
