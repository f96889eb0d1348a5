// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing HTTP request

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::error::{Error, Result};

/// One fully assembled request, built once per target (and once per
/// redirect hop)
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers (multimap)
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
}

impl OutgoingRequest {
    /// Create a request with no headers or body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Parse a target into a request URL. Targets without a scheme get
    /// `http://`.
    pub fn parse_url(target: &str) -> Result<Url> {
        let candidate = if target.contains("://") {
            target.to_string()
        } else {
            format!("http://{}", target)
        };
        Url::parse(&candidate).map_err(|e| Error::invalid_url(target, e))
    }

    /// Append a header, keeping existing values
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = header_pair(name, value)?;
        self.headers.append(name, value);
        Ok(())
    }

    /// Replace all values of a header
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Check for a header regardless of case
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name.to_ascii_lowercase().as_str())
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .and_then(|v| v.to_str().ok())
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Get the host
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Path and query, as written on the request line
    pub fn request_target(&self) -> String {
        match self.url.query() {
            Some(q) => format!("{}?{}", self.url.path(), q),
            None => self.url.path().to_string(),
        }
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::try_from(name)
        .map_err(|_| Error::invalid_args(format!("invalid header name '{}'", name)))?;
    let header_value = HeaderValue::try_from(value)
        .map_err(|_| Error::invalid_args(format!("invalid value for header '{}'", name)))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_adds_scheme() {
        let url = OutgoingRequest::parse_url("example.com/path").unwrap();
        assert_eq!(url.as_str(), "http://example.com/path");

        let url = OutgoingRequest::parse_url("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        let err = OutgoingRequest::parse_url("http://exa mple.com").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_headers_are_a_multimap() {
        let url = Url::parse("https://example.com/a?b=c").unwrap();
        let mut req = OutgoingRequest::new(Method::GET, url);
        req.append_header("Cookie", "a=1").unwrap();
        req.append_header("cookie", "b=2").unwrap();
        req.set_header("X-Custom", "value").unwrap();

        assert_eq!(req.headers.get_all("cookie").iter().count(), 2);
        assert!(req.has_header("x-custom"));
        assert_eq!(req.header("X-Custom"), Some("value"));
        assert_eq!(req.request_target(), "/a?b=c");
        assert_eq!(req.host(), Some("example.com"));
    }

    #[test]
    fn test_invalid_header_name() {
        let url = Url::parse("https://example.com/").unwrap();
        let mut req = OutgoingRequest::new(Method::GET, url);
        assert!(req.append_header("bad name", "v").is_err());
    }
}
