// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response hops and redirect chains

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

/// TLS details of one hop, when the connection was secured
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSummary {
    /// DER-encoded leaf certificate presented by the server
    pub peer_certificate: Option<Vec<u8>>,
}

impl TlsSummary {
    /// One-line description for verbose traces
    pub fn describe(&self) -> String {
        match &self.peer_certificate {
            Some(der) => format!("TLS: server certificate ({} bytes DER)", der.len()),
            None => "TLS: no server certificate".to_string(),
        }
    }
}

/// One request/response exchange within a redirect chain
#[derive(Debug, Clone)]
pub struct ResponseHop {
    /// URL the request for this hop was sent to
    pub url: Url,
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Protocol as reported by the engine (`HTTP/1.1`, `HTTP/2.0`); `None`
    /// when unknown
    pub protocol: Option<String>,
    pub tls: Option<TlsSummary>,
}

impl ResponseHop {
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            url,
            status,
            headers,
            protocol: None,
            tls: None,
        }
    }

    /// Set the protocol string
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set TLS details
    pub fn tls(mut self, tls: TlsSummary) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Status 400 and above
    pub fn is_failure(&self) -> bool {
        self.status.as_u16() >= 400
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// `Location` header, if any
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all("set-cookie")
    }
}

/// Ordered hops of one target: index 0 is the first response, the last is
/// the final one
#[derive(Debug, Clone, Default)]
pub struct ResponseChain {
    hops: Vec<ResponseHop>,
}

impl ResponseChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hop: ResponseHop) {
        self.hops.push(hop);
    }

    pub fn hops(&self) -> &[ResponseHop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// First response
    pub fn first(&self) -> Option<&ResponseHop> {
        self.hops.first()
    }

    /// Final response
    pub fn last(&self) -> Option<&ResponseHop> {
        self.hops.last()
    }

    /// Number of redirects followed
    pub fn redirect_count(&self) -> usize {
        self.hops.len().saturating_sub(1)
    }

    /// Final URL (after redirects)
    pub fn final_url(&self) -> Option<&Url> {
        self.last().map(|h| &h.url)
    }
}

impl<'a> IntoIterator for &'a ResponseChain {
    type Item = &'a ResponseHop;
    type IntoIter = std::slice::Iter<'a, ResponseHop>;

    fn into_iter(self) -> Self::IntoIter {
        self.hops.iter()
    }
}
