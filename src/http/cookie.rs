// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar with optional file persistence
//!
//! The jar is keyed by `(domain, path, name)`. It is loaded once at run start
//! and written back after every exchange when a backing file is configured.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, IoContext, Result};

/// Upper bound on cookie lifetime, per RFC 6265bis section 5.5
const MAX_COOKIE_AGE: i64 = 400 * 24 * 60 * 60;

/// `Expires` layouts accepted besides RFC 2822
const EXPIRES_FORMATS: &[&str] = &[
    "%a, %d-%b-%Y %H:%M:%S GMT",
    "%A, %d-%b-%y %H:%M:%S GMT",
    "%a %b %e %H:%M:%S %Y",
];

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Only sent to exactly `domain`, not its subdomains
    #[serde(default)]
    pub host_only: bool,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            host_only: false,
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Session cookies have no expiry and die with the process unless the
    /// jar is told to keep them
    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    /// Check if the cookie matches the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !path_matches(&self.path, url.path()) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        if self.host_only {
            return host.eq_ignore_ascii_case(domain);
        }
        host.eq_ignore_ascii_case(domain) || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value received from `url`
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim());

        let host = url.host_str().unwrap_or("").to_lowercase();
        cookie.domain = host.clone();
        cookie.host_only = true;
        cookie.path = default_path(url);

        let mut max_age_seen = false;
        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" if !val.is_empty() => {
                        let domain = val.trim_start_matches('.').to_lowercase();
                        if host != domain && !host.ends_with(&format!(".{}", domain)) {
                            tracing::debug!(
                                "rejecting cookie {} for domain {} from {}",
                                name,
                                domain,
                                host
                            );
                            return None;
                        }
                        cookie.domain = domain;
                        cookie.host_only = false;
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" if !max_age_seen => {
                        if let Some(at) = parse_expires(val) {
                            cookie.expires = Some(at.min(expiry_after(MAX_COOKIE_AGE)));
                        }
                    }
                    "max-age" => {
                        if let Some(secs) = parse_max_age(val) {
                            max_age_seen = true;
                            cookie.expires = Some(expiry_after(secs));
                        }
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    fn key(&self) -> CookieKey {
        (self.domain.clone(), self.path.clone(), self.name.clone())
    }
}

/// Delta-seconds; out-of-range integers saturate
fn parse_max_age(val: &str) -> Option<i64> {
    let digits = val.strip_prefix('-').unwrap_or(val);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(val.parse().unwrap_or(if val.starts_with('-') { i64::MIN } else { i64::MAX }))
}

fn parse_expires(val: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(val) {
        return Some(at.with_timezone(&Utc));
    }
    EXPIRES_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(val, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Now plus `secs`, clamped to `[now, now + MAX_COOKIE_AGE]`
fn expiry_after(secs: i64) -> DateTime<Utc> {
    let now = Utc::now();
    TimeDelta::try_seconds(secs.clamp(0, MAX_COOKIE_AGE))
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now)
}

/// Directory of the request path, per RFC 6265 section 5.1.4
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

type CookieKey = (String, String, String);

/// Cookie storage for one run
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: BTreeMap<CookieKey, Cookie>,
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a jar file. A missing file yields an empty jar; expired entries
    /// are dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("cookie jar {} does not exist yet", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err::<Self, _>(e).reading(path),
        };

        if json.trim().is_empty() {
            return Ok(Self::new());
        }

        let jar = Self::from_json(&json).map_err(|e| Error::CannotReadFile {
            path: path.display().to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        tracing::debug!("loaded {} cookie(s) from {}", jar.len(), path.display());
        Ok(jar)
    }

    /// Write the jar to `path`, replacing its contents
    pub fn save(&self, path: impl AsRef<Path>, include_session: bool) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json(include_session).map_err(|e| Error::CannotWriteFile {
            path: path.display().to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        fs::write(path, json).writing(path)
    }

    /// Add a cookie to the jar; an already-expired cookie deletes its key
    pub fn add(&mut self, cookie: Cookie) {
        let key = cookie.key();
        if cookie.is_expired() {
            self.cookies.remove(&key);
        } else {
            self.cookies.insert(key, cookie);
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&mut self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Get all cookies for a URL, longest path first
    pub fn get_cookies(&self, url: &Url) -> Vec<&Cookie> {
        let mut result: Vec<&Cookie> = self.cookies.values().filter(|c| c.matches(url)).collect();
        result.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        result
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Look up one cookie by its key
    pub fn get(&self, domain: &str, path: &str, name: &str) -> Option<&Cookie> {
        self.cookies
            .get(&(domain.to_string(), path.to_string(), name.to_string()))
    }

    /// Remove a specific cookie
    pub fn remove(&mut self, name: &str, domain: &str, path: &str) {
        self.cookies
            .remove(&(domain.to_string(), path.to_string(), name.to_string()));
    }

    /// Clear all cookies
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Export unexpired cookies as JSON
    pub fn to_json(&self, include_session: bool) -> serde_json::Result<String> {
        let all_cookies: Vec<&Cookie> = self
            .cookies
            .values()
            .filter(|c| !c.is_expired())
            .filter(|c| include_session || !c.is_session())
            .collect();
        serde_json::to_string_pretty(&all_cookies)
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let mut jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }
}
