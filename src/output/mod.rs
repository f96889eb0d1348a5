// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Output routing
//!
//! Headers and bodies are written to [`Sink`]s. File sinks are opened once
//! per [`OutputRouter`] and every later write to the same path appends to the
//! already-open handle.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};
use crate::http::{OutgoingRequest, ResponseChain, ResponseHop};

/// A logical output destination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sink {
    Discard,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl Sink {
    /// Resolve a user-supplied destination name
    pub fn parse(spec: &str) -> Self {
        match spec {
            "" | "null" | "/dev/null" => Sink::Discard,
            "-" | "stdout" | "/dev/stdout" => Sink::Stdout,
            "stderr" | "/dev/stderr" => Sink::Stderr,
            path => Sink::File(PathBuf::from(path)),
        }
    }
}

impl From<&str> for Sink {
    fn from(spec: &str) -> Self {
        Sink::parse(spec)
    }
}

/// Per-target `(headers, body)` destinations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDestinationPair {
    pub headers: Sink,
    pub body: Sink,
}

impl OutputDestinationPair {
    pub fn new(headers: Sink, body: Sink) -> Self {
        Self { headers, body }
    }
}

impl Default for OutputDestinationPair {
    fn default() -> Self {
        Self::new(Sink::Discard, Sink::Stdout)
    }
}

/// Header emission mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputMode {
    /// Emit headers only; the body is dropped
    pub headers_only: bool,
    /// Prepend headers to the body
    pub include_headers: bool,
}

/// Writes response chains to their sinks
pub struct OutputRouter {
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    files: HashMap<PathBuf, File>,
}

impl Default for OutputRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputRouter {
    /// Router over the process streams
    pub fn new() -> Self {
        Self::with_streams(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Router over arbitrary writers standing in for stdout and stderr
    pub fn with_streams(stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        Self {
            stdout,
            stderr,
            files: HashMap::new(),
        }
    }

    /// Emit one target's result
    pub fn emit(
        &mut self,
        chain: &ResponseChain,
        body: &[u8],
        pair: &OutputDestinationPair,
        mode: OutputMode,
    ) -> Result<()> {
        let headers = Self::format_headers(chain, "");

        if mode.headers_only {
            return self.write_to(&pair.headers, headers.as_bytes());
        }

        if mode.include_headers {
            self.write_to(&pair.body, &combined(&headers, body))?;
            if pair.headers != pair.body {
                self.write_to(&pair.headers, headers.as_bytes())?;
            }
            return Ok(());
        }

        if pair.headers == pair.body {
            return self.write_to(&pair.body, &combined(&headers, body));
        }

        self.write_to(&pair.headers, headers.as_bytes())?;
        self.write_to(&pair.body, body)
    }

    /// Write `bytes` to `sink` in a single call
    pub fn write_to(&mut self, sink: &Sink, bytes: &[u8]) -> Result<()> {
        match sink {
            Sink::Discard => Ok(()),
            Sink::Stdout => self
                .stdout
                .write_all(bytes)
                .and_then(|_| self.stdout.flush())
                .map_err(Error::CannotWriteToStdout),
            Sink::Stderr => self
                .stderr
                .write_all(bytes)
                .and_then(|_| self.stderr.flush())
                .writing("stderr"),
            Sink::File(path) => {
                let file = self.file(path)?;
                file.write_all(bytes).writing(path)
            }
        }
    }

    /// Open file handles
    pub fn open_files(&self) -> usize {
        self.files.len()
    }

    /// Flush and release every open file
    pub fn close_all(&mut self) -> Result<()> {
        for (path, mut file) in self.files.drain() {
            file.flush().writing(&path)?;
        }
        Ok(())
    }

    fn file(&mut self, path: &Path) -> Result<&mut File> {
        if !self.files.contains_key(path) {
            tracing::debug!("opening output file {}", path.display());
            let file = File::create(path).writing(path)?;
            self.files.insert(path.to_path_buf(), file);
        }
        self.files
            .get_mut(path)
            .ok_or_else(|| Error::CannotWriteFile {
                path: path.display().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "file handle lost"),
            })
    }

    /// Render every hop of a chain, hops separated by a blank line
    pub fn format_headers(chain: &ResponseChain, prefix: &str) -> String {
        chain
            .hops()
            .iter()
            .map(|hop| Self::format_hop(hop, prefix))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render one hop: status line then sorted header lines
    pub fn format_hop(hop: &ResponseHop, prefix: &str) -> String {
        let protocol = hop.protocol.as_deref().unwrap_or("HTTP/?");
        let mut out = format!("{}{} {}\n", prefix, protocol, hop.status.as_u16());
        for (name, value) in sorted_lines(&hop.headers) {
            out.push_str(&format!("{}{}: {}\n", prefix, name, value));
        }
        out
    }

    /// Render a request as sent: `> {METHOD} {path} {protocol}` then headers
    pub fn format_request_headers(request: &OutgoingRequest, protocol: &str) -> String {
        let prefix = "> ";
        let mut out = format!(
            "{}{} {} {}\n",
            prefix,
            request.method,
            request.request_target(),
            protocol
        );

        let mut lines = sorted_lines(&request.headers);
        if !request.has_header("host") {
            if let Some(host) = request.host() {
                let host = match request.url.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };
                lines.push(("Host".to_string(), host));
                lines.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }
        for (name, value) in lines {
            out.push_str(&format!("{}{}: {}\n", prefix, name, value));
        }
        out
    }
}

fn combined(headers: &str, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(headers.len() + 1 + body.len());
    out.extend_from_slice(headers.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(body);
    out
}

/// Header lines with canonical names, sorted by name; one entry per value
fn sorted_lines(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    let mut lines: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| {
            (
                canonical_name(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    lines.sort_by(|a, b| a.0.cmp(&b.0));
    lines
}

/// `content-type` -> `Content-Type`
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
