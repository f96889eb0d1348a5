// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Run configuration
//!
//! A fully-populated [`RunContext`] is produced by the flag parser and
//! consumed by the runner.

use std::path::PathBuf;
use std::time::Duration;

use crate::body::{BodyMode, DataArgument, DataMode, UploadSpec};
use crate::error::{Error, Result};
use crate::output::{OutputDestinationPair, Sink};

/// Default redirect limit when following is enabled
pub const DEFAULT_MAX_REDIRECTS: usize = 50;

/// User-Agent selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserAgent {
    /// Leave it to the engine default
    #[default]
    Default,
    /// Explicitly empty: send no User-Agent at all
    Omit,
    /// Force this value
    Custom(String),
}

impl UserAgent {
    /// Map a flag value: empty means omit
    pub fn from_flag(value: Option<String>) -> Self {
        match value {
            None => UserAgent::Default,
            Some(v) if v.is_empty() => UserAgent::Omit,
            Some(v) => UserAgent::Custom(v),
        }
    }
}

/// TLS inputs for the certificate-loading step
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Skip certificate verification
    pub insecure: bool,
    /// PEM bundle added to the trust pool
    pub ca_cert: Option<PathBuf>,
    /// PEM client certificate
    pub client_cert: Option<PathBuf>,
    /// PEM client key (defaults to the certificate file)
    pub client_key: Option<PathBuf>,
}

/// Everything one invocation needs
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Target URLs, processed in order
    pub targets: Vec<String>,
    /// Explicit method (`-X`); always wins
    pub method: Option<String>,
    /// User headers, in order; names may repeat
    pub headers: Vec<(String, String)>,
    pub user_agent: UserAgent,
    pub referer: Option<String>,
    /// Literal `Cookie` header values (`-b name=value`)
    pub cookies: Vec<String>,
    /// `user[:password]`
    pub credentials: Option<String>,
    /// Backing file of the cookie jar; `None` keeps the jar in memory
    pub cookie_jar: Option<PathBuf>,
    /// Write session cookies to the jar file
    pub persist_session_cookies: bool,
    /// Data arguments across all dialects
    pub data: Vec<DataArgument>,
    /// `-F` items
    pub form: Vec<String>,
    /// `-T` files
    pub uploads: Vec<UploadSpec>,
    /// `-I`
    pub head_only: bool,
    /// `-i`
    pub include_headers: bool,
    /// `-L`
    pub follow_redirects: bool,
    pub max_redirects: usize,
    /// Whole-request timeout
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub tls: TlsOptions,
    /// `--compressed`
    pub compressed: bool,
    /// Abort the run on the first hard error
    pub fail_fast: bool,
    /// `-f`: suppress output for status >= 400
    pub silent_fail: bool,
    /// `-v`
    pub verbose: bool,
    /// Where diagnostics and verbose traces go
    pub error_sink: Sink,
    /// Per-target output pairs; missing entries use [`RunContext::default_output`]
    pub outputs: Vec<OutputDestinationPair>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            method: None,
            headers: Vec::new(),
            user_agent: UserAgent::Default,
            referer: None,
            cookies: Vec::new(),
            credentials: None,
            cookie_jar: None,
            persist_session_cookies: true,
            data: Vec::new(),
            form: Vec::new(),
            uploads: Vec::new(),
            head_only: false,
            include_headers: false,
            follow_redirects: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: None,
            connect_timeout: None,
            tls: TlsOptions::default(),
            compressed: false,
            fail_fast: false,
            silent_fail: false,
            verbose: false,
            error_sink: Sink::Stderr,
            outputs: Vec::new(),
        }
    }
}

impl RunContext {
    /// Create a context for the given targets
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set explicit method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a data argument
    pub fn data(mut self, mode: DataMode, raw: impl Into<String>) -> Self {
        self.data.push(DataArgument::new(mode, raw));
        self
    }

    /// Add a form item
    pub fn form(mut self, item: impl Into<String>) -> Self {
        self.form.push(item.into());
        self
    }

    /// Add an upload file
    pub fn upload(mut self, path: impl Into<String>) -> Self {
        self.uploads.push(UploadSpec::new(path));
        self
    }

    /// Set the cookie jar file
    pub fn cookie_jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_jar = Some(path.into());
        self
    }

    /// Enable redirect following
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set the output pair for the next target
    pub fn output(mut self, pair: OutputDestinationPair) -> Self {
        self.outputs.push(pair);
        self
    }

    /// Set the error sink
    pub fn error_sink(mut self, sink: Sink) -> Self {
        self.error_sink = sink;
        self
    }

    /// Output pair used when a target has none configured
    pub fn default_output(&self) -> OutputDestinationPair {
        if self.head_only {
            OutputDestinationPair::new(Sink::Stdout, Sink::Stdout)
        } else {
            OutputDestinationPair::default()
        }
    }

    /// Output pair for the target at `index`
    pub fn output_for(&self, index: usize) -> OutputDestinationPair {
        self.outputs
            .get(index)
            .cloned()
            .unwrap_or_else(|| self.default_output())
    }

    /// Validate inputs and select the single active body mode.
    ///
    /// Runs before any network activity.
    pub fn body_mode(&self) -> Result<BodyMode> {
        if self.targets.is_empty() {
            return Err(Error::invalid_args("no URL specified"));
        }

        let active = [
            !self.data.is_empty(),
            !self.form.is_empty(),
            !self.uploads.is_empty(),
            self.head_only,
        ]
        .iter()
        .filter(|on| **on)
        .count();

        if active > 1 {
            return Err(Error::invalid_args(
                "only one of --data, --form, --upload-file, --head may be used",
            ));
        }

        if let Some(first) = self.data.first() {
            let mode = first.mode;
            if let Some(other) = self.data.iter().find(|d| d.mode != mode) {
                return Err(Error::invalid_args(format!(
                    "{} cannot be combined with {}",
                    mode.flag(),
                    other.mode.flag()
                )));
            }
            let items = self.data.iter().map(|d| d.raw.clone()).collect();
            return Ok(BodyMode::Data { mode, items });
        }

        if !self.form.is_empty() {
            return Ok(BodyMode::Multipart(self.form.clone()));
        }

        if !self.uploads.is_empty() {
            if self.uploads.len() != self.targets.len() {
                return Err(Error::invalid_args(format!(
                    "{} upload file(s) given for {} URL(s); each URL needs exactly one --upload-file",
                    self.uploads.len(),
                    self.targets.len()
                )));
            }
            return Ok(BodyMode::Upload(self.uploads.clone()));
        }

        if self.head_only {
            return Ok(BodyMode::HeadOnly);
        }

        Ok(BodyMode::Empty)
    }
}
