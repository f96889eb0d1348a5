// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Command-line flags
//!
//! Flag names follow the reference client. [`Cli::into_context`] turns the
//! parsed flags into a [`RunContext`].

use std::path::PathBuf;
use std::time::Duration;

pub use clap::Parser;

use crate::body::{DataArgument, DataMode, UploadSpec};
use crate::context::{RunContext, TlsOptions, UserAgent};
use crate::error::{Error, Result};
use crate::output::{OutputDestinationPair, Sink};

#[derive(Parser, Debug, Default)]
#[command(name = "kurl", version, about = "Transfer data from or to a server over HTTP(S)")]
pub struct Cli {
    /// Target URLs, processed in order
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    #[arg(short = 'X', long = "request", value_name = "METHOD", help = "Request method to use")]
    pub request: Option<String>,

    #[arg(short = 'H', long = "header", value_name = "HEADER", help = "Extra header, 'Name: value'")]
    pub headers: Vec<String>,

    #[arg(short = 'A', long = "user-agent", value_name = "NAME", help = "User-Agent; empty to omit")]
    pub user_agent: Option<String>,

    #[arg(short = 'e', long = "referer", value_name = "URL")]
    pub referer: Option<String>,

    #[arg(short = 'b', long = "cookie", value_name = "DATA", help = "Send literal cookies, 'name=value'")]
    pub cookies: Vec<String>,

    #[arg(short = 'c', long = "cookie-jar", value_name = "FILE", help = "Read and write cookies from FILE")]
    pub cookie_jar: Option<PathBuf>,

    #[arg(long = "junk-session-cookies", help = "Do not save session cookies to the jar")]
    pub junk_session_cookies: bool,

    #[arg(short = 'u', long = "user", value_name = "USER[:PASSWORD]")]
    pub user: Option<String>,

    #[arg(short = 'd', long = "data", value_name = "DATA")]
    pub data: Vec<String>,

    #[arg(long = "data-urlencode", value_name = "DATA")]
    pub data_urlencode: Vec<String>,

    #[arg(long = "data-raw", value_name = "DATA")]
    pub data_raw: Vec<String>,

    #[arg(long = "data-binary", value_name = "DATA")]
    pub data_binary: Vec<String>,

    #[arg(long = "json", value_name = "DATA")]
    pub json: Vec<String>,

    #[arg(short = 'F', long = "form", value_name = "NAME=CONTENT")]
    pub form: Vec<String>,

    #[arg(short = 'T', long = "upload-file", value_name = "FILE")]
    pub upload_file: Vec<String>,

    #[arg(short = 'I', long = "head", help = "Show response headers only")]
    pub head: bool,

    #[arg(short = 'i', long = "include", help = "Include response headers in the output")]
    pub include: bool,

    #[arg(short = 'L', long = "location", help = "Follow redirects")]
    pub location: bool,

    #[arg(long = "max-redirs", value_name = "NUM", allow_negative_numbers = true)]
    pub max_redirs: Option<i64>,

    #[arg(short = 'm', long = "max-time", value_name = "SECONDS", allow_negative_numbers = true)]
    pub max_time: Option<f64>,

    #[arg(long = "connect-timeout", value_name = "SECONDS")]
    pub connect_timeout: Option<f64>,

    #[arg(short = 'k', long = "insecure", help = "Skip certificate verification")]
    pub insecure: bool,

    #[arg(long = "cacert", value_name = "FILE")]
    pub cacert: Option<PathBuf>,

    #[arg(short = 'E', long = "cert", value_name = "FILE")]
    pub cert: Option<PathBuf>,

    #[arg(long = "key", value_name = "FILE")]
    pub key: Option<PathBuf>,

    #[arg(long = "compressed", help = "Request a compressed response")]
    pub compressed: bool,

    #[arg(short = 'f', long = "fail", help = "Fail silently on HTTP errors")]
    pub fail: bool,

    #[arg(long = "fail-early", help = "Stop at the first transfer error")]
    pub fail_early: bool,

    #[arg(short = 'o', long = "output", value_name = "FILE", help = "Write body to FILE (one per URL)")]
    pub output: Vec<String>,

    #[arg(short = 'D', long = "dump-header", value_name = "FILE", help = "Write headers to FILE (one per URL)")]
    pub dump_header: Vec<String>,

    #[arg(long = "stderr", value_name = "FILE", help = "Redirect diagnostics to FILE")]
    pub stderr: Option<String>,

    #[arg(short = 's', long = "silent")]
    pub silent: bool,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Build the run context
    pub fn into_context(self) -> Result<RunContext> {
        let mut ctx = RunContext::new(self.urls);

        ctx.method = self.request;
        ctx.headers = self
            .headers
            .iter()
            .map(String::as_str)
            .map(parse_header)
            .collect::<Result<_>>()?;
        ctx.user_agent = UserAgent::from_flag(self.user_agent);
        ctx.referer = self.referer;
        ctx.cookies = self.cookies;
        ctx.credentials = self.user;
        ctx.cookie_jar = self.cookie_jar;
        ctx.persist_session_cookies = !self.junk_session_cookies;

        let dialects = [
            (DataMode::Standard, self.data),
            (DataMode::Encoded, self.data_urlencode),
            (DataMode::RawConcat, self.data_raw),
            (DataMode::Binary, self.data_binary),
            (DataMode::Json, self.json),
        ];
        for (mode, items) in dialects {
            ctx.data
                .extend(items.into_iter().map(|raw| DataArgument::new(mode, raw)));
        }
        ctx.form = self.form;
        ctx.uploads = self.upload_file.into_iter().map(UploadSpec::new).collect();

        ctx.head_only = self.head;
        ctx.include_headers = self.include;
        ctx.follow_redirects = self.location;
        if let Some(max) = self.max_redirs {
            ctx.max_redirects = usize::try_from(max).unwrap_or(usize::MAX);
        }
        ctx.timeout = self.max_time.map(|s| seconds("--max-time", s)).transpose()?;
        ctx.connect_timeout = self
            .connect_timeout
            .map(|s| seconds("--connect-timeout", s))
            .transpose()?;
        ctx.tls = TlsOptions {
            insecure: self.insecure,
            ca_cert: self.cacert,
            client_cert: self.cert,
            client_key: self.key,
        };
        ctx.compressed = self.compressed;

        ctx.silent_fail = self.fail;
        ctx.fail_fast = self.fail_early;
        ctx.verbose = self.verbose;

        if let Some(spec) = self.stderr {
            ctx.error_sink = Sink::parse(&spec);
        }
        if self.silent {
            ctx.error_sink = Sink::Discard;
        }

        if !self.output.is_empty() || !self.dump_header.is_empty() {
            let default = ctx.default_output();
            ctx.outputs = (0..ctx.targets.len())
                .map(|i| {
                    OutputDestinationPair::new(
                        self.dump_header
                            .get(i)
                            .map(|s| Sink::parse(s))
                            .unwrap_or_else(|| default.headers.clone()),
                        self.output
                            .get(i)
                            .map(|s| Sink::parse(s))
                            .unwrap_or_else(|| default.body.clone()),
                    )
                })
                .collect();
        }

        Ok(ctx)
    }
}

/// Split `Name: value`
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::invalid_args(format!("invalid header '{}': expected 'Name: value'", raw)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_args(format!("invalid header '{}': empty name", raw)));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn seconds(flag: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| Error::invalid_args(format!("{}: invalid number of seconds '{}'", flag, value)))
}
