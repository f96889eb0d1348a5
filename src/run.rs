// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-target execution loop
//!
//! Targets run one at a time in list order. Hard errors stop the run only
//! under fail-fast; otherwise the last error's status becomes the exit
//! status.

use crate::body::{BodyMode, FileReader, FsReader};
use crate::context::RunContext;
use crate::error::{Error, ExitStatus, Result};
use crate::http::{
    CredentialCompleter, Exchange, HttpClient, RequestAssembler, TerminalPrompt,
};
use crate::output::{OutputMode, OutputRouter};

/// Drives one invocation
pub struct Runner<C = TerminalPrompt> {
    ctx: RunContext,
    client: HttpClient,
    assembler: RequestAssembler<C>,
    router: OutputRouter,
    reader: Box<dyn FileReader>,
}

impl Runner<TerminalPrompt> {
    /// Runner over the real network, filesystem and terminal
    pub fn new(ctx: RunContext) -> Result<Self> {
        let client = HttpClient::from_context(&ctx)?;
        Ok(Self::with_parts(
            ctx,
            client,
            RequestAssembler::new(TerminalPrompt),
            OutputRouter::new(),
        ))
    }
}

impl<C: CredentialCompleter> Runner<C> {
    /// Runner from explicit collaborators
    pub fn with_parts(
        ctx: RunContext,
        client: HttpClient,
        assembler: RequestAssembler<C>,
        router: OutputRouter,
    ) -> Self {
        Self {
            ctx,
            client,
            assembler,
            router,
            reader: Box::new(FsReader),
        }
    }

    /// Resolve `@file` references through `reader`
    pub fn with_reader(mut self, reader: impl FileReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn assembler(&self) -> &RequestAssembler<C> {
        &self.assembler
    }

    /// Run every target and return the process exit status.
    ///
    /// Only a failure to write to stdout is returned as `Err`; every other
    /// error has already been reported to the error sink.
    pub async fn run(&mut self) -> Result<ExitStatus> {
        let mode = match self.ctx.body_mode() {
            Ok(mode) => mode,
            Err(e) => {
                self.report(&e)?;
                return Ok(e.exit_status());
            }
        };
        tracing::debug!("body mode: {}", mode.name());

        let mut status = ExitStatus::Success;
        for index in 0..self.ctx.targets.len() {
            let err = match self.run_target(index, &mode).await {
                Ok(()) => continue,
                Err(e) => e,
            };

            if err.is_fatal_output() {
                let _ = self.router.close_all();
                return Err(err);
            }

            tracing::warn!("target #{} failed: {}", index + 1, err);
            status = err.exit_status();
            if !err.is_soft() || self.ctx.silent_fail {
                self.report(&err)?;
            }
            if self.ctx.fail_fast && !err.is_soft() {
                tracing::debug!("aborting after target #{}", index + 1);
                break;
            }
        }

        if let Err(e) = self.router.close_all() {
            self.report(&e)?;
            status = e.exit_status();
        }
        Ok(status)
    }

    async fn run_target(&mut self, index: usize, mode: &BodyMode) -> Result<()> {
        let plan = mode.plan(index, self.reader.as_ref())?;

        let mut target = self.ctx.targets[index].clone();
        if let BodyMode::Upload(uploads) = mode {
            if let Some(spec) = uploads.get(index) {
                target = spec.target_url(&target);
            }
        }

        let request = self.assembler.assemble(plan, &target, &self.ctx)?;
        let exchange = self.client.execute(request).await?;

        if self.ctx.verbose {
            self.trace(&exchange)?;
        }

        let last = exchange
            .last()
            .ok_or_else(|| Error::no_response(target.as_str(), "empty response chain"))?;
        let failure = last.is_failure().then(|| Error::StatusCodeFailure {
            url: last.url.to_string(),
            status: last.status_code(),
        });

        if let Some(failure) = failure {
            if self.ctx.silent_fail {
                return Err(failure);
            }
            self.emit(index, &exchange)?;
            return Err(failure);
        }

        self.emit(index, &exchange)
    }

    fn emit(&mut self, index: usize, exchange: &Exchange) -> Result<()> {
        let pair = self.ctx.output_for(index);
        let mode = OutputMode {
            headers_only: self.ctx.head_only,
            include_headers: self.ctx.include_headers,
        };
        self.router
            .emit(&exchange.chain, &exchange.body, &pair, mode)
    }

    /// Write request and response headers of every hop to the error sink
    fn trace(&mut self, exchange: &Exchange) -> Result<()> {
        let mut text = String::new();
        for (request, hop) in exchange.requests.iter().zip(exchange.chain.hops()) {
            if let Some(tls) = &hop.tls {
                text.push_str(&format!("* {}\n", tls.describe()));
            }
            let protocol = hop.protocol.as_deref().unwrap_or("HTTP/1.1");
            text.push_str(&OutputRouter::format_request_headers(request, protocol));
            text.push_str(">\n");
            text.push_str(&OutputRouter::format_hop(hop, "< "));
            text.push_str("<\n");
        }
        let sink = self.ctx.error_sink.clone();
        self.router.write_to(&sink, text.as_bytes())
    }

    fn report(&mut self, err: &Error) -> Result<()> {
        let line = format!("{}\n", err.diagnostic());
        let sink = self.ctx.error_sink.clone();
        self.router.write_to(&sink, line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::DataMode;
    use crate::http::{CannedCredentials, EngineResponse, HttpClientConfig, HttpEngine, OutgoingRequest, ResponseHop};
    use crate::output::{OutputDestinationPair, Sink};
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// Status per URL path; unknown paths fail to connect
    #[derive(Default)]
    struct PathEngine {
        statuses: HashMap<&'static str, u16>,
        seen: Mutex<Vec<OutgoingRequest>>,
    }

    impl PathEngine {
        fn with(statuses: &[(&'static str, u16)]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<OutgoingRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpEngine for PathEngine {
        async fn send(&self, request: &OutgoingRequest) -> Result<EngineResponse> {
            self.seen.lock().unwrap().push(request.clone());
            let status = self
                .statuses
                .get(request.url.path())
                .copied()
                .ok_or_else(|| Error::no_response(request.url_str(), "connection refused"))?;
            Ok(EngineResponse {
                hop: ResponseHop::new(
                    request.url.clone(),
                    StatusCode::from_u16(status).unwrap(),
                    HeaderMap::new(),
                ),
                body: Bytes::from(format!("body of {}", request.url.path())),
            })
        }
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        runner: Runner<CannedCredentials>,
        engine: Arc<PathEngine>,
        stdout: Capture,
        stderr: Capture,
    }

    fn harness(ctx: RunContext, engine: PathEngine) -> Harness {
        let engine = Arc::new(engine);
        let stdout = Capture::default();
        let stderr = Capture::default();
        let client = HttpClient::new(engine.clone(), HttpClientConfig::from_context(&ctx));
        let router = OutputRouter::with_streams(Box::new(stdout.clone()), Box::new(stderr.clone()));
        let runner = Runner::with_parts(
            ctx,
            client,
            RequestAssembler::new(CannedCredentials::default()),
            router,
        );
        Harness {
            runner,
            engine,
            stdout,
            stderr,
        }
    }

    #[test]
    fn test_targets_run_in_order() {
        let ctx = RunContext::new(["http://h/a", "http://h/b"]);
        let mut h = harness(ctx, PathEngine::with(&[("/a", 200), ("/b", 200)]));

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::Success);
        assert_eq!(h.stdout.text(), "body of /abody of /b");
        let paths: Vec<_> = h.engine.seen().iter().map(|r| r.url.path().to_string()).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[test]
    fn test_conflicting_modes_send_nothing() {
        let ctx = RunContext::new(["http://h/a"])
            .data(DataMode::Standard, "a=1")
            .form("b=2");
        let mut h = harness(ctx, PathEngine::with(&[("/a", 200)]));

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::InvalidArguments);
        assert!(h.engine.seen().is_empty());
        assert!(h.stderr.text().starts_with("Error: only one of"));
    }

    #[test]
    fn test_last_error_wins_without_fail_fast() {
        let ctx = RunContext::new(["http://h/missing", "http://h/ok"]);
        let mut h = harness(ctx, PathEngine::with(&[("/ok", 200)]));

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::NoResponse);
        assert_eq!(h.engine.seen().len(), 2);
        assert_eq!(h.stdout.text(), "body of /ok");
        assert!(h.stderr.text().contains("no response from http://h/missing"));
    }

    #[test]
    fn test_fail_fast_stops_run() {
        let mut ctx = RunContext::new(["http://h/missing", "http://h/ok"]);
        ctx.fail_fast = true;
        let mut h = harness(ctx, PathEngine::with(&[("/ok", 200)]));

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::NoResponse);
        assert_eq!(h.engine.seen().len(), 1);
        assert!(h.stdout.text().is_empty());
    }

    #[test]
    fn test_status_failure_emits_output_by_default() {
        let ctx = RunContext::new(["http://h/gone"]);
        let mut h = harness(ctx, PathEngine::with(&[("/gone", 404)]));

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::StatusCodeFailure);
        assert_eq!(h.stdout.text(), "body of /gone");
        assert!(h.stderr.text().is_empty());
    }

    #[test]
    fn test_silent_fail_suppresses_output() {
        let mut ctx = RunContext::new(["http://h/gone", "http://h/ok"]);
        ctx.silent_fail = true;
        ctx.fail_fast = true;
        let mut h = harness(ctx, PathEngine::with(&[("/gone", 404), ("/ok", 200)]));

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::StatusCodeFailure);
        assert_eq!(h.stdout.text(), "body of /ok");
        assert!(h.stderr.text().contains("returned error: 404"));
    }

    #[test]
    fn test_discarded_error_sink() {
        let ctx = RunContext::new(["http://h/missing"]).error_sink(Sink::Discard);
        let mut h = harness(ctx, PathEngine::default());

        let status = tokio_test::block_on(h.runner.run()).unwrap();
        assert_eq!(status.code(), 7);
        assert!(h.stderr.text().is_empty());
    }

    #[test]
    fn test_upload_appends_file_name() {
        let ctx = RunContext::new(["http://h/files/"]).upload("local/notes.txt");
        let reader: HashMap<String, Vec<u8>> =
            [("local/notes.txt".to_string(), b"hi".to_vec())].into_iter().collect();
        let mut h = harness(ctx, PathEngine::with(&[("/files/notes.txt", 201)]));
        h.runner = h.runner.with_reader(reader);

        let status = tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(status, ExitStatus::Success);
        let seen = h.engine.seen();
        assert_eq!(seen[0].method, reqwest::Method::PUT);
        assert_eq!(seen[0].body.as_deref(), Some(&b"hi"[..]));
    }

    #[test]
    fn test_verbose_traces_to_error_sink() {
        let mut ctx = RunContext::new(["http://h/a"]);
        ctx.verbose = true;
        let mut h = harness(ctx, PathEngine::with(&[("/a", 200)]));

        tokio_test::block_on(h.runner.run()).unwrap();

        let trace = h.stderr.text();
        assert!(trace.starts_with("> GET /a HTTP/1.1\n"));
        assert!(trace.contains("< HTTP/? 200\n"));
    }

    #[test]
    fn test_head_only_prints_headers() {
        let mut ctx = RunContext::new(["http://h/a"]);
        ctx.head_only = true;
        let mut h = harness(ctx, PathEngine::with(&[("/a", 200)]));

        tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(h.engine.seen()[0].method, reqwest::Method::HEAD);
        assert_eq!(h.stdout.text(), "HTTP/? 200\n");
    }

    #[test]
    fn test_output_pair_per_target() {
        let ctx = RunContext::new(["http://h/a", "http://h/b"])
            .output(OutputDestinationPair::new(Sink::Discard, Sink::Stderr));
        let mut h = harness(ctx, PathEngine::with(&[("/a", 200), ("/b", 200)]));

        tokio_test::block_on(h.runner.run()).unwrap();

        assert_eq!(h.stderr.text(), "body of /a");
        assert_eq!(h.stdout.text(), "body of /b");
    }
}
