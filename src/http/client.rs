// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! [`HttpEngine`] is the transport seam. [`HttpClient`] drives it one hop at
//! a time so every response of a redirect chain is observed, applying the
//! cookie jar on the way out and on the way back.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::redirect::Policy;
use reqwest::tls::TlsInfo;
use reqwest::{Client, Method, StatusCode};

use super::cookie::CookieJar;
use super::headers;
use super::request::OutgoingRequest;
use super::response::{ResponseChain, ResponseHop, TlsSummary};
use super::tls::TlsMaterial;
use crate::context::{RunContext, TlsOptions, DEFAULT_MAX_REDIRECTS};
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Follow `Location` on 3xx responses
    pub follow_redirects: bool,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Ask for and decode gzip/brotli bodies
    pub compressed: bool,
    pub tls: TlsOptions,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            follow_redirects: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            compressed: false,
            tls: TlsOptions::default(),
        }
    }
}

impl HttpClientConfig {
    /// Take the transport settings of a run
    pub fn from_context(ctx: &RunContext) -> Self {
        Self {
            timeout: ctx.timeout,
            connect_timeout: ctx.connect_timeout,
            follow_redirects: ctx.follow_redirects,
            max_redirects: ctx.max_redirects,
            compressed: ctx.compressed,
            tls: ctx.tls.clone(),
        }
    }
}

/// One response as returned by an engine
#[derive(Debug, Clone)]
pub struct EngineResponse {
    pub hop: ResponseHop,
    pub body: Bytes,
}

/// Sends a single request and returns a single response; never follows
/// redirects itself
#[async_trait]
pub trait HttpEngine: Send + Sync {
    async fn send(&self, request: &OutgoingRequest) -> Result<EngineResponse>;
}

/// Engine backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestEngine {
    client: Client,
}

impl ReqwestEngine {
    /// Build the underlying client. Certificate problems are
    /// [`Error::SslSystemFailure`].
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let material = TlsMaterial::load(&config.tls)?;

        let mut builder = Client::builder()
            .redirect(Policy::none())
            .gzip(config.compressed)
            .brotli(config.compressed)
            .tls_info(true)
            .danger_accept_invalid_certs(material.insecure);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        for root in material.roots {
            builder = builder.add_root_certificate(root);
        }
        if let Some(identity) = material.identity {
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| Error::ssl(format!("cannot initialize TLS client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpEngine for ReqwestEngine {
    async fn send(&self, request: &OutgoingRequest) -> Result<EngineResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;

        let tls = response
            .extensions()
            .get::<TlsInfo>()
            .map(|info| TlsSummary {
                peer_certificate: info.peer_certificate().map(|der| der.to_vec()),
            });

        let mut hop = ResponseHop::new(
            request.url.clone(),
            response.status(),
            response.headers().clone(),
        )
        .protocol(format!("{:?}", response.version()));
        if let Some(tls) = tls {
            hop = hop.tls(tls);
        }

        let body = response.bytes().await?;
        Ok(EngineResponse { hop, body })
    }
}

/// Everything observed while executing one target
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Requests as sent, one per hop
    pub requests: Vec<OutgoingRequest>,
    pub chain: ResponseChain,
    /// Body of the final hop
    pub body: Bytes,
}

impl Exchange {
    /// Final response
    pub fn last(&self) -> Option<&ResponseHop> {
        self.chain.last()
    }
}

/// Redirect-following executor with cookie management
pub struct HttpClient {
    engine: Arc<dyn HttpEngine>,
    config: HttpClientConfig,
    cookie_jar: CookieJar,
    jar_path: Option<PathBuf>,
    persist_session: bool,
}

impl HttpClient {
    /// Create a client over any engine with an in-memory jar
    pub fn new(engine: Arc<dyn HttpEngine>, config: HttpClientConfig) -> Self {
        Self {
            engine,
            config,
            cookie_jar: CookieJar::new(),
            jar_path: None,
            persist_session: true,
        }
    }

    /// Create the reqwest-backed client for a run, loading its jar file
    pub fn from_context(ctx: &RunContext) -> Result<Self> {
        let config = HttpClientConfig::from_context(ctx);
        let engine = ReqwestEngine::new(&config)?;
        let mut client = Self::new(Arc::new(engine), config);

        if let Some(path) = &ctx.cookie_jar {
            let jar = CookieJar::load(path)?;
            client = client.with_jar(jar, Some(path.clone()), ctx.persist_session_cookies);
        }
        Ok(client)
    }

    /// Use `jar`, writing it to `path` after every exchange
    pub fn with_jar(mut self, jar: CookieJar, path: Option<PathBuf>, persist_session: bool) -> Self {
        self.cookie_jar = jar;
        self.jar_path = path;
        self.persist_session = persist_session;
        self
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute a request, following redirects when enabled.
    ///
    /// The jar is written back once the exchange ends, whether or not it
    /// succeeded.
    pub async fn execute(&mut self, request: OutgoingRequest) -> Result<Exchange> {
        let start = Instant::now();
        let mut requests = Vec::new();
        let mut chain = ResponseChain::new();
        let mut current = request;

        let outcome = loop {
            let mut sent = current.clone();
            if let Some(cookie_header) = self.cookie_jar.get_cookie_header(&sent.url) {
                if let Err(e) = sent.append_header(headers::COOKIE, &cookie_header) {
                    break Err(e);
                }
            }

            tracing::debug!("hop {}: {} {}", chain.len(), sent.method, sent.url);
            let response = match self.engine.send(&sent).await {
                Ok(response) => response,
                Err(e) => break Err(e),
            };
            tracing::debug!(
                "hop {}: {} from {}",
                chain.len(),
                response.hop.status,
                response.hop.url
            );

            for header in response.hop.set_cookies() {
                self.cookie_jar.add_from_header(header, &response.hop.url);
            }
            requests.push(sent);

            let next = self.next_hop(&current, &response.hop, chain.len());
            chain.push(response.hop);
            match next {
                Ok(Some(next)) => current = next,
                Ok(None) => break Ok(response.body),
                Err(e) => break Err(e),
            }
        };

        let persisted = self.persist();
        let body = outcome?;
        persisted?;

        tracing::debug!(
            "exchange finished after {} hop(s) in {}ms",
            chain.len(),
            start.elapsed().as_millis()
        );
        Ok(Exchange {
            requests,
            chain,
            body,
        })
    }

    /// Request for the hop following `hop`, if it is to be followed
    fn next_hop(
        &self,
        current: &OutgoingRequest,
        hop: &ResponseHop,
        followed: usize,
    ) -> Result<Option<OutgoingRequest>> {
        if !self.config.follow_redirects || !hop.is_redirect() {
            return Ok(None);
        }

        let keep_method = !matches!(
            hop.status,
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
        );

        let location = match hop.location() {
            Some(location) => location,
            None => {
                tracing::warn!("redirect status {} for {} but no Location header", hop.status, hop.url);
                return Ok(None);
            }
        };

        if followed >= self.config.max_redirects {
            return Err(Error::no_response(
                current.url_str(),
                format!("maximum ({}) redirects followed", self.config.max_redirects),
            ));
        }

        let url = current.url.join(location).map_err(|e| {
            Error::no_response(
                current.url_str(),
                format!("invalid redirect location '{}': {}", location, e),
            )
        })?;

        let mut next = current.clone();
        if !keep_method && next.method != Method::HEAD {
            next.method = Method::GET;
            next.body = None;
            next.headers.remove(headers::CONTENT_TYPE);
        }
        if next.url.host_str() != url.host_str() {
            next.headers.remove(headers::AUTHORIZATION);
        }
        next.url = url;

        tracing::debug!("following {} redirect to {}", hop.status, next.url);
        Ok(Some(next))
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.jar_path {
            self.cookie_jar.save(path, self.persist_session)?;
            tracing::debug!("saved {} cookie(s) to {}", self.cookie_jar.len(), path.display());
        }
        Ok(())
    }
}
