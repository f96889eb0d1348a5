// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for kurl
//!
//! Request assembly, the redirect-following executor, the cookie jar and
//! certificate loading.

mod assembler;
mod client;
mod cookie;
mod request;
mod response;
mod tls;

pub use assembler::{CannedCredentials, CredentialCompleter, RequestAssembler, TerminalPrompt};
pub use client::{EngineResponse, Exchange, HttpClient, HttpClientConfig, HttpEngine, ReqwestEngine};
pub use cookie::{Cookie, CookieJar};
pub use request::OutgoingRequest;
pub use response::{ResponseChain, ResponseHop, TlsSummary};
pub use tls::{load_ca_bundle, load_identity, TlsMaterial};

/// User agent sent when none was configured
pub const DEFAULT_USER_AGENT: &str = concat!("kurl/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
    pub const REFERER: &str = "referer";
    pub const LOCATION: &str = "location";
    pub const AUTHORIZATION: &str = "authorization";
}
