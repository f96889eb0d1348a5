// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # kurl - curl-compatible HTTP client core
//!
//! Request bodies are built by one of several mutually exclusive modes
//! (data dialects, multipart forms, direct upload), assembled into a
//! request with headers, credentials and cookies, and sent to each target
//! in turn. Every hop of a redirect chain is recorded and routed to the
//! configured header and body sinks.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kurl::{DataMode, RunContext, Runner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = RunContext::new(["https://example.com/form"])
//!         .data(DataMode::Standard, "name=value")
//!         .follow_redirects(true);
//!
//!     let mut runner = Runner::new(ctx)?;
//!     let status = runner.run().await?;
//!     println!("exit code {}", status.code());
//!
//!     Ok(())
//! }
//! ```

pub mod body;
pub mod cli;
pub mod context;
pub mod error;
pub mod http;
pub mod output;
pub mod run;

// Body encoding
pub use body::{BodyMode, DataArgument, DataMode, FileReader, FormField, FsReader, RequestPlan, UploadSpec};

// Configuration
pub use cli::Cli;
pub use context::{RunContext, TlsOptions, UserAgent};

// Errors
pub use error::{Error, ExitStatus, Result};

// HTTP
pub use http::{
    CookieJar, Cookie, CredentialCompleter, HttpClient, HttpEngine, OutgoingRequest,
    RequestAssembler, ResponseChain, ResponseHop,
};

// Output
pub use output::{OutputDestinationPair, OutputMode, OutputRouter, Sink};

// Execution
pub use run::Runner;

/// kurl version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
