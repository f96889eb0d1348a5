// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! kurl CLI

use std::io::{self, Write};
use std::process::ExitCode;

use kurl::cli::Parser;
use kurl::{Cli, Error, ExitStatus, OutputRouter, Runner, Sink};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = match cli.into_context() {
        Ok(ctx) => ctx,
        Err(e) => return fail(&Sink::Stderr, &e),
    };
    let error_sink = ctx.error_sink.clone();

    let mut runner = match Runner::new(ctx) {
        Ok(runner) => runner,
        Err(e) => return fail(&error_sink, &e),
    };

    match runner.run().await {
        Ok(status) => exit_code(status),
        // stdout is gone: exit without trying to report through it
        Err(e) => exit_code(e.exit_status()),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "kurl=debug" } else { "kurl=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Report an error raised before the run started
fn fail(sink: &Sink, err: &Error) -> ExitCode {
    let line = format!("{}\n", err.diagnostic());
    let written = OutputRouter::new().write_to(sink, line.as_bytes());
    if written.is_err() {
        let _ = io::stderr().write_all(line.as_bytes());
    }
    exit_code(err.exit_status())
}

fn exit_code(status: ExitStatus) -> ExitCode {
    ExitCode::from(status.code())
}
