// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request assembly
//!
//! Combines a [`RequestPlan`] with the run's headers, user agent, referer,
//! credentials and literal cookies into one [`OutgoingRequest`].

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use base64::Engine as _;
use reqwest::Method;

use super::headers;
use super::request::OutgoingRequest;
use super::DEFAULT_USER_AGENT;
use crate::body::RequestPlan;
use crate::context::{RunContext, UserAgent};
use crate::error::{Error, Result};

/// Completes a `user` credential that carries no password
pub trait CredentialCompleter {
    /// Return the password for `user`
    fn complete(&mut self, user: &str) -> Result<String>;
}

/// Blocking prompt on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl CredentialCompleter for TerminalPrompt {
    fn complete(&mut self, user: &str) -> Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "Enter host password for user '{}':", user)
            .and_then(|_| stderr.flush())
            .map_err(|e| Error::invalid_args(format!("cannot prompt for password: {}", e)))?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::invalid_args(format!("cannot read password: {}", e)))?;
        let _ = writeln!(stderr);

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Completer answering from a fixed list, for tests and scripted runs
#[derive(Debug, Default)]
pub struct CannedCredentials {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl CannedCredentials {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Users prompted for so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl CredentialCompleter for CannedCredentials {
    fn complete(&mut self, user: &str) -> Result<String> {
        self.asked.push(user.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::invalid_args(format!("no password available for user '{}'", user)))
    }
}

/// Builds one request per target
pub struct RequestAssembler<C> {
    completer: C,
    /// Credential completed by a prompt, reused for later targets
    completed: Option<String>,
}

impl<C: CredentialCompleter> RequestAssembler<C> {
    pub fn new(completer: C) -> Self {
        Self {
            completer,
            completed: None,
        }
    }

    /// Access the completer
    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// Assemble the request for `target`
    pub fn assemble(
        &mut self,
        plan: RequestPlan,
        target: &str,
        ctx: &RunContext,
    ) -> Result<OutgoingRequest> {
        let url = OutgoingRequest::parse_url(target)?;
        let method = resolve_method(ctx.method.as_deref(), plan.method)?;
        let mut request = OutgoingRequest::new(method, url);

        for (name, value) in &ctx.headers {
            request.append_header(name, value)?;
        }

        if let Some(mime) = plan.mime_type.as_deref() {
            if !request.has_header(headers::CONTENT_TYPE) {
                request.set_header(headers::CONTENT_TYPE, mime)?;
            }
        }

        match &ctx.user_agent {
            UserAgent::Custom(agent) => request.set_header(headers::USER_AGENT, agent)?,
            UserAgent::Omit => {
                request.headers.remove(headers::USER_AGENT);
            }
            UserAgent::Default => {
                if !request.has_header(headers::USER_AGENT) {
                    request.set_header(headers::USER_AGENT, DEFAULT_USER_AGENT)?;
                }
            }
        }

        if let Some(referer) = &ctx.referer {
            request.set_header(headers::REFERER, referer)?;
        }

        if let Some(credentials) = &ctx.credentials {
            let credentials = self.complete_credentials(credentials)?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            request.set_header(headers::AUTHORIZATION, &format!("Basic {}", encoded))?;
        }

        for cookie in &ctx.cookies {
            request.append_header(headers::COOKIE, cookie)?;
        }

        if let Some(body) = plan.body {
            request = request.body(body);
        }

        tracing::debug!(
            "assembled {} {} ({} header(s))",
            request.method,
            request.url,
            request.headers.len()
        );
        Ok(request)
    }

    /// `user:password` as given, or with the password prompted for when it
    /// is missing or empty
    fn complete_credentials(&mut self, credentials: &str) -> Result<String> {
        let user = match credentials.split_once(':') {
            Some((_, password)) if !password.is_empty() => return Ok(credentials.to_string()),
            Some((user, _)) => user,
            None => credentials,
        };
        if let Some(completed) = &self.completed {
            return Ok(completed.clone());
        }

        let password = self.completer.complete(user)?;
        let completed = format!("{}:{}", user, password);
        self.completed = Some(completed.clone());
        Ok(completed)
    }
}

fn resolve_method(explicit: Option<&str>, recommended: Option<Method>) -> Result<Method> {
    match explicit {
        Some(name) => Method::from_bytes(name.as_bytes())
            .map_err(|_| Error::invalid_args(format!("invalid request method '{}'", name))),
        None => Ok(recommended.unwrap_or(Method::GET)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn assembler() -> RequestAssembler<CannedCredentials> {
        RequestAssembler::new(CannedCredentials::new(["s3cret"]))
    }

    fn post_plan() -> RequestPlan {
        RequestPlan {
            body: Some(Bytes::from_static(b"a=1")),
            mime_type: Some("application/x-www-form-urlencoded".into()),
            method: Some(Method::POST),
        }
    }

    #[test]
    fn test_method_precedence() {
        let ctx = RunContext::new(["http://example.com/"]);
        let req = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.method, Method::GET);

        let req = assembler()
            .assemble(post_plan(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.method, Method::POST);

        let ctx = ctx.method("PATCH");
        let req = assembler()
            .assemble(post_plan(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.body.as_deref(), Some(&b"a=1"[..]));
    }

    #[test]
    fn test_user_content_type_wins() {
        let ctx = RunContext::new(["http://example.com/"]).header("Content-Type", "text/plain");
        let req = assembler()
            .assemble(post_plan(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.headers.get_all("content-type").iter().count(), 1);
    }

    #[test]
    fn test_plan_content_type_when_absent() {
        let ctx = RunContext::new(["http://example.com/"]);
        let req = assembler()
            .assemble(post_plan(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(
            req.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_user_agent_modes() {
        let mut ctx = RunContext::new(["http://example.com/"]);
        let req = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.header("user-agent"), Some(DEFAULT_USER_AGENT));

        ctx.user_agent = UserAgent::Custom("bot/2".into());
        let req = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.header("user-agent"), Some("bot/2"));

        ctx = ctx.header("User-Agent", "from-header");
        ctx.user_agent = UserAgent::Omit;
        let req = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        assert!(!req.has_header("user-agent"));
    }

    #[test]
    fn test_cookie_literals_are_separate_lines() {
        let mut ctx = RunContext::new(["http://example.com/"]);
        ctx.cookies = vec!["a=1".into(), "b=2".into()];
        let req = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        let values: Vec<_> = req
            .headers
            .get_all("cookie")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_basic_auth_with_password() {
        let mut ctx = RunContext::new(["http://example.com/"]);
        ctx.credentials = Some("alice:pw".into());
        let mut asm = assembler();
        let req = asm
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.header("authorization"), Some("Basic YWxpY2U6cHc="));
        assert!(asm.completer().asked().is_empty());
    }

    #[test]
    fn test_basic_auth_prompts_once() {
        let mut ctx = RunContext::new(["http://a/", "http://b/"]);
        ctx.credentials = Some("alice".into());
        let mut asm = assembler();

        let first = asm.assemble(RequestPlan::empty(), "http://a/", &ctx).unwrap();
        let second = asm.assemble(RequestPlan::empty(), "http://b/", &ctx).unwrap();

        let expected = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("alice:s3cret")
        );
        assert_eq!(first.header("authorization"), Some(expected.as_str()));
        assert_eq!(second.header("authorization"), Some(expected.as_str()));
        assert_eq!(asm.completer().asked(), ["alice".to_string()]);
    }

    #[test]
    fn test_empty_password_prompts() {
        let mut ctx = RunContext::new(["http://example.com/"]);
        ctx.credentials = Some("alice:".into());
        let mut asm = assembler();
        let req = asm
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();

        assert_eq!(asm.completer().asked(), ["alice".to_string()]);
        // alice:s3cret
        assert_eq!(req.header("authorization"), Some("Basic YWxpY2U6czNjcmV0"));
    }

    #[test]
    fn test_invalid_method() {
        let ctx = RunContext::new(["http://example.com/"]).method("BAD METHOD");
        let err = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_referer() {
        let mut ctx = RunContext::new(["http://example.com/"]);
        ctx.referer = Some("http://origin.example/".into());
        let req = assembler()
            .assemble(RequestPlan::empty(), "http://example.com/", &ctx)
            .unwrap();
        assert_eq!(req.header("referer"), Some("http://origin.example/"));
    }
}
