// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body assembly
//!
//! Each body-shaping mode is a pure function `(items, reader) -> body + MIME
//! type`. The active mode is picked once at validation time as a
//! [`BodyMode`] and turned into a [`RequestPlan`] for every target.

mod data;
mod multipart;
mod upload;

use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use reqwest::Method;

use crate::error::{Error, IoContext, Result};

pub use data::{encode_binary, encode_encoded, encode_json, encode_raw, encode_standard};
pub use multipart::{build_multipart, parse_form_fields, FormField, MultipartBody, ValueSource};
pub use upload::{infer_mime_type, plan_upload, UploadSpec};

/// MIME type recommended for every form-style data dialect
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// MIME type for `--json` bodies
pub const APPLICATION_JSON: &str = "application/json";

/// Data-argument parsing dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataMode {
    /// `-d` / `--data`
    Standard,
    /// `--data-urlencode`
    Encoded,
    /// `--data-raw`
    RawConcat,
    /// `--data-binary`
    Binary,
    /// `--json`
    Json,
}

impl DataMode {
    /// Flag name the dialect is selected with
    pub fn flag(self) -> &'static str {
        match self {
            DataMode::Standard => "--data",
            DataMode::Encoded => "--data-urlencode",
            DataMode::RawConcat => "--data-raw",
            DataMode::Binary => "--data-binary",
            DataMode::Json => "--json",
        }
    }
}

/// A single body-contributing value or `@file` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataArgument {
    pub mode: DataMode,
    pub raw: String,
}

impl DataArgument {
    pub fn new(mode: DataMode, raw: impl Into<String>) -> Self {
        Self {
            mode,
            raw: raw.into(),
        }
    }
}

/// Body bytes plus the MIME type a dialect produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub body: Bytes,
    pub mime_type: String,
}

impl EncodedBody {
    pub fn new(body: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Encoder output consumed by the request assembler
///
/// `method` is only a recommendation; an explicit method always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPlan {
    pub body: Option<Bytes>,
    pub mime_type: Option<String>,
    pub method: Option<Method>,
}

impl RequestPlan {
    /// Plan with no body and no recommendation (plain GET)
    pub fn empty() -> Self {
        Self::default()
    }

    fn with_body(encoded: EncodedBody, method: Method) -> Self {
        Self {
            body: Some(encoded.body),
            mime_type: Some(encoded.mime_type),
            method: Some(method),
        }
    }
}

/// The single active body-shaping mode of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyMode {
    /// No body; GET unless overridden
    Empty,
    /// `-I`: HEAD, no body
    HeadOnly,
    /// One of the data dialects with its ordered items
    Data { mode: DataMode, items: Vec<String> },
    /// `-F` items
    Multipart(Vec<String>),
    /// `-T` files, one per target
    Upload(Vec<UploadSpec>),
}

impl BodyMode {
    /// Build the plan for the target at `target_index`
    pub fn plan(&self, target_index: usize, reader: &dyn FileReader) -> Result<RequestPlan> {
        match self {
            BodyMode::Empty => Ok(RequestPlan::empty()),
            BodyMode::HeadOnly => Ok(RequestPlan {
                method: Some(Method::HEAD),
                ..RequestPlan::empty()
            }),
            BodyMode::Data { mode, items } => {
                let encoded = encode_data(*mode, items, reader)?;
                Ok(RequestPlan::with_body(encoded, Method::POST))
            }
            BodyMode::Multipart(items) => {
                let fields = parse_form_fields(items, reader)?;
                let multipart = build_multipart(&fields, reader)?;
                Ok(RequestPlan::with_body(multipart.into_encoded(), Method::POST))
            }
            BodyMode::Upload(uploads) => {
                let encoded = plan_upload(uploads, target_index, reader)?;
                Ok(RequestPlan::with_body(encoded, Method::PUT))
            }
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            BodyMode::Empty => "none",
            BodyMode::HeadOnly => "head",
            BodyMode::Data { mode, .. } => mode.flag(),
            BodyMode::Multipart(_) => "--form",
            BodyMode::Upload(_) => "--upload-file",
        }
    }
}

/// Dispatch to the encoder for `mode`
pub fn encode_data(mode: DataMode, items: &[String], reader: &dyn FileReader) -> Result<EncodedBody> {
    match mode {
        DataMode::Standard => encode_standard(items, reader),
        DataMode::Encoded => encode_encoded(items, reader),
        DataMode::RawConcat => Ok(encode_raw(items)),
        DataMode::Binary => encode_binary(items, reader),
        DataMode::Json => encode_json(items, reader),
    }
}

/// Source of `@file` contents
///
/// Reads are synchronous and eager; the whole file is buffered.
pub trait FileReader {
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reads from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path).reading(path)
    }
}

/// In-memory files, keyed by path
impl FileReader for HashMap<String, Vec<u8>> {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.get(path).cloned().ok_or_else(|| Error::CannotReadFile {
            path: path.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        })
    }
}

/// Split a `name=value` item at the first `=`
pub(crate) fn split_pair(item: &str) -> Option<(&str, &str)> {
    item.split_once('=')
}

/// Byte-level [`split_pair`] for file lines, which need not be UTF-8
pub(crate) fn split_pair_bytes(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let at = line.iter().position(|b| *b == b'=')?;
    Some((&line[..at], &line[at + 1..]))
}

/// Non-empty lines of a file, CR stripped
pub(crate) fn file_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    content
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
}
