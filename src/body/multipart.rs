// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! multipart/form-data builder for `-F` items

use std::borrow::Cow;
use std::path::Path;

use rand::distr::Alphanumeric;
use rand::Rng;

use super::{file_lines, infer_mime_type, split_pair, split_pair_bytes, EncodedBody, FileReader};
use crate::error::{Error, Result};

const BOUNDARY_PREFIX: &str = "------------------------";
const BOUNDARY_RANDOM_LEN: usize = 22;

/// Where a form field's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Literal value
    Inline,
    /// `name=<path`: file contents become the field value
    FileContent,
    /// `name=@path`: file is attached as a file part
    FileAttachment,
}

/// One `-F` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Field name
    pub name: String,
    /// Value discriminator
    pub source: ValueSource,
    /// Literal value bytes, or the path for file-backed sources
    pub raw_value: Vec<u8>,
}

impl FormField {
    pub fn inline(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: ValueSource::Inline,
            raw_value: value.into(),
        }
    }

    /// Parse a single `name=value` item
    pub fn parse(item: &str) -> Result<Self> {
        let (name, value) = split_pair(item).ok_or_else(|| {
            Error::invalid_args(format!(
                "malformed --form item '{}': expected name=value",
                item
            ))
        })?;

        let (source, raw_value) = if let Some(path) = value.strip_prefix('@') {
            (ValueSource::FileAttachment, path)
        } else if let Some(path) = value.strip_prefix('<') {
            (ValueSource::FileContent, path)
        } else {
            (ValueSource::Inline, value)
        };

        Ok(Self {
            name: name.to_string(),
            source,
            raw_value: raw_value.as_bytes().to_vec(),
        })
    }

    /// Path of a file-backed field
    pub fn path(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_value)
    }
}

/// Expand `-F` items into fields.
///
/// A whole item starting with `@` names a file of newline-delimited
/// `name=value` lines; each line becomes a plain inline field. This does not
/// attach the file.
pub fn parse_form_fields(items: &[String], reader: &dyn FileReader) -> Result<Vec<FormField>> {
    let mut fields = Vec::with_capacity(items.len());

    for item in items {
        match item.strip_prefix('@') {
            Some(path) => {
                let content = reader.read(path)?;
                for line in file_lines(&content) {
                    let (name, value) = split_pair_bytes(line).ok_or_else(|| {
                        Error::invalid_args(format!(
                            "malformed line '{}' in form file '{}': expected name=value",
                            String::from_utf8_lossy(line),
                            path
                        ))
                    })?;
                    fields.push(FormField::inline(String::from_utf8_lossy(name), value));
                }
            }
            None => fields.push(FormField::parse(item)?),
        }
    }

    Ok(fields)
}

/// A built multipart body
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub body: Vec<u8>,
}

impl MultipartBody {
    /// MIME string reported for the body
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn into_encoded(self) -> EncodedBody {
        let mime = self.content_type();
        EncodedBody::new(self.body, mime)
    }
}

/// Build a multipart/form-data body with a fresh random boundary
pub fn build_multipart(fields: &[FormField], reader: &dyn FileReader) -> Result<MultipartBody> {
    build_with_boundary(fields, reader, random_boundary())
}

fn build_with_boundary(
    fields: &[FormField],
    reader: &dyn FileReader,
    boundary: String,
) -> Result<MultipartBody> {
    let mut body = Vec::new();

    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());

        match field.source {
            ValueSource::Inline => {
                write_field_header(&mut body, &field.name, None);
                body.extend_from_slice(&field.raw_value);
            }
            ValueSource::FileContent => {
                let content = reader.read(&field.path())?;
                write_field_header(&mut body, &field.name, None);
                body.extend_from_slice(&content);
            }
            ValueSource::FileAttachment => {
                let path = field.path();
                let content = reader.read(&path)?;
                let filename = base_name(&path);
                write_field_header(&mut body, &field.name, Some(&filename));
                body.extend_from_slice(&content);
            }
        }

        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Ok(MultipartBody { boundary, body })
}

fn write_field_header(body: &mut Vec<u8>, name: &str, filename: Option<&str>) {
    let disposition = match filename {
        Some(filename) => format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n",
            escape_quotes(name),
            escape_quotes(filename),
            infer_mime_type(filename)
        ),
        None => format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n",
            escape_quotes(name)
        ),
    };
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"\r\n");
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn random_boundary() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", BOUNDARY_PREFIX, suffix)
}
