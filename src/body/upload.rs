// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Direct file upload (`-T`)

use std::path::Path;

use super::{EncodedBody, FileReader};
use crate::error::{Error, Result};

/// Fallback MIME type for unknown extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Raw file sent as the body of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSpec {
    pub path: String,
}

impl UploadSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// File name component of the path
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name().and_then(|n| n.to_str())
    }

    /// Target URL for this upload: a target ending in `/` gets the file name
    /// appended
    pub fn target_url(&self, target: &str) -> String {
        match self.file_name() {
            Some(name) if target.ends_with('/') => format!("{}{}", target, name),
            _ => target.to_string(),
        }
    }
}

/// Body for the target at `target_index`: the Nth target consumes the Nth
/// upload file
pub fn plan_upload(
    uploads: &[UploadSpec],
    target_index: usize,
    reader: &dyn FileReader,
) -> Result<EncodedBody> {
    let spec = uploads.get(target_index).ok_or_else(|| {
        Error::invalid_args(format!(
            "no --upload-file for target #{} ({} upload file(s) given)",
            target_index + 1,
            uploads.len()
        ))
    })?;

    let content = reader.read(&spec.path)?;
    Ok(EncodedBody::new(content, infer_mime_type(&spec.path)))
}

/// MIME type from a file extension
pub fn infer_mime_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt") | Some("text") | Some("log") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("js") | Some("mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("wasm") => "application/wasm",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_target_url_appends_file_name() {
        let spec = UploadSpec::new("dir/report.json");
        assert_eq!(
            spec.target_url("http://example.com/upload/"),
            "http://example.com/upload/report.json"
        );
        assert_eq!(
            spec.target_url("http://example.com/exact"),
            "http://example.com/exact"
        );
    }

    #[test]
    fn test_mime_inference() {
        assert_eq!(infer_mime_type("a/b/report.PDF"), "application/pdf");
        assert_eq!(infer_mime_type("notes.txt"), "text/plain");
        assert_eq!(infer_mime_type("archive.unknownext"), OCTET_STREAM);
        assert_eq!(infer_mime_type("Makefile"), OCTET_STREAM);
    }

    #[test]
    fn test_nth_target_gets_nth_file() {
        let reader: HashMap<String, Vec<u8>> = [
            ("first.txt".to_string(), b"one".to_vec()),
            ("second.bin".to_string(), b"two".to_vec()),
        ]
        .into_iter()
        .collect();
        let uploads = vec![UploadSpec::new("first.txt"), UploadSpec::new("second.bin")];

        let second = plan_upload(&uploads, 1, &reader).unwrap();
        assert_eq!(&second.body[..], b"two");
        assert_eq!(second.mime_type, OCTET_STREAM);
    }

    #[test]
    fn test_index_past_uploads_is_an_error() {
        let reader: HashMap<String, Vec<u8>> = HashMap::new();
        let uploads = vec![UploadSpec::new("only.txt")];
        let err = plan_upload(&uploads, 1, &reader).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(UploadSpec::new("/var/data/x.json").file_name(), Some("x.json"));
    }
}
