// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Data-argument dialects: `--data`, `--data-urlencode`, `--data-raw`,
//! `--data-binary` and `--json`

use url::form_urlencoded::byte_serialize;

use super::{
    file_lines, split_pair, split_pair_bytes, EncodedBody, FileReader, APPLICATION_JSON,
    FORM_URLENCODED,
};
use crate::error::{Error, Result};

/// `--data`: `@file` is split into lines, `name=@file` substitutes the file
/// verbatim, anything else passes through. Segments are `&`-joined.
pub fn encode_standard(items: &[String], reader: &dyn FileReader) -> Result<EncodedBody> {
    let mut segments: Vec<Vec<u8>> = Vec::new();

    for item in items {
        if let Some(path) = item.strip_prefix('@') {
            let content = reader.read(path)?;
            segments.extend(file_lines(&content).map(<[u8]>::to_vec));
        } else if let Some((name, path)) = file_pair(item) {
            segments.push(named_segment(name, &reader.read(path)?));
        } else {
            segments.push(item.as_bytes().to_vec());
        }
    }

    Ok(EncodedBody::new(join_segments(&segments), FORM_URLENCODED))
}

/// `--data-urlencode`: same file grammar as `--data`, but every resolved
/// pair is percent-encoded. Items matching none of `@file`, `name=@file`,
/// `name=value` are rejected.
///
/// Pairs keep their input order and repeated names are all sent; the body
/// is a sequence, not a map keyed by name.
pub fn encode_encoded(items: &[String], reader: &dyn FileReader) -> Result<EncodedBody> {
    let mut pairs: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();

    for item in items {
        if let Some(path) = item.strip_prefix('@') {
            let content = reader.read(path)?;
            for line in file_lines(&content) {
                let (name, value) = split_pair_bytes(line)
                    .ok_or_else(|| malformed(&String::from_utf8_lossy(line)))?;
                pairs.push((name.to_vec(), value.to_vec()));
            }
        } else if let Some((name, path)) = file_pair(item) {
            pairs.push((name.as_bytes().to_vec(), reader.read(path)?));
        } else if let Some((name, value)) = split_pair(item) {
            pairs.push((name.as_bytes().to_vec(), value.as_bytes().to_vec()));
        } else {
            return Err(malformed(item));
        }
    }

    let body = pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                byte_serialize(name).collect::<String>(),
                byte_serialize(value).collect::<String>()
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    Ok(EncodedBody::new(body, FORM_URLENCODED))
}

/// `--data-raw`: no file substitution, items are literal segments
pub fn encode_raw(items: &[String]) -> EncodedBody {
    EncodedBody::new(items.join("&"), FORM_URLENCODED)
}

/// `--data-binary`: `@file` and `name=@file` are substituted byte-for-byte,
/// embedded newlines included
pub fn encode_binary(items: &[String], reader: &dyn FileReader) -> Result<EncodedBody> {
    let mut segments: Vec<Vec<u8>> = Vec::with_capacity(items.len());

    for item in items {
        if let Some(path) = item.strip_prefix('@') {
            segments.push(reader.read(path)?);
        } else if let Some((name, path)) = file_pair(item) {
            segments.push(named_segment(name, &reader.read(path)?));
        } else {
            segments.push(item.as_bytes().to_vec());
        }
    }

    Ok(EncodedBody::new(join_segments(&segments), FORM_URLENCODED))
}

/// `--json`: exactly one payload, inline or `@file`, passed through unparsed
pub fn encode_json(items: &[String], reader: &dyn FileReader) -> Result<EncodedBody> {
    let payload = match items {
        [single] => single,
        [] => return Err(Error::invalid_args("--json requires a payload")),
        _ => {
            return Err(Error::invalid_args(
                "--json accepts exactly one payload per run",
            ))
        }
    };

    let body = match payload.strip_prefix('@') {
        Some(path) => reader.read(path)?,
        None => payload.as_bytes().to_vec(),
    };

    Ok(EncodedBody::new(body, APPLICATION_JSON))
}

/// `name=@path` split into `(name, path)`
fn file_pair(item: &str) -> Option<(&str, &str)> {
    let (name, value) = split_pair(item)?;
    value.strip_prefix('@').map(|path| (name, path))
}

fn named_segment(name: &str, content: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(name.len() + 1 + content.len());
    segment.extend_from_slice(name.as_bytes());
    segment.push(b'=');
    segment.extend_from_slice(content);
    segment
}

fn join_segments(segments: &[Vec<u8>]) -> Vec<u8> {
    segments.join(&b'&')
}

fn malformed(item: &str) -> Error {
    Error::invalid_args(format!(
        "malformed --data-urlencode item '{}': expected name=value, name=@file or @file",
        item
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use url::form_urlencoded;

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn files(entries: &[(&str, &[u8])]) -> HashMap<String, Vec<u8>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_standard_inline_items_keep_order() {
        let out = encode_standard(&items(&["z=1", "a=2", "m=3"]), &files(&[])).unwrap();
        assert_eq!(&out.body[..], b"z=1&a=2&m=3");
        assert_eq!(out.mime_type, FORM_URLENCODED);
    }

    #[test]
    fn test_standard_file_is_split_into_lines() {
        let reader = files(&[("form.txt", b"a=1\r\nb=2\n\nc=3\n")]);
        let out = encode_standard(&items(&["@form.txt", "d=4"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"a=1&b=2&c=3&d=4");
    }

    #[test]
    fn test_standard_named_file_is_verbatim() {
        let reader = files(&[("note.txt", b"line one\nline two")]);
        let out = encode_standard(&items(&["note=@note.txt"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"note=line one\nline two");
    }

    #[test]
    fn test_standard_missing_file() {
        let err = encode_standard(&items(&["@missing.txt"]), &files(&[])).unwrap_err();
        assert!(matches!(err, Error::CannotReadFile { ref path, .. } if path == "missing.txt"));
    }

    #[test]
    fn test_encoded_value_round_trips() {
        let out = encode_encoded(&items(&["q=a b&c/é"]), &files(&[])).unwrap();
        let body = std::str::from_utf8(&out.body).unwrap();
        assert!(body.starts_with("q="));
        assert!(!body.contains(' '));

        let decoded: Vec<(String, String)> = form_urlencoded::parse(out.body.as_ref())
            .into_owned()
            .collect();
        assert_eq!(decoded, vec![("q".to_string(), "a b&c/é".to_string())]);
    }

    #[test]
    fn test_encoded_named_file_and_file_pairs() {
        let reader = files(&[("v.txt", b"x&y"), ("pairs.txt", b"k1=v 1\nk2=v2\n")]);
        let out = encode_encoded(&items(&["f=@v.txt", "@pairs.txt"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"f=x%26y&k1=v+1&k2=v2");
    }

    #[test]
    fn test_encoded_file_keeps_non_utf8_bytes() {
        let reader = files(&[("p.txt", b"k=\xff\xfe\nk=2\n")]);
        let out = encode_encoded(&items(&["@p.txt"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"k=%FF%FE&k=2");

        let decoded: Vec<_> = form_urlencoded::parse(out.body.as_ref())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1], ("k".to_string(), "2".to_string()));
    }

    #[test]
    fn test_encoded_rejects_bare_item() {
        let err = encode_encoded(&items(&["justtext"]), &files(&[])).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_raw_never_reads_files() {
        let out = encode_raw(&items(&["@nonexistent/path", "a=@b"]));
        assert_eq!(&out.body[..], b"@nonexistent/path&a=@b");
    }

    #[test]
    fn test_binary_file_is_not_resplit() {
        let reader = files(&[("f", b"a&b=c")]);
        let out = encode_binary(&items(&["@f"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"a&b=c");
    }

    #[test]
    fn test_binary_keeps_newlines_and_raw_bytes() {
        let reader = files(&[("blob", b"\x00\x01\nline\r\n")]);
        let out = encode_binary(&items(&["data=@blob", "x=1"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"data=\x00\x01\nline\r\n&x=1");
    }

    #[test]
    fn test_json_inline_and_file() {
        let out = encode_json(&items(&[r#"{"a":1}"#]), &files(&[])).unwrap();
        assert_eq!(&out.body[..], br#"{"a":1}"#);
        assert_eq!(out.mime_type, APPLICATION_JSON);

        let reader = files(&[("body.json", b"{not even json\n")]);
        let out = encode_json(&items(&["@body.json"]), &reader).unwrap();
        assert_eq!(&out.body[..], b"{not even json\n");
    }

    #[test]
    fn test_json_requires_single_payload() {
        let err = encode_json(&items(&["{}", "{}"]), &files(&[])).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }
}
