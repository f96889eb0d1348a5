// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kurl::body::{
    build_multipart, encode_binary, encode_encoded, encode_raw, encode_standard, parse_form_fields,
};

fn items(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("field{}=value {} & more", i, i)).collect()
}

fn files() -> HashMap<String, Vec<u8>> {
    let mut files = HashMap::new();
    let lines: String = (0..200).map(|i| format!("k{}=v{}\n", i, i)).collect();
    files.insert("pairs.txt".to_string(), lines.into_bytes());
    files.insert("blob.bin".to_string(), vec![0xA5; 64 * 1024]);
    files
}

fn data_dialects_benchmark(c: &mut Criterion) {
    let inline = items(100);
    let reader = files();
    let with_files: Vec<String> = vec!["@pairs.txt".into(), "blob=@blob.bin".into()];

    c.bench_function("encode_standard", |b| {
        b.iter(|| black_box(encode_standard(&inline, &reader).unwrap()))
    });

    c.bench_function("encode_standard_files", |b| {
        b.iter(|| black_box(encode_standard(&with_files, &reader).unwrap()))
    });

    c.bench_function("encode_encoded", |b| {
        b.iter(|| black_box(encode_encoded(&inline, &reader).unwrap()))
    });

    c.bench_function("encode_raw", |b| b.iter(|| black_box(encode_raw(&inline))));

    c.bench_function("encode_binary_files", |b| {
        b.iter(|| black_box(encode_binary(&with_files, &reader).unwrap()))
    });
}

fn multipart_benchmark(c: &mut Criterion) {
    let reader = files();
    let form: Vec<String> = vec![
        "name=kurl".into(),
        "notes=<pairs.txt".into(),
        "upload=@blob.bin".into(),
    ];

    c.bench_function("build_multipart", |b| {
        b.iter(|| {
            let fields = parse_form_fields(&form, &reader).unwrap();
            black_box(build_multipart(&fields, &reader).unwrap())
        })
    });
}

criterion_group!(benches, data_dialects_benchmark, multipart_benchmark);
criterion_main!(benches);
