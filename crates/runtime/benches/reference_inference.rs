// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for harness overhead around a reference-engine call.

use criterion::{criterion_group, criterion_main, Criterion};
use runtime::{
    bind_inputs, CompilationOptions, ExecutableLoader, HarnessConfig, InferenceRunner,
    ReferenceEngine,
};
use std::hint::black_box;

const IMAGE_MANIFEST: &str = r#"{ "name": "yolov8n",
    "inputs":  [{ "name": "images",  "dtype": "float32", "shape": [1, 3, 480, 640] }],
    "outputs": [{ "name": "output0", "dtype": "float32", "shape": [1, 84, 6300] }] }"#;

fn bench_image_call(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("model.json"), IMAGE_MANIFEST).expect("write manifest");
    let handle = ExecutableLoader::new(Box::new(ReferenceEngine))
        .load(dir.path(), &CompilationOptions::default())
        .expect("load");
    let runner = InferenceRunner::new(handle.clone());
    let config = HarnessConfig::image_preset();

    c.bench_function("materialize_image_input", |b| {
        b.iter(|| black_box(config.materialize_inputs()))
    });

    c.bench_function("bind_image_input", |b| {
        b.iter(|| {
            let inputs = config.materialize_inputs().expect("inputs");
            bind_inputs(handle.signature(), black_box(inputs))
        })
    });

    c.bench_function("reference_image_call", |b| {
        b.iter(|| runner.run(black_box(config.materialize_inputs().expect("inputs"))))
    });
}

criterion_group!(benches, bench_image_call);
criterion_main!(benches);
