// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for host-array <-> buffer conversion.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::{DType, Shape, TensorBuffer};

fn bench_encode_image(c: &mut Criterion) {
    let shape = Shape::from([1, 3, 480, 640]);
    let values = vec![0.0f32; shape.num_elements()];
    c.bench_function("encode_f32_1x3x480x640", |b| {
        b.iter(|| TensorBuffer::encode("images", black_box(&values), shape.clone()))
    });
}

fn bench_decode_image(c: &mut Criterion) {
    let buffer = TensorBuffer::zeros("images", Shape::from([1, 3, 480, 640]), DType::F32);
    c.bench_function("decode_f32_1x3x480x640", |b| {
        b.iter(|| black_box(&buffer).decode::<f32>())
    });
}

fn bench_fill_tokens(c: &mut Criterion) {
    c.bench_function("filled_i64_2x7", |b| {
        b.iter(|| TensorBuffer::filled("input_ids", Shape::matrix(2, 7), DType::I64, black_box(1.0)))
    });
}

criterion_group!(benches, bench_encode_image, bench_decode_image, bench_fill_tokens);
criterion_main!(benches);
