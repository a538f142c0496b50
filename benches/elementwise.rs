//! Elementwise operation benchmarks: default path against `nosimd`.
//!
//! Sizes step from below `SIMD_THRESHOLD` (both runs take the scalar path)
//! through L1/L2-sized arrays (lane path) to sizes above
//! `PARALLEL_SIMD_THRESHOLD`, where unchecked runs are split across threads.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdarith::ops::Arity;
use simdarith::{call, convert, Arg, CallOptions, Operation, TypedArray};

const VECTOR_SIZES: &[usize] = &[
    32,        // below the vector threshold
    4_096,     // 16 KiB of f32, L1
    65_536,    // 256 KiB, L2
    1_048_576, // 4 MiB, parallel when unchecked
];

fn generate_test_data(len: usize) -> (Vec<f32>, Vec<i32>) {
    let mut rng = StdRng::seed_from_u64(42);

    let floats: Vec<f32> = (0..len).map(|_| rng.random::<f32>()).collect();
    let ints: Vec<i32> = (0..len).map(|_| rng.random_range(-1_000..=1_000)).collect();

    (floats, ints)
}

fn format_size(elements: usize) -> String {
    let bytes = elements * std::mem::size_of::<f32>();

    if bytes >= 1_048_576 {
        format!("{:.1}_MiB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}_KiB", bytes as f64 / 1024.0)
    } else {
        format!("{}_B", bytes)
    }
}

fn bench_binary(c: &mut Criterion, op: Operation, name: &str, options: CallOptions) {
    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("{name}_{}", format_size(size)));
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<f32>() * 2) as u64));

        let (floats, _) = generate_test_data(size);
        let left = TypedArray::from(floats.clone());
        let right = TypedArray::from(floats);

        for (label, options) in [("default", options), ("nosimd", options.with_nosimd(true))] {
            group.bench_with_input(BenchmarkId::new(label, size), &options, |b, options| {
                let (mut left, mut right) = (left.clone(), right.clone());
                let mut output = TypedArray::zeros(left.numeric_type(), size);
                b.iter(|| {
                    if op.capabilities().arity == Arity::Compare {
                        black_box(call(op, &mut [Arg::from(&mut left), Arg::from(&mut right)], options))
                    } else {
                        black_box(call(
                            op,
                            &mut [Arg::from(&mut left), Arg::from(&mut right), Arg::from(&mut output)],
                            options,
                        ))
                    }
                })
            });
        }

        group.finish();
    }
}

fn bench_shift(c: &mut Criterion) {
    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("LShift_{}", format_size(size)));
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<i32>()) as u64));

        let (_, ints) = generate_test_data(size);
        let data = TypedArray::from(ints);

        for (label, options) in [
            ("default", CallOptions::new()),
            ("nosimd", CallOptions::new().with_nosimd(true)),
        ] {
            group.bench_with_input(BenchmarkId::new(label, size), &options, |b, options| {
                let mut data = data.clone();
                b.iter(|| black_box(call(Operation::LShift, &mut [Arg::from(&mut data), Arg::from(1i32)], options)))
            });
        }

        group.finish();
    }
}

fn bench_convert(c: &mut Criterion) {
    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("Convert_f32_i32_{}", format_size(size)));
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<f32>()) as u64));

        let (floats, _) = generate_test_data(size);
        let input = TypedArray::from(floats);

        group.bench_with_input(BenchmarkId::new("guarded", size), &input, |b, input| {
            let mut output = TypedArray::from(vec![0i32; size]);
            b.iter(|| black_box(convert(input, &mut output, None)))
        });

        group.finish();
    }
}

fn all_benchmarks(c: &mut Criterion) {
    bench_binary(c, Operation::Add, "Add_checked", CallOptions::new());
    bench_binary(c, Operation::Add, "Add_unchecked", CallOptions::new().with_matherrors(true));
    bench_binary(c, Operation::Lt, "Lt", CallOptions::new());
    bench_shift(c);
    bench_convert(c);
}

criterion_group!(benches, all_benchmarks);
criterion_main!(benches);
