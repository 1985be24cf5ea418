use criterion::{criterion_group, criterion_main, Criterion};

use unicode_ctype::ranges::{compress, expand};

/// A synthetic class shaped like the real alpha class: dense letter blocks
/// with gaps, plus a long alternating stretch that compresses to stepped
/// ranges.
fn synthetic_class() -> Vec<u32> {
    let mut code_points = Vec::new();
    code_points.extend(0x41..=0x5A);
    code_points.extend(0x61..=0x7A);
    code_points.extend(0xC0..=0xD6);
    code_points.extend(0xD8..=0xF6);
    code_points.extend((0x100..0x250).step_by(2));
    code_points.extend(0x4E00..0x9FFF);
    code_points
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let code_points = synthetic_class();
    let ranges = compress(&code_points);
    let lines: Vec<String> = ranges.iter().map(|range| range.to_string()).collect();

    let mut group = c.benchmark_group("Range codec");
    group.bench_function("compress", |b| {
        b.iter(|| {
            compress(&code_points);
        })
    });
    group.bench_function("expand", |b| {
        b.iter(|| {
            lines.iter().map(|line| expand(line).len()).sum::<usize>();
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
