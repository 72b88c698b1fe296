//! Throughput benchmarks for the UTF-8 alias codec and EXE filter.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use strata_core::transform::BlockTransform;
use strata_filters::{ExeFilter, Utf8AliasCodec};

fn utf8_sample(chars: usize) -> Vec<u8> {
    let points = [0x00E9u32, 0x00E8, 0x4E2D, 0x6587, 0x1F600, b'a' as u32, b' ' as u32];
    let mut s = String::new();
    for i in 0..chars {
        s.push(char::from_u32(points[i % points.len()]).unwrap());
    }
    s.into_bytes()
}

fn bench_utf8_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("utf8_alias_forward");
    for chars in [4_096usize, 65_536, 1 << 20] {
        let data = utf8_sample(chars);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chars), &data, |b, data| {
            b.iter(|| {
                let mut codec = Utf8AliasCodec::new();
                let mut out = vec![0u8; codec.max_encoded_len(data.len())];
                black_box(codec.forward(data, &mut out, data.len()).unwrap());
            });
        });
    }
    group.finish();
}

fn exe_sample(n_instrs: usize) -> Vec<u8> {
    let mut buf = vec![0u8; 64];
    buf[0..4].copy_from_slice(b"\x7FELF");
    buf[4] = 2;
    buf[18..20].copy_from_slice(&0x3Eu16.to_le_bytes());
    for k in 0..n_instrs {
        buf.push(0xE8);
        buf.extend_from_slice(&((k as i32 + 1) * 16).to_le_bytes());
        buf.push(0x90);
    }
    buf
}

fn bench_exe_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("exe_filter_forward");
    for n_instrs in [64usize, 4_096, 65_536] {
        let data = exe_sample(n_instrs);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_instrs), &data, |b, data| {
            b.iter(|| {
                let mut filter = ExeFilter::new();
                let mut out = vec![0u8; filter.max_encoded_len(data.len())];
                black_box(filter.forward(data, &mut out, data.len()).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_utf8_forward, bench_exe_forward);
criterion_main!(benches);
