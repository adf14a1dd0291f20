use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_traits::{PrimInt, WrappingAdd};
use rand::distributions::{Uniform, WeightedIndex};
use rand::prelude::*;
use std::ops::RangeInclusive;
use streamvbyte32::{Codec, Codec0124, Codec1234};

const ZIPF_WEIGHTS: [usize; 4] = [840, 420, 280, 210];
const ARRAY_LEN: usize = 1024;

fn range_for_byte_size(n: usize) -> RangeInclusive<u64> {
    match n {
        0 => 0..=0,
        1 => 0x1..=0xff,
        2 => 0x100..=0xffff,
        3 => 0x10000..=0xffffff,
        4 => 0x1000000..=0xffffffff,
        _ => unreachable!(),
    }
}

// Generate an array of len with values no larger than max_bytes with a
// zipf-ian distribution.
fn generate_array<I: PrimInt>(len: usize, max_bytes: usize) -> Vec<I> {
    assert!(max_bytes <= std::mem::size_of::<I>());
    let mut len_rng = StdRng::from_seed([0xabu8; 32]);
    let len_dist = WeightedIndex::new(&ZIPF_WEIGHTS[..max_bytes]).unwrap();
    let mut value_rng = StdRng::from_seed([0xcdu8; 32]);
    len_dist
        .sample_iter(&mut len_rng)
        .take(len)
        .map(|n| Uniform::from(range_for_byte_size(n + 1)).sample(&mut value_rng))
        .map(|n| I::from(n).unwrap())
        .collect()
}

fn generate_cumulative_array<I: PrimInt + WrappingAdd>(
    len: usize,
    max_bytes: usize,
    initial: I,
) -> Vec<I> {
    let mut values = generate_array::<I>(len, max_bytes);
    let mut cum = initial;
    for v in values.iter_mut() {
        cum = cum.wrapping_add(v);
        *v = cum;
    }
    values
}

fn encoded_stream<C: Codec>(
    codec: &C,
    values: &[u32],
    encode: impl Fn(&C, &[u32], &mut [u8]) -> usize,
) -> Vec<u8> {
    let mut encoded = vec![0u8; C::compressed_bound(values.len())];
    encode(codec, values, &mut encoded);
    encoded
}

fn bm_codec<C: Codec>(name: &str, c: &mut Criterion) {
    let codec = C::new();
    let mut bm_group = c.benchmark_group(name);
    bm_group.throughput(Throughput::Elements(ARRAY_LEN as u64));
    let max_data_len = C::compressed_bound(ARRAY_LEN);

    for max_bytes in [1usize, 2, 4] {
        let input_values = generate_array::<u32>(ARRAY_LEN, max_bytes);
        bm_group.bench_with_input(
            BenchmarkId::new("encode", max_bytes),
            &input_values,
            |b, v| {
                let mut encoded = vec![0u8; C::compressed_bound(v.len())];
                b.iter(|| assert!(codec.encode(v, &mut encoded) <= max_data_len))
            },
        );

        let input_delta_values = generate_cumulative_array::<u32>(ARRAY_LEN, max_bytes, 1);
        bm_group.bench_with_input(
            BenchmarkId::new("encode_deltas", max_bytes),
            &input_delta_values,
            |b, v| {
                let mut encoded = vec![0u8; C::compressed_bound(v.len())];
                b.iter(|| assert!(codec.encode_deltas(1, v, &mut encoded) <= max_data_len))
            },
        );
        bm_group.bench_with_input(
            BenchmarkId::new("encode_transposed_deltas", max_bytes),
            &input_delta_values,
            |b, v| {
                let mut encoded = vec![0u8; C::compressed_bound(v.len())];
                b.iter(|| {
                    assert!(codec.encode_transposed_deltas(1, v, &mut encoded) <= max_data_len)
                })
            },
        );

        let encoded = encoded_stream(&codec, &input_values, C::encode);
        bm_group.bench_with_input(BenchmarkId::new("decode", max_bytes), &encoded, |b, s| {
            let mut values = vec![0u32; ARRAY_LEN];
            b.iter(|| assert!(codec.decode(s, &mut values) <= max_data_len))
        });

        let encoded = encoded_stream(&codec, &input_delta_values, |c, v, out| {
            c.encode_deltas(1, v, out)
        });
        bm_group.bench_with_input(
            BenchmarkId::new("decode_deltas", max_bytes),
            &encoded,
            |b, s| {
                let mut values = vec![0u32; ARRAY_LEN];
                b.iter(|| assert!(codec.decode_deltas(1, s, &mut values) <= max_data_len))
            },
        );

        let encoded = encoded_stream(&codec, &input_delta_values, |c, v, out| {
            c.encode_transposed_deltas(1, v, out)
        });
        bm_group.bench_with_input(
            BenchmarkId::new("decode_transposed_deltas", max_bytes),
            &encoded,
            |b, s| {
                let mut values = vec![0u32; ARRAY_LEN];
                b.iter(|| {
                    assert!(codec.decode_transposed_deltas(1, s, &mut values) <= max_data_len)
                })
            },
        );

        bm_group.bench_with_input(
            BenchmarkId::new("compressed_len", max_bytes),
            &encoded,
            |b, s| b.iter(|| assert!(codec.compressed_len(s, ARRAY_LEN) <= max_data_len)),
        );
    }
    bm_group.finish();
}

fn benchmark(c: &mut Criterion) {
    bm_codec::<Codec1234>("Codec1234", c);
    bm_codec::<Codec0124>("Codec0124", c);
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
