use crate::Codec;
use num_traits::{PrimInt, WrappingAdd};
use rand::distributions::Uniform;
use rand::prelude::*;

pub(crate) fn generate_array<I: PrimInt>(len: usize, max_bytes: usize) -> Vec<I> {
    assert!(max_bytes <= std::mem::size_of::<I>());
    let seed: &[u8; 32] = &[0xabu8; 32];
    let mut rng = StdRng::from_seed(*seed);
    let max_val = (0..max_bytes).fold(0u64, |acc, i| acc | (0xffu64 << (i * 8)));
    let between = Uniform::from(0..=max_val);
    (0..len)
        .map(|_| between.sample(&mut rng))
        .map(|v| I::from(v).unwrap())
        .collect()
}

pub(crate) fn generate_cumulative_array<I: PrimInt + WrappingAdd>(
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

/// A random walk whose steps go in both directions, exercising the zigzag
/// delta paths with small negative differences.
pub(crate) fn generate_walk_array(len: usize, magnitude: i32, initial: u32) -> Vec<u32> {
    let seed: &[u8; 32] = &[0xcdu8; 32];
    let mut rng = StdRng::from_seed(*seed);
    let between = Uniform::from(-magnitude..=magnitude);
    let mut cur = initial;
    (0..len)
        .map(|_| {
            cur = cur.wrapping_add(between.sample(&mut rng) as u32);
            cur
        })
        .collect()
}

/// Round-trips `values` through every variant of `codec`, checking that the
/// encoder and decoder agree on the stream length, that the length never
/// exceeds the bound, and that `compressed_len` accounts for the stream.
pub(crate) fn round_trip_all_variants<C: Codec>(codec: &C, values: &[u32]) {
    let bound = C::compressed_bound(values.len());
    let mut encoded = vec![0u8; bound];
    let mut decoded = vec![0u32; values.len()];

    let check = |encoded: &[u8], enc_len: usize, dec_len: usize| {
        assert!(enc_len <= bound);
        assert_eq!(enc_len, dec_len);
        assert_eq!(codec.compressed_len(encoded, values.len()), enc_len);
    };

    let enc = codec.encode(values, &mut encoded);
    let dec = codec.decode(&encoded, &mut decoded);
    check(&encoded, enc, dec);
    assert_eq!(values, decoded.as_slice());

    let enc = codec.encode_zigzag(values, &mut encoded);
    let dec = codec.decode_zigzag(&encoded, &mut decoded);
    check(&encoded, enc, dec);
    assert_eq!(values, decoded.as_slice());

    for previous in [0u32, 42] {
        let enc = codec.encode_deltas(previous, values, &mut encoded);
        let dec = codec.decode_deltas(previous, &encoded, &mut decoded);
        check(&encoded, enc, dec);
        assert_eq!(values, decoded.as_slice());

        let enc = codec.encode_zigzag_deltas(previous, values, &mut encoded);
        let dec = codec.decode_zigzag_deltas(previous, &encoded, &mut decoded);
        check(&encoded, enc, dec);
        assert_eq!(values, decoded.as_slice());

        let enc = codec.encode_transposed_deltas(previous, values, &mut encoded);
        let dec = codec.decode_transposed_deltas(previous, &encoded, &mut decoded);
        check(&encoded, enc, dec);
        assert_eq!(values, decoded.as_slice());
    }
}

/// Encodes `values` through every variant of both codecs and asserts the
/// streams are byte-identical, then cross-decodes each stream with the
/// other codec.
pub(crate) fn compare_streams<C: Codec>(left: &C, right: &C, values: &[u32]) {
    let bound = C::compressed_bound(values.len());
    let mut left_out = vec![0u8; bound];
    let mut right_out = vec![0u8; bound];
    let mut decoded = vec![0u32; values.len()];

    #[allow(clippy::type_complexity)]
    let plain_ops: [(
        fn(&C, &[u32], &mut [u8]) -> usize,
        fn(&C, &[u8], &mut [u32]) -> usize,
    ); 2] = [
        (C::encode, C::decode),
        (C::encode_zigzag, C::decode_zigzag),
    ];
    for (encode, decode) in plain_ops {
        left_out.fill(0);
        right_out.fill(0);
        let left_len = encode(left, values, &mut left_out);
        let right_len = encode(right, values, &mut right_out);
        assert_eq!(left_len, right_len);
        assert_eq!(left_out[..left_len], right_out[..right_len]);
        assert_eq!(decode(right, &left_out, &mut decoded), left_len);
        assert_eq!(values, decoded.as_slice());
        assert_eq!(decode(left, &right_out, &mut decoded), right_len);
        assert_eq!(values, decoded.as_slice());
    }

    #[allow(clippy::type_complexity)]
    let delta_ops: [(
        fn(&C, u32, &[u32], &mut [u8]) -> usize,
        fn(&C, u32, &[u8], &mut [u32]) -> usize,
    ); 3] = [
        (C::encode_deltas, C::decode_deltas),
        (C::encode_zigzag_deltas, C::decode_zigzag_deltas),
        (C::encode_transposed_deltas, C::decode_transposed_deltas),
    ];
    for (encode, decode) in delta_ops {
        for previous in [0u32, 42] {
            left_out.fill(0);
            right_out.fill(0);
            let left_len = encode(left, previous, values, &mut left_out);
            let right_len = encode(right, previous, values, &mut right_out);
            assert_eq!(left_len, right_len);
            assert_eq!(left_out[..left_len], right_out[..right_len]);
            assert_eq!(decode(right, previous, &left_out, &mut decoded), left_len);
            assert_eq!(values, decoded.as_slice());
            assert_eq!(decode(left, previous, &right_out, &mut decoded), right_len);
            assert_eq!(values, decoded.as_slice());
        }
    }
}

/// Plants sentinels one past the bound reservation and one past the decode
/// output and checks no variant disturbs them.
pub(crate) fn check_sentinels<C: Codec>(codec: &C, values: &[u32]) {
    const CANARY: u32 = 0x5a5a_5a5a;
    let bound = C::compressed_bound(values.len());
    let mut encoded = vec![0u8; bound + 1];
    let mut decoded = vec![0u32; values.len() + 1];

    macro_rules! check {
        ($enc:expr, $dec:expr) => {{
            encoded.fill(0xfe);
            let enc_len = $enc;
            assert!(enc_len <= bound);
            assert_eq!(encoded[bound], 0xfe);
            decoded.fill(CANARY);
            let dec_len = $dec;
            assert_eq!(enc_len, dec_len);
            assert_eq!(decoded[values.len()], CANARY);
            assert_eq!(values, &decoded[..values.len()]);
        }};
    }

    check!(
        codec.encode(values, &mut encoded[..bound]),
        codec.decode(&encoded[..bound], &mut decoded[..values.len()])
    );
    check!(
        codec.encode_zigzag(values, &mut encoded[..bound]),
        codec.decode_zigzag(&encoded[..bound], &mut decoded[..values.len()])
    );
    check!(
        codec.encode_deltas(42, values, &mut encoded[..bound]),
        codec.decode_deltas(42, &encoded[..bound], &mut decoded[..values.len()])
    );
    check!(
        codec.encode_zigzag_deltas(42, values, &mut encoded[..bound]),
        codec.decode_zigzag_deltas(42, &encoded[..bound], &mut decoded[..values.len()])
    );
    check!(
        codec.encode_transposed_deltas(42, values, &mut encoded[..bound]),
        codec.decode_transposed_deltas(42, &encoded[..bound], &mut decoded[..values.len()])
    );
}

/// Lengths around every kernel boundary: the 4-element key byte, the
/// 8-element vector step, and the 64-element tile.
pub(crate) const BOUNDARY_LENS: [usize; 22] = [
    0, 1, 2, 3, 4, 5, 7, 8, 9, 15, 16, 17, 31, 63, 64, 65, 127, 128, 129, 192, 199, 256,
];

/// Defines the conformance suite for a codec. Invoke at the bottom of the
/// module defining the codec and its descriptor.
macro_rules! codec_test_suite {
    ($codec:ident, $descriptor:ident) => {
        mod codec_suite {
            use super::{$codec, $descriptor};
            use crate::coding_descriptor::CodingDescriptor;
            use crate::tests::{
                check_sentinels, compare_streams, generate_array, generate_cumulative_array,
                generate_walk_array, round_trip_all_variants, BOUNDARY_LENS,
            };
            use crate::Codec;

            #[test]
            fn empty_stream() {
                let codec = $codec::new();
                assert_eq!($codec::compressed_bound(0), 0);
                assert_eq!(codec.encode(&[], &mut []), 0);
                assert_eq!(codec.encode_deltas(42, &[], &mut []), 0);
                assert_eq!(codec.encode_transposed_deltas(42, &[], &mut []), 0);
                assert_eq!(codec.decode(&[], &mut []), 0);
                assert_eq!(codec.decode_deltas(42, &[], &mut []), 0);
                assert_eq!(codec.decode_transposed_deltas(42, &[], &mut []), 0);
                assert_eq!(codec.compressed_len(&[], 0), 0);
            }

            #[test]
            fn minimal_key_selection() {
                for v in [
                    0u32,
                    1,
                    0xff,
                    0x100,
                    0xffff,
                    0x1_0000,
                    0xff_ffff,
                    0x100_0000,
                    u32::MAX,
                ] {
                    let (key, len) = $descriptor::key_value(v);
                    let minimal = (0..4usize)
                        .find(|&k| v <= $descriptor::KEY_MAX[k])
                        .unwrap();
                    assert_eq!(key as usize, minimal, "v={:#x}", v);
                    assert_eq!(len, $descriptor::KEY_LEN[key as usize]);
                }
            }

            #[test]
            fn boundary_lengths() {
                let codec = $codec::new();
                for len in BOUNDARY_LENS {
                    round_trip_all_variants(&codec, &generate_array::<u32>(len, 4));
                }
            }

            #[test]
            fn mixed_widths() {
                let codec = $codec::new();
                for max_bytes in [1usize, 2, 3, 4] {
                    round_trip_all_variants(&codec, &generate_array::<u32>(4096, max_bytes));
                    round_trip_all_variants(
                        &codec,
                        &generate_cumulative_array::<u32>(4096, max_bytes, 42),
                    );
                }
                round_trip_all_variants(&codec, &generate_walk_array(4096, 1 << 20, 1 << 30));
            }

            #[test]
            fn pattern_inputs() {
                let codec = $codec::new();
                for len in [64usize, 199, 256] {
                    round_trip_all_variants(&codec, &vec![0u32; len]);
                    round_trip_all_variants(&codec, &vec![u32::MAX; len]);
                    let alternating: Vec<u32> = (0..len)
                        .map(|i| if i % 2 == 0 { 0 } else { u32::MAX })
                        .collect();
                    round_trip_all_variants(&codec, &alternating);
                    let ascending: Vec<u32> = (0..len as u32).collect();
                    round_trip_all_variants(&codec, &ascending);
                    let descending: Vec<u32> = (0..len as u32).rev().collect();
                    round_trip_all_variants(&codec, &descending);
                }
            }

            #[test]
            fn bound_is_respected() {
                let codec = $codec::new();
                for len in BOUNDARY_LENS {
                    check_sentinels(&codec, &generate_array::<u32>(len, 4));
                }
            }

            #[test]
            fn data_block_accounting() {
                let codec = $codec::new();
                for len in [5usize, 64, 1000] {
                    let values = generate_array::<u32>(len, 4);
                    let mut encoded = vec![0u8; $codec::compressed_bound(len)];
                    let expected: usize = (len + 3) / 4
                        + values
                            .iter()
                            .map(|&v| $descriptor::key_value(v).1)
                            .sum::<usize>();
                    assert_eq!(codec.encode(&values, &mut encoded), expected);
                }
            }

            #[test]
            fn matches_scalar_stream() {
                let fast = $codec::new();
                let scalar = $codec::scalar();
                for len in [5usize, 8, 63, 64, 65, 127, 128, 1000] {
                    for max_bytes in [1usize, 2, 4] {
                        compare_streams(&fast, &scalar, &generate_array::<u32>(len, max_bytes));
                        compare_streams(
                            &fast,
                            &scalar,
                            &generate_cumulative_array::<u32>(len, max_bytes, 1),
                        );
                    }
                    compare_streams(&fast, &scalar, &generate_walk_array(len, 1 << 20, 7));
                }
            }

            #[test]
            fn large_delta_stream() {
                let codec = $codec::new();
                let values = generate_cumulative_array::<u32>(65536, 2, 7);
                let mut encoded = vec![0u8; $codec::compressed_bound(values.len())];
                let mut decoded = vec![0u32; values.len()];
                let len = codec.encode_deltas(7, &values, &mut encoded);
                assert_eq!(codec.decode_deltas(7, &encoded, &mut decoded), len);
                assert_eq!(values, decoded);
                let len = codec.encode_transposed_deltas(7, &values, &mut encoded);
                assert_eq!(codec.decode_transposed_deltas(7, &encoded, &mut decoded), len);
                assert_eq!(values, decoded);
            }
        }
    };
}

pub(crate) use codec_test_suite;
