#[cfg(target_arch = "x86_64")]
mod sse41;

use crate::coding_descriptor::CodingDescriptor;
use crate::scalar;
use crate::Codec;

#[derive(Copy, Clone, Debug)]
pub(crate) struct CodingDescriptor0124;

impl CodingDescriptor0124 {
    const KEY_BY_BYTES: [u8; 5] = [0, 1, 2, 3, 3];
}

impl CodingDescriptor for CodingDescriptor0124 {
    const KEY_LEN: [usize; 4] = [0, 1, 2, 4];
    const KEY_MAX: [u32; 4] = crate::key_utils::key_mask_table32(Self::KEY_LEN);

    #[inline]
    fn key_value(value: u32) -> (u8, usize) {
        let key = Self::KEY_BY_BYTES[4 - value.leading_zeros() as usize / 8];
        (key, Self::KEY_LEN[key as usize])
    }

    #[inline(always)]
    fn data_len(key: u8) -> usize {
        LENGTH_TABLE[key as usize] as usize
    }
}
const LENGTH_TABLE: [u8; 256] = crate::key_utils::key_length_table(CodingDescriptor0124::KEY_LEN);

#[derive(Clone, Copy)]
enum Impl {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Sse41,
}

/// `Codec0124` stores every value in 0, 1, 2, or 4 payload bytes.
///
/// Zero values cost no payload bytes at all, which favors inputs with many
/// zeros or delta streams with many repeats; three-byte values pay for a
/// full four. Acceleration is available on `x86_64` targets with SSE4.1
/// support.
#[derive(Clone, Copy)]
pub struct Codec0124(Impl);

impl Codec0124 {
    /// Portable implementation, used as the reference in kernel
    /// equivalence tests.
    #[cfg(test)]
    pub(crate) fn scalar() -> Self {
        Codec0124(Impl::Scalar)
    }
}

impl Codec for Codec0124 {
    fn new() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("sse4.1") {
                return Codec0124(Impl::Sse41);
            }
        }
        Codec0124(Impl::Scalar)
    }

    fn encode(&self, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::encode::<CodingDescriptor0124>(values, output),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode::<CodingDescriptor0124>(values, output)
            },
        }
    }

    fn encode_zigzag(&self, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::encode_zigzag::<CodingDescriptor0124>(values, output),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_zigzag::<CodingDescriptor0124>(values, output)
            },
        }
    }

    fn encode_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::encode_deltas::<CodingDescriptor0124>(previous, values, output),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_deltas::<CodingDescriptor0124>(previous, values, output)
            },
        }
    }

    fn encode_zigzag_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::encode_zigzag_deltas::<CodingDescriptor0124>(previous, values, output)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_zigzag_deltas::<CodingDescriptor0124>(
                    previous, values, output,
                )
            },
        }
    }

    fn encode_transposed_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::encode_transposed_deltas::<CodingDescriptor0124>(previous, values, output)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_transposed_deltas::<CodingDescriptor0124>(
                    previous, values, output,
                )
            },
        }
    }

    fn decode(&self, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::decode::<CodingDescriptor0124>(input, values),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode::<CodingDescriptor0124>(input, values)
            },
        }
    }

    fn decode_zigzag(&self, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::decode_zigzag::<CodingDescriptor0124>(input, values),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_zigzag::<CodingDescriptor0124>(input, values)
            },
        }
    }

    fn decode_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::decode_deltas::<CodingDescriptor0124>(previous, input, values),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_deltas::<CodingDescriptor0124>(previous, input, values)
            },
        }
    }

    fn decode_zigzag_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::decode_zigzag_deltas::<CodingDescriptor0124>(previous, input, values)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_zigzag_deltas::<CodingDescriptor0124>(
                    previous, input, values,
                )
            },
        }
    }

    fn decode_transposed_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::decode_transposed_deltas::<CodingDescriptor0124>(previous, input, values)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_transposed_deltas::<CodingDescriptor0124>(
                    previous, input, values,
                )
            },
        }
    }

    fn compressed_len(&self, input: &[u8], count: usize) -> usize {
        scalar::compressed_len::<CodingDescriptor0124>(input, count)
    }
}

#[cfg(test)]
crate::tests::codec_test_suite!(Codec0124, CodingDescriptor0124);

#[cfg(test)]
mod stream_layout {
    use super::*;

    #[test]
    fn single_zero_element() {
        let codec = Codec0124::new();
        let mut output = [0xfeu8; 5];
        // One key byte with key 00 and no payload at all.
        assert_eq!(codec.encode(&[0], &mut output), 1);
        assert_eq!(output[0], 0x00);
    }

    #[test]
    fn one_key_byte_every_width() {
        let codec = Codec0124::new();
        let values = [0u32, 1, 258, 66_051];
        let mut output = [0u8; 17];
        let len = codec.encode(&values, &mut output);
        // Keys 00, 01, 10, 11 pack to 0xe4; the zero stores nothing and the
        // three-byte value 0x010203 is stored at the full four bytes.
        assert_eq!(&output[..len], &[0xe4, 0x01, 0x02, 0x01, 0x03, 0x02, 0x01, 0x00]);
        assert_eq!(codec.compressed_len(&output, values.len()), len);
    }

    #[test]
    fn constant_run_of_deltas() {
        let codec = Codec0124::new();
        let mut output = [0xfeu8; 17];
        // All deltas are zero: a single key byte and an empty data block.
        let len = codec.encode_deltas(42, &[42, 42, 42, 42], &mut output);
        assert_eq!(&output[..len], &[0x00]);
    }

    #[test]
    fn transposed_deltas_beat_plain_encoding() {
        let codec = Codec0124::new();
        let values: Vec<u32> = (0..128u32).map(|i| i * 1000).collect();
        let mut plain = vec![0u8; Codec0124::compressed_bound(values.len())];
        let mut transposed = vec![0u8; Codec0124::compressed_bound(values.len())];
        let plain_len = codec.encode(&values, &mut plain);
        let transposed_len = codec.encode_transposed_deltas(0, &values, &mut transposed);
        assert!(transposed_len < plain_len);

        let mut decoded = vec![0u32; values.len()];
        assert_eq!(
            transposed_len,
            codec.decode_transposed_deltas(0, &transposed, &mut decoded)
        );
        assert_eq!(values, decoded);
    }
}
