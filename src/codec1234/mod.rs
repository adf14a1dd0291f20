#[cfg(target_arch = "x86_64")]
mod sse41;

use crate::coding_descriptor::CodingDescriptor;
use crate::scalar;
use crate::Codec;

#[derive(Copy, Clone, Debug)]
pub(crate) struct CodingDescriptor1234;

impl CodingDescriptor for CodingDescriptor1234 {
    const KEY_LEN: [usize; 4] = [1, 2, 3, 4];
    const KEY_MAX: [u32; 4] = crate::key_utils::key_mask_table32(Self::KEY_LEN);

    #[inline]
    fn key_value(value: u32) -> (u8, usize) {
        let key = 3u32.saturating_sub(value.leading_zeros() / 8);
        (key as u8, key as usize + 1)
    }

    #[inline(always)]
    fn data_len(key: u8) -> usize {
        LENGTH_TABLE[key as usize] as usize
    }
}
const LENGTH_TABLE: [u8; 256] = crate::key_utils::key_length_table(CodingDescriptor1234::KEY_LEN);

#[derive(Clone, Copy)]
enum Impl {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Sse41,
}

/// `Codec1234` stores every value in 1, 2, 3, or 4 payload bytes.
///
/// This is the format of choice when zero values are rare; each element
/// costs at least one payload byte. Acceleration is available on `x86_64`
/// targets with SSE4.1 support.
#[derive(Clone, Copy)]
pub struct Codec1234(Impl);

impl Codec1234 {
    /// Portable implementation, used as the reference in kernel
    /// equivalence tests.
    #[cfg(test)]
    pub(crate) fn scalar() -> Self {
        Codec1234(Impl::Scalar)
    }
}

impl Codec for Codec1234 {
    fn new() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("sse4.1") {
                return Codec1234(Impl::Sse41);
            }
        }
        Codec1234(Impl::Scalar)
    }

    fn encode(&self, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::encode::<CodingDescriptor1234>(values, output),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode::<CodingDescriptor1234>(values, output)
            },
        }
    }

    fn encode_zigzag(&self, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::encode_zigzag::<CodingDescriptor1234>(values, output),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_zigzag::<CodingDescriptor1234>(values, output)
            },
        }
    }

    fn encode_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::encode_deltas::<CodingDescriptor1234>(previous, values, output),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_deltas::<CodingDescriptor1234>(previous, values, output)
            },
        }
    }

    fn encode_zigzag_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::encode_zigzag_deltas::<CodingDescriptor1234>(previous, values, output)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_zigzag_deltas::<CodingDescriptor1234>(
                    previous, values, output,
                )
            },
        }
    }

    fn encode_transposed_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize {
        assert!(output.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::encode_transposed_deltas::<CodingDescriptor1234>(previous, values, output)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::encode_transposed_deltas::<CodingDescriptor1234>(
                    previous, values, output,
                )
            },
        }
    }

    fn decode(&self, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::decode::<CodingDescriptor1234>(input, values),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode::<CodingDescriptor1234>(input, values)
            },
        }
    }

    fn decode_zigzag(&self, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::decode_zigzag::<CodingDescriptor1234>(input, values),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_zigzag::<CodingDescriptor1234>(input, values)
            },
        }
    }

    fn decode_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => scalar::decode_deltas::<CodingDescriptor1234>(previous, input, values),
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_deltas::<CodingDescriptor1234>(previous, input, values)
            },
        }
    }

    fn decode_zigzag_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::decode_zigzag_deltas::<CodingDescriptor1234>(previous, input, values)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_zigzag_deltas::<CodingDescriptor1234>(
                    previous, input, values,
                )
            },
        }
    }

    fn decode_transposed_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize {
        assert!(input.len() >= Self::compressed_bound(values.len()));
        match self.0 {
            Impl::Scalar => {
                scalar::decode_transposed_deltas::<CodingDescriptor1234>(previous, input, values)
            }
            #[cfg(target_arch = "x86_64")]
            Impl::Sse41 => unsafe {
                crate::arch::sse41::decode_transposed_deltas::<CodingDescriptor1234>(
                    previous, input, values,
                )
            },
        }
    }

    fn compressed_len(&self, input: &[u8], count: usize) -> usize {
        scalar::compressed_len::<CodingDescriptor1234>(input, count)
    }
}

#[cfg(test)]
crate::tests::codec_test_suite!(Codec1234, CodingDescriptor1234);
