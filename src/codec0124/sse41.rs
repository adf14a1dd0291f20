use super::CodingDescriptor0124;
use crate::arch::shuffle::{decode_shuffle_table, encode_shuffle_table, lane3_mask_table};
use crate::arch::sse41::SimdDescriptor;
use crate::coding_descriptor::CodingDescriptor;
use std::arch::x86_64::{
    __m128i, _mm_min_epi16, _mm_min_epu8, _mm_movemask_epi8, _mm_packus_epi32, _mm_set1_epi16,
    _mm_set1_epi8, _mm_slli_epi16,
};

impl SimdDescriptor for CodingDescriptor0124 {
    const ENCODE_SHUFFLE: [[u8; 16]; 64] = encode_shuffle_table(Self::KEY_LEN);
    const DECODE_SHUFFLE: [[u8; 16]; 64] = decode_shuffle_table(Self::KEY_LEN);
    const LANE3_MASK: [[u8; 16]; 4] = lane3_mask_table(Self::KEY_LEN);

    #[inline(always)]
    unsafe fn keys(a: __m128i, b: __m128i) -> usize {
        let mask_01 = _mm_set1_epi8(0x01);
        let mask_0100 = _mm_set1_epi16(0x0100);

        // Normalize each byte to 0 or 1 and narrow whole values with
        // unsigned saturation, leaving one halfword per value.
        let a = _mm_min_epu8(mask_01, a);
        let b = _mm_min_epu8(mask_01, b);
        let packed = _mm_packus_epi32(a, b);
        // 0x0101 -> 0x0100
        let packed = _mm_min_epi16(packed, mask_0100);
        let packed = _mm_slli_epi16::<7>(packed);
        _mm_movemask_epi8(packed) as usize
    }
}
