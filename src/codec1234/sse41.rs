use super::CodingDescriptor1234;
use crate::arch::shuffle::{decode_shuffle_table, encode_shuffle_table, lane3_mask_table};
use crate::arch::sse41::SimdDescriptor;
use crate::coding_descriptor::CodingDescriptor;
use std::arch::x86_64::{
    __m128i, _mm_adds_epu16, _mm_min_epi16, _mm_min_epu8, _mm_movemask_epi8, _mm_packus_epi16,
    _mm_set1_epi16, _mm_set1_epi8,
};

impl SimdDescriptor for CodingDescriptor1234 {
    const ENCODE_SHUFFLE: [[u8; 16]; 64] = encode_shuffle_table(Self::KEY_LEN);
    const DECODE_SHUFFLE: [[u8; 16]; 64] = decode_shuffle_table(Self::KEY_LEN);
    const LANE3_MASK: [[u8; 16]; 4] = lane3_mask_table(Self::KEY_LEN);

    #[inline(always)]
    unsafe fn keys(a: __m128i, b: __m128i) -> usize {
        let mask_01 = _mm_set1_epi8(0x01);
        let mask_7f00 = _mm_set1_epi16(0x7f00);

        // Normalize each byte to 0 or 1 and narrow byte pairs with unsigned
        // saturation, leaving one halfword per value.
        let a = _mm_min_epu8(mask_01, a);
        let b = _mm_min_epu8(mask_01, b);
        let packed = _mm_packus_epi16(a, b);
        // 0x01ff -> 0x0101
        let packed = _mm_min_epi16(packed, mask_01);
        // 0x0101 -> 0x8001, 0xff01 -> 0xffff
        let packed = _mm_adds_epu16(packed, mask_7f00);
        _mm_movemask_epi8(packed) as usize
    }
}
