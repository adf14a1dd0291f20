//! SSE4.1 whole-stream kernels, generic over a `SimdDescriptor`.
//!
//! Eight values are processed per iteration: two 4-lane registers are
//! reduced to sixteen key bits, each half is packed or scattered through a
//! 64-row shuffle table, and full 16-byte registers are stored with the
//! pointer advanced by the true payload length. Tails below eight elements
//! run through the scalar kernels so both paths emit identical streams.

use crate::coding_descriptor::CodingDescriptor;
use crate::scalar;
use crate::scalar::{key_block_len, TILE_LEN};
use crate::transform::{delta_decode32, delta_encode32, zigzag_decode32, zigzag_encode32};
use std::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_alignr_epi8, _mm_and_si128, _mm_cmpeq_epi32, _mm_cmpgt_epi32,
    _mm_extract_epi32, _mm_loadu_si128, _mm_set1_epi32, _mm_set_epi32, _mm_setzero_si128,
    _mm_shuffle_epi32, _mm_shuffle_epi8, _mm_slli_si128, _mm_srli_epi32, _mm_storeu_si128,
    _mm_sub_epi32, _mm_unpackhi_epi32, _mm_unpackhi_epi64, _mm_unpacklo_epi32, _mm_unpacklo_epi64,
    _mm_xor_si128,
};

/// Per-format hooks for the generic kernels: the key derivation sequence
/// and the permutation tables generated from the key-length distribution.
pub(crate) trait SimdDescriptor: CodingDescriptor {
    /// Packs the live payload bytes of a group to contiguous low positions;
    /// indexed by the low 6 bits of the group's key byte.
    const ENCODE_SHUFFLE: [[u8; 16]; 64];
    /// Scatters packed payload bytes into four zero-filled lanes; indexed by
    /// the low 6 bits of the group's key byte.
    const DECODE_SHUFFLE: [[u8; 16]; 64];
    /// Masks the fourth lane down to its key's width after a decode shuffle;
    /// indexed by the high 2 bits of the group's key byte.
    const LANE3_MASK: [[u8; 16]; 4];

    /// Derives the sixteen key bits for the eight values in `a` and `b`,
    /// low-to-high element order.
    unsafe fn keys(a: __m128i, b: __m128i) -> usize;
}

#[inline(always)]
unsafe fn zigzag_encode(v: __m128i) -> __m128i {
    let sign = _mm_cmpgt_epi32(_mm_setzero_si128(), v);
    _mm_xor_si128(_mm_add_epi32(v, v), sign)
}

#[inline(always)]
unsafe fn zigzag_decode(v: __m128i) -> __m128i {
    let one = _mm_set1_epi32(1);
    let sign = _mm_cmpeq_epi32(_mm_and_si128(one, v), one);
    _mm_xor_si128(_mm_srli_epi32::<1>(v), sign)
}

/// Differences each lane with the preceding lane: `[A-P, B-A, C-B, D-C]`
/// with `P` taken from the high lane of `prev`.
#[inline(always)]
unsafe fn delta_encode(v: __m128i, prev: __m128i) -> __m128i {
    _mm_sub_epi32(v, _mm_alignr_epi8::<12>(v, prev))
}

/// Prefix-sums the lanes of `v` starting from the high lane of `prev`:
/// `[P+A, P+A+B, P+A+B+C, P+A+B+C+D]`.
#[inline(always)]
unsafe fn delta_decode(v: __m128i, prev: __m128i) -> __m128i {
    let prev = _mm_shuffle_epi32::<0b11_11_11_11>(prev); // [P P P P]
    let v = _mm_add_epi32(v, _mm_slli_si128::<4>(v)); // [A AB BC CD]
    let sum = _mm_add_epi32(prev, v); // [PA PAB PBC PCD]
    _mm_add_epi32(sum, _mm_slli_si128::<8>(v)) // [PA PAB PABC PABCD]
}

/// 4x4 transpose of 32-bit lanes across four registers.
#[inline(always)]
unsafe fn transpose4(
    r0: __m128i,
    r1: __m128i,
    r2: __m128i,
    r3: __m128i,
) -> (__m128i, __m128i, __m128i, __m128i) {
    let t0 = _mm_unpacklo_epi32(r0, r1);
    let t1 = _mm_unpacklo_epi32(r2, r3);
    let t2 = _mm_unpackhi_epi32(r0, r1);
    let t3 = _mm_unpackhi_epi32(r2, r3);
    (
        _mm_unpacklo_epi64(t0, t1),
        _mm_unpackhi_epi64(t0, t1),
        _mm_unpacklo_epi64(t2, t3),
        _mm_unpackhi_epi64(t2, t3),
    )
}

/// Compresses eight values and stores their two key bytes, little-endian.
/// Returns the payload advance; store bytes beyond it are overwritten by
/// the next store or land inside the bound reservation.
#[inline(always)]
unsafe fn encode8<D: SimdDescriptor>(
    key_ptr: *mut u8,
    data_ptr: *mut u8,
    a: __m128i,
    b: __m128i,
) -> usize {
    let keys = D::keys(a, b);
    let shuf_a = _mm_loadu_si128(D::ENCODE_SHUFFLE[keys & 0x3f].as_ptr() as *const __m128i);
    let shuf_b = _mm_loadu_si128(D::ENCODE_SHUFFLE[(keys >> 8) & 0x3f].as_ptr() as *const __m128i);
    _mm_storeu_si128(data_ptr as *mut __m128i, _mm_shuffle_epi8(a, shuf_a));
    let len_a = D::data_len((keys & 0xff) as u8);
    _mm_storeu_si128(data_ptr.add(len_a) as *mut __m128i, _mm_shuffle_epi8(b, shuf_b));
    std::ptr::write_unaligned(key_ptr as *mut u16, (keys as u16).to_le());
    len_a + D::data_len((keys >> 8) as u8)
}

#[inline(always)]
unsafe fn decode4<D: SimdDescriptor>(data_ptr: *const u8, key: usize) -> __m128i {
    let shuf = _mm_loadu_si128(D::DECODE_SHUFFLE[key & 0x3f].as_ptr() as *const __m128i);
    let mask = _mm_loadu_si128(D::LANE3_MASK[key >> 6].as_ptr() as *const __m128i);
    let data = _mm_loadu_si128(data_ptr as *const __m128i);
    _mm_and_si128(_mm_shuffle_epi8(data, shuf), mask)
}

/// Decompresses eight values from two key bytes. Returns the two groups and
/// the payload advance.
#[inline(always)]
unsafe fn decode8<D: SimdDescriptor>(
    key_ptr: *const u8,
    data_ptr: *const u8,
) -> (__m128i, __m128i, usize) {
    let keys = u16::from_le(std::ptr::read_unaligned(key_ptr as *const u16)) as usize;
    let a = decode4::<D>(data_ptr, keys & 0xff);
    let len_a = D::data_len((keys & 0xff) as u8);
    let b = decode4::<D>(data_ptr.add(len_a), keys >> 8);
    (a, b, len_a + D::data_len((keys >> 8) as u8))
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn encode<D: SimdDescriptor>(values: &[u32], output: &mut [u8]) -> usize {
    let count = values.len();
    let mut key_ptr = output.as_mut_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut input = values.as_ptr();

    let end = input.add(count & !7);
    while input < end {
        let a = _mm_loadu_si128(input as *const __m128i);
        let b = _mm_loadu_si128(input.add(4) as *const __m128i);
        input = input.add(8);
        data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, a, b));
        key_ptr = key_ptr.add(2);
    }

    data_ptr = scalar::encode_run::<D, _>(key_ptr, data_ptr, &values[count & !7..], &mut |v| v);
    data_ptr.offset_from(output.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn encode_zigzag<D: SimdDescriptor>(values: &[u32], output: &mut [u8]) -> usize {
    let count = values.len();
    let mut key_ptr = output.as_mut_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut input = values.as_ptr();

    let end = input.add(count & !7);
    while input < end {
        let a = zigzag_encode(_mm_loadu_si128(input as *const __m128i));
        let b = zigzag_encode(_mm_loadu_si128(input.add(4) as *const __m128i));
        input = input.add(8);
        data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, a, b));
        key_ptr = key_ptr.add(2);
    }

    data_ptr = scalar::encode_run::<D, _>(
        key_ptr,
        data_ptr,
        &values[count & !7..],
        &mut zigzag_encode32,
    );
    data_ptr.offset_from(output.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn encode_deltas<D: SimdDescriptor>(
    mut previous: u32,
    values: &[u32],
    output: &mut [u8],
) -> usize {
    let count = values.len();
    let mut key_ptr = output.as_mut_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut input = values.as_ptr();

    if count >= 8 {
        let mut prev = _mm_set_epi32(previous as i32, 0, 0, 0);
        let end = input.add(count & !7);
        while input < end {
            let a = _mm_loadu_si128(input as *const __m128i);
            let b = _mm_loadu_si128(input.add(4) as *const __m128i);
            input = input.add(8);
            let diff_a = delta_encode(a, prev);
            let diff_b = delta_encode(b, a);
            prev = b;
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, diff_a, diff_b));
            key_ptr = key_ptr.add(2);
        }
        previous = _mm_extract_epi32::<3>(prev) as u32;
    }

    data_ptr = scalar::encode_run::<D, _>(key_ptr, data_ptr, &values[count & !7..], &mut |v| {
        let delta = delta_encode32(v, previous);
        previous = v;
        delta
    });
    data_ptr.offset_from(output.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn encode_zigzag_deltas<D: SimdDescriptor>(
    mut previous: u32,
    values: &[u32],
    output: &mut [u8],
) -> usize {
    let count = values.len();
    let mut key_ptr = output.as_mut_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut input = values.as_ptr();

    if count >= 8 {
        let mut prev = _mm_set_epi32(previous as i32, 0, 0, 0);
        let end = input.add(count & !7);
        while input < end {
            let a = _mm_loadu_si128(input as *const __m128i);
            let b = _mm_loadu_si128(input.add(4) as *const __m128i);
            input = input.add(8);
            let diff_a = zigzag_encode(delta_encode(a, prev));
            let diff_b = zigzag_encode(delta_encode(b, a));
            prev = b;
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, diff_a, diff_b));
            key_ptr = key_ptr.add(2);
        }
        previous = _mm_extract_epi32::<3>(prev) as u32;
    }

    data_ptr = scalar::encode_run::<D, _>(key_ptr, data_ptr, &values[count & !7..], &mut |v| {
        let delta = zigzag_encode32(delta_encode32(v, previous));
        previous = v;
        delta
    });
    data_ptr.offset_from(output.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn encode_transposed_deltas<D: SimdDescriptor>(
    mut previous: u32,
    values: &[u32],
    output: &mut [u8],
) -> usize {
    let count = values.len();
    let mut key_ptr = output.as_mut_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut input = values.as_ptr();

    if count >= 8 {
        let mut prev = _mm_set_epi32(previous as i32, 0, 0, 0);

        let tile_end = input.add(count & !(TILE_LEN - 1));
        while input < tile_end {
            // The bottom row group seeds the delta of the first row group,
            // so it is loaded and transposed out of sequence.
            let (r3, r7, rb, rf) = transpose4(
                _mm_loadu_si128(input.add(12) as *const __m128i),
                _mm_loadu_si128(input.add(28) as *const __m128i),
                _mm_loadu_si128(input.add(44) as *const __m128i),
                _mm_loadu_si128(input.add(60) as *const __m128i),
            );
            prev = _mm_alignr_epi8::<12>(rf, prev);

            let (r0, r4, r8, rc) = transpose4(
                _mm_loadu_si128(input as *const __m128i),
                _mm_loadu_si128(input.add(16) as *const __m128i),
                _mm_loadu_si128(input.add(32) as *const __m128i),
                _mm_loadu_si128(input.add(48) as *const __m128i),
            );
            let carry = rc;
            let dc = _mm_sub_epi32(rc, r8);
            let d8 = _mm_sub_epi32(r8, r4);
            let d4 = _mm_sub_epi32(r4, r0);
            let d0 = _mm_sub_epi32(r0, prev);
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, d0, d4));
            data_ptr = data_ptr.add(encode8::<D>(key_ptr.add(2), data_ptr, d8, dc));
            key_ptr = key_ptr.add(4);

            let (r1, r5, r9, rd) = transpose4(
                _mm_loadu_si128(input.add(4) as *const __m128i),
                _mm_loadu_si128(input.add(20) as *const __m128i),
                _mm_loadu_si128(input.add(36) as *const __m128i),
                _mm_loadu_si128(input.add(52) as *const __m128i),
            );
            prev = rd;
            let dd = _mm_sub_epi32(rd, r9);
            let d9 = _mm_sub_epi32(r9, r5);
            let d5 = _mm_sub_epi32(r5, r1);
            let d1 = _mm_sub_epi32(r1, carry);
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, d1, d5));
            data_ptr = data_ptr.add(encode8::<D>(key_ptr.add(2), data_ptr, d9, dd));
            key_ptr = key_ptr.add(4);

            let (r2, r6, ra, re) = transpose4(
                _mm_loadu_si128(input.add(8) as *const __m128i),
                _mm_loadu_si128(input.add(24) as *const __m128i),
                _mm_loadu_si128(input.add(40) as *const __m128i),
                _mm_loadu_si128(input.add(56) as *const __m128i),
            );
            let carry = re;
            let de = _mm_sub_epi32(re, ra);
            let da = _mm_sub_epi32(ra, r6);
            let d6 = _mm_sub_epi32(r6, r2);
            let d2 = _mm_sub_epi32(r2, prev);
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, d2, d6));
            data_ptr = data_ptr.add(encode8::<D>(key_ptr.add(2), data_ptr, da, de));
            key_ptr = key_ptr.add(4);

            // The last four rows are already loaded and transposed.
            prev = rf;
            let df = _mm_sub_epi32(rf, rb);
            let db = _mm_sub_epi32(rb, r7);
            let d7 = _mm_sub_epi32(r7, r3);
            let d3 = _mm_sub_epi32(r3, carry);
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, d3, d7));
            data_ptr = data_ptr.add(encode8::<D>(key_ptr.add(2), data_ptr, db, df));
            key_ptr = key_ptr.add(4);

            input = input.add(TILE_LEN);
        }

        // Remaining chunks of 8 elements use the plain delta transform.
        let end = input.add((count & (TILE_LEN - 1)) & !7);
        while input < end {
            let a = _mm_loadu_si128(input as *const __m128i);
            let b = _mm_loadu_si128(input.add(4) as *const __m128i);
            input = input.add(8);
            let diff_a = delta_encode(a, prev);
            let diff_b = delta_encode(b, a);
            prev = b;
            data_ptr = data_ptr.add(encode8::<D>(key_ptr, data_ptr, diff_a, diff_b));
            key_ptr = key_ptr.add(2);
        }
        previous = _mm_extract_epi32::<3>(prev) as u32;
    }

    data_ptr = scalar::encode_run::<D, _>(key_ptr, data_ptr, &values[count & !7..], &mut |v| {
        let delta = delta_encode32(v, previous);
        previous = v;
        delta
    });
    data_ptr.offset_from(output.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn decode<D: SimdDescriptor>(input: &[u8], values: &mut [u32]) -> usize {
    let count = values.len();
    let mut key_ptr = input.as_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut out = values.as_mut_ptr();

    let end = out.add(count & !7);
    while out < end {
        let (a, b, len) = decode8::<D>(key_ptr, data_ptr);
        _mm_storeu_si128(out as *mut __m128i, a);
        _mm_storeu_si128(out.add(4) as *mut __m128i, b);
        out = out.add(8);
        key_ptr = key_ptr.add(2);
        data_ptr = data_ptr.add(len);
    }

    data_ptr = scalar::decode_run::<D, _>(key_ptr, data_ptr, &mut values[count & !7..], &mut |v| v);
    data_ptr.offset_from(input.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn decode_zigzag<D: SimdDescriptor>(input: &[u8], values: &mut [u32]) -> usize {
    let count = values.len();
    let mut key_ptr = input.as_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut out = values.as_mut_ptr();

    let end = out.add(count & !7);
    while out < end {
        let (a, b, len) = decode8::<D>(key_ptr, data_ptr);
        _mm_storeu_si128(out as *mut __m128i, zigzag_decode(a));
        _mm_storeu_si128(out.add(4) as *mut __m128i, zigzag_decode(b));
        out = out.add(8);
        key_ptr = key_ptr.add(2);
        data_ptr = data_ptr.add(len);
    }

    data_ptr = scalar::decode_run::<D, _>(
        key_ptr,
        data_ptr,
        &mut values[count & !7..],
        &mut zigzag_decode32,
    );
    data_ptr.offset_from(input.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn decode_deltas<D: SimdDescriptor>(
    mut previous: u32,
    input: &[u8],
    values: &mut [u32],
) -> usize {
    let count = values.len();
    let mut key_ptr = input.as_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut out = values.as_mut_ptr();

    if count >= 8 {
        let mut prev = _mm_set_epi32(previous as i32, 0, 0, 0);
        let end = out.add(count & !7);
        while out < end {
            let (diff_a, diff_b, len) = decode8::<D>(key_ptr, data_ptr);
            let a = delta_decode(diff_a, prev);
            let b = delta_decode(diff_b, a);
            prev = b;
            _mm_storeu_si128(out as *mut __m128i, a);
            _mm_storeu_si128(out.add(4) as *mut __m128i, b);
            out = out.add(8);
            key_ptr = key_ptr.add(2);
            data_ptr = data_ptr.add(len);
        }
        previous = _mm_extract_epi32::<3>(prev) as u32;
    }

    data_ptr = scalar::decode_run::<D, _>(key_ptr, data_ptr, &mut values[count & !7..], &mut |d| {
        previous = delta_decode32(d, previous);
        previous
    });
    data_ptr.offset_from(input.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn decode_zigzag_deltas<D: SimdDescriptor>(
    mut previous: u32,
    input: &[u8],
    values: &mut [u32],
) -> usize {
    let count = values.len();
    let mut key_ptr = input.as_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut out = values.as_mut_ptr();

    if count >= 8 {
        let mut prev = _mm_set_epi32(previous as i32, 0, 0, 0);
        let end = out.add(count & !7);
        while out < end {
            let (diff_a, diff_b, len) = decode8::<D>(key_ptr, data_ptr);
            let a = delta_decode(zigzag_decode(diff_a), prev);
            let b = delta_decode(zigzag_decode(diff_b), a);
            prev = b;
            _mm_storeu_si128(out as *mut __m128i, a);
            _mm_storeu_si128(out.add(4) as *mut __m128i, b);
            out = out.add(8);
            key_ptr = key_ptr.add(2);
            data_ptr = data_ptr.add(len);
        }
        previous = _mm_extract_epi32::<3>(prev) as u32;
    }

    data_ptr = scalar::decode_run::<D, _>(key_ptr, data_ptr, &mut values[count & !7..], &mut |d| {
        previous = delta_decode32(zigzag_decode32(d), previous);
        previous
    });
    data_ptr.offset_from(input.as_ptr()) as usize
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn decode_transposed_deltas<D: SimdDescriptor>(
    mut previous: u32,
    input: &[u8],
    values: &mut [u32],
) -> usize {
    let count = values.len();
    let mut key_ptr = input.as_ptr();
    let mut data_ptr = key_ptr.add(key_block_len(count));
    let mut out = values.as_mut_ptr();

    if count >= 8 {
        let mut prev = _mm_set_epi32(previous as i32, 0, 0, 0);

        let tile_end = out.add(count & !(TILE_LEN - 1));
        while out < tile_end {
            // Decode the sixteen delta groups of the tile in stream order.
            let (s0, s1, len) = decode8::<D>(key_ptr, data_ptr);
            data_ptr = data_ptr.add(len);
            let (s2, s3, len) = decode8::<D>(key_ptr.add(2), data_ptr);
            data_ptr = data_ptr.add(len);
            let (s4, s5, len) = decode8::<D>(key_ptr.add(4), data_ptr);
            data_ptr = data_ptr.add(len);
            let (s6, s7, len) = decode8::<D>(key_ptr.add(6), data_ptr);
            data_ptr = data_ptr.add(len);
            let (s8, s9, len) = decode8::<D>(key_ptr.add(8), data_ptr);
            data_ptr = data_ptr.add(len);
            let (sa, sb, len) = decode8::<D>(key_ptr.add(10), data_ptr);
            data_ptr = data_ptr.add(len);
            let (sc, sd, len) = decode8::<D>(key_ptr.add(12), data_ptr);
            data_ptr = data_ptr.add(len);
            let (se, sf, len) = decode8::<D>(key_ptr.add(14), data_ptr);
            data_ptr = data_ptr.add(len);
            key_ptr = key_ptr.add(16);

            // Un-transpose each group of four back to input-order rows,
            // leaving sixteen vectors of input-order deltas.
            let (e0, e4, e8, ec) = transpose4(s0, s1, s2, s3);
            let (e1, e5, e9, ed) = transpose4(s4, s5, s6, s7);
            let (e2, e6, ea, ee) = transpose4(s8, s9, sa, sb);
            let (e3, e7, eb, ef) = transpose4(sc, sd, se, sf);

            // Chain the prefix sums through the rows in input order.
            let r = delta_decode(e0, prev);
            _mm_storeu_si128(out as *mut __m128i, r);
            let r = delta_decode(e1, r);
            _mm_storeu_si128(out.add(4) as *mut __m128i, r);
            let r = delta_decode(e2, r);
            _mm_storeu_si128(out.add(8) as *mut __m128i, r);
            let r = delta_decode(e3, r);
            _mm_storeu_si128(out.add(12) as *mut __m128i, r);
            let r = delta_decode(e4, r);
            _mm_storeu_si128(out.add(16) as *mut __m128i, r);
            let r = delta_decode(e5, r);
            _mm_storeu_si128(out.add(20) as *mut __m128i, r);
            let r = delta_decode(e6, r);
            _mm_storeu_si128(out.add(24) as *mut __m128i, r);
            let r = delta_decode(e7, r);
            _mm_storeu_si128(out.add(28) as *mut __m128i, r);
            let r = delta_decode(e8, r);
            _mm_storeu_si128(out.add(32) as *mut __m128i, r);
            let r = delta_decode(e9, r);
            _mm_storeu_si128(out.add(36) as *mut __m128i, r);
            let r = delta_decode(ea, r);
            _mm_storeu_si128(out.add(40) as *mut __m128i, r);
            let r = delta_decode(eb, r);
            _mm_storeu_si128(out.add(44) as *mut __m128i, r);
            let r = delta_decode(ec, r);
            _mm_storeu_si128(out.add(48) as *mut __m128i, r);
            let r = delta_decode(ed, r);
            _mm_storeu_si128(out.add(52) as *mut __m128i, r);
            let r = delta_decode(ee, r);
            _mm_storeu_si128(out.add(56) as *mut __m128i, r);
            let r = delta_decode(ef, r);
            _mm_storeu_si128(out.add(60) as *mut __m128i, r);
            prev = r;

            out = out.add(TILE_LEN);
        }

        // Remaining chunks of 8 elements use the plain delta transform.
        let end = out.add((count & (TILE_LEN - 1)) & !7);
        while out < end {
            let (diff_a, diff_b, len) = decode8::<D>(key_ptr, data_ptr);
            let a = delta_decode(diff_a, prev);
            let b = delta_decode(diff_b, a);
            prev = b;
            _mm_storeu_si128(out as *mut __m128i, a);
            _mm_storeu_si128(out.add(4) as *mut __m128i, b);
            out = out.add(8);
            key_ptr = key_ptr.add(2);
            data_ptr = data_ptr.add(len);
        }
        previous = _mm_extract_epi32::<3>(prev) as u32;
    }

    data_ptr = scalar::decode_run::<D, _>(key_ptr, data_ptr, &mut values[count & !7..], &mut |d| {
        previous = delta_decode32(d, previous);
        previous
    });
    data_ptr.offset_from(input.as_ptr()) as usize
}
