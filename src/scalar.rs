//! Portable whole-stream kernels, generic over a `CodingDescriptor`.
//!
//! These are the only kernels on targets without the vector capability and
//! the tail path of the vector kernels everywhere else. Both must produce
//! identical streams: a value is always stored as four little-endian bytes
//! with the pointer advanced by the key's true length, so trailing zero
//! bytes are either overwritten by the next value or fall inside the bound
//! reservation.

use crunchy::unroll;

use crate::coding_descriptor::CodingDescriptor;
use crate::transform::{delta_decode32, delta_encode32, zigzag_decode32, zigzag_encode32};

/// Elements per delta-transpose tile.
pub(crate) const TILE_LEN: usize = 64;

/// Size in bytes of the key block preceding the data block for `count`
/// elements: four 2-bit keys per byte, rounded up.
#[inline(always)]
pub(crate) fn key_block_len(count: usize) -> usize {
    (count + 3) >> 2
}

#[inline(always)]
unsafe fn encode_one<D: CodingDescriptor>(data_ptr: *mut u8, value: u32) -> (u8, usize) {
    std::ptr::write_unaligned(data_ptr as *mut [u8; 4], value.to_le_bytes());
    D::key_value(value)
}

#[inline(always)]
unsafe fn decode_one<D: CodingDescriptor>(data_ptr: *const u8, key: usize) -> (u32, usize) {
    let raw = u32::from_le_bytes(std::ptr::read_unaligned(data_ptr as *const [u8; 4]));
    (raw & D::KEY_MAX[key], D::KEY_LEN[key])
}

/// Encodes a run of values starting at a fresh key byte, applying `pre` to
/// each element before width selection. Returns the advanced data pointer.
/// A partial final key byte keeps its unused high bits zero.
///
/// _Safety_: `key_ptr` must be valid for `(values.len() + 3) / 4` bytes and
/// `data_ptr` for `values.len() * 4` bytes.
pub(crate) unsafe fn encode_run<D: CodingDescriptor, F: FnMut(u32) -> u32>(
    mut key_ptr: *mut u8,
    mut data_ptr: *mut u8,
    values: &[u32],
    pre: &mut F,
) -> *mut u8 {
    let mut quads = values.chunks_exact(4);
    for quad in &mut quads {
        let mut keys = 0u8;
        unroll! {
            for i in 0..4 {
                let (key, len) = encode_one::<D>(data_ptr, pre(quad[i]));
                keys |= key << (i * 2);
                data_ptr = data_ptr.add(len);
            }
        }
        *key_ptr = keys;
        key_ptr = key_ptr.add(1);
    }

    let tail = quads.remainder();
    if !tail.is_empty() {
        let mut keys = 0u8;
        for (i, &v) in tail.iter().enumerate() {
            let (key, len) = encode_one::<D>(data_ptr, pre(v));
            keys |= key << (i * 2);
            data_ptr = data_ptr.add(len);
        }
        *key_ptr = keys;
    }
    data_ptr
}

/// Decodes a run of values starting at a fresh key byte, applying `post` to
/// each zero-extended value. Returns the advanced data pointer.
///
/// _Safety_: `key_ptr` must be valid for `(values.len() + 3) / 4` bytes and
/// `data_ptr` readable up to the bound reservation.
pub(crate) unsafe fn decode_run<D: CodingDescriptor, F: FnMut(u32) -> u32>(
    mut key_ptr: *const u8,
    mut data_ptr: *const u8,
    values: &mut [u32],
    post: &mut F,
) -> *const u8 {
    let mut quads = values.chunks_exact_mut(4);
    for quad in &mut quads {
        let keys = *key_ptr as usize;
        key_ptr = key_ptr.add(1);
        unroll! {
            for i in 0..4 {
                let (raw, len) = decode_one::<D>(data_ptr, (keys >> (i * 2)) & 0x3);
                quad[i] = post(raw);
                data_ptr = data_ptr.add(len);
            }
        }
    }

    let tail = quads.into_remainder();
    if !tail.is_empty() {
        let keys = *key_ptr as usize;
        for (i, slot) in tail.iter_mut().enumerate() {
            let (raw, len) = decode_one::<D>(data_ptr, (keys >> (i * 2)) & 0x3);
            *slot = post(raw);
            data_ptr = data_ptr.add(len);
        }
    }
    data_ptr
}

#[inline]
fn encode_with<D: CodingDescriptor, F: FnMut(u32) -> u32>(
    values: &[u32],
    output: &mut [u8],
    pre: &mut F,
) -> usize {
    unsafe {
        let key_ptr = output.as_mut_ptr();
        let data_ptr = key_ptr.add(key_block_len(values.len()));
        let end = encode_run::<D, F>(key_ptr, data_ptr, values, pre);
        end.offset_from(output.as_ptr()) as usize
    }
}

#[inline]
fn decode_with<D: CodingDescriptor, F: FnMut(u32) -> u32>(
    input: &[u8],
    values: &mut [u32],
    post: &mut F,
) -> usize {
    unsafe {
        let key_ptr = input.as_ptr();
        let data_ptr = key_ptr.add(key_block_len(values.len()));
        let end = decode_run::<D, F>(key_ptr, data_ptr, values, post);
        end.offset_from(input.as_ptr()) as usize
    }
}

pub(crate) fn encode<D: CodingDescriptor>(values: &[u32], output: &mut [u8]) -> usize {
    encode_with::<D, _>(values, output, &mut |v| v)
}

pub(crate) fn encode_zigzag<D: CodingDescriptor>(values: &[u32], output: &mut [u8]) -> usize {
    encode_with::<D, _>(values, output, &mut zigzag_encode32)
}

pub(crate) fn encode_deltas<D: CodingDescriptor>(
    mut previous: u32,
    values: &[u32],
    output: &mut [u8],
) -> usize {
    encode_with::<D, _>(values, output, &mut |v| {
        let delta = delta_encode32(v, previous);
        previous = v;
        delta
    })
}

pub(crate) fn encode_zigzag_deltas<D: CodingDescriptor>(
    mut previous: u32,
    values: &[u32],
    output: &mut [u8],
) -> usize {
    encode_with::<D, _>(values, output, &mut |v| {
        let delta = zigzag_encode32(delta_encode32(v, previous));
        previous = v;
        delta
    })
}

/// Tiles of 64 elements are differenced in input order and written with the
/// four 16-element chains interleaved at stride 4 in stream order; tails
/// below a tile use the plain delta path.
pub(crate) fn encode_transposed_deltas<D: CodingDescriptor>(
    mut previous: u32,
    values: &[u32],
    output: &mut [u8],
) -> usize {
    unsafe {
        let mut key_ptr = output.as_mut_ptr();
        let mut data_ptr = key_ptr.add(key_block_len(values.len()));

        let mut tiles = values.chunks_exact(TILE_LEN);
        for tile_values in &mut tiles {
            let mut tile = [0u32; TILE_LEN];
            for (j, chain) in tile_values.chunks_exact(16).enumerate() {
                for (i, &v) in chain.iter().enumerate() {
                    tile[i * 4 + j] = delta_encode32(v, previous);
                    previous = v;
                }
            }
            data_ptr = encode_run::<D, _>(key_ptr, data_ptr, &tile, &mut |v| v);
            key_ptr = key_ptr.add(TILE_LEN / 4);
        }

        data_ptr = encode_run::<D, _>(key_ptr, data_ptr, tiles.remainder(), &mut |v| {
            let delta = delta_encode32(v, previous);
            previous = v;
            delta
        });
        data_ptr.offset_from(output.as_ptr()) as usize
    }
}

pub(crate) fn decode<D: CodingDescriptor>(input: &[u8], values: &mut [u32]) -> usize {
    decode_with::<D, _>(input, values, &mut |v| v)
}

pub(crate) fn decode_zigzag<D: CodingDescriptor>(input: &[u8], values: &mut [u32]) -> usize {
    decode_with::<D, _>(input, values, &mut zigzag_decode32)
}

pub(crate) fn decode_deltas<D: CodingDescriptor>(
    mut previous: u32,
    input: &[u8],
    values: &mut [u32],
) -> usize {
    decode_with::<D, _>(input, values, &mut |d| {
        previous = delta_decode32(d, previous);
        previous
    })
}

pub(crate) fn decode_zigzag_deltas<D: CodingDescriptor>(
    mut previous: u32,
    input: &[u8],
    values: &mut [u32],
) -> usize {
    decode_with::<D, _>(input, values, &mut |d| {
        previous = delta_decode32(zigzag_decode32(d), previous);
        previous
    })
}

pub(crate) fn decode_transposed_deltas<D: CodingDescriptor>(
    mut previous: u32,
    input: &[u8],
    values: &mut [u32],
) -> usize {
    unsafe {
        let mut key_ptr = input.as_ptr();
        let mut data_ptr = key_ptr.add(key_block_len(values.len()));

        let mut tiles = values.chunks_exact_mut(TILE_LEN);
        for tile_out in &mut tiles {
            let mut tile = [0u32; TILE_LEN];
            data_ptr = decode_run::<D, _>(key_ptr, data_ptr, &mut tile, &mut |d| d);
            key_ptr = key_ptr.add(TILE_LEN / 4);
            for (j, chain) in tile_out.chunks_exact_mut(16).enumerate() {
                for (i, slot) in chain.iter_mut().enumerate() {
                    previous = delta_decode32(tile[i * 4 + j], previous);
                    *slot = previous;
                }
            }
        }

        data_ptr = decode_run::<D, _>(key_ptr, data_ptr, tiles.into_remainder(), &mut |d| {
            previous = delta_decode32(d, previous);
            previous
        });
        data_ptr.offset_from(input.as_ptr()) as usize
    }
}

/// Total stream length in bytes for a stream of `count` elements whose key
/// block is at the front of `input`. Keys in the unused high bits of a
/// partial final key byte do not contribute.
pub(crate) fn compressed_len<D: CodingDescriptor>(input: &[u8], count: usize) -> usize {
    let key_len = key_block_len(count);
    let keys = &input[..key_len];
    let mut len = key_len;
    for &key in &keys[..count / 4] {
        len += D::data_len(key);
    }
    let rem = count & 3;
    if rem != 0 {
        let key = keys[key_len - 1] as usize;
        for i in 0..rem {
            len += D::KEY_LEN[(key >> (i * 2)) & 0x3];
        }
    }
    len
}
