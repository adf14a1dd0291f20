/*! # StreamVByte coding for 32-bit integers
This crate compresses and decompresses streams of `u32` values using the
StreamVByte family of byte-aligned formats. Each value is stored in a
variable number of payload bytes selected by a 2-bit key; the keys for four
values share one key byte, and the key block for the whole stream precedes
the data block so that vectorized kernels can permute eight values per
iteration with a single table-driven shuffle each.

Two key formats are provided and produce incompatible streams. [`Codec1234`]
stores 1, 2, 3, or 4 bytes per value; [`Codec0124`] stores 0, 1, 2, or 4
bytes, making zeros free at the cost of three-byte values. Each format
offers five codec variants: plain values, zigzag-mapped values, deltas,
zigzag-mapped deltas, and transposed deltas (64-element tiles carrying four
interleaved delta chains for wider decode parallelism). A portable scalar
implementation is always available and byte-identical to the accelerated
one; the accelerated implementation is selected automatically at
[`Codec::new`] when the CPU supports it.

The stream records neither the element count nor the variant used: callers
carry both out of band and must decode with the variant, count, and (for
delta variants) `previous` seed that produced the stream.

## Example

```
use streamvbyte32::{Codec, Codec1234};

let codec = Codec1234::new();
let values = vec![3u32, 100, 65_537, 0, 16_777_216, 42, 7, 260, 11];
let mut encoded = vec![0u8; Codec1234::compressed_bound(values.len())];
let len = codec.encode(&values, &mut encoded);
assert!(len <= encoded.len());

let mut decoded = vec![0u32; values.len()];
assert_eq!(len, codec.decode(&encoded, &mut decoded));
assert_eq!(values, decoded);
```

## Example with delta coding

```
use streamvbyte32::{Codec, Codec0124};

let codec = Codec0124::new();
// Sorted input: deltas stay small, and repeats cost no payload at all.
let values: Vec<u32> = (0..100u32).map(|i| 1000 + i * 3).collect();
let mut encoded = vec![0u8; Codec0124::compressed_bound(values.len())];
let len = codec.encode_deltas(0, &values, &mut encoded);
assert!(len < values.len() * 2);

let mut decoded = vec![0u32; values.len()];
assert_eq!(len, codec.decode_deltas(0, &encoded, &mut decoded));
assert_eq!(values, decoded);
```
*/

mod arch;
mod coding_descriptor;
mod key_utils;
mod scalar;
mod transform;

mod codec0124;
mod codec1234;

pub use codec0124::Codec0124;
pub use codec1234::Codec1234;

/// `Codec` compresses and decompresses `u32` streams in a byte-aligned
/// format composed of a key block followed by a data block.
///
/// Encoders write `ceil(len / 4)` key bytes at the start of `output` and
/// the payload immediately after, returning the total stream length in
/// bytes. Decoders read the same layout and return the same length, so a
/// matched encode/decode pair always agrees on where the stream ends. The
/// element count is never part of the stream; the decoder takes it from the
/// length of its output slice.
///
/// Buffers are sized for the worst case: both the encoder output and the
/// decoder input must hold at least [`Codec::compressed_bound`] bytes even
/// when the actual stream is shorter, because the kernels move whole
/// 16-byte registers and rely on that reservation.
pub trait Codec: Sized + Copy + Clone {
    /// Creates a codec, selecting the fastest kernel available at runtime.
    ///
    /// Cheap to create, no allocation; the scalar and accelerated kernels
    /// produce identical streams.
    fn new() -> Self;

    /// Returns the number of bytes that must be reserved for a stream of
    /// `len` values: `ceil(len / 4)` key bytes plus four payload bytes per
    /// value.
    fn compressed_bound(len: usize) -> usize {
        (len + 3) / 4 + len * 4
    }

    /// Encodes `values` into `output` and returns the stream length.
    ///
    /// # Panics
    ///
    /// If `output.len() < Self::compressed_bound(values.len())`.
    fn encode(&self, values: &[u32], output: &mut [u8]) -> usize;

    /// Encodes `values` after mapping each through the zigzag transform,
    /// which keeps values of small magnitude in either sign short.
    ///
    /// # Panics
    ///
    /// If `output.len() < Self::compressed_bound(values.len())`.
    fn encode_zigzag(&self, values: &[u32], output: &mut [u8]) -> usize;

    /// Encodes the wrapping difference of each value from its predecessor,
    /// starting from `previous`. The seed is not stored: decode with the
    /// same one. Best suited to ascending inputs.
    ///
    /// # Panics
    ///
    /// If `output.len() < Self::compressed_bound(values.len())`.
    fn encode_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize;

    /// Encodes zigzag-mapped differences, suiting inputs that drift in both
    /// directions.
    ///
    /// # Panics
    ///
    /// If `output.len() < Self::compressed_bound(values.len())`.
    fn encode_zigzag_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize;

    /// Encodes differences with tiles of 64 elements permuted so that four
    /// independent delta chains interleave, exposing four-way parallelism
    /// to the vector decoder. Tails shorter than a tile fall back to plain
    /// deltas. The stream is incompatible with [`Codec::encode_deltas`].
    ///
    /// # Panics
    ///
    /// If `output.len() < Self::compressed_bound(values.len())`.
    fn encode_transposed_deltas(&self, previous: u32, values: &[u32], output: &mut [u8]) -> usize;

    /// Decodes `values.len()` elements from `input` and returns the number
    /// of stream bytes consumed.
    ///
    /// # Panics
    ///
    /// If `input.len() < Self::compressed_bound(values.len())`.
    fn decode(&self, input: &[u8], values: &mut [u32]) -> usize;

    /// Decodes a stream produced by [`Codec::encode_zigzag`].
    ///
    /// # Panics
    ///
    /// If `input.len() < Self::compressed_bound(values.len())`.
    fn decode_zigzag(&self, input: &[u8], values: &mut [u32]) -> usize;

    /// Decodes a stream produced by [`Codec::encode_deltas`] with the same
    /// `previous` seed.
    ///
    /// # Panics
    ///
    /// If `input.len() < Self::compressed_bound(values.len())`.
    fn decode_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize;

    /// Decodes a stream produced by [`Codec::encode_zigzag_deltas`] with
    /// the same `previous` seed.
    ///
    /// # Panics
    ///
    /// If `input.len() < Self::compressed_bound(values.len())`.
    fn decode_zigzag_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize;

    /// Decodes a stream produced by [`Codec::encode_transposed_deltas`]
    /// with the same `previous` seed.
    ///
    /// # Panics
    ///
    /// If `input.len() < Self::compressed_bound(values.len())`.
    fn decode_transposed_deltas(&self, previous: u32, input: &[u8], values: &mut [u32]) -> usize;

    /// Returns the total stream length for `count` elements from the key
    /// block at the front of `input`, without decoding any payload. Useful
    /// to skip over a stream whose count is known.
    ///
    /// # Panics
    ///
    /// If `input.len()` is smaller than the key block, `ceil(count / 4)`.
    fn compressed_len(&self, input: &[u8], count: usize) -> usize;
}

#[cfg(test)]
pub(crate) mod tests;
