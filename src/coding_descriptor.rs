use std::fmt::Debug;

/// `CodingDescriptor` captures the parameters of a key format: the payload
/// length selected by each 2-bit key and how to derive the key for a value.
pub(crate) trait CodingDescriptor: Debug + Copy {
    /// Payload byte length for each 2-bit key value.
    /// All of the lengths must be `<= 4`.
    const KEY_LEN: [usize; 4];

    /// Maximum value that can be stored under each 2-bit key value.
    /// Doubles as the zero-extension mask applied when decoding.
    const KEY_MAX: [u32; 4];

    /// Returns the smallest 2-bit key whose width represents `value`
    /// exactly, along with the number of payload bytes it stores.
    fn key_value(value: u32) -> (u8, usize);

    /// Returns the number of payload bytes a group of 4 values with the
    /// given key byte occupies.
    fn data_len(key: u8) -> usize;
}
