use encoding::{DecoderTrap, Encoding, EncodingRef};

/// Returns the prefix of `bytes` up to (not including) the first NUL byte.
#[inline]
pub fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Reads an ISO 639 language code, one character per byte, stopping at NUL.
pub fn language_code(bytes: &[u8]) -> String {
    until_nul(bytes).iter().copied().map(char::from).collect()
}

/// Best-effort decoding of descriptor text.
///
/// Bytes that do not form a valid sequence in `codec` are dropped instead of failing
/// the whole event.
pub fn decode_lossy(bytes: &[u8], codec: EncodingRef) -> String {
    codec
        .decode(bytes, DecoderTrap::Ignore)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}
