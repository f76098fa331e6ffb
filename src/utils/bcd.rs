use crate::err::{DeserializationError, DeserializationResult};

/// Decodes a packed binary-coded-decimal value.
///
/// Nibbles are read most significant first and their decimal renderings are
/// concatenated, so `0x1345` decodes to `1345`. Nibbles above 9 are not
/// rejected: `0xAB` decodes to `1011`, the concatenation of `10` and `11`.
pub fn bcd_to_int(value: i64) -> DeserializationResult<u64> {
    if value < 0 {
        return Err(DeserializationError::InvalidBcd {
            value,
            reason: "value is negative",
        });
    }

    let mut nibbles = Vec::with_capacity(16);
    let mut rest = value as u64;
    while rest > 0 {
        nibbles.push(rest & 0xf);
        rest >>= 4;
    }

    nibbles.iter().rev().try_fold(0_u64, |acc, &nibble| {
        let scale = if nibble > 9 { 100 } else { 10 };
        acc.checked_mul(scale)
            .and_then(|acc| acc.checked_add(nibble))
            .ok_or(DeserializationError::InvalidBcd {
                value,
                reason: "decoded value does not fit in 64 bits",
            })
    })
}

/// BCD-decodes a single byte. Cannot fail, the widest result is `1515`.
#[inline]
pub fn bcd_byte(byte: u8) -> u32 {
    let digit = |nibble: u8| -> (u32, u32) {
        if nibble > 9 {
            (100, u32::from(nibble))
        } else {
            (10, u32::from(nibble))
        }
    };

    let (_, high) = digit(byte >> 4);
    let (scale, low) = digit(byte & 0x0f);
    high * scale + low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_valid_bcd() {
        assert_eq!(bcd_to_int(0x00).unwrap(), 0);
        assert_eq!(bcd_to_int(0x09).unwrap(), 9);
        assert_eq!(bcd_to_int(0x13).unwrap(), 13);
        assert_eq!(bcd_to_int(0x99).unwrap(), 99);
        assert_eq!(bcd_to_int(0x1345).unwrap(), 1345);
        assert_eq!(bcd_to_int(0x0100).unwrap(), 100);
    }

    #[test]
    fn test_rejects_negative_values() {
        assert!(matches!(
            bcd_to_int(-1),
            Err(DeserializationError::InvalidBcd { value: -1, .. })
        ));
    }

    #[test]
    fn test_out_of_range_nibbles_are_concatenated() {
        assert_eq!(bcd_to_int(0xAB).unwrap(), 1011);
        assert_eq!(bcd_to_int(0x1F).unwrap(), 115);
        assert_eq!(bcd_to_int(0xF0).unwrap(), 150);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(bcd_to_int(i64::MAX).is_err());
        assert_eq!(bcd_to_int(0x1234_5678_9012_3456).unwrap(), 1_234_567_890_123_456);
    }

    #[test]
    fn test_byte_matches_generic_decoder() {
        for byte in 0..=u8::MAX {
            assert_eq!(
                u64::from(bcd_byte(byte)),
                bcd_to_int(i64::from(byte)).unwrap(),
                "byte 0x{:02x}",
                byte
            );
        }
    }
}
