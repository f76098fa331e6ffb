use crate::err::{DeserializationError, DeserializationResult};
use crate::utils::{ByteCursor, Endianness};

use log::debug;

/// Magic as it reads when the cursor already uses the dump's byte order.
pub const EPG_MAGIC: u32 = 0x9876_5432;
/// Magic as it reads when the cursor uses the opposite byte order.
pub const EPG_MAGIC_SWAPPED: u32 = 0x3254_7698;
pub const EPG_HEADER: &[u8; 13] = b"ENIGMA_EPG_V7";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EpgFileHeader {
    /// Magic as read with the cursor's initial byte order.
    pub magic: u32,
    pub endianness: Endianness,
    pub header: [u8; 13],
}

impl EpgFileHeader {
    /// Reads the magic and version header.
    ///
    /// The magic is read with the cursor's current byte order. A byte-reversed magic flips
    /// the cursor to the other byte order, which then stays fixed for the rest of the dump.
    pub fn from_cursor(cursor: &mut ByteCursor<'_>) -> DeserializationResult<EpgFileHeader> {
        let magic = cursor.u32_named("magic")?;
        debug!("Magic 0x{:x}", magic);

        let endianness = match magic {
            EPG_MAGIC => cursor.endianness(),
            EPG_MAGIC_SWAPPED => cursor.endianness().flipped(),
            other => return Err(DeserializationError::UnsupportedFormat { magic: other }),
        };
        cursor.set_endianness(endianness);
        debug!("{} format detected", endianness);

        let header = cursor.array::<13>("header")?;
        debug!("Header: {}", String::from_utf8_lossy(&header));

        if &header != EPG_HEADER {
            return Err(DeserializationError::UnsupportedVersion { header });
        }

        Ok(EpgFileHeader {
            magic,
            endianness,
            header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(magic: [u8; 4]) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.extend_from_slice(EPG_HEADER);
        data
    }

    #[test]
    fn test_detects_little_endian_dump() {
        let data = header_bytes(EPG_MAGIC.to_le_bytes());
        let mut cursor = ByteCursor::new(&data, Endianness::Little);

        let header = EpgFileHeader::from_cursor(&mut cursor).unwrap();
        assert_eq!(header.endianness, Endianness::Little);
        assert_eq!(cursor.endianness(), Endianness::Little);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_detects_big_endian_dump() {
        let data = header_bytes(EPG_MAGIC.to_be_bytes());
        let mut cursor = ByteCursor::new(&data, Endianness::Little);

        let header = EpgFileHeader::from_cursor(&mut cursor).unwrap();
        assert_eq!(header.magic, EPG_MAGIC_SWAPPED);
        assert_eq!(header.endianness, Endianness::Big);
        assert_eq!(cursor.endianness(), Endianness::Big);
    }

    #[test]
    fn test_big_endian_override_on_big_endian_dump() {
        let data = header_bytes(EPG_MAGIC.to_be_bytes());
        let mut cursor = ByteCursor::new(&data, Endianness::Big);

        let header = EpgFileHeader::from_cursor(&mut cursor).unwrap();
        assert_eq!(header.magic, EPG_MAGIC);
        assert_eq!(header.endianness, Endianness::Big);
    }

    #[test]
    fn test_big_endian_override_on_little_endian_dump() {
        let data = header_bytes(EPG_MAGIC.to_le_bytes());
        let mut cursor = ByteCursor::new(&data, Endianness::Big);

        let header = EpgFileHeader::from_cursor(&mut cursor).unwrap();
        assert_eq!(header.endianness, Endianness::Little);
    }

    #[test]
    fn test_rejects_unknown_magic_before_header() {
        let data = 0xdead_beef_u32.to_le_bytes();
        let mut cursor = ByteCursor::new(&data, Endianness::Little);

        assert!(matches!(
            EpgFileHeader::from_cursor(&mut cursor),
            Err(DeserializationError::UnsupportedFormat { magic: 0xdead_beef })
        ));
    }

    #[test]
    fn test_rejects_unknown_header() {
        let mut data = EPG_MAGIC.to_le_bytes().to_vec();
        data.extend_from_slice(b"ENIGMA_EPG_V5");
        let mut cursor = ByteCursor::new(&data, Endianness::Little);

        match EpgFileHeader::from_cursor(&mut cursor) {
            Err(DeserializationError::UnsupportedVersion { header }) => {
                assert_eq!(&header, b"ENIGMA_EPG_V5")
            }
            other => panic!("expected unsupported version, got {:?}", other),
        }
    }
}
