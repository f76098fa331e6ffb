use crate::err::{DescriptorError, DeserializationResult};
use crate::utils::{ByteCursor, HexBytes, until_nul};

use hashbrown::HashMap;
use log::trace;
use std::fmt;

/// DVB short event descriptor, carries an event's title.
pub const EPG_SHORT_DESC: u8 = 0x4d;
/// DVB extended event descriptor, carries (part of) an event's description.
pub const EPG_LONG_DESC: u8 = 0x4e;

pub const EPG_LONG_DESC_ONCE: u8 = 0x00;
pub const EPG_LONG_DESC_START: u8 = 0x01;
pub const EPG_LONG_DESC_ADD: u8 = 0x11;

/// Control byte that may precede the text of a short descriptor.
const SHORT_TEXT_CONTROL: u8 = 0x15;

/// Descriptors keyed by their checksum id. A later descriptor with the same id
/// replaces an earlier one.
pub type DescriptorTable = HashMap<u32, RawDescriptor>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDescriptor {
    /// Checksum the events reference this descriptor by.
    pub id: u32,
    pub ref_count: i32,
    /// `[tag, len, body..]`, where `len` counts the body bytes only.
    pub payload: Vec<u8>,
}

/// A descriptor payload classified by `(tag, subtype)`.
///
/// Text slices are raw bytes, cut at the first NUL. Decoding happens once all parts
/// of an event are folded together, so multi-byte sequences split across parts survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorPart<'a> {
    /// Event title.
    Short { language: &'a [u8], text: &'a [u8] },
    /// Complete description in a single descriptor.
    LongOnce { language: &'a [u8], text: &'a [u8] },
    /// First part of a description continued by [`DescriptorPart::LongAdd`] parts.
    LongStart { language: &'a [u8], text: &'a [u8] },
    /// Continuation of the running description.
    LongAdd { text: &'a [u8] },
}

impl RawDescriptor {
    pub fn from_cursor(cursor: &mut ByteCursor<'_>) -> DeserializationResult<RawDescriptor> {
        let id = cursor.u32_named("descriptor id")?;
        let ref_count = cursor.i32_named("descriptor reference count")?;
        let tag = cursor.u8_named("descriptor tag")?;
        let len = cursor.u8_named("descriptor length")?;
        let body = cursor.take_bytes(usize::from(len), "descriptor body")?;

        let mut payload = Vec::with_capacity(2 + body.len());
        payload.push(tag);
        payload.push(len);
        payload.extend_from_slice(body);

        trace!("Descriptor 0x{:08x}, tag 0x{:02x}, {} bytes", id, tag, len);

        Ok(RawDescriptor {
            id,
            ref_count,
            payload,
        })
    }

    /// First payload byte, `0x00` for an empty payload.
    pub fn tag(&self) -> u8 {
        self.payload.first().copied().unwrap_or_default()
    }

    pub fn body(&self) -> &[u8] {
        tail(&self.payload, 2)
    }

    /// Classifies the payload. Out-of-range text offsets yield empty text.
    pub fn interpret(&self) -> Result<DescriptorPart<'_>, DescriptorError> {
        let body = self.body();

        match self.tag() {
            EPG_SHORT_DESC => {
                let text = tail(body, 5);
                let skip = text
                    .iter()
                    .take_while(|&&b| b == SHORT_TEXT_CONTROL)
                    .count();
                Ok(DescriptorPart::Short {
                    language: range(body, 0, 3),
                    text: until_nul(&text[skip..]),
                })
            }
            EPG_LONG_DESC => {
                let subtype = *body
                    .first()
                    .ok_or(DescriptorError::MissingLongDescSubtype { id: self.id })?;
                let language = range(body, 1, 4);

                match subtype {
                    EPG_LONG_DESC_ONCE => Ok(DescriptorPart::LongOnce {
                        language,
                        text: until_nul(tail(body, 6)),
                    }),
                    EPG_LONG_DESC_START => Ok(DescriptorPart::LongStart {
                        language,
                        text: until_nul(tail(body, 7)),
                    }),
                    EPG_LONG_DESC_ADD => Ok(DescriptorPart::LongAdd {
                        text: until_nul(tail(body, 6)),
                    }),
                    other => Err(DescriptorError::UnsupportedLongDescSubtype {
                        id: self.id,
                        subtype: other,
                    }),
                }
            }
            other => Err(DescriptorError::UnsupportedDescriptorTag {
                id: self.id,
                tag: other,
            }),
        }
    }
}

impl fmt::Display for RawDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Desc: ID[{:08x}] Refs[{:02}] Data[{}]",
            self.id,
            self.ref_count,
            HexBytes(&self.payload)
        )
    }
}

fn tail(bytes: &[u8], start: usize) -> &[u8] {
    bytes.get(start..).unwrap_or(&[])
}

fn range(bytes: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(bytes.len());
    bytes.get(start..end).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::DeserializationError;
    use crate::utils::Endianness;

    fn descriptor(tag: u8, body: &[u8]) -> RawDescriptor {
        let mut payload = vec![tag, body.len() as u8];
        payload.extend_from_slice(body);
        RawDescriptor {
            id: 0x1122_3344,
            ref_count: 1,
            payload,
        }
    }

    #[test]
    fn test_parses_descriptor_record() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x1122_3344_u32.to_be_bytes());
        data.extend_from_slice(&3_i32.to_be_bytes());
        data.extend_from_slice(&[EPG_SHORT_DESC, 3, b'a', b'b', b'c', 0xff]);
        let mut cursor = ByteCursor::new(&data, Endianness::Big);

        let desc = RawDescriptor::from_cursor(&mut cursor).unwrap();
        assert_eq!(desc.id, 0x1122_3344);
        assert_eq!(desc.ref_count, 3);
        assert_eq!(desc.payload, vec![EPG_SHORT_DESC, 3, b'a', b'b', b'c']);
        assert_eq!(desc.body(), b"abc");
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn test_truncated_descriptor_body_fails() {
        let mut data = Vec::new();
        data.extend_from_slice(&1_u32.to_le_bytes());
        data.extend_from_slice(&0_i32.to_le_bytes());
        data.extend_from_slice(&[EPG_LONG_DESC, 10, 0x00]);
        let mut cursor = ByteCursor::new(&data, Endianness::Little);

        assert!(matches!(
            RawDescriptor::from_cursor(&mut cursor),
            Err(DeserializationError::Truncated {
                what: "descriptor body",
                need: 10,
                have: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_short_descriptor() {
        let desc = descriptor(EPG_SHORT_DESC, b"deu\x0a\x00Tagesschau\x00junk");
        assert_eq!(
            desc.interpret().unwrap(),
            DescriptorPart::Short {
                language: b"deu",
                text: b"Tagesschau",
            }
        );
    }

    #[test]
    fn test_short_descriptor_skips_control_byte() {
        let desc = descriptor(EPG_SHORT_DESC, b"deu\x0b\x00\x15Tagesschau");
        assert_eq!(
            desc.interpret().unwrap(),
            DescriptorPart::Short {
                language: b"deu",
                text: b"Tagesschau",
            }
        );
    }

    #[test]
    fn test_control_byte_is_kept_after_text_start() {
        let desc = descriptor(EPG_SHORT_DESC, b"deu\x0b\x00A\x15B");
        assert_eq!(
            desc.interpret().unwrap(),
            DescriptorPart::Short {
                language: b"deu",
                text: b"A\x15B",
            }
        );
    }

    #[test]
    fn test_long_descriptor_variants() {
        let once = descriptor(EPG_LONG_DESC, b"\x00eng\x00\x00Whole story");
        assert_eq!(
            once.interpret().unwrap(),
            DescriptorPart::LongOnce {
                language: b"eng",
                text: b"Whole story",
            }
        );

        let start = descriptor(EPG_LONG_DESC, b"\x01eng\x00\x00\x00Once upon ");
        assert_eq!(
            start.interpret().unwrap(),
            DescriptorPart::LongStart {
                language: b"eng",
                text: b"Once upon ",
            }
        );

        let add = descriptor(EPG_LONG_DESC, b"\x11eng\x00\x00a time\x00");
        assert_eq!(
            add.interpret().unwrap(),
            DescriptorPart::LongAdd { text: b"a time" }
        );
    }

    #[test]
    fn test_unsupported_descriptors() {
        let desc = descriptor(0x54, b"\x00\x01");
        assert_eq!(
            desc.interpret(),
            Err(DescriptorError::UnsupportedDescriptorTag {
                id: 0x1122_3344,
                tag: 0x54
            })
        );

        let desc = descriptor(EPG_LONG_DESC, b"\x02eng\x00\x00text");
        assert_eq!(
            desc.interpret(),
            Err(DescriptorError::UnsupportedLongDescSubtype {
                id: 0x1122_3344,
                subtype: 0x02
            })
        );

        let desc = descriptor(EPG_LONG_DESC, b"");
        assert_eq!(
            desc.interpret(),
            Err(DescriptorError::MissingLongDescSubtype { id: 0x1122_3344 })
        );
    }

    #[test]
    fn test_short_payload_yields_empty_text() {
        let desc = descriptor(EPG_SHORT_DESC, b"de");
        assert_eq!(
            desc.interpret().unwrap(),
            DescriptorPart::Short {
                language: b"de",
                text: b"",
            }
        );
    }

    #[test]
    fn test_payload_without_body() {
        let empty = RawDescriptor {
            id: 7,
            ref_count: 0,
            payload: vec![],
        };
        assert_eq!(empty.tag(), 0x00);
        assert!(empty.body().is_empty());
        assert_eq!(
            empty.interpret(),
            Err(DescriptorError::UnsupportedDescriptorTag { id: 7, tag: 0x00 })
        );

        let tag_only = RawDescriptor {
            id: 8,
            ref_count: 0,
            payload: vec![EPG_LONG_DESC],
        };
        assert_eq!(
            tag_only.interpret(),
            Err(DescriptorError::MissingLongDescSubtype { id: 8 })
        );

        let short_tag_only = RawDescriptor {
            id: 9,
            ref_count: 0,
            payload: vec![EPG_SHORT_DESC],
        };
        assert_eq!(
            short_tag_only.interpret().unwrap(),
            DescriptorPart::Short {
                language: b"",
                text: b"",
            }
        );
    }

    #[test]
    fn test_display() {
        let desc = descriptor(EPG_SHORT_DESC, b"de");
        assert_eq!(desc.to_string(), "Desc: ID[11223344] Refs[01] Data[4d 02 64 65]");
    }
}
