use crate::epg_channel::EpgChannel;
use crate::epg_descriptor::{DescriptorTable, RawDescriptor};
use crate::epg_file_header::EpgFileHeader;
use crate::err::{DeserializationResult, EpgError, Result};
use crate::model::ProgramGuide;
use crate::resolver::resolve;
use crate::utils::{ByteCursor, Endianness};

use encoding::{Encoding, EncodingRef};
use encoding::all::UTF_8;
use log::{debug, info};

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Clone)]
pub struct ParserSettings {
    /// Byte order to read the magic with. The magic itself decides the final byte order.
    big_endian: bool,
    /// Codec of descriptor text. Invalid sequences are dropped.
    text_codec: EncodingRef,
}

impl fmt::Debug for ParserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserSettings")
            .field("big_endian", &self.big_endian)
            .field("text_codec", &self.text_codec.name())
            .finish()
    }
}

impl PartialEq for ParserSettings {
    fn eq(&self, other: &Self) -> bool {
        self.big_endian == other.big_endian && self.text_codec.name() == other.text_codec.name()
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        ParserSettings {
            big_endian: false,
            text_codec: UTF_8,
        }
    }
}

impl ParserSettings {
    pub fn new() -> Self {
        ParserSettings::default()
    }

    pub fn big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    pub fn text_codec(mut self, text_codec: EncodingRef) -> Self {
        self.text_codec = text_codec;
        self
    }

    fn initial_endianness(&self) -> Endianness {
        if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

/// Reads an EPG dump into a [`ProgramGuide`].
///
/// The whole dump is held in memory: events can only be finalized once the descriptor
/// table, stored after all channels, has been read.
pub struct EpgParser {
    data: Vec<u8>,
    config: ParserSettings,
}

impl EpgParser {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut f = File::open(path).map_err(|source| EpgError::FailedToOpenFile {
            source,
            path: path.to_path_buf(),
        })?;

        let mut data = Vec::new();
        f.read_to_end(&mut data)?;

        Ok(EpgParser::from_buffer(data))
    }

    pub fn from_read(mut input: impl Read) -> Result<Self> {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;

        Ok(EpgParser::from_buffer(data))
    }

    pub fn from_buffer(data: Vec<u8>) -> Self {
        EpgParser {
            data,
            config: ParserSettings::default(),
        }
    }

    pub fn with_configuration(mut self, configuration: ParserSettings) -> Self {
        self.config = configuration;
        self
    }

    /// Decodes channels, events and descriptors without cross-referencing them.
    ///
    /// Any structural failure aborts the decode, nothing of a partially read dump is returned.
    pub fn decode(&self) -> DeserializationResult<ProgramGuide> {
        let mut cursor = ByteCursor::new(&self.data, self.config.initial_endianness());

        let header = EpgFileHeader::from_cursor(&mut cursor)?;

        let channel_count = cursor.i32_named("channel count")?;
        info!("EPG channels: {}", channel_count);

        let channel_count = usize::try_from(channel_count).unwrap_or(0);
        let mut channels = Vec::with_capacity(channel_count.min(cursor.remaining() / 16));
        for _ in 0..channel_count {
            channels.push(EpgChannel::from_cursor(&mut cursor)?);
        }

        let descriptor_count = cursor.i32_named("descriptor count")?;
        info!("EPG descriptors: {}", descriptor_count);

        let descriptor_count = usize::try_from(descriptor_count).unwrap_or(0);
        let mut descriptors = DescriptorTable::with_capacity(
            descriptor_count.min(cursor.remaining() / 10),
        );
        for _ in 0..descriptor_count {
            let descriptor = RawDescriptor::from_cursor(&mut cursor)?;
            if let Some(previous) = descriptors.insert(descriptor.id, descriptor) {
                debug!("Descriptor 0x{:08x} redefined", previous.id);
            }
        }

        if cursor.remaining() > 0 {
            debug!("{} trailing bytes after descriptor table", cursor.remaining());
        }

        Ok(ProgramGuide {
            endianness: header.endianness,
            channels,
            descriptors,
        })
    }

    /// Decodes the dump and resolves every event's title and description.
    pub fn parse(&self) -> Result<ProgramGuide> {
        let mut guide = self.decode()?;
        resolve(
            &mut guide.channels,
            &guide.descriptors,
            self.config.text_codec,
        );

        debug!(
            "Resolved {} events in {} channels",
            guide.event_count(),
            guide.channels.len()
        );
        Ok(guide)
    }
}
