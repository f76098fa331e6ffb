use thiserror::Error;

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, EpgError>;
pub type DeserializationResult<T> = std::result::Result<T, DeserializationError>;
pub type SerializationResult<T> = std::result::Result<T, SerializationError>;

/// Errors that abort decoding of an EPG dump.
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("unexpected EOF while reading {what} at offset {offset} (need {need} bytes, have {have})")]
    Truncated {
        what: &'static str,
        offset: u64,
        need: usize,
        have: usize,
    },

    #[error("unsupported EPG format, magic `0x{magic:08x}` is neither `0x98765432` nor `0x32547698`")]
    UnsupportedFormat { magic: u32 },

    #[error("unsupported EPG version, expected header `ENIGMA_EPG_V7`, found `{}`", String::from_utf8_lossy(header))]
    UnsupportedVersion { header: [u8; 13] },

    #[error("cannot BCD-decode {value}: {reason}")]
    InvalidBcd { value: i64, reason: &'static str },

    #[error("MJD {mjd} at {hour:02}:{minute:02} is not a valid calendar date")]
    InvalidDateTime { mjd: u16, hour: u32, minute: u32 },
}

/// Descriptor interpretation failures. These never abort a run, the resolver
/// logs them and moves on to the next reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor 0x{id:08x}: unsupported descriptor tag 0x{tag:02x}")]
    UnsupportedDescriptorTag { id: u32, tag: u8 },

    #[error("descriptor 0x{id:08x}: unsupported long description type 0x{subtype:02x}")]
    UnsupportedLongDescSubtype { id: u32, subtype: u8 },

    #[error("descriptor 0x{id:08x}: long description carries no type byte")]
    MissingLongDescSubtype { id: u32 },
}

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to compute stop time of event {event_id}: {source}")]
    StopTimeOverflow {
        event_id: u16,
        #[source]
        source: jiff::Error,
    },

    #[error("failed to apply UTC offset to {what}: {source}")]
    InvalidOffset {
        what: &'static str,
        #[source]
        source: jiff::Error,
    },

    #[error("writing XMLTV failed with: {0}")]
    XmlOutputError(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum EpgError {
    #[error("failed to open file {}", path.display())]
    FailedToOpenFile {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("an I/O error has occurred")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

impl EpgError {
    /// Process exit code for this error, matching the historical tool:
    /// `3` for an unknown magic, `4` for an unknown header, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            EpgError::Deserialization(DeserializationError::UnsupportedFormat { .. }) => 3,
            EpgError::Deserialization(DeserializationError::UnsupportedVersion { .. }) => 4,
            _ => 1,
        }
    }
}
