#![deny(unused_must_use)]
#![forbid(unsafe_code)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]
//! Parser for the binary EPG cache (`epg.dat`, version `ENIGMA_EPG_V7`) written by
//! Enigma2 set-top boxes, and an XMLTV renderer for it.
//!
//! ```no_run
//! use enigma2_epg::{EpgParser, ParserSettings, RenderSettings, render_to_vec};
//!
//! let guide = EpgParser::from_path("epg.dat")?
//!     .with_configuration(ParserSettings::new().big_endian(false))
//!     .parse()?;
//! let xml = render_to_vec(&guide, &RenderSettings::new())?;
//! # Ok::<(), enigma2_epg::err::EpgError>(())
//! ```

pub use epg_channel::{ChannelId, EIT_SIZE, EpgChannel, EpgEvent};
pub use epg_descriptor::{
    DescriptorPart, DescriptorTable, EPG_LONG_DESC, EPG_LONG_DESC_ADD, EPG_LONG_DESC_ONCE,
    EPG_LONG_DESC_START, EPG_SHORT_DESC, RawDescriptor,
};
pub use epg_file_header::{EPG_HEADER, EPG_MAGIC, EPG_MAGIC_SWAPPED, EpgFileHeader};
pub use epg_parser::{EpgParser, ParserSettings};
pub use model::{ProgramGuide, TextFragment};
pub use resolver::{resolve, resolve_event};
pub use xmltv_output::{
    DEFAULT_GENERATOR_NAME, RenderSettings, XmltvOutput, render_to_vec, xmltv_time,
};

pub mod err;
pub mod utils;

mod epg_channel;
mod epg_descriptor;
mod epg_file_header;
mod epg_parser;
mod model;
mod resolver;
mod xmltv_output;

/// Decodes and resolves a complete dump held in memory.
///
/// `big_endian` only selects the byte order the magic is read with, the magic decides
/// the byte order of the rest of the dump.
pub fn decode(input: &[u8], big_endian: bool) -> err::Result<ProgramGuide> {
    EpgParser::from_buffer(input.to_vec())
        .with_configuration(ParserSettings::new().big_endian(big_endian))
        .parse()
}

/// Renders a resolved guide as an indented XMLTV document with default settings.
pub fn render(guide: &ProgramGuide) -> err::Result<Vec<u8>> {
    Ok(render_to_vec(guide, &RenderSettings::default())?)
}

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;
    use std::sync::Once;

    static LOGGER_INIT: Once = Once::new();

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}
