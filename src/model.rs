use crate::epg_channel::EpgChannel;
use crate::epg_descriptor::DescriptorTable;
use crate::utils::Endianness;

use std::fmt;

/// Decoded title or description of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextFragment {
    /// ISO 639 language code, may be shorter than 3 characters (or empty).
    pub language: String,
    pub text: String,
}

impl TextFragment {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        TextFragment {
            language: language.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.language, self.text)
    }
}

/// Every channel of one EPG dump, in dump order, plus the descriptor table the
/// channels' events reference.
#[derive(Debug, Clone, Default)]
pub struct ProgramGuide {
    pub endianness: Endianness,
    pub channels: Vec<EpgChannel>,
    pub descriptors: DescriptorTable,
}

impl ProgramGuide {
    pub fn event_count(&self) -> usize {
        self.channels.iter().map(|c| c.events.len()).sum()
    }
}

impl fmt::Display for ProgramGuide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for channel in &self.channels {
            writeln!(f, "{}", channel)?;
        }

        let mut descriptors: Vec<_> = self.descriptors.values().collect();
        descriptors.sort_by_key(|d| d.id);
        for descriptor in descriptors {
            writeln!(f, "{}", descriptor)?;
        }
        Ok(())
    }
}
