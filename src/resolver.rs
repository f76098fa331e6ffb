use crate::epg_channel::{EpgChannel, EpgEvent};
use crate::epg_descriptor::{DescriptorPart, DescriptorTable};
use crate::model::TextFragment;
use crate::utils::{HexBytes, decode_lossy, language_code};

use encoding::EncodingRef;
use log::{debug, warn};

/// Text of one event while its descriptor parts are being folded, still undecoded.
#[derive(Debug, Default)]
struct PendingText {
    language: String,
    raw: Vec<u8>,
}

impl PendingText {
    fn new(language: &[u8], text: &[u8]) -> Self {
        PendingText {
            language: language_code(language),
            raw: text.to_vec(),
        }
    }

    fn finish(self, codec: EncodingRef) -> TextFragment {
        TextFragment {
            language: self.language,
            text: decode_lossy(&self.raw, codec),
        }
    }
}

/// Fills in title and description of every event from the descriptor table.
pub fn resolve(channels: &mut [EpgChannel], descriptors: &DescriptorTable, codec: EncodingRef) {
    for channel in channels.iter_mut() {
        for event in channel.events.iter_mut() {
            resolve_event(event, descriptors, codec);
        }
    }
}

/// Folds the descriptors referenced by `event` into its title and description.
///
/// References are visited in order. A short descriptor replaces the title, a `ONCE` or
/// `START` long descriptor replaces the description and `ADD` parts are appended to it.
/// References without a matching descriptor are skipped, unsupported descriptors are
/// logged and skipped.
pub fn resolve_event(event: &mut EpgEvent, descriptors: &DescriptorTable, codec: EncodingRef) {
    let mut title: Option<PendingText> = None;
    let mut description: Option<PendingText> = None;

    for checksum in &event.checksum_refs {
        let Some(descriptor) = descriptors.get(checksum) else {
            continue;
        };

        match descriptor.interpret() {
            Ok(DescriptorPart::Short { language, text }) => {
                title = Some(PendingText::new(language, text));
            }
            Ok(DescriptorPart::LongOnce { language, text })
            | Ok(DescriptorPart::LongStart { language, text }) => {
                description = Some(PendingText::new(language, text));
            }
            Ok(DescriptorPart::LongAdd { text }) => {
                let running = description.get_or_insert_with(|| {
                    debug!(
                        "Event {}: description continuation 0x{:08x} without a start",
                        event.event_id, descriptor.id
                    );
                    PendingText::default()
                });
                running.raw.extend_from_slice(text);
            }
            Err(e) => warn!("{} -> {}", e, HexBytes(&descriptor.payload)),
        }
    }

    event.title = title.map(|t| t.finish(codec));
    event.description = description.map(|d| d.finish(codec));
}
