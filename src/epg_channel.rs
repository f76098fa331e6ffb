use crate::err::DeserializationResult;
use crate::model::TextFragment;
use crate::utils::{ByteCursor, decode_duration, decode_start_time};

use jiff::SignedDuration;
use jiff::civil::DateTime;
use log::trace;
use std::fmt;

/// Size of the DVB event information carried by every event record.
pub const EIT_SIZE: usize = 10;

/// One programme of a channel.
///
/// `title` and `description` are only populated by [`crate::resolve`], which folds the
/// descriptors referenced by `checksum_refs` in reference order.
#[derive(Debug, Clone, PartialEq)]
pub struct EpgEvent {
    pub event_type: u8,
    /// Declared length of the event information, including [`EIT_SIZE`].
    pub length: u8,
    pub event_id: u16,
    pub start_time: DateTime,
    pub duration: u32,
    pub checksum_refs: Vec<u32>,
    pub title: Option<TextFragment>,
    pub description: Option<TextFragment>,
}

impl EpgEvent {
    pub fn from_cursor(cursor: &mut ByteCursor<'_>) -> DeserializationResult<EpgEvent> {
        let event_type = cursor.u8_named("event type")?;
        let length = cursor.u8_named("event length")?;

        // DVB fields inside the EIT are always big endian, whatever the dump uses.
        let eit = cursor.array::<EIT_SIZE>("event information")?;
        let event_id = u16::from_be_bytes([eit[0], eit[1]]);
        let start_time = decode_start_time(&[eit[2], eit[3], eit[4], eit[5], eit[6]])?;
        let duration = decode_duration(&[eit[7], eit[8], eit[9]]);

        let ref_count = usize::from(length).saturating_sub(EIT_SIZE) / 4;
        let mut checksum_refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            checksum_refs.push(cursor.u32_named("event descriptor checksum")?);
        }

        trace!(
            "Event {} at {}, {} descriptor references",
            event_id,
            start_time,
            checksum_refs.len()
        );

        Ok(EpgEvent {
            event_type,
            length,
            event_id,
            start_time,
            duration,
            checksum_refs,
            title: None,
            description: None,
        })
    }

    pub fn stop_time(&self) -> Result<DateTime, jiff::Error> {
        self.start_time
            .checked_add(SignedDuration::from_secs(i64::from(self.duration)))
    }

    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.text.as_str())
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_ref().map(|d| d.text.as_str())
    }
}

impl fmt::Display for EpgEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EIT: ID[{}] start[{}] duration[{}]",
            self.event_id,
            self.start_time.strftime("%Y/%m/%d %H:%M"),
            self.duration
        )?;

        for text in [&self.title, &self.description] {
            match text {
                Some(text) => write!(f, "\n\t{}", text)?,
                None => f.write_str("\n\t")?,
            }
        }
        Ok(())
    }
}

/// Identity of a channel: service, original network and transport stream ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId {
    pub service_id: i32,
    pub network_id: i32,
    pub transport_stream_id: i32,
}

impl fmt::Display for ChannelId {
    /// Upper-case hexadecimal ids joined by colons (ex - `2EE3:1:3F2`). Negative ids keep
    /// their sign instead of being printed as two's complement.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn hex(f: &mut fmt::Formatter<'_>, value: i32) -> fmt::Result {
            if value < 0 {
                write!(f, "-{:X}", value.unsigned_abs())
            } else {
                write!(f, "{:X}", value)
            }
        }

        hex(f, self.service_id)?;
        f.write_str(":")?;
        hex(f, self.network_id)?;
        f.write_str(":")?;
        hex(f, self.transport_stream_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpgChannel {
    pub service_id: i32,
    pub network_id: i32,
    pub transport_stream_id: i32,
    pub events: Vec<EpgEvent>,
}

impl EpgChannel {
    pub fn from_cursor(cursor: &mut ByteCursor<'_>) -> DeserializationResult<EpgChannel> {
        let service_id = cursor.i32_named("service id")?;
        let network_id = cursor.i32_named("network id")?;
        let transport_stream_id = cursor.i32_named("transport stream id")?;
        let event_count = cursor.i32_named("event count")?;

        trace!(
            "Channel SID[{}] NID[{}] TSID[{}] with {} events",
            service_id, network_id, transport_stream_id, event_count
        );

        // A negative count is treated as an empty channel.
        let event_count = usize::try_from(event_count).unwrap_or(0);
        let mut events = Vec::with_capacity(event_count.min(cursor.remaining() / (2 + EIT_SIZE)));
        for _ in 0..event_count {
            events.push(EpgEvent::from_cursor(cursor)?);
        }

        Ok(EpgChannel {
            service_id,
            network_id,
            transport_stream_id,
            events,
        })
    }

    pub fn id(&self) -> ChannelId {
        ChannelId {
            service_id: self.service_id,
            network_id: self.network_id,
            transport_stream_id: self.transport_stream_id,
        }
    }
}

impl fmt::Display for EpgChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Channel: SID[{}] NID[{}] TSID[{}]",
            self.service_id, self.network_id, self.transport_stream_id
        )?;
        for event in &self.events {
            write!(f, "\n{}", event)?;
        }
        writeln!(f)
    }
}
