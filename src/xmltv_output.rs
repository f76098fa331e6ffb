use crate::epg_channel::{ChannelId, EpgEvent};
use crate::err::{SerializationError, SerializationResult};
use crate::model::{ProgramGuide, TextFragment};

use jiff::civil::DateTime;
use jiff::tz::{Offset, TimeZone};
use log::trace;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use std::io::Write;

pub const DEFAULT_GENERATOR_NAME: &str = "enigma2-epg";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Offset printed after every start/stop time. Event times are taken as-is, the
    /// offset is not applied to them.
    utc_offset: Offset,
    indent: bool,
    generator_name: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            utc_offset: Offset::constant(1),
            indent: true,
            generator_name: DEFAULT_GENERATOR_NAME.to_owned(),
        }
    }
}

impl RenderSettings {
    pub fn new() -> Self {
        RenderSettings::default()
    }

    pub fn utc_offset(mut self, utc_offset: Offset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn generator_name(mut self, generator_name: impl Into<String>) -> Self {
        self.generator_name = generator_name.into();
        self
    }
}

/// Writes a resolved [`ProgramGuide`] as an XMLTV document.
pub struct XmltvOutput<W: Write> {
    writer: Writer<W>,
    settings: RenderSettings,
}

impl<W: Write> XmltvOutput<W> {
    pub fn with_writer(target: W, settings: &RenderSettings) -> Self {
        let writer = if settings.indent {
            Writer::new_with_indent(target, b'\t', 1)
        } else {
            Writer::new(target)
        };

        XmltvOutput {
            writer,
            settings: settings.clone(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    /// Writes the whole document: one `channel` element per channel, each followed by
    /// the `programme` elements of its events, all in decode order.
    pub fn write_guide(&mut self, guide: &ProgramGuide) -> SerializationResult<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut tv = BytesStart::new("tv");
        tv.push_attribute(("generator-info-name", self.settings.generator_name.as_str()));
        self.writer.write_event(Event::Start(tv))?;

        for channel in &guide.channels {
            let channel_id = channel.id();
            trace!("Rendering channel {}", channel_id);

            let id = channel_id.to_string();
            let mut element = BytesStart::new("channel");
            element.push_attribute(("id", id.as_str()));
            self.writer.write_event(Event::Empty(element))?;

            for event in &channel.events {
                self.write_programme(&channel_id, event)?;
            }
        }

        self.writer.write_event(Event::End(BytesEnd::new("tv")))?;
        self.writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    fn write_programme(&mut self, channel: &ChannelId, event: &EpgEvent) -> SerializationResult<()> {
        let start = xmltv_time(event.start_time, self.settings.utc_offset)?;
        let stop_time = event
            .stop_time()
            .map_err(|source| SerializationError::StopTimeOverflow {
                event_id: event.event_id,
                source,
            })?;
        let stop = xmltv_time(stop_time, self.settings.utc_offset)?;
        let channel = channel.to_string();

        let mut programme = BytesStart::new("programme");
        programme.push_attribute(("start", start.as_str()));
        programme.push_attribute(("stop", stop.as_str()));
        programme.push_attribute(("channel", channel.as_str()));
        self.writer.write_event(Event::Start(programme))?;

        if let Some(title) = &event.title {
            self.write_text_fragment("title", title)?;
        }
        if let Some(description) = &event.description {
            self.write_text_fragment("desc", description)?;
        }

        let date = event.start_time.strftime("%Y%m%d").to_string();
        self.write_text_element(BytesStart::new("date"), &date)?;

        self.writer
            .write_event(Event::End(BytesEnd::new("programme")))?;
        Ok(())
    }

    /// Elements with empty text are left out entirely.
    fn write_text_fragment(&mut self, name: &str, fragment: &TextFragment) -> SerializationResult<()> {
        if fragment.text.is_empty() {
            return Ok(());
        }

        let mut element = BytesStart::new(name);
        if !fragment.language.is_empty() {
            element.push_attribute(("lang", fragment.language.as_str()));
        }
        self.write_text_element(element, &fragment.text)
    }

    fn write_text_element(&mut self, element: BytesStart<'_>, text: &str) -> SerializationResult<()> {
        let end = element.to_end().into_owned();
        self.writer.write_event(Event::Start(element))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }
}

/// Formats a civil time as `yyyyMMddHHmmss ±HHMM`.
pub fn xmltv_time(time: DateTime, offset: Offset) -> SerializationResult<String> {
    let zoned = time
        .to_zoned(TimeZone::fixed(offset))
        .map_err(|source| SerializationError::InvalidOffset {
            what: "programme time",
            source,
        })?;
    Ok(zoned.strftime("%Y%m%d%H%M%S %z").to_string())
}

/// Renders `guide` into an in-memory XMLTV document.
pub fn render_to_vec(guide: &ProgramGuide, settings: &RenderSettings) -> SerializationResult<Vec<u8>> {
    let mut output = XmltvOutput::with_writer(Vec::new(), settings);
    output.write_guide(guide)?;
    Ok(output.into_writer())
}
