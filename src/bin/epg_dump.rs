use anyhow::{Context, Result, bail, format_err};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use encoding::EncodingRef;
use encoding::all::encodings;
use encoding::types::Encoding;
use indoc::indoc;
use jiff::tz::Offset;
use log::{Level, info};

use enigma2_epg::err::EpgError;
use enigma2_epg::{EpgParser, ParserSettings, ProgramGuide, RenderSettings, XmltvOutput};

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

struct EpgDump {
    parser_settings: ParserSettings,
    render_settings: RenderSettings,
    input: PathBuf,
    output_target: Option<PathBuf>,
    confirm_overwrite: bool,
    dump: bool,
    verbosity_level: Option<Level>,
}

impl EpgDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = PathBuf::from(
            matches
                .get_one::<String>("input")
                .ok_or_else(|| format_err!("This is a required argument"))?,
        );

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(Level::Info),
            2 => Some(Level::Debug),
            3 => Some(Level::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(Level::Trace)
            }
        };

        let codec_name = matches
            .get_one::<String>("codec")
            .map(String::as_str)
            .unwrap_or("utf-8");
        let codec = find_codec(codec_name)
            .ok_or_else(|| format_err!("`{}` is not a supported codec", codec_name))?;

        let utc_offset = match matches.get_one::<String>("utc-offset") {
            Some(offset) => parse_utc_offset(offset)?,
            None => Offset::constant(1),
        };

        Ok(EpgDump {
            parser_settings: ParserSettings::new()
                .big_endian(matches.get_flag("big-endian"))
                .text_codec(codec),
            render_settings: RenderSettings::new()
                .utc_offset(utc_offset)
                .indent(!matches.get_flag("no-indent")),
            input,
            output_target: matches.get_one::<String>("output").map(PathBuf::from),
            confirm_overwrite: !matches.get_flag("no-confirm-overwrite"),
            dump: matches.get_flag("dump"),
            verbosity_level,
        })
    }

    /// Main entry point for `EpgDump`
    pub fn run(&self) -> Result<()> {
        self.try_to_initialize_logging();

        let parser = if self.input == Path::new("-") {
            EpgParser::from_read(io::stdin().lock())?
        } else {
            EpgParser::from_path(&self.input)?
        }
        .with_configuration(self.parser_settings.clone());

        let guide = parser.parse()?;
        info!(
            "Decoded {} channels, {} events, {} descriptors",
            guide.channels.len(),
            guide.event_count(),
            guide.descriptors.len()
        );

        // Nothing is written before the whole dump has been decoded.
        let output: Box<dyn Write> = match &self.output_target {
            Some(path) => Box::new(self.create_output_file(path)?),
            None => Box::new(io::stdout().lock()),
        };

        let mut output = XmltvOutput::with_writer(BufWriter::new(output), &self.render_settings);
        output.write_guide(&guide).map_err(EpgError::from)?;
        output.into_writer().flush()?;

        if self.dump {
            self.dump_guide(&guide);
        }

        Ok(())
    }

    /// If `confirm_overwrite` is set, will display a confirmation prompt before overwriting files.
    fn create_output_file(&self, path: &Path) -> Result<File> {
        if path.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                path.display()
            );
        }

        if path.exists() {
            if self.confirm_overwrite {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to override output file at {}",
                        path.display()
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to write confirmation prompt to term")?;

                if !confirmed {
                    bail!("Cancelled");
                }
            }
        } else if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directory {}", parent.display())
                })?;
            }
        }

        File::create(path).with_context(|| format!("Failed to create {}", path.display()))
    }

    fn dump_guide(&self, guide: &ProgramGuide) {
        let stderr = io::stderr();
        let mut stderr = stderr.lock();
        if let Err(e) = writeln!(stderr, "\n{}", guide) {
            eprintln!("Failed to dump decoded EPG: {}", e);
        }
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            match simplelog::TermLogger::init(
                level.to_level_filter(),
                simplelog::Config::default(),
                simplelog::TerminalMode::Stderr,
                simplelog::ColorChoice::Auto,
            ) {
                Ok(_) => {}
                Err(e) => eprintln!("Failed to initialize logging: {:?}", e),
            };
        }
    }
}

fn find_codec(name: &str) -> Option<EncodingRef> {
    encodings()
        .iter()
        .find(|c| c.name() == name && c.raw_decoder().is_ascii_compatible())
        .copied()
}

/// Parses `+HHMM` / `-HHMM` (ex - `+0100`).
fn parse_utc_offset(value: &str) -> Result<Offset> {
    jiff::fmt::strtime::parse("%z", value)
        .ok()
        .and_then(|tm| tm.offset())
        .ok_or_else(|| format_err!("`{}` is not a UTC offset like `+0100`", value))
}

fn main() {
    let matches = Command::new("Enigma2 EPG Parser")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to convert Enigma2 epg.dat files to XMLTV")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("INPUT")
                .required(true)
                .help("EPG dump to read, `-` reads from stdin."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT")
                .help(indoc!("
                    Writes output to the file specified instead of stdout, errors will still be printed to stderr.
                    Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`.
                    Will create parent directories if needed.")),
        )
        .arg(
            Arg::new("big-endian")
                .short('b')
                .long("big-endian")
                .action(ArgAction::SetTrue)
                .help("Read the magic as big endian. A byte-swapped magic still switches byte order."),
        )
        .arg(
            Arg::new("utc-offset")
                .long("utc-offset")
                .value_name("OFFSET")
                .allow_hyphen_values(true)
                .help("UTC offset appended to programme times, `+0100` by default."),
        )
        .arg(
            Arg::new("codec")
                .long("codec")
                .value_parser(PossibleValuesParser::new(
                    encodings()
                        .iter()
                        .filter(|&e| e.raw_decoder().is_ascii_compatible())
                        .map(|e| e.name())
                        .collect::<Vec<&'static str>>(),
                ))
                .default_value("utf-8")
                .help("Codec of title and description text. Invalid sequences are dropped."),
        )
        .arg(
            Arg::new("no-indent")
                .long("no-indent")
                .action(ArgAction::SetTrue)
                .help("When set, output will not be indented."),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("dump")
                .short('d')
                .long("dump")
                .action(ArgAction::SetTrue)
                .help("Print the decoded channels, events and descriptors to stderr."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help(indoc!("
                    Sets debug prints level for the application:
                        -v   - info
                        -vv  - debug
                        -vvv - trace
                    NOTE: trace output is only available in debug builds, as it is extremely verbose.")),
        )
        .get_matches();

    let app = match EpgDump::from_cli_matches(&matches) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{:?}", e);
            exit(1);
        }
    };

    if let Err(e) = app.run() {
        eprintln!("{:?}", e);
        let code = e
            .downcast_ref::<EpgError>()
            .map(EpgError::exit_code)
            .unwrap_or(1);
        exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_utc_offsets() {
        assert_eq!(parse_utc_offset("+0100").unwrap(), Offset::constant(1));
        assert_eq!(parse_utc_offset("-0000").unwrap(), Offset::UTC);
        assert_eq!(
            parse_utc_offset("+0530").unwrap(),
            Offset::from_seconds(5 * 3600 + 30 * 60).unwrap()
        );
        assert!(parse_utc_offset("CET").is_err());
    }

    #[test]
    fn test_finds_codecs() {
        assert!(find_codec("utf-8").is_some());
        assert!(find_codec("not-a-codec").is_none());
    }
}
