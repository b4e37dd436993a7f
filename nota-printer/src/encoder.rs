//! Protocol encoders: formatted lines to printer bytes
//!
//! Two protocols are supported:
//! - `EscPosRaw`: ESC/POS commands for styles, hardware alignment and the
//!   final feed-and-cut
//! - `PlainText`: the laid-out text only, for generic/text-only drivers

use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::{EncodingResult, PrintError};
use crate::escpos::EscPosBuilder;
use crate::line::{Align, FormattedLine, TextStyle};
use crate::profile::PaperProfile;

/// A character that was printed as the substitute glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    /// Index into the encoded line sequence
    pub line: usize,
    pub ch: char,
}

/// Encoded print job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedJob {
    pub bytes: Vec<u8>,
    pub substitutions: Vec<Substitution>,
}

impl EncodedJob {
    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }
}

/// Paper handling appended after the last line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Feed and cut at the end (ESC/POS only)
    pub cut: bool,
    /// Pulse the cash drawer before cutting (ESC/POS only)
    pub open_drawer: bool,
    /// Lines fed before the cut, or blank lines after plain text
    pub feed_lines: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            cut: true,
            open_drawer: false,
            feed_lines: 3,
        }
    }
}

/// Serializes formatted lines for one printer protocol
#[enum_dispatch]
pub trait JobEncoder {
    fn encode(&self, lines: &[FormattedLine], profile: &PaperProfile)
    -> EncodingResult<EncodedJob>;
}

/// Printer protocol selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    EscPosRaw,
    PlainText,
}

impl Protocol {
    pub fn encoder(self, options: EncodeOptions) -> Encoder {
        match self {
            Self::EscPosRaw => EscPosEncoder::new(options).into(),
            Self::PlainText => PlainTextEncoder::new(options).into(),
        }
    }
}

impl FromStr for Protocol {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "escpos" | "esc_pos" | "escpos_raw" | "esc_pos_raw" => Ok(Self::EscPosRaw),
            "text" | "plain" | "plain_text" => Ok(Self::PlainText),
            other => Err(PrintError::InvalidConfig(format!(
                "Unknown print protocol: {}",
                other
            ))),
        }
    }
}

/// Encoder for any supported protocol
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(JobEncoder)]
#[derive(Debug, Clone)]
pub enum Encoder {
    EscPos(EscPosEncoder),
    PlainText(PlainTextEncoder),
}

/// ESC/POS raw encoder
#[derive(Debug, Clone, Default)]
pub struct EscPosEncoder {
    options: EncodeOptions,
}

impl EscPosEncoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }
}

impl JobEncoder for EscPosEncoder {
    #[instrument(skip_all, fields(lines = lines.len(), code_page = %profile.encoding()))]
    fn encode(
        &self,
        lines: &[FormattedLine],
        profile: &PaperProfile,
    ) -> EncodingResult<EncodedJob> {
        let mut b = EscPosBuilder::new(profile.columns(), profile.encoding())?;
        let mut align = Align::Left;
        let mut style = TextStyle::PLAIN;
        let mut substitutions = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if line.align != align {
                match line.align {
                    Align::Left => b.left(),
                    Align::Center => b.center(),
                    Align::Right => b.right(),
                };
                align = line.align;
            }
            if line.style.bold != style.bold {
                if line.style.bold {
                    b.bold();
                } else {
                    b.bold_off();
                }
            }
            if line.style.double_height != style.double_height {
                if line.style.double_height {
                    b.double_height();
                } else {
                    b.reset_size();
                }
            }
            style = line.style;

            let before = b.substituted().len();
            b.line(line.text());
            substitutions.extend(
                b.substituted()[before..]
                    .iter()
                    .map(|&ch| Substitution { line: idx, ch }),
            );
        }

        // Leave the printer in its default state for the next job
        if style.bold {
            b.bold_off();
        }
        if style.double_height {
            b.reset_size();
        }
        if align != Align::Left {
            b.left();
        }

        if self.options.open_drawer {
            b.open_drawer();
        }
        if self.options.cut {
            b.cut_feed(self.options.feed_lines);
        } else {
            b.feed(self.options.feed_lines);
        }

        let job = EncodedJob {
            bytes: b.build(),
            substitutions,
        };
        report_substitutions(&job);
        Ok(job)
    }
}

/// Plain text encoder
///
/// Emits the laid-out content verbatim, one line per `LF`, then blank lines
/// for tearing off. No control codes, so `cut` and `open_drawer` are ignored.
#[derive(Debug, Clone, Default)]
pub struct PlainTextEncoder {
    options: EncodeOptions,
}

impl PlainTextEncoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }
}

impl JobEncoder for PlainTextEncoder {
    #[instrument(skip_all, fields(lines = lines.len(), code_page = %profile.encoding()))]
    fn encode(
        &self,
        lines: &[FormattedLine],
        profile: &PaperProfile,
    ) -> EncodingResult<EncodedJob> {
        let code_page = profile.encoding();
        code_page.ensure_supported()?;

        let mut bytes = Vec::new();
        let mut substitutions = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            let encoded = code_page.encode(line.content.trim_end())?;
            bytes.extend_from_slice(&encoded.bytes);
            bytes.push(b'\n');
            substitutions.extend(
                encoded
                    .substituted
                    .into_iter()
                    .map(|ch| Substitution { line: idx, ch }),
            );
        }
        bytes.extend(std::iter::repeat_n(b'\n', self.options.feed_lines as usize));

        let job = EncodedJob {
            bytes,
            substitutions,
        };
        report_substitutions(&job);
        Ok(job)
    }
}

fn report_substitutions(job: &EncodedJob) {
    if !job.substitutions.is_empty() {
        let chars: String = job.substitutions.iter().map(|s| s.ch).collect();
        warn!(
            count = job.substitutions.len(),
            chars = %chars,
            "Characters outside the code page were substituted"
        );
    }
}
