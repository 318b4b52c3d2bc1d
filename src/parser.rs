pub mod builder;
mod constants;
pub mod types;

use crate::parser::builder::{DecodeError, build_position_from_string};
use crate::parser::constants::KEEPALIVE_PREFIX;
use crate::parser::types::PositionPacket;

/// Preset for [`Corrections`]: the wire-compatible decoder or the one with
/// every known slicing and sign defect fixed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderMode {
    /// Seconds sliced from the minute offset, hemispheres ignored, vertical
    /// speed and flight level taken from fixed token positions.
    #[default]
    Compatible,
    Corrected,
}

/// Deviations from the wire-compatible decoder, each switched on its own.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Corrections {
    /// Seconds from body offset [5,7) instead of [3,7), as a valid clock time.
    pub clock_seconds: bool,
    /// `S` and `W` hemisphere indicators negate latitude and longitude.
    pub hemisphere_signs: bool,
    /// The body runs to the end of the line instead of the next `:`.
    pub full_body: bool,
    /// Vertical speed and flight level found by their `fpm` / `FL` markers
    /// instead of by token position.
    pub searched_tokens: bool,
}

impl Corrections {
    pub const NONE: Corrections = Corrections {
        clock_seconds: false,
        hemisphere_signs: false,
        full_body: false,
        searched_tokens: false,
    };
    pub const ALL: Corrections = Corrections {
        clock_seconds: true,
        hemisphere_signs: true,
        full_body: true,
        searched_tokens: true,
    };
}

impl From<DecoderMode> for Corrections {
    fn from(mode: DecoderMode) -> Self {
        match mode {
            DecoderMode::Compatible => Corrections::NONE,
            DecoderMode::Corrected => Corrections::ALL,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LineKind {
    KeepAlive,
    Position(PositionPacket),
    Unparsed(DecodeError),
}

pub struct PacketDecoder {
    corrections: Corrections,
}
impl PacketDecoder {
    #[must_use]
    pub fn new(corrections: Corrections) -> Self {
        PacketDecoder { corrections }
    }

    /// Classifies a single non-empty line. Never fails: anything that is not a
    /// keepalive and does not decode comes back as [`LineKind::Unparsed`].
    #[must_use]
    pub fn classify(&self, line: &str) -> LineKind {
        if line.starts_with(KEEPALIVE_PREFIX) {
            return LineKind::KeepAlive;
        }

        match build_position_from_string(line, self.corrections) {
            Ok(position) => LineKind::Position(position),
            Err(err) => {
                log::debug!("Unparsed line ({err}): {line}");
                LineKind::Unparsed(err)
            }
        }
    }
}

impl Default for PacketDecoder {
    fn default() -> Self {
        PacketDecoder::new(Corrections::default())
    }
}
