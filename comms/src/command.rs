//! Framed configuration command decoding.
//!
//! Commands arrive as `$`…`#` framed ASCII: `$` opens a frame (abandoning any
//! partial one), `#` closes it, and everything between is an opcode byte plus
//! fixed-point digits. Bytes outside a frame are ignored, which keeps the
//! decoder robust against line noise on the serial link.
//!
//! Frame payloads:
//!
//! | opcode | payload   | meaning                              |
//! |--------|-----------|--------------------------------------|
//! | `0`    | `dd`      | target frequency, kHz (20-40)        |
//! | `1`    | `dddd`    | hi threshold, d.ddd volts (0-1)      |
//! | `2`    | `dddd`    | lo threshold, d.ddd volts (0-1)      |
//! | `3`    | `dddd`    | array side length, dd.dd inches (>0) |

use log::warn;
use thiserror::Error;

/// Longest payload a well-formed frame can carry (opcode plus digits).
const MAX_FRAME_LEN: usize = 16;

/// A validated configuration command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Retune the detection engine to a new pinger frequency.
    SetFrequency { khz: u32 },
    /// Replace the high-tier trigger threshold.
    SetHiThreshold { volts: f32 },
    /// Replace the low-tier trigger threshold.
    SetLoThreshold { volts: f32 },
    /// Change the hydrophone spacing used for bearing computation.
    SetSideLength { inches: f32 },
}

/// Errors produced while parsing a completed frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("empty command frame")]
    Empty,

    #[error("unknown command opcode '{0}'")]
    UnknownOpcode(char),

    #[error("malformed {what}: expected {expected} digits, got payload {payload:?}")]
    Malformed {
        what: &'static str,
        expected: usize,
        payload: String,
    },

    #[error("invalid frequency setting of {khz} kHz, frequency must be between 20 kHz and 40 kHz")]
    FrequencyOutOfRange { khz: u32 },

    #[error("invalid trigger threshold of {volts} V, threshold must be between 0 V and 1 V")]
    ThresholdOutOfRange { volts: f32 },

    #[error("invalid side length of {inches} in, side length must be positive")]
    SideLengthOutOfRange { inches: f32 },

    #[error("command frame exceeded {MAX_FRAME_LEN} bytes")]
    FrameTooLong,
}

/// Incremental `$`…`#` frame decoder.
///
/// Feed received bytes one at a time to [`CommandDecoder::push`]; a completed
/// frame yields `Some(Ok(command))` or `Some(Err(..))`, everything else
/// yields `None`.
#[derive(Debug, Default)]
pub struct CommandDecoder {
    buf: Vec<u8>,
    in_frame: bool,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one received byte, returning a parse outcome when a frame
    /// completes.
    pub fn push(&mut self, byte: u8) -> Option<Result<Command, CommandError>> {
        match byte {
            b'$' => {
                if self.in_frame {
                    warn!("restarting command frame mid-payload");
                }
                self.buf.clear();
                self.in_frame = true;
                None
            }
            b'#' => {
                if !self.in_frame {
                    return None;
                }
                self.in_frame = false;
                Some(parse_frame(&self.buf))
            }
            _ if self.in_frame => {
                if self.buf.len() >= MAX_FRAME_LEN {
                    self.in_frame = false;
                    self.buf.clear();
                    return Some(Err(CommandError::FrameTooLong));
                }
                self.buf.push(byte);
                None
            }
            // Out-of-frame noise.
            _ => None,
        }
    }
}

/// Parse a completed frame payload (bytes between `$` and `#`).
fn parse_frame(payload: &[u8]) -> Result<Command, CommandError> {
    let (&opcode, digits) = payload.split_first().ok_or(CommandError::Empty)?;
    match opcode {
        b'0' => {
            let khz = parse_digits(digits, 2, "frequency")? as u32;
            if !(20..=40).contains(&khz) {
                return Err(CommandError::FrequencyOutOfRange { khz });
            }
            Ok(Command::SetFrequency { khz })
        }
        b'1' => Ok(Command::SetHiThreshold {
            volts: parse_threshold(digits)?,
        }),
        b'2' => Ok(Command::SetLoThreshold {
            volts: parse_threshold(digits)?,
        }),
        b'3' => {
            // dd.dd inches
            let raw = parse_digits(digits, 4, "side length")?;
            let inches = raw as f32 / 100.0;
            if inches <= 0.0 {
                return Err(CommandError::SideLengthOutOfRange { inches });
            }
            Ok(Command::SetSideLength { inches })
        }
        other => Err(CommandError::UnknownOpcode(other as char)),
    }
}

/// d.ddd volts, range-checked to 0-1 V.
fn parse_threshold(digits: &[u8]) -> Result<f32, CommandError> {
    let raw = parse_digits(digits, 4, "threshold")?;
    let volts = raw as f32 / 1000.0;
    if volts > 1.0 {
        return Err(CommandError::ThresholdOutOfRange { volts });
    }
    Ok(volts)
}

/// Interpret exactly `expected` ASCII digits as a decimal integer.
fn parse_digits(digits: &[u8], expected: usize, what: &'static str) -> Result<u64, CommandError> {
    if digits.len() != expected || !digits.iter().all(u8::is_ascii_digit) {
        return Err(CommandError::Malformed {
            what,
            expected,
            payload: String::from_utf8_lossy(digits).into_owned(),
        });
    }
    Ok(digits
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + u64::from(d - b'0')))
}
