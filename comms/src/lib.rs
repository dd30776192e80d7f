//! Command and telemetry protocol for the pinger locator's serial link.
//!
//! The transport (UART, DMA, interrupts) lives elsewhere; this crate handles
//! only the byte-level protocol semantics. Inbound traffic is `$`…`#` framed
//! configuration commands fed to [`CommandDecoder`] one byte at a time;
//! outbound traffic is the detection result line built by
//! [`telemetry::format_detection`].

pub mod command;
pub mod telemetry;

pub use command::{Command, CommandDecoder, CommandError};
pub use telemetry::{format_detection, parse_detection, TelemetryError};
