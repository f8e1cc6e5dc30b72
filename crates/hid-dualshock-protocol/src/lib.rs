//! Sony DualShock 4 protocol
//!
//! The DS4 streams fixed-layout reports instead of honoring its HID
//! descriptor, so this interpreter takes the raw-report path: report 0x01
//! (simple mode) and 0x11 (stream mode with motion sensors, battery and
//! CRC-protected output). Lightbar color and rumble share one output
//! report, so the interpreter remembers the last value of each and
//! re-sends it whenever the other changes.
//!
//! I/O-free: parsing mutates the canonical model, feedback operations
//! return encoded reports.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod interpreter;
pub mod report;

pub use ids::*;
pub use interpreter::Ds4Interpreter;
pub use report::encode_output_report;
