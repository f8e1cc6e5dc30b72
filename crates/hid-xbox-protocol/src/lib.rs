//! Xbox Wireless Controller HID protocol
//!
//! Usage interpretation and feedback encoding for the Xbox One/Series
//! controller family over Bluetooth. Three firmware revisions are handled
//! (v3.1, v4.8, v5.x BLE), each with its own usage table; the revision is
//! guessed from the descriptor length at setup and self-corrects while
//! parsing.
//!
//! This crate is I/O-free: it maps usages onto the canonical controller
//! model and encodes outgoing reports, nothing else.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod interpreter;
pub mod report;

pub use ids::*;
pub use interpreter::{TRIGGER_BUTTON_THRESHOLD, XboxFirmware, XboxInterpreter};
pub use report::{HID_DESCRIPTOR_FW_4_8, encode_rumble};
