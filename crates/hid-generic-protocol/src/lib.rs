//! Generic HID device interpreters
//!
//! Fallback interpreters for devices without a vendor-specific protocol:
//! multi-console gamepads, Bluetooth mice and keyboards. Gamepads designed
//! to work everywhere often emit usages that are invalid on any one
//! console; the generic table collects those so the vendor tables stay
//! clean.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod gamepad;
pub mod keyboard;
pub mod mouse;

pub use gamepad::GenericInterpreter;
pub use keyboard::KeyboardInterpreter;
pub use mouse::MouseInterpreter;
