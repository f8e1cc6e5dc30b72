//! Virtual gamepad state.
//!
//! Different usage interpreters populate this one layout regardless of the
//! physical controller. A device with a hat switch populates the D-pad; a
//! device with a single joypad populates the left stick.

use serde::{Deserialize, Serialize};

/// Output span of a normalized analog stick axis: values are in
/// `-AXIS_NORMALIZE_RANGE/2 .. AXIS_NORMALIZE_RANGE/2 - 1` (-512..511).
pub const AXIS_NORMALIZE_RANGE: i32 = 1024;

/// Maximum value of a normalized pedal/trigger (unipolar 0..1023).
pub const PEDAL_MAX: i32 = AXIS_NORMALIZE_RANGE - 1;

// D-pad bits. Diagonals are two bits set.
pub const DPAD_UP: u8 = 1 << 0;
pub const DPAD_DOWN: u8 = 1 << 1;
pub const DPAD_RIGHT: u8 = 1 << 2;
pub const DPAD_LEFT: u8 = 1 << 3;

// Main gamepad buttons.
pub const BUTTON_A: u16 = 1 << 0;
pub const BUTTON_B: u16 = 1 << 1;
pub const BUTTON_X: u16 = 1 << 2;
pub const BUTTON_Y: u16 = 1 << 3;
pub const BUTTON_SHOULDER_L: u16 = 1 << 4;
pub const BUTTON_SHOULDER_R: u16 = 1 << 5;
pub const BUTTON_TRIGGER_L: u16 = 1 << 6;
pub const BUTTON_TRIGGER_R: u16 = 1 << 7;
pub const BUTTON_THUMB_L: u16 = 1 << 8;
pub const BUTTON_THUMB_R: u16 = 1 << 9;

// Misc buttons: helpers like "select"/"start"/"system", usually not used
// by games themselves.
pub const MISC_BUTTON_SYSTEM: u8 = 1 << 0; // PS, Xbox, OUYA "U", ...
pub const MISC_BUTTON_SELECT: u8 = 1 << 1; // Select, Share, View, -
pub const MISC_BUTTON_START: u8 = 1 << 2; // Start, Options, Menu, +
pub const MISC_BUTTON_CAPTURE: u8 = 1 << 3; // Mute, Capture, Share

/// Normalized gamepad state.
///
/// Axes are -512..511 (0 = centered), pedals 0..1023, gyro in deg/s units,
/// accel in G units as scaled by the interpreter's calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gamepad {
    pub dpad: u8,

    pub axis_x: i32,
    pub axis_y: i32,
    pub axis_rx: i32,
    pub axis_ry: i32,

    pub brake: i32,
    pub throttle: i32,

    pub buttons: u16,
    pub misc_buttons: u8,

    pub gyro: [i32; 3],
    pub accel: [i32; 3],
}
