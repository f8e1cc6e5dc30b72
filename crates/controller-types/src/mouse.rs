//! Mouse state.

use serde::{Deserialize, Serialize};

pub const MOUSE_BUTTON_LEFT: u16 = 1 << 0;
pub const MOUSE_BUTTON_RIGHT: u16 = 1 << 1;
pub const MOUSE_BUTTON_MIDDLE: u16 = 1 << 2;

pub const MOUSE_BUTTON_AUX_0: u16 = 1 << 3;
pub const MOUSE_BUTTON_AUX_1: u16 = 1 << 4;
pub const MOUSE_BUTTON_AUX_2: u16 = 1 << 5;
pub const MOUSE_BUTTON_AUX_3: u16 = 1 << 6;
pub const MOUSE_BUTTON_AUX_4: u16 = 1 << 7;
pub const MOUSE_BUTTON_AUX_5: u16 = 1 << 8;

/// Relative mouse motion plus buttons. Deltas are per-report, already
/// scaled by the interpreter's per-model resolution factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mouse {
    pub delta_x: i32,
    pub delta_y: i32,
    pub buttons: u16,
    pub scroll_wheel: i8,
    pub misc_buttons: u8,
}
