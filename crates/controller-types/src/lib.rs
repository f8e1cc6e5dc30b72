//! Canonical controller model for OpenPad
//!
//! This crate defines the normalized, transport-agnostic representation of
//! a connected input device: a tagged [`Controller`] state covering
//! gamepads, mice, keyboards and balance boards, plus the bit constants and
//! value ranges every usage interpreter populates.
//!
//! The model is pure data. Each input report is a full-state snapshot, so
//! interpreters reset the model to a zeroed baseline of the right class
//! before populating it field by field.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod balance_board;
pub mod gamepad;
pub mod keyboard;
pub mod mouse;

pub use balance_board::BalanceBoard;
pub use gamepad::*;
pub use keyboard::*;
pub use mouse::*;

use serde::{Deserialize, Serialize};

/// Battery level meaning "the device does not report battery status".
pub const BATTERY_NOT_AVAILABLE: u8 = 0;
/// Lowest reportable battery level.
pub const BATTERY_EMPTY: u8 = 1;
/// Highest reportable battery level.
pub const BATTERY_FULL: u8 = 255;

/// Device class of a connected controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerClass {
    None,
    Gamepad,
    Mouse,
    Keyboard,
    BalanceBoard,
}

/// Class-specific controller state. Exactly one variant is active at a
/// time; switching class discards the previous payload entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerData {
    None,
    Gamepad(Gamepad),
    Mouse(Mouse),
    Keyboard(Keyboard),
    BalanceBoard(BalanceBoard),
}

impl Default for ControllerData {
    fn default() -> Self {
        Self::None
    }
}

/// Normalized state of one physical device.
///
/// Battery is common to every class, so it lives outside the tagged data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controller {
    pub data: ControllerData,
    /// 0 = not available, 1 = empty, 255 = full.
    pub battery: u8,
}

impl Controller {
    pub fn class(&self) -> ControllerClass {
        match self.data {
            ControllerData::None => ControllerClass::None,
            ControllerData::Gamepad(_) => ControllerClass::Gamepad,
            ControllerData::Mouse(_) => ControllerClass::Mouse,
            ControllerData::Keyboard(_) => ControllerClass::Keyboard,
            ControllerData::BalanceBoard(_) => ControllerClass::BalanceBoard,
        }
    }

    /// Reset to a zeroed state of the given class. Called by interpreters
    /// at the start of every report, since reports are full snapshots.
    pub fn reset_as(&mut self, class: ControllerClass) {
        self.battery = BATTERY_NOT_AVAILABLE;
        self.data = match class {
            ControllerClass::None => ControllerData::None,
            ControllerClass::Gamepad => ControllerData::Gamepad(Gamepad::default()),
            ControllerClass::Mouse => ControllerData::Mouse(Mouse::default()),
            ControllerClass::Keyboard => ControllerData::Keyboard(Keyboard::default()),
            ControllerClass::BalanceBoard => ControllerData::BalanceBoard(BalanceBoard::default()),
        };
    }

    pub fn gamepad(&self) -> Option<&Gamepad> {
        match &self.data {
            ControllerData::Gamepad(gp) => Some(gp),
            _ => None,
        }
    }

    /// Gamepad view, switching the class first if the model currently holds
    /// something else. Interpreters that accumulate state across reports
    /// (no init-report step) rely on the "switch only when needed" part.
    pub fn gamepad_mut(&mut self) -> &mut Gamepad {
        if !matches!(self.data, ControllerData::Gamepad(_)) {
            self.data = ControllerData::Gamepad(Gamepad::default());
        }
        match &mut self.data {
            ControllerData::Gamepad(gp) => gp,
            _ => unreachable!("gamepad variant set above"),
        }
    }

    pub fn mouse(&self) -> Option<&Mouse> {
        match &self.data {
            ControllerData::Mouse(ms) => Some(ms),
            _ => None,
        }
    }

    pub fn mouse_mut(&mut self) -> &mut Mouse {
        if !matches!(self.data, ControllerData::Mouse(_)) {
            self.data = ControllerData::Mouse(Mouse::default());
        }
        match &mut self.data {
            ControllerData::Mouse(ms) => ms,
            _ => unreachable!("mouse variant set above"),
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match &self.data {
            ControllerData::Keyboard(kb) => Some(kb),
            _ => None,
        }
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        if !matches!(self.data, ControllerData::Keyboard(_)) {
            self.data = ControllerData::Keyboard(Keyboard::default());
        }
        match &mut self.data {
            ControllerData::Keyboard(kb) => kb,
            _ => unreachable!("keyboard variant set above"),
        }
    }
}
