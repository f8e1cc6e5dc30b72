//! iCade arcade controller protocol
//!
//! iCade devices present themselves as Bluetooth keyboards: every control
//! maps to a pair of letter scancodes, one sent on press and one on
//! release (e.g. joystick up is `w` on, `e` off). Reports are
//! edge-triggered, so there is no init-report step — state accumulates in
//! the model across reports and is cleared by the matching "off" scancode.
//!
//! Two models with slightly different layouts are supported:
//!
//! ```text
//! Cabinet:             8-Bitty:
//!   ↑      A C Y L       d-pad, two shoulder keys,
//!  ← →                   four face buttons and
//!   ↓      B X Z R       select/start in the middle
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

use openpad_controller_types::{
    BUTTON_A, BUTTON_B, BUTTON_SHOULDER_L, BUTTON_SHOULDER_R, BUTTON_X, BUTTON_Y, Controller,
    DPAD_DOWN, DPAD_LEFT, DPAD_RIGHT, DPAD_UP, MISC_BUTTON_START, MISC_BUTTON_SYSTEM,
};
use openpad_hid_common::{HidGlobals, usages};
use tracing::{debug, info};

/// iCade Cabinet vendor id.
pub const ICADE_CABINET_VID: u16 = 0x15e4;
/// iCade 8-Bitty vendor/product ids.
pub const ICADE_8BITTY_VID: u16 = 0x0a5c;
pub const ICADE_8BITTY_PID: u16 = 0x8502;

/// iCade hardware models. Mappings differ slightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ICadeModel {
    #[default]
    Cabinet,
    EightBitty,
}

/// What a scancode acts on.
#[derive(Debug, Clone, Copy)]
enum Target {
    Dpad(u8),
    Button(u16),
    Misc(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ICadeInterpreter {
    model: ICadeModel,
}

impl ICadeInterpreter {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        let model = if vendor_id == ICADE_CABINET_VID && product_id != 0 {
            info!("iCade: detected Cabinet");
            ICadeModel::Cabinet
        } else if vendor_id == ICADE_8BITTY_VID && product_id == ICADE_8BITTY_PID {
            info!("iCade: detected 8-Bitty");
            ICadeModel::EightBitty
        } else {
            info!(vendor_id, product_id, "iCade: unknown model, assuming Cabinet");
            ICadeModel::Cabinet
        };
        Self { model }
    }

    pub fn model(&self) -> ICadeModel {
        self.model
    }

    /// Resolve a scancode to its edge and target for this model. The
    /// model-independent d-pad codes come first; the rest differ between
    /// Cabinet and 8-Bitty.
    fn decode(&self, usage: u16) -> Option<(Edge, Target)> {
        use Edge::{Off, On};
        use ICadeModel::{Cabinet, EightBitty};

        let entry = match usage {
            usages::KB_W => (On, Target::Dpad(DPAD_UP)),
            usages::KB_E => (Off, Target::Dpad(DPAD_UP)),
            usages::KB_D => (On, Target::Dpad(DPAD_RIGHT)),
            usages::KB_C => (Off, Target::Dpad(DPAD_RIGHT)),
            usages::KB_X => (On, Target::Dpad(DPAD_DOWN)),
            usages::KB_Z => (Off, Target::Dpad(DPAD_DOWN)),
            usages::KB_A => (On, Target::Dpad(DPAD_LEFT)),
            usages::KB_Q => (Off, Target::Dpad(DPAD_LEFT)),

            usages::KB_Y | usages::KB_T => {
                let target = match self.model {
                    Cabinet => Target::Button(BUTTON_A),
                    EightBitty => Target::Misc(MISC_BUTTON_SYSTEM),
                };
                (if usage == usages::KB_Y { On } else { Off }, target)
            }
            usages::KB_H | usages::KB_R => {
                let target = match self.model {
                    Cabinet => Target::Button(BUTTON_B),
                    EightBitty => Target::Button(BUTTON_SHOULDER_L),
                };
                (if usage == usages::KB_H { On } else { Off }, target)
            }
            usages::KB_U | usages::KB_F => {
                let target = match self.model {
                    Cabinet => Target::Button(BUTTON_X),
                    EightBitty => Target::Misc(MISC_BUTTON_START),
                };
                (if usage == usages::KB_U { On } else { Off }, target)
            }
            usages::KB_J | usages::KB_N => {
                let target = match self.model {
                    Cabinet => Target::Button(BUTTON_Y),
                    EightBitty => Target::Button(BUTTON_SHOULDER_R),
                };
                (if usage == usages::KB_J { On } else { Off }, target)
            }
            usages::KB_O | usages::KB_G => {
                let target = match self.model {
                    Cabinet => Target::Misc(MISC_BUTTON_SYSTEM),
                    EightBitty => Target::Button(BUTTON_Y),
                };
                (if usage == usages::KB_O { On } else { Off }, target)
            }
            usages::KB_I | usages::KB_M => {
                let target = match self.model {
                    Cabinet => Target::Misc(MISC_BUTTON_START),
                    EightBitty => Target::Button(BUTTON_X),
                };
                (if usage == usages::KB_I { On } else { Off }, target)
            }
            usages::KB_K | usages::KB_P => {
                let target = match self.model {
                    Cabinet => Target::Button(BUTTON_SHOULDER_L),
                    EightBitty => Target::Button(BUTTON_A),
                };
                (if usage == usages::KB_K { On } else { Off }, target)
            }
            usages::KB_L | usages::KB_V => {
                let target = match self.model {
                    Cabinet => Target::Button(BUTTON_SHOULDER_R),
                    EightBitty => Target::Button(BUTTON_B),
                };
                (if usage == usages::KB_L { On } else { Off }, target)
            }
            _ => return None,
        };
        Some(entry)
    }

    pub fn parse_usage(
        &mut self,
        ctl: &mut Controller,
        _globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        if usage_page != usages::PAGE_KEYBOARD_KEYPAD {
            return;
        }
        // Reserved slot and the modifier range carry nothing here.
        if usage == 0x00 || (0xe0..=0xe7).contains(&usage) {
            return;
        }

        let Some((edge, target)) = self.decode(usage) else {
            debug!(usage_page, usage, value, "iCade: unsupported usage");
            return;
        };

        let gp = ctl.gamepad_mut();
        match (edge, target) {
            (Edge::On, Target::Dpad(bit)) => gp.dpad |= bit,
            (Edge::Off, Target::Dpad(bit)) => gp.dpad &= !bit,
            (Edge::On, Target::Button(bit)) => gp.buttons |= bit,
            (Edge::Off, Target::Button(bit)) => gp.buttons &= !bit,
            (Edge::On, Target::Misc(bit)) => gp.misc_buttons |= bit,
            (Edge::Off, Target::Misc(bit)) => gp.misc_buttons &= !bit,
        }
    }
}
