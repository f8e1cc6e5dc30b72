//! Generic multi-console gamepad interpreter.

use openpad_controller_types::{
    BUTTON_A, BUTTON_B, BUTTON_SHOULDER_L, BUTTON_SHOULDER_R, BUTTON_THUMB_L, BUTTON_THUMB_R,
    BUTTON_X, BUTTON_Y, Controller, ControllerClass, MISC_BUTTON_SELECT, MISC_BUTTON_START,
    MISC_BUTTON_SYSTEM,
};
use openpad_hid_common::{
    HidGlobals, apply_dpad_usage, hat_to_dpad, hat_to_value, normalize_axis, normalize_pedal,
    usages,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericInterpreter;

impl GenericInterpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn init_report(&mut self, ctl: &mut Controller) {
        ctl.reset_as(ControllerClass::Gamepad);
    }

    pub fn parse_usage(
        &mut self,
        ctl: &mut Controller,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        let gp = ctl.gamepad_mut();
        match usage_page {
            usages::PAGE_GENERIC_DESKTOP => match usage {
                usages::USAGE_AXIS_X => gp.axis_x = normalize_axis(globals, value),
                usages::USAGE_AXIS_Y => gp.axis_y = normalize_axis(globals, value),
                // Multi-console pads report the right stick as Z/Rz or
                // Rx/Ry depending on mood; accept both spellings.
                usages::USAGE_AXIS_Z | usages::USAGE_AXIS_RX => {
                    gp.axis_rx = normalize_axis(globals, value)
                }
                usages::USAGE_AXIS_RY | usages::USAGE_AXIS_RZ => {
                    gp.axis_ry = normalize_axis(globals, value)
                }
                usages::USAGE_HAT => {
                    let hat = hat_to_value(globals, value);
                    gp.dpad = hat_to_dpad(hat);
                }
                usages::USAGE_DPAD_UP
                | usages::USAGE_DPAD_DOWN
                | usages::USAGE_DPAD_RIGHT
                | usages::USAGE_DPAD_LEFT => apply_dpad_usage(usage, value, &mut gp.dpad),
                _ => debug!(usage_page, usage, value, "Generic: unsupported usage"),
            },

            usages::PAGE_SIMULATION_CONTROLS => match usage {
                usages::USAGE_ACCELERATOR => gp.throttle = normalize_pedal(globals, value),
                usages::USAGE_BRAKE => gp.brake = normalize_pedal(globals, value),
                _ => debug!(usage_page, usage, value, "Generic: unsupported usage"),
            },

            usages::PAGE_KEYBOARD_KEYPAD => match usage {
                usages::KB_NONE => {}
                usages::KB_ENTER => {
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SYSTEM;
                    }
                }
                // Modifier keys carry nothing on a gamepad.
                usages::KB_LEFT_CONTROL..=usages::KB_RIGHT_GUI => {}
                _ => debug!(usage_page, usage, value, "Generic: unsupported usage"),
            },

            usages::PAGE_GENERIC_DEVICE_CONTROLS => match usage {
                usages::USAGE_BATTERY_STRENGTH => ctl.battery = value.clamp(0, 255) as u8,
                _ => debug!(usage_page, usage, value, "Generic: unsupported usage"),
            },

            usages::PAGE_BUTTON => {
                let bit = match usage {
                    0x01 => Some(BUTTON_A),
                    0x02 => Some(BUTTON_B),
                    0x04 => Some(BUTTON_X),
                    0x05 => Some(BUTTON_Y),
                    0x07 => Some(BUTTON_SHOULDER_L),
                    0x08 => Some(BUTTON_SHOULDER_R),
                    0x0e => Some(BUTTON_THUMB_L),
                    0x0f => Some(BUTTON_THUMB_R),
                    _ => None,
                };
                let misc = match usage {
                    0x0b => Some(MISC_BUTTON_SELECT),
                    0x0c => Some(MISC_BUTTON_START),
                    0x0d => Some(MISC_BUTTON_SYSTEM),
                    _ => None,
                };
                if let Some(bit) = bit {
                    if value != 0 {
                        gp.buttons |= bit;
                    }
                } else if let Some(bit) = misc {
                    if value != 0 {
                        gp.misc_buttons |= bit;
                    }
                } else {
                    match usage {
                        // Phantom C/Z buttons and other slots nothing maps to.
                        0x03 | 0x06 | 0x09 | 0x0a | 0x10 => {}
                        _ => debug!(usage_page, usage, value, "Generic: unsupported usage"),
                    }
                }
            }

            usages::PAGE_CONSUMER => match usage {
                usages::USAGE_AC_HOME => {
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_START;
                    }
                }
                usages::USAGE_AC_BACK => {
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SELECT;
                    }
                }
                usages::USAGE_FAST_FORWARD
                | usages::USAGE_REWIND
                | usages::USAGE_PLAY_PAUSE
                | usages::USAGE_AC_SEARCH => {}
                _ => debug!(usage_page, usage, value, "Generic: unsupported usage"),
            },

            _ => debug!(usage_page, usage, value, "Generic: unsupported usage page"),
        }
    }
}
