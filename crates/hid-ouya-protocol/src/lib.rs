//! OUYA controller HID protocol
//!
//! Single-revision usage table. The OUYA's triggers show up twice: as
//! analog Z/Rz pedals and as digital buttons 0x0d/0x0e the firmware
//! synthesizes itself.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

use openpad_controller_types::{
    BUTTON_A, BUTTON_B, BUTTON_SHOULDER_L, BUTTON_SHOULDER_R, BUTTON_THUMB_L, BUTTON_THUMB_R,
    BUTTON_TRIGGER_L, BUTTON_TRIGGER_R, BUTTON_X, BUTTON_Y, Controller, ControllerClass,
    DPAD_DOWN, DPAD_LEFT, DPAD_RIGHT, DPAD_UP, MISC_BUTTON_SYSTEM,
};
use openpad_hid_common::{HidGlobals, OutgoingReport, normalize_axis, normalize_pedal, usages};
use tracing::debug;

/// OUYA vendor-specific usage page; reported but carries nothing mapped.
const PAGE_OUYA_VENDOR: u16 = 0xff00;

/// Per-device interpreter state. The OUYA needs none, but the type keeps
/// the capability surface uniform.
#[derive(Debug, Clone, Copy, Default)]
pub struct OuyaInterpreter;

impl OuyaInterpreter {
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
                usages::USAGE_AXIS_Z => gp.brake = normalize_pedal(globals, value),
                usages::USAGE_AXIS_RX => gp.axis_rx = normalize_axis(globals, value),
                usages::USAGE_AXIS_RY => gp.axis_ry = normalize_axis(globals, value),
                usages::USAGE_AXIS_RZ => gp.throttle = normalize_pedal(globals, value),
                _ => debug!(usage_page, usage, value, "OUYA: unsupported usage"),
            },

            usages::PAGE_BUTTON => {
                let bit = match usage {
                    0x01 => Some(BUTTON_A),
                    0x02 => Some(BUTTON_X),
                    0x03 => Some(BUTTON_Y),
                    0x04 => Some(BUTTON_B),
                    0x05 => Some(BUTTON_SHOULDER_L),
                    0x06 => Some(BUTTON_SHOULDER_R),
                    0x07 => Some(BUTTON_THUMB_L),
                    0x08 => Some(BUTTON_THUMB_R),
                    0x0d => Some(BUTTON_TRIGGER_L), // triggered by brake pedal
                    0x0e => Some(BUTTON_TRIGGER_R), // triggered by accelerator pedal
                    _ => None,
                };
                let dpad_bit = match usage {
                    0x09 => Some(DPAD_UP),
                    0x0a => Some(DPAD_DOWN),
                    0x0b => Some(DPAD_LEFT),
                    0x0c => Some(DPAD_RIGHT),
                    _ => None,
                };
                if let Some(bit) = bit {
                    if value != 0 {
                        gp.buttons |= bit;
                    }
                } else if let Some(bit) = dpad_bit {
                    if value != 0 {
                        gp.dpad |= bit;
                    }
                } else {
                    match usage {
                        0x0f => {
                            if value != 0 {
                                gp.misc_buttons |= MISC_BUTTON_SYSTEM;
                            }
                        }
                        0x10 => {} // reported but not mapped
                        _ => debug!(usage_page, usage, value, "OUYA: unsupported usage"),
                    }
                }
            }

            PAGE_OUYA_VENDOR => {}

            _ => debug!(usage_page, usage, value, "OUYA: unsupported usage page"),
        }
    }

    /// Encode the player LED command. The controller lights the LEDs named
    /// in the bitmask.
    pub fn player_leds(&self, leds: u8) -> OutgoingReport {
        OutgoingReport::control(vec![0xa2, 0x07, leds, leds, leds, leds, leds, leds, leds, leds])
    }
}
