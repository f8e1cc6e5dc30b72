//! Bluetooth keyboard interpreter.

use openpad_controller_types::{Controller, ControllerClass};
use openpad_hid_common::{HidGlobals, usages};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardInterpreter;

impl KeyboardInterpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn init_report(&mut self, ctl: &mut Controller) {
        ctl.reset_as(ControllerClass::Keyboard);
    }

    pub fn parse_usage(
        &mut self,
        ctl: &mut Controller,
        _globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        match usage_page {
            usages::PAGE_KEYBOARD_KEYPAD => {
                if value == 0 {
                    return;
                }
                if usage < usages::KB_LEFT_CONTROL {
                    // The usage is the pressed key (HID Usage Tables §10).
                    let kb = ctl.keyboard_mut();
                    if !kb.press(usage as u8) {
                        warn!(usage, "Keyboard: pressed-key table full, dropping key");
                    }
                } else if usage <= usages::KB_RIGHT_GUI {
                    // 0xe0..=0xe7 are the modifiers, bit 0..7.
                    let modifier = (usage - usages::KB_LEFT_CONTROL) as u8;
                    ctl.keyboard_mut().modifiers |= 1 << modifier;
                } else {
                    debug!(usage_page, usage, value, "Keyboard: unsupported usage");
                }
            }

            usages::PAGE_CONSUMER => {
                // Media keys: reserved for future use.
                debug!(usage_page, usage, value, "Keyboard: consumer usage ignored");
            }

            _ => debug!(usage_page, usage, value, "Keyboard: unsupported usage page"),
        }
    }
}
