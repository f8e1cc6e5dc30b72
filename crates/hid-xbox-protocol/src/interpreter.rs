//! Usage interpretation for the Xbox Wireless Controller family.

use crate::ids::{XBOX_WIRELESS_NAME, XBOX_WIRELESS_PID, XBOX_WIRELESS_VID};
use crate::report::{HID_DESCRIPTOR_FW_4_8, encode_rumble};
use openpad_controller_types::{
    BUTTON_A, BUTTON_B, BUTTON_SHOULDER_L, BUTTON_SHOULDER_R, BUTTON_THUMB_L, BUTTON_THUMB_R,
    BUTTON_TRIGGER_L, BUTTON_TRIGGER_R, BUTTON_X, BUTTON_Y, Controller, ControllerClass,
    MISC_BUTTON_CAPTURE, MISC_BUTTON_SELECT, MISC_BUTTON_START, MISC_BUTTON_SYSTEM,
};
use openpad_hid_common::{
    HidGlobals, IdentityOverride, OutgoingReport, apply_dpad_usage, hat_to_dpad, hat_to_value,
    normalize_axis, normalize_pedal, usages,
};
use tracing::{debug, info};

/// The controller reports analog throttle/brake instead of trigger
/// buttons. Pedal values at or above this (on the 0..1023 scale) also
/// synthesize the digital trigger bit.
pub const TRIGGER_BUTTON_THRESHOLD: i32 = 32;

/// Descriptors longer than this belong to firmware 4.8 or newer.
const FW_4_8_DESCRIPTOR_LEN: usize = 330;

/// Firmware revisions seen in the wild. Usage tables differ per revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum XboxFirmware {
    /// Pre-installed firmware, or close to it.
    V3_1,
    /// Released 2019-10.
    V4_8,
    /// BLE firmware.
    V5,
}

/// Per-device interpreter state for the Xbox family.
///
/// The firmware classification is a heuristic at construction time and
/// self-corrects while parsing: usages that only exist on newer firmware
/// upgrade it. It never downgrades within a session.
#[derive(Debug, Clone, Copy)]
pub struct XboxInterpreter {
    firmware: XboxFirmware,
}

impl XboxInterpreter {
    pub fn new(descriptor_len: usize) -> Self {
        let firmware = if descriptor_len > FW_4_8_DESCRIPTOR_LEN {
            info!("Xbox: assuming firmware v4.8 or v5.x");
            XboxFirmware::V4_8
        } else {
            // If it is really firmware 4.8, parsing corrects it later.
            info!("Xbox: assuming firmware v3.1");
            XboxFirmware::V3_1
        };
        Self { firmware }
    }

    pub fn firmware(&self) -> XboxFirmware {
        self.firmware
    }

    /// Some non-Xbox hardware advertises the Xbox controller's Bluetooth
    /// name (e.g. GameSir T3s in iOS mode) and must be treated as one.
    pub fn matches_name(name: &str) -> bool {
        name == XBOX_WIRELESS_NAME
    }

    /// Identity forced onto devices that match by name: the real
    /// vendor/product ids and the known-good FW 4.8 descriptor.
    pub fn identity_override() -> IdentityOverride {
        IdentityOverride {
            vendor_id: XBOX_WIRELESS_VID,
            product_id: XBOX_WIRELESS_PID,
            descriptor: HID_DESCRIPTOR_FW_4_8,
        }
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
        match self.firmware {
            XboxFirmware::V3_1 => self.parse_usage_v3_1(ctl, globals, usage_page, usage, value),
            // Valid for both v4.8 and v5.
            _ => self.parse_usage_v4_v5(ctl, globals, usage_page, usage, value),
        }
    }

    pub fn rumble(&self, magnitude: u8, duration: u8) -> OutgoingReport {
        encode_rumble(magnitude, duration)
    }

    fn parse_usage_v3_1(
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
                usages::USAGE_HAT => {
                    let hat = hat_to_value(globals, value);
                    gp.dpad = hat_to_dpad(hat);
                }
                usages::USAGE_SYSTEM_MAIN_MENU => {
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SYSTEM;
                    }
                }
                usages::USAGE_DPAD_UP
                | usages::USAGE_DPAD_DOWN
                | usages::USAGE_DPAD_RIGHT
                | usages::USAGE_DPAD_LEFT => apply_dpad_usage(usage, value, &mut gp.dpad),
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_GENERIC_DEVICE_CONTROLS => match usage {
                usages::USAGE_BATTERY_STRENGTH => ctl.battery = value.clamp(0, 255) as u8,
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_BUTTON => match usage {
                0x01 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_A;
                    }
                }
                0x02 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_B;
                    }
                }
                0x03 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_X;
                    }
                }
                0x04 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_Y;
                    }
                }
                0x05 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_SHOULDER_L;
                    }
                }
                0x06 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_SHOULDER_R;
                    }
                }
                0x07 => {
                    // View button.
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SELECT;
                    }
                }
                0x08 => {
                    // Menu button.
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_START;
                    }
                }
                0x09 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_THUMB_L;
                    }
                }
                0x0a => {
                    if value != 0 {
                        gp.buttons |= BUTTON_THUMB_R;
                    }
                }
                0x0f => {
                    // Only firmware 4.8 / 5.x reports this usage.
                    info!("Xbox: firmware 4.8 / 5.x detected");
                    self.firmware = XboxFirmware::V4_8;
                }
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_CONSUMER => match usage {
                // Reported by firmware 4.8+, no action on v3.1 tables.
                usages::USAGE_RECORD | usages::USAGE_AC_BACK => {}
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            _ => debug!(usage_page, usage, value, "Xbox: unsupported usage page"),
        }
    }

    // v4.8 / v5 are almost identical to the Android mappings.
    fn parse_usage_v4_v5(
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
                usages::USAGE_AXIS_Z => gp.axis_rx = normalize_axis(globals, value),
                usages::USAGE_AXIS_RZ => gp.axis_ry = normalize_axis(globals, value),
                usages::USAGE_HAT => {
                    let hat = hat_to_value(globals, value);
                    gp.dpad = hat_to_dpad(hat);
                }
                usages::USAGE_SYSTEM_MAIN_MENU => {
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SYSTEM;
                    }
                }
                usages::USAGE_DPAD_UP
                | usages::USAGE_DPAD_DOWN
                | usages::USAGE_DPAD_RIGHT
                | usages::USAGE_DPAD_LEFT => apply_dpad_usage(usage, value, &mut gp.dpad),
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_SIMULATION_CONTROLS => match usage {
                usages::USAGE_ACCELERATOR => {
                    gp.throttle = normalize_pedal(globals, value);
                    if gp.throttle >= TRIGGER_BUTTON_THRESHOLD {
                        gp.buttons |= BUTTON_TRIGGER_R;
                    }
                }
                usages::USAGE_BRAKE => {
                    gp.brake = normalize_pedal(globals, value);
                    if gp.brake >= TRIGGER_BUTTON_THRESHOLD {
                        gp.buttons |= BUTTON_TRIGGER_L;
                    }
                }
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_GENERIC_DEVICE_CONTROLS => match usage {
                usages::USAGE_BATTERY_STRENGTH => ctl.battery = value.clamp(0, 255) as u8,
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_BUTTON => match usage {
                0x01 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_A;
                    }
                }
                0x02 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_B;
                    }
                }
                0x04 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_X;
                    }
                }
                0x05 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_Y;
                    }
                }
                0x07 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_SHOULDER_L;
                    }
                }
                0x08 => {
                    if value != 0 {
                        gp.buttons |= BUTTON_SHOULDER_R;
                    }
                }
                0x0b => {
                    // Unused on v4.8, select on v5.
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SELECT;
                    }
                }
                0x0c => {
                    // Burger button.
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_START;
                    }
                }
                0x0d => {
                    // Xbox button.
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SYSTEM;
                    }
                }
                0x0e => {
                    if value != 0 {
                        gp.buttons |= BUTTON_THUMB_L;
                    }
                }
                0x0f => {
                    if value != 0 {
                        gp.buttons |= BUTTON_THUMB_R;
                    }
                }
                0x03 | 0x06 | 0x09 | 0x0a | 0x10 => {}
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            usages::PAGE_CONSUMER => match usage {
                usages::USAGE_RECORD => {
                    // Share button on model 1914; only firmware 5.x has it.
                    if self.firmware != XboxFirmware::V5 {
                        info!("Xbox: assuming firmware v5.x");
                        self.firmware = XboxFirmware::V5;
                    }
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_CAPTURE;
                    }
                }
                usages::USAGE_AC_BACK => {
                    // Back on v4.8 (not v5.x).
                    if value != 0 {
                        gp.misc_buttons |= MISC_BUTTON_SELECT;
                    }
                }
                // Xbox Adaptive Controller reports these; purpose unknown.
                usages::USAGE_ASSIGN_SELECTION
                | usages::USAGE_ORDER_MOVIE
                | usages::USAGE_MEDIA_SELECT_SECURITY => {}
                _ => debug!(usage_page, usage, value, "Xbox: unsupported usage"),
            },

            _ => debug!(usage_page, usage, value, "Xbox: unsupported usage page"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pedal_globals() -> HidGlobals {
        HidGlobals {
            logical_minimum: 0,
            logical_maximum: 1023,
            report_size: 10,
            ..HidGlobals::default()
        }
    }

    fn gamepad(ctl: &Controller) -> &openpad_controller_types::Gamepad {
        ctl.gamepad().expect("gamepad class")
    }

    #[test]
    fn descriptor_length_heuristic() {
        assert_eq!(XboxInterpreter::new(334).firmware(), XboxFirmware::V4_8);
        assert_eq!(XboxInterpreter::new(307).firmware(), XboxFirmware::V3_1);
    }

    #[test]
    fn trigger_threshold_is_inclusive() {
        let mut xbox = XboxInterpreter::new(334);
        let mut ctl = Controller::default();
        xbox.init_report(&mut ctl);

        xbox.parse_usage(
            &mut ctl,
            &pedal_globals(),
            usages::PAGE_SIMULATION_CONTROLS,
            usages::USAGE_ACCELERATOR,
            32,
        );
        assert_eq!(gamepad(&ctl).throttle, 32);
        assert_ne!(gamepad(&ctl).buttons & BUTTON_TRIGGER_R, 0);

        xbox.init_report(&mut ctl);
        xbox.parse_usage(
            &mut ctl,
            &pedal_globals(),
            usages::PAGE_SIMULATION_CONTROLS,
            usages::USAGE_ACCELERATOR,
            31,
        );
        assert_eq!(gamepad(&ctl).throttle, 31);
        assert_eq!(gamepad(&ctl).buttons & BUTTON_TRIGGER_R, 0);
    }

    #[test]
    fn brake_threshold_sets_left_trigger() {
        let mut xbox = XboxInterpreter::new(334);
        let mut ctl = Controller::default();
        xbox.init_report(&mut ctl);
        xbox.parse_usage(
            &mut ctl,
            &pedal_globals(),
            usages::PAGE_SIMULATION_CONTROLS,
            usages::USAGE_BRAKE,
            700,
        );
        assert_eq!(gamepad(&ctl).brake, 700);
        assert_ne!(gamepad(&ctl).buttons & BUTTON_TRIGGER_L, 0);
    }

    #[test]
    fn button_0x0f_upgrades_v3_1_irreversibly() {
        let mut xbox = XboxInterpreter::new(100);
        assert_eq!(xbox.firmware(), XboxFirmware::V3_1);

        let mut ctl = Controller::default();
        xbox.init_report(&mut ctl);
        xbox.parse_usage(&mut ctl, &HidGlobals::default(), usages::PAGE_BUTTON, 0x0f, 0);
        assert_eq!(xbox.firmware(), XboxFirmware::V4_8);

        // Nothing parses back to v3.1.
        xbox.parse_usage(&mut ctl, &HidGlobals::default(), usages::PAGE_BUTTON, 0x01, 1);
        xbox.parse_usage(
            &mut ctl,
            &HidGlobals::default(),
            usages::PAGE_GENERIC_DESKTOP,
            usages::USAGE_AXIS_X,
            0,
        );
        assert_eq!(xbox.firmware(), XboxFirmware::V4_8);
    }

    #[test]
    fn record_usage_upgrades_to_v5_and_sets_capture() {
        let mut xbox = XboxInterpreter::new(334);
        let mut ctl = Controller::default();
        xbox.init_report(&mut ctl);
        xbox.parse_usage(
            &mut ctl,
            &HidGlobals::default(),
            usages::PAGE_CONSUMER,
            usages::USAGE_RECORD,
            1,
        );
        assert_eq!(xbox.firmware(), XboxFirmware::V5);
        assert_ne!(gamepad(&ctl).misc_buttons & MISC_BUTTON_CAPTURE, 0);
    }

    #[test]
    fn axis_assignment_differs_between_revisions() {
        let globals = HidGlobals {
            logical_minimum: 0,
            logical_maximum: 255,
            report_size: 8,
            ..HidGlobals::default()
        };

        // v3.1: Z is the brake pedal.
        let mut old = XboxInterpreter::new(100);
        let mut ctl = Controller::default();
        old.init_report(&mut ctl);
        old.parse_usage(
            &mut ctl,
            &globals,
            usages::PAGE_GENERIC_DESKTOP,
            usages::USAGE_AXIS_Z,
            255,
        );
        assert_eq!(gamepad(&ctl).brake, 1020);
        assert_eq!(gamepad(&ctl).axis_rx, 0);

        // v4.8: Z is the right stick X axis.
        let mut new = XboxInterpreter::new(334);
        let mut ctl = Controller::default();
        new.init_report(&mut ctl);
        new.parse_usage(
            &mut ctl,
            &globals,
            usages::PAGE_GENERIC_DESKTOP,
            usages::USAGE_AXIS_Z,
            255,
        );
        assert_eq!(gamepad(&ctl).brake, 0);
        assert_eq!(gamepad(&ctl).axis_rx, 508);
    }

    #[test]
    fn name_match_is_exact() {
        assert!(XboxInterpreter::matches_name("Xbox Wireless Controller"));
        assert!(!XboxInterpreter::matches_name("Xbox Wireless Controller X"));
        assert!(!XboxInterpreter::matches_name("xbox wireless controller"));

        let identity = XboxInterpreter::identity_override();
        assert_eq!(identity.vendor_id, 0x045e);
        assert_eq!(identity.product_id, 0x02e0);
        assert_eq!(identity.descriptor.len(), 334);
    }
}
