//! Interpreter dispatch.
//!
//! One closed variant set instead of open-ended registration: every
//! supported device class is a [`DeviceInterpreter`] variant, so mapping
//! tables stay exhaustive and dispatch is a plain match. Not every variant
//! implements every capability; callers check the `has_*` queries before
//! invoking the optional operations (the `set_*` operations return `None`
//! when the capability is absent).
//!
//! Each variant owns its private per-device state inside its struct. The
//! total size is bounded: interpreter state is embedded in every device
//! record, so an oversized variant is a compile-time error.

use openpad_controller_types::Controller;
use openpad_hid_common::{HidGlobals, OutgoingReport};
use openpad_hid_dualshock_protocol::Ds4Interpreter;
use openpad_hid_generic_protocol::{GenericInterpreter, KeyboardInterpreter, MouseInterpreter};
use openpad_hid_icade_protocol::ICadeInterpreter;
use openpad_hid_ouya_protocol::OuyaInterpreter;
use openpad_hid_xbox_protocol::XboxInterpreter;

/// Upper bound on any single interpreter's private state.
pub const MAX_INTERPRETER_STATE: usize = 192;

const _: () = assert!(core::mem::size_of::<XboxInterpreter>() <= MAX_INTERPRETER_STATE);
const _: () = assert!(core::mem::size_of::<Ds4Interpreter>() <= MAX_INTERPRETER_STATE);
const _: () = assert!(core::mem::size_of::<OuyaInterpreter>() <= MAX_INTERPRETER_STATE);
const _: () = assert!(core::mem::size_of::<ICadeInterpreter>() <= MAX_INTERPRETER_STATE);
const _: () = assert!(core::mem::size_of::<GenericInterpreter>() <= MAX_INTERPRETER_STATE);
const _: () = assert!(core::mem::size_of::<MouseInterpreter>() <= MAX_INTERPRETER_STATE);
const _: () = assert!(core::mem::size_of::<KeyboardInterpreter>() <= MAX_INTERPRETER_STATE);

/// Device classification, decided before the interpreter is constructed
/// (by name, vendor/product ids, or class of device, in that order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    Xbox,
    DualShock4,
    Ouya,
    ICade,
    Generic,
    Mouse,
    Keyboard,
}

/// The active usage interpreter of one device.
pub enum DeviceInterpreter {
    Xbox(XboxInterpreter),
    DualShock4(Ds4Interpreter),
    Ouya(OuyaInterpreter),
    ICade(ICadeInterpreter),
    Generic(GenericInterpreter),
    Mouse(MouseInterpreter),
    Keyboard(KeyboardInterpreter),
}

impl DeviceInterpreter {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Xbox(_) => "xbox",
            Self::DualShock4(_) => "dualshock4",
            Self::Ouya(_) => "ouya",
            Self::ICade(_) => "icade",
            Self::Generic(_) => "generic",
            Self::Mouse(_) => "mouse",
            Self::Keyboard(_) => "keyboard",
        }
    }

    // Capability presence. Callers check these before invoking the
    // corresponding operation.

    /// iCade scancodes are edge-triggered; clearing the model between
    /// reports would drop held buttons.
    pub fn has_init_report(&self) -> bool {
        !matches!(self, Self::ICade(_))
    }

    /// Descriptor-less devices parse the raw byte stream instead.
    pub fn has_raw_report(&self) -> bool {
        matches!(self, Self::DualShock4(_))
    }

    pub fn has_parse_usage(&self) -> bool {
        !matches!(self, Self::DualShock4(_))
    }

    pub fn has_rumble(&self) -> bool {
        matches!(self, Self::Xbox(_) | Self::DualShock4(_))
    }

    pub fn has_player_leds(&self) -> bool {
        matches!(self, Self::Ouya(_))
    }

    pub fn has_lightbar_color(&self) -> bool {
        matches!(self, Self::DualShock4(_))
    }

    /// Reports to transmit right after setup (e.g. the DualShock
    /// lightbar-enable and calibration request).
    pub fn setup_reports(&mut self) -> Vec<OutgoingReport> {
        match self {
            Self::DualShock4(ds4) => ds4.setup(),
            _ => Vec::new(),
        }
    }

    /// Reset the model to a zeroed baseline of the right class. Reports
    /// are full snapshots; this runs before every report for every
    /// interpreter that has the capability.
    pub fn init_report(&mut self, ctl: &mut Controller) {
        match self {
            Self::Xbox(i) => i.init_report(ctl),
            Self::DualShock4(i) => i.init_report(ctl),
            Self::Ouya(i) => i.init_report(ctl),
            Self::ICade(_) => {}
            Self::Generic(i) => i.init_report(ctl),
            Self::Mouse(i) => i.init_report(ctl),
            Self::Keyboard(i) => i.init_report(ctl),
        }
    }

    pub fn parse_raw_report(&mut self, ctl: &mut Controller, report: &[u8]) {
        if let Self::DualShock4(ds4) = self {
            ds4.parse_raw_report(ctl, report);
        }
    }

    pub fn parse_usage(
        &mut self,
        ctl: &mut Controller,
        globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        match self {
            Self::Xbox(i) => i.parse_usage(ctl, globals, usage_page, usage, value),
            Self::DualShock4(_) => {}
            Self::Ouya(i) => i.parse_usage(ctl, globals, usage_page, usage, value),
            Self::ICade(i) => i.parse_usage(ctl, globals, usage_page, usage, value),
            Self::Generic(i) => i.parse_usage(ctl, globals, usage_page, usage, value),
            Self::Mouse(i) => i.parse_usage(ctl, globals, usage_page, usage, value),
            Self::Keyboard(i) => i.parse_usage(ctl, globals, usage_page, usage, value),
        }
    }

    /// Feature-report responses (DualShock calibration exchange). May
    /// return a follow-up request to transmit.
    pub fn parse_feature_report(&mut self, report: &[u8]) -> Option<OutgoingReport> {
        match self {
            Self::DualShock4(ds4) => ds4.parse_feature_report(report),
            _ => None,
        }
    }

    pub fn set_rumble(&mut self, magnitude: u8, duration: u8) -> Option<OutgoingReport> {
        match self {
            Self::Xbox(i) => Some(i.rumble(magnitude, duration)),
            Self::DualShock4(i) => Some(i.set_rumble(magnitude, duration)),
            _ => None,
        }
    }

    pub fn set_player_leds(&mut self, leds: u8) -> Option<OutgoingReport> {
        match self {
            Self::Ouya(i) => Some(i.player_leds(leds)),
            _ => None,
        }
    }

    pub fn set_lightbar_color(&mut self, red: u8, green: u8, blue: u8) -> Option<OutgoingReport> {
        match self {
            Self::DualShock4(i) => Some(i.set_lightbar_color(red, green, blue)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_matrix() {
        let xbox = DeviceInterpreter::Xbox(XboxInterpreter::new(334));
        assert!(xbox.has_init_report());
        assert!(xbox.has_parse_usage());
        assert!(!xbox.has_raw_report());
        assert!(xbox.has_rumble());
        assert!(!xbox.has_lightbar_color());

        let ds4 = DeviceInterpreter::DualShock4(Ds4Interpreter::new());
        assert!(ds4.has_raw_report());
        assert!(!ds4.has_parse_usage());
        assert!(ds4.has_rumble());
        assert!(ds4.has_lightbar_color());
        assert!(!ds4.has_player_leds());

        let icade = DeviceInterpreter::ICade(ICadeInterpreter::new(0x15e4, 1));
        assert!(!icade.has_init_report());
        assert!(icade.has_parse_usage());
        assert!(!icade.has_rumble());

        let ouya = DeviceInterpreter::Ouya(OuyaInterpreter::new());
        assert!(ouya.has_player_leds());
    }

    #[test]
    fn absent_capability_returns_none() {
        let mut generic = DeviceInterpreter::Generic(GenericInterpreter::new());
        assert!(generic.set_rumble(255, 255).is_none());
        assert!(generic.set_player_leds(0x0f).is_none());
        assert!(generic.set_lightbar_color(1, 2, 3).is_none());
        assert!(generic.setup_reports().is_empty());
    }
}
