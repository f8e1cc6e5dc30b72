//! Bluetooth mouse interpreter.
//!
//! Mouse reports are hit and miss: "unitless" deltas mean nothing by
//! themselves and unit-oriented reports (Apple Magic Mouse) need math that
//! is not worth doing. Since only a handful of mice are supported, the
//! per-model delta scale is hardcoded instead.

use openpad_controller_types::{
    Controller, ControllerClass, MOUSE_BUTTON_AUX_0, MOUSE_BUTTON_AUX_1, MOUSE_BUTTON_AUX_2,
    MOUSE_BUTTON_AUX_3, MOUSE_BUTTON_LEFT, MOUSE_BUTTON_MIDDLE, MOUSE_BUTTON_RIGHT,
};
use openpad_hid_common::{HidGlobals, usages};
use tracing::{debug, info};

struct MouseResolution {
    vendor_id: u16,
    product_id: u16,
    /// When set, the device name must match too (some vid/pid pairs are
    /// shared between models with different sensors).
    name: Option<&'static str>,
    scale: f32,
}

// Models with scale 1.0 need no entry.
const RESOLUTIONS: &[MouseResolution] = &[
    // Apple Magic Mouse 1st gen
    MouseResolution { vendor_id: 0x05ac, product_id: 0x030d, name: None, scale: 0.2 },
    // Apple Magic Mouse 2nd gen
    MouseResolution { vendor_id: 0x05ac, product_id: 0x0269, name: None, scale: 0.2 },
    MouseResolution { vendor_id: 0x004c, product_id: 0x0269, name: None, scale: 0.2 },
    // Apple Magic Trackpad 1st gen
    MouseResolution { vendor_id: 0x05ac, product_id: 0x030e, name: None, scale: 0.47 },
    // TECKNET 2600DPI; make the fast DPI mode usable
    MouseResolution { vendor_id: 0x0a5c, product_id: 0x4503, name: Some("BM30X mouse"), scale: 0.3334 },
    // Adesso iMouse M300
    MouseResolution { vendor_id: 0x0a5c, product_id: 0x4503, name: Some("Adesso Bluetooth 3.0 Mouse"), scale: 0.5 },
    // Bornd C170B
    MouseResolution { vendor_id: 0x0a5c, product_id: 0x0001, name: Some("BORND Bluetooth Mouse"), scale: 0.6667 },
    // Logitech M336 / M337 / M535
    MouseResolution { vendor_id: 0x046d, product_id: 0xb016, name: Some("Bluetooth Mouse M336/M337/M535"), scale: 0.3334 },
    // Logitech M-RCL124 MX Revolution
    MouseResolution { vendor_id: 0x046d, product_id: 0xb007, name: Some("Logitech MX Revolution Mouse"), scale: 0.3334 },
    // Kensington SureTrack Dual Wireless
    MouseResolution { vendor_id: 0xae24, product_id: 0x8618, name: Some("BT3.0 Mouse"), scale: 0.2 },
    // TECKNET "3 Modes, 2400 DPI"
    MouseResolution { vendor_id: 0xae24, product_id: 0x8618, name: Some("BM20X-3.0"), scale: 0.2 },
    // HP Z5000
    MouseResolution { vendor_id: 0x03f0, product_id: 0x084c, name: Some("HP Bluetooth Mouse Z5000"), scale: 0.5 },
    // LogiLink ID0078A
    MouseResolution { vendor_id: 0x046d, product_id: 0xb016, name: Some("ID0078A"), scale: 0.3334 },
    // Tank mouse
    MouseResolution { vendor_id: 0x248a, product_id: 0x8266, name: None, scale: 0.75 },
];

#[derive(Debug, Clone, Copy)]
pub struct MouseInterpreter {
    scale: f32,
}

impl MouseInterpreter {
    pub fn new(vendor_id: u16, product_id: u16, name: &str) -> Self {
        let scale = RESOLUTIONS
            .iter()
            .find(|r| {
                r.vendor_id == vendor_id
                    && r.product_id == product_id
                    && r.name.is_none_or(|n| n == name)
            })
            .map_or(1.0, |r| r.scale);
        info!(vendor_id, product_id, name, scale, "mouse resolution");
        Self { scale }
    }

    /// Scale a raw delta, clamp into -127..127 and never let real motion
    /// round to zero (a stream of zeros feels janky downstream).
    fn process_delta(&self, value: i32) -> i32 {
        if value == 0 {
            return 0;
        }
        let scaled = (value as f32 * self.scale).clamp(-127.0, 127.0);
        let out = scaled.round() as i32;
        if out == 0 { if value < 0 { -1 } else { 1 } } else { out }
    }

    pub fn init_report(&mut self, ctl: &mut Controller) {
        ctl.reset_as(ControllerClass::Mouse);
    }

    pub fn parse_usage(
        &mut self,
        ctl: &mut Controller,
        _globals: &HidGlobals,
        usage_page: u16,
        usage: u16,
        value: i32,
    ) {
        let ms = ctl.mouse_mut();
        match usage_page {
            usages::PAGE_GENERIC_DESKTOP => match usage {
                usages::USAGE_AXIS_X => ms.delta_x = self.process_delta(value),
                usages::USAGE_AXIS_Y => ms.delta_y = self.process_delta(value),
                usages::USAGE_WHEEL => ms.scroll_wheel = value.clamp(-128, 127) as i8,
                _ => debug!(usage_page, usage, value, "Mouse: unsupported usage"),
            },

            usages::PAGE_BUTTON => {
                let bit = match usage {
                    0x01 => Some(MOUSE_BUTTON_LEFT),
                    0x02 => Some(MOUSE_BUTTON_RIGHT),
                    0x03 => Some(MOUSE_BUTTON_MIDDLE),
                    0x04 => Some(MOUSE_BUTTON_AUX_0), // back
                    0x05 => Some(MOUSE_BUTTON_AUX_1), // forward
                    0x06 => Some(MOUSE_BUTTON_AUX_2), // tilt wheel left
                    0x07 => Some(MOUSE_BUTTON_AUX_3), // tilt wheel right
                    _ => None,
                };
                match bit {
                    Some(bit) => {
                        if value != 0 {
                            ms.buttons |= bit;
                        }
                    }
                    None => debug!(usage_page, usage, value, "Mouse: unsupported button"),
                }
            }

            _ => debug!(usage_page, usage, value, "Mouse: unsupported usage page"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mouse_uses_unit_scale() {
        let mut mouse = MouseInterpreter::new(0x1111, 0x2222, "whatever");
        let mut ctl = Controller::default();
        mouse.init_report(&mut ctl);
        mouse.parse_usage(
            &mut ctl,
            &HidGlobals::default(),
            usages::PAGE_GENERIC_DESKTOP,
            usages::USAGE_AXIS_X,
            42,
        );
        assert_eq!(ctl.mouse().unwrap().delta_x, 42);
    }

    #[test]
    fn magic_mouse_deltas_are_scaled_down() {
        let mut mouse = MouseInterpreter::new(0x05ac, 0x030d, "");
        let mut ctl = Controller::default();
        mouse.init_report(&mut ctl);
        mouse.parse_usage(
            &mut ctl,
            &HidGlobals::default(),
            usages::PAGE_GENERIC_DESKTOP,
            usages::USAGE_AXIS_X,
            100,
        );
        assert_eq!(ctl.mouse().unwrap().delta_x, 20);
    }

    #[test]
    fn small_motion_never_rounds_to_zero() {
        let mouse = MouseInterpreter::new(0x05ac, 0x030d, "");
        assert_eq!(mouse.process_delta(1), 1);
        assert_eq!(mouse.process_delta(-1), -1);
        assert_eq!(mouse.process_delta(0), 0);
    }

    #[test]
    fn deltas_clamped_to_quadrature_range() {
        let mouse = MouseInterpreter::new(0x1111, 0x2222, "");
        assert_eq!(mouse.process_delta(1000), 127);
        assert_eq!(mouse.process_delta(-1000), -127);
    }

    #[test]
    fn name_disambiguates_shared_ids() {
        // Same vid/pid, different sensors.
        let tecknet = MouseInterpreter::new(0x0a5c, 0x4503, "BM30X mouse");
        let adesso = MouseInterpreter::new(0x0a5c, 0x4503, "Adesso Bluetooth 3.0 Mouse");
        assert_eq!(tecknet.process_delta(100), 33);
        assert_eq!(adesso.process_delta(100), 50);
    }

    #[test]
    fn buttons_map() {
        let mut mouse = MouseInterpreter::new(0, 0, "");
        let mut ctl = Controller::default();
        mouse.init_report(&mut ctl);
        mouse.parse_usage(&mut ctl, &HidGlobals::default(), usages::PAGE_BUTTON, 0x01, 1);
        mouse.parse_usage(&mut ctl, &HidGlobals::default(), usages::PAGE_BUTTON, 0x03, 1);
        assert_eq!(
            ctl.mouse().unwrap().buttons,
            MOUSE_BUTTON_LEFT | MOUSE_BUTTON_MIDDLE
        );
    }
}
