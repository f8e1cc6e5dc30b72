//! Stateless field normalization.
//!
//! Converts raw HID field values into the canonical model ranges: bipolar
//! axes into -512..511, unipolar pedals into 0..1023, hat switches into the
//! D-pad bitmask.

use crate::HidGlobals;
use openpad_controller_types::{
    AXIS_NORMALIZE_RANGE, DPAD_DOWN, DPAD_LEFT, DPAD_RIGHT, DPAD_UP, PEDAL_MAX,
};
use tracing::{debug, warn};

/// Sentinel for "hat reports no direction".
pub const HAT_NULL: u8 = 0xff;

/// Resolve the usable logical range of a field.
///
/// Some devices report an unsigned maximum that aliases to -1 when read as
/// signed (e.g. 0xff in an 8-bit item); recompute it from the report size
/// in that case.
fn logical_range(globals: &HidGlobals) -> i64 {
    let min = globals.logical_minimum as i64;
    let mut max = globals.logical_maximum as i64;
    if max == -1 {
        max = (1i64 << globals.report_size.min(32)) - 1;
    }
    (max - min) + 1
}

/// Normalize a bipolar axis value into -512..511, with 0 meaning "at rest".
///
/// The value is centered first and scaled second; the other order rounds
/// differently.
pub fn normalize_axis(globals: &HidGlobals, value: i32) -> i32 {
    let range = logical_range(globals);
    if range <= 0 {
        warn!(
            min = globals.logical_minimum,
            max = globals.logical_maximum,
            "axis field with empty logical range"
        );
        return 0;
    }
    let centered = value as i64 - range / 2 - globals.logical_minimum as i64;
    let normalized = centered * AXIS_NORMALIZE_RANGE as i64 / range;
    normalized.clamp(
        -(AXIS_NORMALIZE_RANGE as i64) / 2,
        AXIS_NORMALIZE_RANGE as i64 / 2 - 1,
    ) as i32
}

/// Normalize a unipolar pedal/trigger value into 0..1023. No centering.
pub fn normalize_pedal(globals: &HidGlobals, value: i32) -> i32 {
    let range = logical_range(globals);
    if range <= 0 {
        warn!(
            min = globals.logical_minimum,
            max = globals.logical_maximum,
            "pedal field with empty logical range"
        );
        return 0;
    }
    let normalized = value as i64 * AXIS_NORMALIZE_RANGE as i64 / range;
    normalized.clamp(0, PEDAL_MAX as i64) as i32
}

/// Rebase a hat-switch value so 0 means "up". Values outside the logical
/// range mean the hat is released and map to [`HAT_NULL`].
pub fn hat_to_value(globals: &HidGlobals, value: i32) -> u8 {
    if value < globals.logical_minimum || value > globals.logical_maximum {
        return HAT_NULL;
    }
    (value - globals.logical_minimum) as u8
}

/// Convert an 8-direction hat value (0 = up, clockwise) into D-pad bits.
/// Diagonals set two bits; [`HAT_NULL`] and 8 set none.
pub fn hat_to_dpad(hat: u8) -> u8 {
    match hat {
        HAT_NULL | 8 => 0,
        0 => DPAD_UP,
        1 => DPAD_UP | DPAD_RIGHT,
        2 => DPAD_RIGHT,
        3 => DPAD_RIGHT | DPAD_DOWN,
        4 => DPAD_DOWN,
        5 => DPAD_DOWN | DPAD_LEFT,
        6 => DPAD_LEFT,
        7 => DPAD_LEFT | DPAD_UP,
        _ => {
            warn!(hat, "hat value out of range");
            0
        }
    }
}

/// Set or clear one D-pad bit from a discrete directional usage.
/// Unknown usages are ignored.
pub fn apply_dpad_usage(usage: u16, value: i32, dpad: &mut u8) {
    let bit = match usage {
        crate::usages::USAGE_DPAD_UP => DPAD_UP,
        crate::usages::USAGE_DPAD_DOWN => DPAD_DOWN,
        crate::usages::USAGE_DPAD_RIGHT => DPAD_RIGHT,
        crate::usages::USAGE_DPAD_LEFT => DPAD_LEFT,
        _ => {
            debug!(usage, "unsupported dpad usage");
            return;
        }
    };
    if value != 0 {
        *dpad |= bit;
    } else {
        *dpad &= !bit;
    }
}
