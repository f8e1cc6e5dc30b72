//! DualShock 4 identifiers.

/// Sony Interactive Entertainment.
pub const SONY_VID: u16 = 0x054c;
/// DualShock 4 first generation (CUH-ZCT1).
pub const DS4_V1_PID: u16 = 0x05c4;
/// DualShock 4 second generation (CUH-ZCT2).
pub const DS4_V2_PID: u16 = 0x09cc;
