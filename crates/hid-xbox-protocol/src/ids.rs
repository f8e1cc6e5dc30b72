//! Xbox Wireless Controller identifiers.

/// Microsoft.
pub const XBOX_WIRELESS_VID: u16 = 0x045e;
/// Xbox One S controller over Bluetooth.
pub const XBOX_WIRELESS_PID: u16 = 0x02e0;

/// Bluetooth name the controller (and hardware that impersonates it, like
/// the GameSir T3s in iOS mode) advertises.
pub const XBOX_WIRELESS_NAME: &str = "Xbox Wireless Controller";
