//! Bluetooth connection lifecycle and pairing control.

pub mod conn;
pub mod keys;

pub use conn::{BdAddr, BtConnection, ConnectionState, INVALID_HANDLE, TransportProtocol};
pub use keys::{BtControl, BtControlHandle, LinkKey, MAX_STORED_KEYS};
