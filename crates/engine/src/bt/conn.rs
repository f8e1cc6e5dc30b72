//! Bluetooth connection record and lifecycle state machine.
//!
//! One [`BtConnection`] exists per physical link. The state machine is
//! strictly monotonic on the happy path; the only way back is
//! [`BtConnection::disconnect`]. Transitions are validated against a
//! per-transport allowed-predecessor set:
//!
//! - BR/EDR walks the full chain. Two orderings are legal for the SDP
//!   block (before L2CAP for first-gen DualShock 4, after L2CAP for
//!   Switch-style controllers), and the remote-name stage may be skipped
//!   for incoming links that delivered their name with the connection
//!   request.
//! - LE skips the BR/EDR-only stages entirely:
//!   `None -> Discovered -> DevicePendingReady -> DeviceReady`.
//! - While the protocol is still `None`, only `Discovered` is reachable;
//!   the transport must be tagged before the handshake proceeds.
//!
//! A rejected transition is a protocol error: the caller logs it and
//! tears the connection down, it is never silently coerced.

use crate::error::{EngineError, EngineResult};
use std::fmt;
use tracing::{debug, info, warn};

/// Link handle value meaning "no handle assigned".
pub const INVALID_HANDLE: u16 = 0xffff;

/// Bluetooth device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr(pub [u8; 6]);

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

/// Which transport the link runs on. Set once after discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportProtocol {
    #[default]
    None,
    BrEdr,
    Le,
}

/// Connection lifecycle states, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    None,
    Discovered,
    RemoteNameRequest,
    RemoteNameInquired,
    RemoteNameFetched,
    SdpVendorRequested,
    SdpVendorFetched,
    SdpHidDescriptorRequested,
    SdpHidDescriptorFetched,
    L2capControlRequested,
    L2capControlConnected,
    L2capInterruptRequested,
    L2capInterruptConnected,
    DevicePendingReady,
    DeviceReady,
}

/// Allowed predecessor states for `to` on a BR/EDR link.
fn predecessors_br_edr(to: ConnectionState) -> &'static [ConnectionState] {
    use ConnectionState as S;
    match to {
        S::None => &[],
        S::Discovered => &[S::None],
        S::RemoteNameRequest => &[S::Discovered],
        S::RemoteNameInquired => &[S::RemoteNameRequest],
        S::RemoteNameFetched => &[S::RemoteNameRequest, S::RemoteNameInquired],
        // SDP either directly after discovery/naming, or after the
        // interrupt channel opened (query-after-connect devices).
        S::SdpVendorRequested => &[S::Discovered, S::RemoteNameFetched, S::L2capInterruptConnected],
        S::SdpVendorFetched => &[S::SdpVendorRequested],
        S::SdpHidDescriptorRequested => &[S::SdpVendorFetched],
        S::SdpHidDescriptorFetched => &[S::SdpHidDescriptorRequested],
        S::L2capControlRequested => &[
            S::Discovered,
            S::RemoteNameFetched,
            S::SdpHidDescriptorFetched,
        ],
        S::L2capControlConnected => &[S::L2capControlRequested],
        S::L2capInterruptRequested => &[S::L2capControlConnected],
        S::L2capInterruptConnected => &[S::L2capInterruptRequested],
        S::DevicePendingReady => &[S::L2capInterruptConnected, S::SdpHidDescriptorFetched],
        S::DeviceReady => &[S::DevicePendingReady],
    }
}

/// Allowed predecessor states for `to` on an LE link. The remote-name and
/// SDP stages are BR/EDR-only and invalid here.
fn predecessors_le(to: ConnectionState) -> &'static [ConnectionState] {
    use ConnectionState as S;
    match to {
        S::Discovered => &[S::None],
        S::DevicePendingReady => &[S::Discovered],
        S::DeviceReady => &[S::DevicePendingReady],
        _ => &[],
    }
}

fn predecessors(to: ConnectionState, protocol: TransportProtocol) -> &'static [ConnectionState] {
    use ConnectionState as S;
    match protocol {
        TransportProtocol::BrEdr => predecessors_br_edr(to),
        TransportProtocol::Le => predecessors_le(to),
        // Without a transport tag only discovery is possible.
        TransportProtocol::None => match to {
            S::Discovered => &[S::None],
            _ => &[],
        },
    }
}

/// Per-link connection record. Owned by the connection state machine; the
/// device record refers to it through the link identifiers only.
#[derive(Debug, Clone)]
pub struct BtConnection {
    addr: BdAddr,
    handle: u16,

    /// L2CAP channel ids (BR/EDR) or their LE equivalents.
    pub control_cid: u16,
    pub interrupt_cid: u16,

    // BR/EDR only.
    pub page_scan_repetition_mode: u8,
    pub clock_offset: u16,

    // BLE and BR/EDR.
    pub rssi: u8,

    incoming: bool,
    connected: bool,

    state: ConnectionState,
    protocol: TransportProtocol,
}

impl BtConnection {
    pub fn new(addr: BdAddr) -> Self {
        Self {
            addr,
            handle: INVALID_HANDLE,
            control_cid: 0,
            interrupt_cid: 0,
            page_scan_repetition_mode: 0,
            clock_offset: 0,
            rssi: 0,
            incoming: false,
            connected: false,
            state: ConnectionState::None,
            protocol: TransportProtocol::None,
        }
    }

    /// Reset to the freshly-constructed state, keeping the address.
    pub fn init(&mut self) {
        *self = Self::new(self.addr);
    }

    pub fn address(&self) -> BdAddr {
        self.addr
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Advance the lifecycle. Same-state sets are no-ops; anything not in
    /// the allowed predecessor set for this transport is rejected.
    pub fn set_state(&mut self, state: ConnectionState) -> EngineResult<()> {
        if state == self.state {
            debug!(addr = %self.addr, ?state, "connection already in state");
            return Ok(());
        }
        if !predecessors(state, self.protocol).contains(&self.state) {
            warn!(
                addr = %self.addr,
                from = ?self.state,
                to = ?state,
                protocol = ?self.protocol,
                "illegal connection state transition"
            );
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: state,
                protocol: self.protocol,
            });
        }
        debug!(addr = %self.addr, from = ?self.state, to = ?state, "connection state");
        self.state = state;
        Ok(())
    }

    pub fn protocol(&self) -> TransportProtocol {
        self.protocol
    }

    /// Tag the transport. Set once; re-tagging with a different protocol
    /// is an error.
    pub fn set_protocol(&mut self, protocol: TransportProtocol) -> EngineResult<()> {
        if self.protocol != TransportProtocol::None && self.protocol != protocol {
            return Err(EngineError::ProtocolAlreadySet {
                current: self.protocol,
            });
        }
        self.protocol = protocol;
        Ok(())
    }

    pub fn handle(&self) -> u16 {
        self.handle
    }

    pub fn set_handle(&mut self, handle: u16) {
        self.handle = handle;
    }

    pub fn is_incoming(&self) -> bool {
        self.incoming
    }

    pub fn set_incoming(&mut self, incoming: bool) {
        self.incoming = incoming;
    }

    /// Raw link-level connect/disconnect, independent of handshake
    /// progress.
    pub fn set_connected(&mut self, connected: bool) {
        if self.connected == connected {
            info!(addr = %self.addr, connected, "connection already in requested link state, ignoring");
            return;
        }
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::DeviceReady
    }

    /// Tear the connection down. Legal from any state and idempotent:
    /// disconnecting an already-disconnected record is a no-op.
    pub fn disconnect(&mut self) {
        if !self.connected && self.state == ConnectionState::None {
            debug!(addr = %self.addr, "already disconnected");
            return;
        }
        info!(addr = %self.addr, "disconnecting");
        self.connected = false;
        self.state = ConnectionState::None;
        self.handle = INVALID_HANDLE;
        self.control_cid = 0;
        self.interrupt_cid = 0;
    }
}
