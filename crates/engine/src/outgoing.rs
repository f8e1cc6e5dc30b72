//! Outgoing packet flushing.
//!
//! The transport owns the actual send primitive; the engine drains the
//! shared circular buffer towards it. Flushing is gated per connection:
//! packets for links that are not `DeviceReady` yet stay queued (setup
//! commands are produced before the handshake finishes), and packets
//! whose channel id no longer maps to any device are dropped silently —
//! teardown invalidates everything still queued for that connection.

use crate::device::DeviceRegistry;
use openpad_command_buffer::SharedCommandBuffer;
use tracing::{debug, trace, warn};

/// Transport send primitive, owned by the excluded transport layer.
pub trait Transport {
    /// Transmit one packet on the given channel. Errors are logged and
    /// the packet is dropped; feedback is best-effort.
    fn send(&mut self, cid: u16, data: &[u8]) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport send failed: {0}")]
pub struct TransportError(pub String);

/// Drain the buffer once. Returns how many packets were transmitted.
///
/// One pass over the queued packets: ready connections send, not-ready
/// ones re-queue (preserving relative order), gone ones drop.
pub fn flush_queued<T: Transport>(
    buffer: &SharedCommandBuffer,
    registry: &DeviceRegistry,
    transport: &mut T,
) -> usize {
    let mut sent = 0;
    let mut requeue = Vec::new();

    while let Ok(packet) = buffer.get() {
        match registry.get_for_cid(packet.cid()) {
            Some(device) if device.conn.is_ready() => {
                match transport.send(packet.cid(), packet.payload()) {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        warn!(cid = packet.cid(), %err, "send failed, dropping packet")
                    }
                }
            }
            Some(device) => {
                debug!(
                    cid = packet.cid(),
                    state = ?device.conn.state(),
                    "connection not ready, keeping packet queued"
                );
                requeue.push(packet);
            }
            None => {
                // The connection is gone; its queued packets die with it.
                trace!(cid = packet.cid(), "dropping packet for unknown connection");
            }
        }
    }

    for packet in requeue {
        if buffer.put(packet.cid(), packet.payload()).is_err() {
            warn!(cid = packet.cid(), "buffer full while re-queueing, dropping packet");
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bt::conn::{BdAddr, ConnectionState, TransportProtocol};

    #[derive(Default)]
    pub struct MockTransport {
        pub sent: Vec<(u16, Vec<u8>)>,
        pub fail: bool,
    }

    impl Transport for MockTransport {
        fn send(&mut self, cid: u16, data: &[u8]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError("radio off".into()));
            }
            self.sent.push((cid, data.to_vec()));
            Ok(())
        }
    }

    fn ready_device(registry: &mut DeviceRegistry, last: u8, cid: u16) {
        let device = registry.create(BdAddr([0, 0, 0, 0, 0, last])).unwrap();
        device.conn.set_protocol(TransportProtocol::Le).unwrap();
        device.conn.interrupt_cid = cid;
        device.conn.set_state(ConnectionState::Discovered).unwrap();
        device
            .conn
            .set_state(ConnectionState::DevicePendingReady)
            .unwrap();
        device.conn.set_state(ConnectionState::DeviceReady).unwrap();
    }

    #[test]
    fn ready_packets_are_sent_in_order() {
        let mut registry = DeviceRegistry::new();
        ready_device(&mut registry, 1, 0x41);
        let buffer = SharedCommandBuffer::new();
        buffer.put(0x41, &[1]).unwrap();
        buffer.put(0x41, &[2]).unwrap();

        let mut transport = MockTransport::default();
        assert_eq!(flush_queued(&buffer, &registry, &mut transport), 2);
        assert_eq!(transport.sent, vec![(0x41, vec![1]), (0x41, vec![2])]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn packets_for_gone_connections_are_dropped() {
        let registry = DeviceRegistry::new();
        let buffer = SharedCommandBuffer::new();
        buffer.put(0x99, &[1, 2, 3]).unwrap();

        let mut transport = MockTransport::default();
        assert_eq!(flush_queued(&buffer, &registry, &mut transport), 0);
        assert!(transport.sent.is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn packets_for_not_ready_connections_stay_queued() {
        let mut registry = DeviceRegistry::new();
        let device = registry.create(BdAddr([0, 0, 0, 0, 0, 1])).unwrap();
        device.conn.interrupt_cid = 0x41;

        let buffer = SharedCommandBuffer::new();
        buffer.put(0x41, &[7]).unwrap();

        let mut transport = MockTransport::default();
        assert_eq!(flush_queued(&buffer, &registry, &mut transport), 0);
        assert!(transport.sent.is_empty());
        assert!(!buffer.is_empty());
    }

    #[test]
    fn send_failure_drops_the_packet() {
        let mut registry = DeviceRegistry::new();
        ready_device(&mut registry, 1, 0x41);
        let buffer = SharedCommandBuffer::new();
        buffer.put(0x41, &[1]).unwrap();

        let mut transport = MockTransport {
            fail: true,
            ..MockTransport::default()
        };
        assert_eq!(flush_queued(&buffer, &registry, &mut transport), 0);
        assert!(buffer.is_empty());
    }
}
