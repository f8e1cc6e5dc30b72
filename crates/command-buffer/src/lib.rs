//! Bounded circular buffer for outgoing command packets
//!
//! Feedback commands (rumble, LEDs, lightbar) are generated at
//! report-parsing time but transmitted whenever the transport can send.
//! This crate decouples the two with a fixed-capacity ring of packets
//! tagged by connection id: multiple connected controllers can queue
//! packets concurrently (think of eight gamepads all told to rumble at
//! once) and the transport drains them in FIFO order.
//!
//! The ring never blocks and never allocates per packet: `put` and `get`
//! are O(1) and fail with a typed error instead of waiting. Dropped
//! packets are not retried here — feedback is best-effort and any retry
//! policy belongs to the caller.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use thiserror::Error;

/// How many packets can be queued across all connections.
pub const BUFFER_CAPACITY: usize = 32;

/// Maximum payload size of a single packet.
pub const MAX_PAYLOAD: usize = 128;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("Buffer is full")]
    BufferFull,

    #[error("Buffer is empty")]
    BufferEmpty,

    #[error("Payload too large: {len} bytes, max {MAX_PAYLOAD}")]
    PayloadTooLarge { len: usize },
}

pub type BufferResult<T> = Result<T, BufferError>;

/// One queued packet. Entries are plain values copied into and out of the
/// ring; nothing borrows into ring storage.
#[derive(Debug, Clone, Copy)]
pub struct Packet {
    cid: u16,
    len: usize,
    data: [u8; MAX_PAYLOAD],
}

impl Packet {
    pub fn cid(&self) -> u16 {
        self.cid
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            cid: 0,
            len: 0,
            data: [0; MAX_PAYLOAD],
        }
    }
}

/// Fixed-capacity FIFO of outgoing packets.
///
/// One slot is kept empty to distinguish full from empty, so the ring
/// holds at most `BUFFER_CAPACITY - 1` packets at a time.
pub struct CommandBuffer {
    buffer: Box<[Packet; BUFFER_CAPACITY]>,
    head: usize,
    tail: usize,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self {
            buffer: Box::new([Packet::default(); BUFFER_CAPACITY]),
            head: 0,
            tail: 0,
        }
    }

    /// Queue a packet for the given connection id. The packet is dropped
    /// (not stored, not retried) when the ring is full or the payload
    /// oversized.
    pub fn put(&mut self, cid: u16, data: &[u8]) -> BufferResult<()> {
        if self.is_full() {
            return Err(BufferError::BufferFull);
        }
        if data.len() > MAX_PAYLOAD {
            return Err(BufferError::PayloadTooLarge { len: data.len() });
        }
        let slot = &mut self.buffer[self.tail];
        slot.cid = cid;
        slot.len = data.len();
        slot.data[..data.len()].copy_from_slice(data);

        self.tail = (self.tail + 1) % BUFFER_CAPACITY;
        Ok(())
    }

    /// Dequeue the oldest packet.
    pub fn get(&mut self) -> BufferResult<Packet> {
        if self.is_empty() {
            return Err(BufferError::BufferEmpty);
        }
        let packet = self.buffer[self.head];
        self.head = (self.head + 1) % BUFFER_CAPACITY;
        Ok(packet)
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        (self.tail + 1) % BUFFER_CAPACITY == self.head
    }

    /// Drop all queued packets. Used on transport-level reinitialization.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutex-serialized handle shared between the producer (report parsing /
/// feedback requests) and consumer (transport send loop) contexts.
///
/// All head/tail accesses happen inside the critical section; there is no
/// way to observe ring indices without holding the lock.
#[derive(Clone, Default)]
pub struct SharedCommandBuffer {
    inner: Arc<Mutex<CommandBuffer>>,
}

impl SharedCommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, cid: u16, data: &[u8]) -> BufferResult<()> {
        self.lock().put(cid, data)
    }

    pub fn get(&self) -> BufferResult<Packet> {
        self.lock().get()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    pub fn reset(&self) {
        self.lock().reset()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CommandBuffer> {
        // A poisoned lock means a panic while holding it; the ring state
        // is still structurally valid (plain indices and value slots).
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut buf = CommandBuffer::new();
        assert!(buf.is_empty());

        buf.put(0x41, &[1, 2, 3]).unwrap();
        let packet = buf.get().unwrap();
        assert_eq!(packet.cid(), 0x41);
        assert_eq!(packet.payload(), &[1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn fifo_order_preserved() {
        let mut buf = CommandBuffer::new();
        for i in 0..4u16 {
            buf.put(i, &[i as u8]).unwrap();
        }
        for i in 0..4u16 {
            let packet = buf.get().unwrap();
            assert_eq!(packet.cid(), i);
            assert_eq!(packet.payload(), &[i as u8]);
        }
    }

    #[test]
    fn get_on_empty() {
        let mut buf = CommandBuffer::new();
        assert_eq!(buf.get().unwrap_err(), BufferError::BufferEmpty);
    }

    #[test]
    fn put_beyond_capacity_leaves_content_unchanged() {
        let mut buf = CommandBuffer::new();
        for i in 0..BUFFER_CAPACITY - 1 {
            buf.put(i as u16, &[i as u8]).unwrap();
        }
        assert!(buf.is_full());
        assert_eq!(buf.put(99, &[99]).unwrap_err(), BufferError::BufferFull);

        // Everything queued before the failed put is still there, in order.
        for i in 0..BUFFER_CAPACITY - 1 {
            assert_eq!(buf.get().unwrap().cid(), i as u16);
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_payload_rejected() {
        let mut buf = CommandBuffer::new();
        let too_big = [0u8; MAX_PAYLOAD + 1];
        assert_eq!(
            buf.put(1, &too_big).unwrap_err(),
            BufferError::PayloadTooLarge {
                len: MAX_PAYLOAD + 1
            }
        );
        assert!(buf.is_empty());

        let exactly = [0u8; MAX_PAYLOAD];
        buf.put(1, &exactly).unwrap();
        assert_eq!(buf.get().unwrap().payload().len(), MAX_PAYLOAD);
    }

    #[test]
    fn reset_clears_everything() {
        let mut buf = CommandBuffer::new();
        buf.put(1, &[1]).unwrap();
        buf.put(2, &[2]).unwrap();
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.get().unwrap_err(), BufferError::BufferEmpty);
    }

    #[test]
    fn wrap_around() {
        let mut buf = CommandBuffer::new();
        // Cycle through the ring a few times to cross the wrap point.
        for round in 0..3 {
            for i in 0..BUFFER_CAPACITY - 1 {
                buf.put((round * 100 + i) as u16, &[i as u8]).unwrap();
            }
            for i in 0..BUFFER_CAPACITY - 1 {
                assert_eq!(buf.get().unwrap().cid(), (round * 100 + i) as u16);
            }
        }
    }

    #[test]
    fn duplicate_commands_not_coalesced() {
        let mut buf = CommandBuffer::new();
        buf.put(7, &[0xaa]).unwrap();
        buf.put(7, &[0xaa]).unwrap();
        assert_eq!(buf.get().unwrap().payload(), &[0xaa]);
        assert_eq!(buf.get().unwrap().payload(), &[0xaa]);
        assert!(buf.is_empty());
    }

    #[test]
    fn shared_buffer_serializes_access() {
        let shared = SharedCommandBuffer::new();
        let producer = shared.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..8u16 {
                while producer.put(i, &[i as u8]).is_err() {
                    std::thread::yield_now();
                }
            }
        });

        let mut seen = 0;
        while seen < 8 {
            if let Ok(packet) = shared.get() {
                assert_eq!(packet.cid() as u8, packet.payload()[0]);
                seen += 1;
            }
        }
        handle.join().unwrap();
    }
}
