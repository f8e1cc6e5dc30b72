//! Context-tagged pairing and link-key control.
//!
//! Mutating the key store and the pairing flag is only safe from the
//! transport callback context. The application context gets a cloneable
//! [`BtControlHandle`] that can only *enqueue* requests; the transport
//! drains them with [`BtControl::process_pending`] at a safe point. The
//! handle has no access to the store itself, so the marshalling contract
//! is enforced by the API shape rather than by convention.

use crate::bt::conn::BdAddr;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Bounded number of remembered link keys.
pub const MAX_STORED_KEYS: usize = 16;

/// One stored bonding key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkKey {
    pub addr: BdAddr,
    pub key: [u8; 16],
    pub key_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BtRequest {
    SetPairingEnabled(bool),
    DeleteStoredKeys,
    ListStoredKeys,
}

type RequestQueue = Arc<Mutex<VecDeque<BtRequest>>>;

/// Transport-context owner of the key store and pairing state.
///
/// All methods on this type must run in the transport callback context.
#[derive(Default)]
pub struct BtControl {
    keys: Vec<LinkKey>,
    pairing_enabled: bool,
    pending: RequestQueue,
}

impl BtControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Application-context handle. Cheap to clone and Send.
    pub fn handle(&self) -> BtControlHandle {
        BtControlHandle {
            pending: Arc::clone(&self.pending),
        }
    }

    /// Drain requests marshalled from the application context. Returns
    /// how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let drained: Vec<BtRequest> = {
            let mut queue = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            queue.drain(..).collect()
        };
        let count = drained.len();
        for request in drained {
            match request {
                BtRequest::SetPairingEnabled(enabled) => self.set_pairing_enabled(enabled),
                BtRequest::DeleteStoredKeys => self.delete_keys(),
                BtRequest::ListStoredKeys => {
                    for key in self.list_keys() {
                        info!(addr = %key.addr, key_type = key.key_type, "stored link key");
                    }
                }
            }
        }
        count
    }

    pub fn set_pairing_enabled(&mut self, enabled: bool) {
        info!(enabled, "new pairings");
        self.pairing_enabled = enabled;
    }

    pub fn is_pairing_enabled(&self) -> bool {
        self.pairing_enabled
    }

    /// Remember a key, replacing any previous one for the same address.
    /// The oldest key falls out when the store is full.
    pub fn store_key(&mut self, key: LinkKey) {
        self.keys.retain(|k| k.addr != key.addr);
        if self.keys.len() == MAX_STORED_KEYS {
            let dropped = self.keys.remove(0);
            debug!(addr = %dropped.addr, "key store full, dropping oldest");
        }
        self.keys.push(key);
    }

    pub fn key_for(&self, addr: BdAddr) -> Option<&LinkKey> {
        self.keys.iter().find(|k| k.addr == addr)
    }

    pub fn list_keys(&self) -> &[LinkKey] {
        &self.keys
    }

    pub fn delete_keys(&mut self) {
        info!(count = self.keys.len(), "deleting stored link keys");
        self.keys.clear();
    }
}

/// Application-context view: requests are queued, never applied directly.
#[derive(Clone)]
pub struct BtControlHandle {
    pending: RequestQueue,
}

impl BtControlHandle {
    pub fn set_pairing_enabled(&self, enabled: bool) {
        self.push(BtRequest::SetPairingEnabled(enabled));
    }

    pub fn delete_keys(&self) {
        self.push(BtRequest::DeleteStoredKeys);
    }

    /// Logged from the transport context when processed.
    pub fn list_keys(&self) {
        self.push(BtRequest::ListStoredKeys);
    }

    fn push(&self, request: BtRequest) {
        let mut queue = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(request);
    }
}
