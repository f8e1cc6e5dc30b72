//! OpenPad input engine
//!
//! Ties the protocol crates together into the controller-facing stack:
//!
//! - [`device`]: per-link device records (identity, descriptor,
//!   interpreter, canonical model) and the fixed-capacity registry
//! - [`interpreter`]: closed dispatch over the supported device classes
//!   with explicit capability queries
//! - [`parser`]: the input-report parsing engine (init-report, raw path,
//!   descriptor walk)
//! - [`bt`]: the connection lifecycle state machine and the
//!   context-tagged pairing/key control
//! - [`outgoing`]: flushing queued feedback packets to the transport
//!
//! The transport itself (radio, L2CAP, SDP) is not here: the engine
//! consumes raw report bytes tagged with a connection id and produces raw
//! outgoing bytes the same way.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod bt;
pub mod device;
pub mod error;
pub mod interpreter;
pub mod outgoing;
pub mod parser;

pub use bt::{BdAddr, BtConnection, BtControl, BtControlHandle, ConnectionState, TransportProtocol};
pub use device::{
    AcceptAll, DeviceDelegate, DeviceRegistry, HidDevice, MAX_DEVICES, SdpQueryOrdering,
};
pub use error::{EngineError, EngineResult};
pub use interpreter::{ControllerType, DeviceInterpreter, MAX_INTERPRETER_STATE};
pub use outgoing::{Transport, TransportError, flush_queued};
