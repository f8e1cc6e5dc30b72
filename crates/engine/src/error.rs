//! Engine error types.

use crate::bt::conn::{ConnectionState, TransportProtocol};
use openpad_command_buffer::BufferError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The requested state is not reachable from the current one for this
    /// transport. The connection must be torn down by the caller.
    #[error("Illegal connection state transition {from:?} -> {to:?} over {protocol:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
        protocol: TransportProtocol,
    },

    /// The transport protocol is set once per connection.
    #[error("Transport protocol already set to {current:?}")]
    ProtocolAlreadySet { current: TransportProtocol },

    #[error("Device table full ({max} devices)")]
    DeviceTableFull { max: usize },

    #[error("HID descriptor too large: {len} bytes, max {max}")]
    DescriptorTooLarge { len: usize, max: usize },

    /// The ready callback refused the device. Terminal; tear the
    /// connection down.
    #[error("Device rejected by the platform delegate")]
    DeviceRejected,

    /// Input reports are only trusted once the connection reached
    /// `DeviceReady`.
    #[error("Connection not ready for input reports")]
    NotReady,

    /// The active interpreter does not implement the requested feedback
    /// capability; callers are expected to check first.
    #[error("Feedback capability not supported by this device")]
    UnsupportedFeedback,

    #[error("No interpreter assigned to this device yet")]
    NoInterpreter,

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

pub type EngineResult<T> = Result<T, EngineError>;
