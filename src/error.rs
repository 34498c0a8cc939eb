//! Runtime error taxonomy for the virtual machine.
//!
//! Grounded on `fuel-vm/src/error.rs`'s split between a recoverable panic
//! reason and a host/storage error, collapsed to this system's single host
//! collaborator (see `host::HostApi`).

/// The six error kinds of the consensus contract (spec §7), each
/// recoverable via `on_error_address` unless the host itself fails (see
/// [`RuntimeError::Host`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PanicReason {
    /// Unknown opcode byte or function code; bad param/return shape for a
    /// function code.
    #[display(fmt = "illegal operation")]
    IllegalOperation,
    /// Ran out of code bytes while decoding an opcode's operands.
    #[display(fmt = "code segment overrun")]
    CodeSegment,
    /// A code or data address operand (including a computed indirect index)
    /// fell outside its segment's bounds.
    #[display(fmt = "invalid address")]
    InvalidAddress,
    /// Call-stack or user-stack overflow/underflow.
    #[display(fmt = "stack bounds exceeded")]
    StackBounds,
    /// Division or modulo by zero.
    #[display(fmt = "arithmetic error")]
    Arithmetic,
    /// Catch-all raised by function codes, e.g. a hash read that would
    /// overflow the data segment.
    #[display(fmt = "execution error")]
    Execution,
}

impl std::error::Error for PanicReason {}

/// Result of an operation that cannot access the host collaborator.
pub type SimpleResult<T> = Result<T, PanicReason>;

/// Runtime error description: either a well-formed panic (which the round
/// driver can redirect to `on_error_address`) or an error surfaced by the
/// host collaborator, which always halts the round.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError<HostError> {
    /// Specified error with a well-formed fallback: the round driver may
    /// redirect to `on_error_address` or finish with `had_fatal_error`.
    #[error("vm panic: {0}")]
    Recoverable(PanicReason),
    /// Error surfaced by the host collaborator (e.g. a storage failure).
    /// Always halts the round; not addressable by `on_error_address`.
    #[error("host error: {0}")]
    Host(HostError),
}

impl<HostError> RuntimeError<HostError> {
    /// Whether this error is recoverable via `on_error_address`.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    /// Return the panic reason, if this is a recoverable error.
    pub const fn panic_reason(&self) -> Option<PanicReason> {
        match self {
            Self::Recoverable(reason) => Some(*reason),
            Self::Host(_) => None,
        }
    }
}

impl<HostError> From<PanicReason> for RuntimeError<HostError> {
    fn from(reason: PanicReason) -> Self {
        Self::Recoverable(reason)
    }
}

impl<HostError: PartialEq> PartialEq for RuntimeError<HostError> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Recoverable(a), Self::Recoverable(b)) => a == b,
            (Self::Host(a), Self::Host(b)) => a == b,
            _ => false,
        }
    }
}
