//! Deterministic bytecode virtual machine for automated on-chain
//! transactions.
//!
//! An [`interpreter::execute_round`] call drives one metered, cooperative
//! round of a [`state::MachineState`] against a host-supplied
//! [`host::HostApi`]; [`creation`] and [`state::serialize`] handle the wire
//! formats a host uses to deploy and persist that state between rounds.

#![deny(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod address;
pub mod asm;
pub mod codec;
pub mod consts;
pub mod creation;
pub mod disassemble;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod state;

pub mod prelude {
    //! The types most callers need: the machine itself, the host seam, and
    //! the error/version types that show up in their signatures.
    pub use crate::creation::{from_creation_bytes, to_creation_bytes};
    pub use crate::error::{PanicReason, RuntimeError, SimpleResult};
    pub use crate::host::HostApi;
    pub use crate::interpreter::{execute_round, RoundInputs};
    pub use crate::state::{Flags, Header, MachineState, Version};

    #[cfg(feature = "test-helpers")]
    pub use crate::host::NullHost;
}
