//! Per-message security lifecycle: block policy and the state machine

pub mod policy;
pub mod state;

pub use policy::BlockPolicy;
pub use state::SecurityStateMachine;
