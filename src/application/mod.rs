//! Application layer containing the protocol logic.
//!
//! `ProtocolEngine` validates, processes and transforms messages through an
//! explicit `Registry`; `AuthenticationOrchestrator` drives one
//! authentication attempt end to end on top of it.

pub mod engine;
pub mod orchestrator;
pub mod registry;
pub mod transform;
