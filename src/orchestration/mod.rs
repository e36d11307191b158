//! Epoch-end orchestration and transport ack handling.

pub mod acks;
pub mod settler;

pub use settler::Settler;
