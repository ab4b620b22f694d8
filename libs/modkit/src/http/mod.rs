//! Outgoing HTTP helpers.

pub mod client;
