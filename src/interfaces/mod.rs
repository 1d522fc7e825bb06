//! Adapters between the outside world and the payment use case.

pub mod api;
pub mod csv;
pub mod seed;
