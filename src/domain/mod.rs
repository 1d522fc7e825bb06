//! Domain model: orders, users, loyalty rules and the persistence ports.

pub mod loyalty;
pub mod order;
pub mod payment;
pub mod ports;
pub mod user;
