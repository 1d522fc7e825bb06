//! Application layer containing the payment use case.
//!
//! This module defines the `PaymentProcessor`, the single entry point that
//! moves an order from `pending` to `paid` and credits loyalty points to its
//! owner in one atomic unit of work.

pub mod processor;
