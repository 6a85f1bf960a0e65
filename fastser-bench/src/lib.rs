//! # fastser Bench
//!
//! Shared workloads for the fastser criterion benches.

pub mod encoding;
