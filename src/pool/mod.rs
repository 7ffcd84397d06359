// src/pool/mod.rs

//! Worker lifecycle and the LIFO-managed worker pool.

pub mod manager;
pub mod worker;

pub use manager::{WorkerPool, WorkerTicket};
pub use worker::{SwarmContext, WorkerState, format_elapsed};
