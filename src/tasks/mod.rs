//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a store.
//!
//! # Tasks
//! - Sweep: removes expired memory-store entries at a fixed interval

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
