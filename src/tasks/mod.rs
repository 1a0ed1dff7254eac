//! Background Tasks Module
//!
//! Periodic maintenance tasks spawned by the engine.
//!
//! # Tasks
//! - Expiry Sweeper: removes expired cache entries at configured intervals

mod sweeper;

pub use sweeper::spawn_sweeper_task;
