//! `courier-scheduler` — batch accumulation and the recurring clock.
//!
//! # Overview
//!
//! A [`BatchScheduler`] holds the pending notification tasks for one
//! cadence and executes them as a single FIFO batch when flushed. The
//! [`Clock`] drives one tokio interval loop per registered cadence and
//! forwards every task failure through an mpsc channel, so the consumer
//! (the user directory, via the manager) never couples to the tick loop.
//!
//! Batches are in-memory only; nothing survives a restart.

pub mod batch;
pub mod clock;
pub mod error;

pub use batch::{BatchScheduler, BatchTask, SchedulerHandle};
pub use clock::Clock;
pub use error::{Result, SchedulerError};
