//! Synchronization primitives
pub mod cpu;
pub mod mutex;

pub use cpu::{AtomicRegion, CpuPin};
