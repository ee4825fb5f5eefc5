//! SIR: Simple Interrupt Reporter
//!
//! A char device (`/dev/sir0`) reporting how many interrupts the requesting
//! cpu has taken since boot. The most important pieces are:
//!
//! - [`provider`]: the arch aggregate counter that the stable counter
//!   interface does not export, resolved once at startup
//! - [`collector`]: consistent per-cpu snapshots, simple or detailed
//! - [`session`]: the per-handle partial read state machine
//! - [`fs::sir`]: the device file, its reads and control operations
//! - [`module`]: init and exit, registering the device with the kernel
//!
//! With the default `sim` feature everything runs on the host on top of the
//! simulated hal backend.
#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
extern crate bitflags;

pub mod collector;
pub mod config;
pub mod error;
pub mod fs;
pub mod irq;
pub mod mm;
pub mod module;
pub mod provider;
pub mod report;
pub mod session;
pub mod sync;
pub mod utils;

pub use error::{InitError, SysError, SysResult};
