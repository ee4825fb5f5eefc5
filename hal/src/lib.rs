//! Hardware abstraction for the interrupt reporter.
//!
//! Two backends exist: `x86_64` for kernel builds and `sim` (the default
//! feature) for host builds, where every thread acts as one simulated cpu.
#![cfg_attr(not(feature = "sim"), no_std)]

mod component;

pub use component::*;

pub mod util;

#[cfg(feature = "sim")]
pub use component::instruction::sim;

#[cfg(not(any(feature = "sim", target_arch = "x86_64")))]
compile_error!("hal: no backend for this target, enable the `sim` feature");
