//! Access to memory owned by the caller of the device.
pub mod user;

pub use user::{KernelBuf, UserBuf, UserPtr};
