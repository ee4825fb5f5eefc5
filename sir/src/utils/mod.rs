//! useful utils for the driver
//!

pub mod macro_utils;
