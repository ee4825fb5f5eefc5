use std::io::Write;

use super::Stdout;

impl core::fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        std::io::stderr()
            .write_all(s.as_bytes())
            .map_err(|_| core::fmt::Error)
    }
}
