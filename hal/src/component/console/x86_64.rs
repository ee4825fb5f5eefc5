//! COM1 output.

use ::x86_64::instructions::port::Port;

use super::Stdout;

const COM1: u16 = 0x3F8;
const LINE_STATUS: u16 = COM1 + 5;
const TRANSMIT_EMPTY: u8 = 1 << 5;

fn putchar(byte: u8) {
    let mut data: Port<u8> = Port::new(COM1);
    let mut status: Port<u8> = Port::new(LINE_STATUS);
    unsafe {
        while status.read() & TRANSMIT_EMPTY == 0 {
            core::hint::spin_loop();
        }
        data.write(byte);
    }
}

impl core::fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                putchar(b'\r');
            }
            putchar(byte);
        }
        Ok(())
    }
}
