// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking USART debug writer.
//!
//! Every binary logs through this: hex and decimal printers for register dumps, plus
//! `core::fmt::Write` so that `write!` / `writeln!` work.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! On the host, attach a USB-serial adapter to the debug port (USART2: PA2 TX, PA3 RX) and use
//! ```text
//! $ screen /dev/ttyUSB0 <baud_rate>
//! ```

use core::fmt;

use embedded_hal::serial::Write;
use nb::block;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

pub struct Usart<W> {
    tx: W,
}

impl<W: Write<u8>> Usart<W> {
    /// Take the transmit half of a configured serial port.
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the transmitter is idle.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    /// `0x` followed by `nibbles` hex digits of `n`, with `_` between 16-bit halves of longer
    /// values.
    fn print_hex(&mut self, n: u32, nibbles: u32) {
        self.write_str("0x");
        for i in (0..nibbles).rev() {
            if nibbles > 4 && i == 3 {
                self.write_byte(b'_');
            }
            self.write_byte(HEX[((n >> (i * 4)) & 0xF) as usize]);
        }
    }

    pub fn print_hex_u8(&mut self, n: u8) {
        self.print_hex(n as u32, 2);
    }

    pub fn print_hex_u16(&mut self, n: u16) {
        self.print_hex(n as u32, 4);
    }

    pub fn print_hex_u32(&mut self, n: u32) {
        self.print_hex(n, 8);
    }

    /// Space-separated hex bytes without prefix, e.g. `DE AD BE EF`.
    pub fn print_bytes(&mut self, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            if i > 0 {
                self.write_byte(b' ');
            }
            self.write_byte(HEX[(b >> 4) as usize]);
            self.write_byte(HEX[(b & 0xF) as usize]);
        }
    }

    pub fn print_u32(&mut self, mut n: u32) {
        let mut buf = [0u8; 10];
        let mut i = buf.len();
        loop {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        for &b in &buf[i..] {
            self.write_byte(b);
        }
    }

    pub fn print_i32(&mut self, n: i32) {
        if n < 0 {
            self.write_byte(b'-');
        }
        self.print_u32(n.unsigned_abs());
    }

    pub fn free(self) -> W {
        self.tx
    }
}

impl<W: Write<u8>> fmt::Write for Usart<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}
