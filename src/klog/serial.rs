// Copyright (C) 2019-2020  Pierre Krieger
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! A bare 16550 UART writer over COM1, used by the `selftest` harness to report results where a
//! graphical framebuffer isn't a reliable place to look (QEMU's `-serial stdio`).

use core::fmt;
use x86_64::instructions::port::Port;

const COM1_BASE: u16 = 0x3f8;

pub struct SerialPort {
    data: Port<u8>,
    line_status: Port<u8>,
}

impl SerialPort {
    /// # Safety
    ///
    /// Must only be called once per physical COM1 port; constructing two instances would race
    /// on the same hardware registers.
    pub const unsafe fn new() -> Self {
        SerialPort {
            data: Port::new(COM1_BASE),
            line_status: Port::new(COM1_BASE + 5),
        }
    }

    /// Initializes the UART for 38400 baud, 8 data bits, no parity, one stop bit.
    ///
    /// # Safety
    ///
    /// Performs raw port I/O; must be called before the first write.
    pub unsafe fn init(&mut self) {
        let mut interrupt_enable = Port::<u8>::new(COM1_BASE + 1);
        let mut fifo_control = Port::<u8>::new(COM1_BASE + 2);
        let mut line_control = Port::<u8>::new(COM1_BASE + 3);
        let mut modem_control = Port::<u8>::new(COM1_BASE + 4);
        let mut divisor_low = Port::<u8>::new(COM1_BASE);
        let mut divisor_high = Port::<u8>::new(COM1_BASE + 1);

        interrupt_enable.write(0x00);
        line_control.write(0x80); // Enable DLAB to set the baud-rate divisor.
        divisor_low.write(0x03); // 38400 baud.
        divisor_high.write(0x00);
        line_control.write(0x03); // 8 bits, no parity, one stop bit.
        fifo_control.write(0xc7); // Enable, clear, 14-byte threshold FIFO.
        modem_control.write(0x0b); // IRQs enabled (unused here), RTS/DSR set.
        interrupt_enable.write(0x01);
    }

    fn is_transmit_empty(&mut self) -> bool {
        unsafe { self.line_status.read() & 0x20 != 0 }
    }

    fn write_byte(&mut self, byte: u8) {
        while !self.is_transmit_empty() {}
        unsafe {
            self.data.write(byte);
        }
    }
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
