//! 16550 UART serial console
//!
//! Polled transmitter used as the log sink. The southbridge must have routed
//! the UART (see `southbridge::uart`) before output appears on the pins;
//! until [`init`] succeeds all output is silently dropped.

use core::fmt::{self, Write};
use spin::Mutex;

/// Standard COM1 port address
pub const COM1: u16 = 0x3F8;

/// Serial port register offsets
mod registers {
    pub const DATA: u16 = 0; // Data register (read/write)
    pub const IER: u16 = 1; // Interrupt Enable Register
    pub const FCR: u16 = 2; // FIFO Control Register
    pub const LCR: u16 = 3; // Line Control Register
    pub const MCR: u16 = 4; // Modem Control Register
    pub const LSR: u16 = 5; // Line Status Register
    pub const SCRATCH: u16 = 7;
    pub const DLL: u16 = 0; // Divisor Latch Low (when DLAB=1)
    pub const DLH: u16 = 1; // Divisor Latch High (when DLAB=1)
}

const LSR_TX_EMPTY: u8 = 1 << 5;
const LCR_8N1: u8 = 0x03;
const LCR_DLAB: u8 = 0x80;

/// Global serial port instance
static SERIAL: Mutex<Option<SerialPort>> = Mutex::new(None);

/// Maximum iterations to wait for TX ready (prevents infinite loop on missing hardware)
const TX_TIMEOUT_ITERATIONS: u32 = 100_000;

/// A 16550 UART serial port
pub struct SerialPort {
    /// Base I/O port address
    base: u16,
    /// Whether this port has been detected as functional
    functional: bool,
}

impl SerialPort {
    /// Create a new serial port at the given base address
    ///
    /// # Safety
    ///
    /// The base address must be a valid I/O port for a 16550 UART.
    pub const unsafe fn new(base: u16) -> Self {
        SerialPort {
            base,
            functional: false,
        }
    }

    /// Scratch register test: a UART echoes back what was written
    fn detect(&self) -> bool {
        for pattern in [0x55, 0xAA] {
            self.write_reg(registers::SCRATCH, pattern);
            if self.read_reg(registers::SCRATCH) != pattern {
                return false;
            }
        }
        self.read_reg(registers::LSR) != 0xFF
    }

    /// Initialize the serial port with the given baud rate
    ///
    /// Returns true if initialization succeeded, false if no serial port detected.
    pub fn init(&mut self, baud: u32) -> bool {
        if baud == 0 || !self.detect() {
            self.functional = false;
            return false;
        }

        let divisor = 115200 / baud;

        self.write_reg(registers::IER, 0x00);
        self.write_reg(registers::LCR, LCR_DLAB);
        self.write_reg(registers::DLL, (divisor & 0xFF) as u8);
        self.write_reg(registers::DLH, ((divisor >> 8) & 0xFF) as u8);
        self.write_reg(registers::LCR, LCR_8N1);
        // Enable FIFO, clear them, with 14-byte threshold
        self.write_reg(registers::FCR, 0xC7);
        self.write_reg(registers::MCR, 0x0B);

        self.functional = true;
        true
    }

    /// Write a byte to the serial port
    pub fn write_byte(&mut self, byte: u8) {
        if !self.functional {
            return;
        }

        let mut timeout = TX_TIMEOUT_ITERATIONS;
        while self.read_reg(registers::LSR) & LSR_TX_EMPTY == 0 {
            timeout -= 1;
            if timeout == 0 {
                self.functional = false;
                return;
            }
            core::hint::spin_loop();
        }

        self.write_reg(registers::DATA, byte);
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn read_reg(&self, offset: u16) -> u8 {
        unsafe { crate::arch::io::inb(self.base + offset) }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn read_reg(&self, _offset: u16) -> u8 {
        0xFF
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn write_reg(&self, offset: u16, value: u8) {
        unsafe { crate::arch::io::outb(self.base + offset, value) }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn write_reg(&self, _offset: u16, _value: u8) {}
}

impl Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}

/// Bring up the console UART at `base`
///
/// Returns false (and leaves output disabled) if no UART answers there.
pub fn init(base: u16, baud: u32) -> bool {
    let mut serial = unsafe { SerialPort::new(base) };
    if !serial.init(baud) {
        return false;
    }
    *SERIAL.lock() = Some(serial);
    true
}

/// Write formatted output to the console, if one is up
pub fn write_fmt(args: fmt::Arguments<'_>) {
    if let Some(serial) = SERIAL.lock().as_mut() {
        let _ = serial.write_fmt(args);
    }
}
