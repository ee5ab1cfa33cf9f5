//! Byte-level access to the RTC's index and data ports.
//!
//! The driver never touches I/O space itself; it goes through
//! [`RegisterPort`], so any platform (or a test fake) can supply the two
//! primitives. With the `x86_64` feature on an x86_64 target, [`CmosPort`]
//! provides the legacy 0x70/0x71 pair and [`X86Interrupts`] the matching
//! interrupt mask.

/// The two I/O ports of the CMOS RTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum PortAddr {
    /// Selects the register the next data access targets
    Index = 0x70,
    /// Reads or writes the selected register
    Data = 0x71,
}

impl PortAddr {
    pub const fn addr(self) -> u16 {
        self as u16
    }
}

/// Single-byte port I/O.
pub trait RegisterPort {
    /// Reads one byte from `port`.
    fn read(&mut self, port: PortAddr) -> u8;

    /// Writes one byte to `port`.
    fn write(&mut self, port: PortAddr, value: u8);
}

cfg_if::cfg_if! {
    if #[cfg(all(feature = "x86_64", target_arch = "x86_64"))] {
        mod x86;
        pub use x86::{CmosPort, X86Interrupts};
    }
}
