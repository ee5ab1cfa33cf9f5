//! Legacy PC port backend.

use core::sync::atomic::{AtomicBool, Ordering};

use x86_64::instructions::{interrupts, port::Port};

use super::{PortAddr, RegisterPort};
use crate::lock::InterruptMask;
use crate::ClockError;

// Set while a `CmosPort` is alive.
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// The CMOS RTC ports at 0x70/0x71.
///
/// Only one `CmosPort` may exist at a time, since the driver's lock can only
/// serialize access that goes through it.
pub struct CmosPort {
    index: Port<u8>,
    data: Port<u8>,
}

impl CmosPort {
    /// Claims the port pair.
    ///
    /// # Errors
    /// [`ClockError::AllocationError`] if another `CmosPort` is alive.
    pub fn acquire() -> Result<Self, ClockError> {
        if CLAIMED
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("CMOS RTC ports are already claimed");
            return Err(ClockError::AllocationError);
        }
        Ok(Self {
            index: Port::new(PortAddr::Index.addr()),
            data: Port::new(PortAddr::Data.addr()),
        })
    }
}

impl Drop for CmosPort {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

impl RegisterPort for CmosPort {
    fn read(&mut self, port: PortAddr) -> u8 {
        // SAFETY: the claim guarantees this is the only handle on the RTC
        // ports, and reading them has no effect beyond the RTC.
        unsafe {
            match port {
                PortAddr::Index => self.index.read(),
                PortAddr::Data => self.data.read(),
            }
        }
    }

    fn write(&mut self, port: PortAddr, value: u8) {
        // SAFETY: as above. Bit 7 of the index port also masks NMIs; the
        // driver only writes register indices below 0x80.
        unsafe {
            match port {
                PortAddr::Index => self.index.write(value),
                PortAddr::Data => self.data.write(value),
            }
        }
    }
}

/// Masks maskable interrupts on the current core.
#[derive(Copy, Clone, Debug, Default)]
pub struct X86Interrupts;

impl InterruptMask for X86Interrupts {
    type State = bool;

    fn disable(&self) -> bool {
        let enabled = interrupts::are_enabled();
        interrupts::disable();
        enabled
    }

    fn restore(&self, enabled: bool) {
        if enabled {
            interrupts::enable();
        }
    }
}
