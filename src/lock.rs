//! Interrupt-masking spin lock.
//!
//! [`IrqSpinLock`] masks local interrupts before spinning on the lock, so an
//! interrupt handler on the same core can never find the RTC half-way
//! through a transaction. Dropping the guard unlocks first and then restores
//! the interrupt state saved at lock time.

use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

/// Local interrupt masking supplied by the platform.
pub trait InterruptMask {
    /// Whatever is needed to put the interrupt state back.
    type State: Copy;

    /// Masks interrupts and returns the previous state.
    fn disable(&self) -> Self::State;

    /// Restores a state returned by [`InterruptMask::disable`].
    fn restore(&self, state: Self::State);
}

/// Mask for contexts with no interrupts to speak of, such as hosted builds.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoInterrupts;

impl InterruptMask for NoInterrupts {
    type State = ();

    fn disable(&self) {}

    fn restore(&self, _state: ()) {}
}

pub struct IrqSpinLock<T, I: InterruptMask> {
    irq: I,
    inner: Mutex<T>,
}

impl<T, I: InterruptMask> IrqSpinLock<T, I> {
    pub const fn new(value: T, irq: I) -> Self {
        Self {
            irq,
            inner: Mutex::new(value),
        }
    }

    pub fn lock(&self) -> IrqSpinGuard<'_, T, I> {
        let restore = IrqRestore {
            irq: &self.irq,
            state: self.irq.disable(),
        };
        IrqSpinGuard {
            guard: self.inner.lock(),
            _restore: restore,
        }
    }

    pub fn into_inner(self) -> (T, I) {
        (self.inner.into_inner(), self.irq)
    }
}

struct IrqRestore<'a, I: InterruptMask> {
    irq: &'a I,
    state: I::State,
}

impl<I: InterruptMask> Drop for IrqRestore<'_, I> {
    fn drop(&mut self) {
        self.irq.restore(self.state);
    }
}

/// Holds the lock with interrupts masked.
// Field order matters: the mutex guard drops before interrupts come back.
pub struct IrqSpinGuard<'a, T, I: InterruptMask> {
    guard: MutexGuard<'a, T>,
    _restore: IrqRestore<'a, I>,
}

impl<T, I: InterruptMask> Deref for IrqSpinGuard<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, I: InterruptMask> DerefMut for IrqSpinGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
