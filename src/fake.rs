//! Test doubles: an MC146818 register model, an interrupt mask that counts,
//! and a delay that adds up what it was asked to wait.

extern crate alloc;

use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use embedded_hal::delay::DelayNs;

use crate::lock::InterruptMask;
use crate::port::{PortAddr, RegisterPort};
use crate::registers::Register;

const STATUS_A_IDLE: u8 = 0x26;
const UIP: u8 = 0x80;
const SET: u8 = 0x80;

// Seconds, minutes, hours, day of week, day of month, month, year
const TIME_REGISTERS: [Register; 7] = [
    Register::Seconds,
    Register::Minutes,
    Register::Hours,
    Register::DayOfWeek,
    Register::DayOfMonth,
    Register::Month,
    Register::Year,
];

/// One data-port access, tagged with the register selected at the time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Access {
    Read(u8, u8),
    Write(u8, u8),
}

pub(crate) struct FakeCmos {
    regs: [u8; 128],
    index: u8,
    uip_polls: u32,
    status_a_reads: usize,
    unguarded_writes: usize,
    accesses: Vec<Access>,
}

impl FakeCmos {
    /// A chip with status B `status_b` holding `time` in register order.
    pub(crate) fn new(status_b: u8, time: [u8; 7]) -> Self {
        let mut regs = [0; 128];
        regs[usize::from(u8::from(Register::StatusA))] = STATUS_A_IDLE;
        regs[usize::from(u8::from(Register::StatusB))] = status_b;
        for (reg, value) in TIME_REGISTERS.iter().zip(time) {
            regs[usize::from(u8::from(*reg))] = value;
        }
        Self {
            regs,
            index: 0,
            uip_polls: 0,
            status_a_reads: 0,
            unguarded_writes: 0,
            accesses: Vec::new(),
        }
    }

    /// Reports an update in progress for the next `polls` reads of status A.
    /// `u32::MAX` never clears.
    pub(crate) fn set_update_in_progress_polls(&mut self, polls: u32) {
        self.uip_polls = polls;
    }

    pub(crate) fn register(&self, reg: Register) -> u8 {
        self.regs[usize::from(u8::from(reg))]
    }

    pub(crate) fn time_registers(&self) -> [u8; 7] {
        TIME_REGISTERS.map(|reg| self.register(reg))
    }

    pub(crate) fn register_accesses(&self) -> Vec<Access> {
        self.accesses.clone()
    }

    pub(crate) fn status_a_reads(&self) -> usize {
        self.status_a_reads
    }

    /// Time register writes that happened with SET clear.
    pub(crate) fn unguarded_writes(&self) -> usize {
        self.unguarded_writes
    }

    fn read_data(&mut self) -> u8 {
        let mut value = self.regs[usize::from(self.index)];
        if self.index == u8::from(Register::StatusA) {
            self.status_a_reads += 1;
            if self.uip_polls > 0 {
                if self.uip_polls != u32::MAX {
                    self.uip_polls -= 1;
                }
                value |= UIP;
            }
        }
        self.accesses.push(Access::Read(self.index, value));
        value
    }

    fn write_data(&mut self, value: u8) {
        let is_time_register = TIME_REGISTERS
            .iter()
            .any(|reg| u8::from(*reg) == self.index);
        if is_time_register && self.register(Register::StatusB) & SET == 0 {
            self.unguarded_writes += 1;
        }
        self.regs[usize::from(self.index)] = value;
        self.accesses.push(Access::Write(self.index, value));
    }
}

impl RegisterPort for FakeCmos {
    fn read(&mut self, port: PortAddr) -> u8 {
        match port {
            PortAddr::Index => self.index,
            PortAddr::Data => self.read_data(),
        }
    }

    fn write(&mut self, port: PortAddr, value: u8) {
        match port {
            // Bit 7 is the NMI mask, not part of the index
            PortAddr::Index => self.index = value & 0x7F,
            PortAddr::Data => self.write_data(value),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CountingMask {
    disables: AtomicUsize,
    restores: AtomicUsize,
}

impl CountingMask {
    pub(crate) fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }

    pub(crate) fn restores(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }

    /// Masked sections currently open.
    pub(crate) fn depth(&self) -> usize {
        self.disables() - self.restores()
    }
}

impl InterruptMask for CountingMask {
    type State = ();

    fn disable(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
    }

    fn restore(&self, _state: ()) {
        self.restores.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub(crate) struct CountingDelay {
    total_ns: u64,
}

impl CountingDelay {
    pub(crate) fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
