//! The N1 address space.
//!
//! | range           | region                       |
//! |-----------------|------------------------------|
//! | `0x0000-0x7FFF` | ROM, read only               |
//! | `0x8000-0xBFFF` | bank selected by `mb`        |
//! | `0xC000-0xEFFF` | RAM                          |
//! | `0xF000-0xFFEE` | stack                        |
//! | `0xFFFB`        | `mb`                         |
//! | `0xFFFC-0xFFFD` | stack pointer                |
//! | `0xFFFE-0xFFFF` | program counter, read only   |

use crate::{
    Fault, ADDR_BANK, ADDR_MB, ADDR_PC, ADDR_RAM, ADDR_ROM, ADDR_SP, ADDR_STACK, N1, SIZE_BANK,
    SIZE_RAM, SIZE_ROM, SIZE_STACK,
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Rom,
    Bank,
    Ram,
    Stack,
    Mb,
    /// `true` for the high byte.
    Sp(bool),
    Pc(bool),
}

impl Region {
    pub fn of(addr: u16) -> Option<Self> {
        let within = |start: u16, size: u16| {
            addr >= start && u32::from(addr) < u32::from(start) + u32::from(size)
        };
        Some(match addr {
            _ if within(ADDR_ROM, SIZE_ROM) => Region::Rom,
            _ if within(ADDR_BANK, SIZE_BANK) => Region::Bank,
            _ if within(ADDR_RAM, SIZE_RAM) => Region::Ram,
            _ if within(ADDR_STACK, SIZE_STACK) => Region::Stack,
            ADDR_MB => Region::Mb,
            _ if within(ADDR_SP, 2) => Region::Sp(addr == ADDR_SP),
            _ if within(ADDR_PC, 2) => Region::Pc(addr == ADDR_PC),
            _ => return None,
        })
    }
}

impl N1 {
    /// Reads a byte. Unset memory reads as 0; faults read as 0 too.
    pub fn addr_get(&mut self, addr: u16) -> u8 {
        let Some(region) = Region::of(addr) else {
            self.raise(Fault::InvalidAddress, addr);
            return 0;
        };
        let cell = |memory: &crate::Memory| memory.get(&addr).copied().unwrap_or(0);
        match region {
            Region::Rom => cell(&self.rom),
            Region::Bank => match self.banks.get(&self.mb) {
                Some(bank) => cell(bank),
                None => {
                    self.raise(Fault::InvalidBank, addr);
                    0
                }
            },
            Region::Ram => cell(&self.ram),
            Region::Stack => cell(&self.stack),
            Region::Mb => self.mb,
            Region::Sp(true) => self.sp.0,
            Region::Sp(false) => self.sp.1,
            Region::Pc(true) => self.pc.0,
            Region::Pc(false) => self.pc.1,
        }
    }

    /// Writes a byte. Returns `false` when the write faulted and nothing changed.
    pub fn addr_set(&mut self, addr: u16, value: u8) -> bool {
        let Some(region) = Region::of(addr) else {
            self.raise(Fault::InvalidAddress, addr);
            return false;
        };
        match region {
            Region::Rom | Region::Pc(_) => {
                self.raise(Fault::ReadOnlyAccess, addr);
                return false;
            }
            Region::Bank => match self.banks.get_mut(&self.mb) {
                Some(bank) => {
                    bank.insert(addr, value);
                }
                None => {
                    self.raise(Fault::InvalidBank, addr);
                    return false;
                }
            },
            Region::Ram => {
                self.ram.insert(addr, value);
            }
            Region::Stack => {
                self.stack.insert(addr, value);
            }
            Region::Mb => self.mb = value,
            Region::Sp(true) => self.sp.0 = value,
            Region::Sp(false) => self.sp.1 = value,
        }
        true
    }

    /// Pushes onto the upward growing stack.
    pub fn push(&mut self, value: u8) -> bool {
        let sp = self.sp();
        if sp >= ADDR_STACK + SIZE_STACK {
            self.raise(Fault::StackOverflow, sp);
            return false;
        }
        if !self.addr_set(sp, value) {
            return false;
        }
        self.set_sp(sp + 1);
        true
    }

    pub fn pop(&mut self) -> u8 {
        let sp = self.sp();
        if sp <= ADDR_STACK {
            self.raise(Fault::StackEmpty, sp);
            return 0;
        }
        let value = self.addr_get(sp - 1);
        self.set_sp(sp - 1);
        value
    }

    /// Records a fault. The latest fault wins.
    pub fn raise(&mut self, fault: Fault, addr: u16) {
        tracing::warn!(%fault, addr = %format!("{addr:#06x}"), pc = self.pc(), "fault");
        self.exit = fault.code();
    }
}
