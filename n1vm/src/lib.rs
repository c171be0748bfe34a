use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};

use ahash::AHashMap;
use n1asm::isa::Register;

pub mod exec;
pub mod memory;

pub const REGISTER_COUNT: usize = 8;

pub const SIZE_ROM: u16 = 0x8000;
pub const SIZE_BANK: u16 = 0x4000;
pub const SIZE_RAM: u16 = 0x3000;
pub const SIZE_STACK: u16 = 0x0FEF;

pub const ADDR_ROM: u16 = 0x0000;
pub const ADDR_BANK: u16 = ADDR_ROM + SIZE_ROM;
pub const ADDR_RAM: u16 = ADDR_BANK + SIZE_BANK;
pub const ADDR_STACK: u16 = ADDR_RAM + SIZE_RAM;
pub const ADDR_MB: u16 = 0xFFFB;
pub const ADDR_SP: u16 = 0xFFFC;
pub const ADDR_PC: u16 = 0xFFFE;

pub const BANK_RAM: u8 = 0;
pub const BANK_VRAM: u8 = 1;

pub const PORT_EXIT: u8 = 0;
pub const PORT_GPU: u8 = 1;

pub const EXIT_RUNNING: i32 = -1;
pub const EXIT_CLEAN: i32 = 0;

/// Machine faults. The discriminant is the exit code the fault leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Fault {
    Unknown = 1,
    StackOverflow = 2,
    StackEmpty = 3,
    ReadOnlyAccess = 4,
    InvalidBank = 5,
    InvalidAddress = 6,
}

impl Fault {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => Fault::Unknown,
            2 => Fault::StackOverflow,
            3 => Fault::StackEmpty,
            4 => Fault::ReadOnlyAccess,
            5 => Fault::InvalidBank,
            6 => Fault::InvalidAddress,
            _ => return None,
        })
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fault::Unknown => "unknown fault",
            Fault::StackOverflow => "stack overflow",
            Fault::StackEmpty => "stack empty",
            Fault::ReadOnlyAccess => "read-only access",
            Fault::InvalidBank => "invalid bank",
            Fault::InvalidAddress => "invalid address",
        })
    }
}

/// Errors raised around the machine rather than by it.
#[derive(Debug)]
pub enum VmError {
    RomTooLarge { size: usize },
    Io(std::io::Error),
}

impl Display for VmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            VmError::RomTooLarge { size } => write!(
                f,
                "ROM image is {size} bytes, the ROM window holds {SIZE_ROM} bytes"
            ),
            VmError::Io(e) => write!(f, "cannot read ROM image: {e}"),
        }
    }
}

impl std::error::Error for VmError {}

impl From<std::io::Error> for VmError {
    fn from(e: std::io::Error) -> Self {
        VmError::Io(e)
    }
}

type Memory = AHashMap<u16, u8>;

#[derive(Debug, Clone)]
pub struct N1 {
    pub reg: [u8; REGISTER_COUNT],
    /// Selected bank.
    pub mb: u8,
    /// Stack pointer, high byte first.
    pub sp: (u8, u8),
    /// Program counter, high byte first.
    pub pc: (u8, u8),
    pub rom: Memory,
    pub banks: AHashMap<u8, Memory>,
    pub ram: Memory,
    pub stack: Memory,
    pub exit: i32,
    /// Bytes written to the GPU port.
    pub output: Vec<u8>,
    input: AHashMap<u8, VecDeque<u8>>,
}

impl Default for N1 {
    fn default() -> Self {
        Self::new()
    }
}

impl N1 {
    pub fn new() -> Self {
        let mut n1 = Self {
            reg: [0; REGISTER_COUNT],
            mb: BANK_RAM,
            sp: (0, 0),
            pc: (0, 0),
            rom: Memory::new(),
            banks: AHashMap::new(),
            ram: Memory::new(),
            stack: Memory::new(),
            exit: EXIT_RUNNING,
            output: Vec::new(),
            input: AHashMap::new(),
        };
        n1.reset();
        n1
    }

    /// Clears everything but ROM.
    pub fn reset(&mut self) {
        self.reg = [0; REGISTER_COUNT];
        self.mb = BANK_RAM;
        self.set_sp(ADDR_STACK);
        self.set_pc(ADDR_ROM);
        self.banks = [(BANK_RAM, Memory::new()), (BANK_VRAM, Memory::new())]
            .into_iter()
            .collect();
        self.ram.clear();
        self.stack.clear();
        self.exit = EXIT_RUNNING;
        self.output.clear();
        self.input.clear();
    }

    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), VmError> {
        if image.len() > SIZE_ROM as usize {
            return Err(VmError::RomTooLarge { size: image.len() });
        }
        self.rom = image
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .map(|(i, byte)| (ADDR_ROM + i as u16, *byte))
            .collect();
        tracing::debug!(size = image.len(), "ROM loaded");
        Ok(())
    }

    pub fn reg(&self, reg: Register) -> u8 {
        self.reg[reg.code() as usize]
    }

    pub fn reg_mut(&mut self, reg: Register) -> &mut u8 {
        &mut self.reg[reg.code() as usize]
    }

    pub fn sp(&self) -> u16 {
        u16::from_be_bytes([self.sp.0, self.sp.1])
    }

    pub fn set_sp(&mut self, sp: u16) {
        let [hi, lo] = sp.to_be_bytes();
        self.sp = (hi, lo);
    }

    pub fn pc(&self) -> u16 {
        u16::from_be_bytes([self.pc.0, self.pc.1])
    }

    pub fn set_pc(&mut self, pc: u16) {
        let [hi, lo] = pc.to_be_bytes();
        self.pc = (hi, lo);
    }

    /// Address held by `h:l`.
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.reg(Register::H), self.reg(Register::L)])
    }

    pub fn is_running(&self) -> bool {
        self.exit == EXIT_RUNNING
    }

    pub fn fault(&self) -> Option<Fault> {
        Fault::from_code(self.exit)
    }

    /// Queues bytes to be read from `port`.
    pub fn feed_input(&mut self, port: u8, bytes: &[u8]) {
        self.input.entry(port).or_default().extend(bytes);
    }

    fn read_port(&mut self, port: u8) -> u8 {
        self.input
            .get_mut(&port)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0)
    }

    fn write_port(&mut self, port: u8, value: u8) {
        match port {
            PORT_EXIT => {
                tracing::debug!(code = value, "exit requested");
                self.exit = value as i32;
            }
            PORT_GPU => self.output.push(value),
            _ => tracing::trace!(port, value, "write to unmapped port"),
        }
    }
}
