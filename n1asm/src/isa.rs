//! Instruction set of the N1: register codes, opcodes and operand shapes.
//!
//! An instruction's first byte is `opcode << 3 | register`, the register
//! being its first register operand (0 without one).


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Register {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    H = 4,
    L = 5,
    Z = 6,
    F = 7,
}

impl Register {
    pub const ALL: [Register; 8] = [
        Register::A,
        Register::B,
        Register::C,
        Register::D,
        Register::H,
        Register::L,
        Register::Z,
        Register::F,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Register for the low 3 bits of `code`.
    pub fn from_code(code: u8) -> Self {
        Self::ALL[(code & 0b111) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "a",
            Register::B => "b",
            Register::C => "c",
            Register::D => "d",
            Register::H => "h",
            Register::L => "l",
            Register::Z => "z",
            Register::F => "f",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Register,
    Immediate,
    Address,
}

impl OperandKind {
    /// Argument class letter used by macro parameters (`%r0`, `%i1`, `%a2`).
    pub fn class(self) -> char {
        match self {
            OperandKind::Register => 'r',
            OperandKind::Immediate => 'i',
            OperandKind::Address => 'a',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionDef {
    pub name: &'static str,
    pub opcode: u8,
    pub operands: &'static [OperandKind],
    /// Encoded size in bytes.
    pub length: u8,
}

impl InstructionDef {
    pub fn arity(&self) -> usize {
        self.operands.len()
    }

    pub fn binary(&self) -> String {
        format!("{:05b}", self.opcode)
    }
}

use OperandKind::{Address as A, Immediate as I, Register as R};

const fn def(
    name: &'static str,
    opcode: u8,
    operands: &'static [OperandKind],
    length: u8,
) -> InstructionDef {
    InstructionDef {
        name,
        opcode,
        operands,
        length,
    }
}

/// Indexed by opcode.
pub static INSTRUCTIONS: [InstructionDef; 32] = [
    def("mvi", 0b00000, &[R, I], 2),
    def("mvr", 0b00001, &[R, R], 2),
    def("lda", 0b00010, &[R, A], 3),
    def("ldhl", 0b00011, &[R], 1),
    def("sta", 0b00100, &[R, A], 3),
    def("sthl", 0b00101, &[R], 1),
    def("pushi", 0b00110, &[I], 2),
    def("pushr", 0b00111, &[R], 1),
    def("pop", 0b01000, &[R], 1),
    def("nop", 0b01001, &[], 1),
    def("jnz", 0b01010, &[R], 1),
    def("jmp", 0b01011, &[], 1),
    def("ini", 0b01100, &[R, I], 2),
    def("inr", 0b01101, &[R, R], 2),
    def("outi", 0b01110, &[R, I], 2),
    def("outr", 0b01111, &[R, R], 2),
    def("addi", 0b10000, &[R, I], 2),
    def("addr", 0b10001, &[R, R], 2),
    def("adci", 0b10010, &[R, I], 2),
    def("adcr", 0b10011, &[R, R], 2),
    def("andi", 0b10100, &[R, I], 2),
    def("andr", 0b10101, &[R, R], 2),
    def("ori", 0b10110, &[R, I], 2),
    def("orr", 0b10111, &[R, R], 2),
    def("nori", 0b11000, &[R, I], 2),
    def("norr", 0b11001, &[R, R], 2),
    def("cmpi", 0b11010, &[R, I], 2),
    def("cmpr", 0b11011, &[R, R], 2),
    def("sbbi", 0b11100, &[R, I], 2),
    def("sbbr", 0b11101, &[R, R], 2),
    def("shl", 0b11110, &[R], 1),
    def("shr", 0b11111, &[R], 1),
];

pub fn by_name(name: &str) -> Option<&'static InstructionDef> {
    INSTRUCTIONS
        .iter()
        .find(|def| def.name.eq_ignore_ascii_case(name))
}

pub fn by_opcode(opcode: u8) -> Option<&'static InstructionDef> {
    INSTRUCTIONS.get(opcode as usize)
}

/// Opcode of `name` as a 5-digit binary string.
pub fn opcode_binary(name: &str) -> Option<String> {
    by_name(name).map(InstructionDef::binary)
}

pub fn instruction_from_binary(binary: &str) -> Option<&'static InstructionDef> {
    if binary.len() != 5 || !is_binary(binary) {
        return None;
    }
    by_opcode(u8::from_str_radix(binary, 2).ok()?)
}

pub fn register_binary(name: &str) -> Option<String> {
    Register::from_name(name).map(|r| format!("{:03b}", r.code()))
}

pub fn register_from_binary(binary: &str) -> Option<Register> {
    if binary.len() != 3 || !is_binary(binary) {
        return None;
    }
    u8::from_str_radix(binary, 2).ok().map(Register::from_code)
}

fn is_binary(digits: &str) -> bool {
    digits.bytes().all(|b| matches!(b, b'0' | b'1'))
}

pub fn with_length(length: u8) -> impl Iterator<Item = &'static InstructionDef> {
    INSTRUCTIONS.iter().filter(move |def| def.length == length)
}

pub fn with_arity(arity: usize) -> impl Iterator<Item = &'static InstructionDef> {
    INSTRUCTIONS.iter().filter(move |def| def.arity() == arity)
}
