use n1asm::isa::{self, InstructionDef, OperandKind, Register};

use crate::{Fault, N1};


/// A fetched instruction with its operands pulled out of the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub def: &'static InstructionDef,
    pub reg: Register,
    /// Second register operand, from the low bits of byte 2.
    pub source: Register,
    /// Byte 2 for immediates.
    pub imm: u8,
    /// Bytes 2 and 3, high first.
    pub addr: u16,
}

impl Decoded {
    /// Decodes the bytes of one instruction. `bytes` holds at least `length` bytes.
    pub fn new(bytes: &[u8]) -> Option<Self> {
        let first = *bytes.first()?;
        let def = isa::by_opcode(first >> 3)?;
        let operand = |i: usize| bytes.get(i).copied().unwrap_or(0);
        let mut decoded = Decoded {
            def,
            reg: Register::from_code(first),
            source: Register::A,
            imm: 0,
            addr: 0,
        };
        match def.operands.get(1).or(def.operands.first()) {
            Some(OperandKind::Register) if def.arity() == 2 => {
                decoded.source = Register::from_code(operand(1))
            }
            Some(OperandKind::Immediate) => decoded.imm = operand(1),
            Some(OperandKind::Address) => {
                decoded.addr = u16::from_be_bytes([operand(1), operand(2)])
            }
            _ => (),
        }
        Some(decoded)
    }
}

/// Encodes an instruction: first byte `opcode << 3 | reg`, then the operand bytes.
pub fn encode(def: &InstructionDef, reg: Register, operand: u16) -> Vec<u8> {
    let mut out = vec![def.opcode << 3 | reg.code()];
    match def.length {
        2 => out.push(operand as u8),
        3 => out.extend(operand.to_be_bytes()),
        _ => (),
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alu {
    Add,
    Adc,
    And,
    Or,
    Nor,
    Cmp,
    Sbb,
    Shl,
    Shr,
}

const CARRY: u8 = 0b01;
const ZERO: u8 = 0b10;

impl N1 {
    /// Fetches the instruction at `pc`. Fetching goes through the address map,
    /// so a bad `pc` faults like any other read.
    pub fn fetch(&mut self) -> Option<Decoded> {
        let pc = self.pc();
        let first = self.addr_get(pc);
        if !self.is_running() {
            return None;
        }
        let Some(def) = isa::by_opcode(first >> 3) else {
            self.raise(Fault::Unknown, pc);
            return None;
        };
        let mut bytes = vec![first];
        for i in 1..def.length as u16 {
            bytes.push(self.addr_get(pc.wrapping_add(i)));
        }
        if !self.is_running() {
            return None;
        }
        Decoded::new(&bytes)
    }

    /// Runs one instruction. Does nothing once the machine stopped.
    pub fn step(&mut self) {
        if !self.is_running() {
            return;
        }
        let Some(ins) = self.fetch() else {
            return;
        };
        let next = self.pc().wrapping_add(u16::from(ins.def.length));
        self.set_pc(next);
        tracing::trace!(pc = next, ins = ins.def.name, "step");
        self.execute(ins);
    }

    /// Steps until the machine stops or `max_steps` ran. Returns the exit code,
    /// which is still `EXIT_RUNNING` when the step budget ran out.
    pub fn run(&mut self, max_steps: Option<u64>) -> i32 {
        let mut steps = 0u64;
        while self.is_running() && max_steps.map_or(true, |max| steps < max) {
            self.step();
            steps += 1;
        }
        tracing::debug!(steps, exit = self.exit, "run finished");
        self.exit
    }

    fn execute(&mut self, ins: Decoded) {
        let r = ins.reg;
        match ins.def.name {
            "mvi" => *self.reg_mut(r) = ins.imm,
            "mvr" => *self.reg_mut(r) = self.reg(ins.source),
            "lda" => *self.reg_mut(r) = self.addr_get(ins.addr),
            "ldhl" => *self.reg_mut(r) = self.addr_get(self.hl()),
            "sta" => {
                self.addr_set(ins.addr, self.reg(r));
            }
            "sthl" => {
                self.addr_set(self.hl(), self.reg(r));
            }
            "pushi" => {
                self.push(ins.imm);
            }
            "pushr" => {
                self.push(self.reg(r));
            }
            "pop" => {
                let value = self.pop();
                if self.is_running() {
                    *self.reg_mut(r) = value;
                }
            }
            "nop" => (),
            "jnz" => {
                if self.reg(r) != 0 {
                    self.set_pc(self.hl());
                }
            }
            "jmp" => self.set_pc(self.hl()),
            "ini" => *self.reg_mut(r) = self.read_port(ins.imm),
            "inr" => *self.reg_mut(r) = self.read_port(self.reg(ins.source)),
            "outi" => self.write_port(ins.imm, self.reg(r)),
            "outr" => self.write_port(self.reg(ins.source), self.reg(r)),
            "addi" => self.alu(Alu::Add, r, ins.imm),
            "addr" => self.alu(Alu::Add, r, self.reg(ins.source)),
            "adci" => self.alu(Alu::Adc, r, ins.imm),
            "adcr" => self.alu(Alu::Adc, r, self.reg(ins.source)),
            "andi" => self.alu(Alu::And, r, ins.imm),
            "andr" => self.alu(Alu::And, r, self.reg(ins.source)),
            "ori" => self.alu(Alu::Or, r, ins.imm),
            "orr" => self.alu(Alu::Or, r, self.reg(ins.source)),
            "nori" => self.alu(Alu::Nor, r, ins.imm),
            "norr" => self.alu(Alu::Nor, r, self.reg(ins.source)),
            "cmpi" => self.alu(Alu::Cmp, r, ins.imm),
            "cmpr" => self.alu(Alu::Cmp, r, self.reg(ins.source)),
            "sbbi" => self.alu(Alu::Sbb, r, ins.imm),
            "sbbr" => self.alu(Alu::Sbb, r, self.reg(ins.source)),
            "shl" => self.alu(Alu::Shl, r, 0),
            "shr" => self.alu(Alu::Shr, r, 0),
            _ => self.raise(Fault::Unknown, self.pc()),
        }
    }

    /// Applies an ALU op to `r`, then sets carry and zero in `f`.
    fn alu(&mut self, op: Alu, r: Register, operand: u8) {
        let a = self.reg(r);
        let carry_in = self.reg(Register::F) & CARRY;
        let (result, carry) = match op {
            Alu::Add => a.overflowing_add(operand),
            Alu::Adc => {
                let sum = u16::from(a) + u16::from(operand) + u16::from(carry_in);
                (sum as u8, sum > 0xFF)
            }
            Alu::And => (a & operand, false),
            Alu::Or => (a | operand, false),
            Alu::Nor => (!(a | operand), false),
            Alu::Cmp => a.overflowing_sub(operand),
            Alu::Sbb => {
                let diff = i16::from(a) - i16::from(operand) - i16::from(carry_in);
                (diff as u8, diff < 0)
            }
            Alu::Shl => (a << 1, a & 0x80 != 0),
            Alu::Shr => (a >> 1, a & 0x01 != 0),
        };
        if op != Alu::Cmp {
            *self.reg_mut(r) = result;
        }
        let mut flags = 0;
        if carry {
            flags |= CARRY;
        }
        if result == 0 {
            flags |= ZERO;
        }
        *self.reg_mut(Register::F) = flags;
    }
}
