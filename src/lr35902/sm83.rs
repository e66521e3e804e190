use crate::lr35902::handlers::{FHandler, Handlers};
use crate::memory::mmu::Mmu;
use bitflags::bitflags;
use log::trace;
use std::cmp::PartialEq;

type FDecode = fn(u8, Opcode) -> Instruction;

const PREFIX: u8 = 0xcb;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    BC,
    DE,
    HL,
    SP,
}

/// Register pairs reachable through push and pop. AF only exists here.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum StackPair {
    BC,
    DE,
    HL,
    AF,
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    pub struct AddressingMode: u8 {
        const DIRECT    = 0b0001;
        const INDIRECT  = 0b0010;
        const INCREMENT = 0b0100;
        const DECREMENT = 0b1000;
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Condition {
    None,
    NZ,
    Z,
    NC,
    C,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Operand {
    /// An indirect 8-bit register addresses `$ff00 + reg`.
    Reg8(Register, AddressingMode),
    Reg16(Register, AddressingMode),
    Pair(StackPair),
    /// An indirect immediate addresses `$ff00 + imm`.
    Imm8(u8, AddressingMode),
    Imm16(u16, AddressingMode),
    Conditional(Condition),
    DisplacedReg16(Register, i8, AddressingMode),
    Offset(i8),
    Bit(u8),
    Vector(u16),
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Opcode {
    Nop,
    Ld,
    Ldh,
    Inc,
    Dec,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Jp,
    Jr,
    Call,
    Ret,
    Reti,
    Rst,
    Push,
    Pop,
    Halt,
    Stop,
    Di,
    Ei,
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit,
    Res,
    Set,
    Illegal,
}

/// A decoded instruction. Cycle counts are in machine cycles; the second
/// entry is the cost when a conditional branch is not taken.
#[derive(Clone, Copy)]
pub struct Instruction {
    pub opcode: Opcode,
    pub lhs: Option<Operand>,
    pub rhs: Option<Operand>,
    pub length: usize,
    pub cycles: (usize, Option<usize>),
    pub handler: FHandler,
}

impl Instruction {
    fn new(opcode: Opcode, lhs: Option<Operand>, rhs: Option<Operand>, length: usize, cycles: usize) -> Instruction {
        Instruction {
            opcode,
            lhs,
            rhs,
            length,
            cycles: (cycles, None),
            handler: Handlers::lookup(opcode),
        }
    }

    fn branch(
        opcode: Opcode,
        lhs: Option<Operand>,
        rhs: Option<Operand>,
        length: usize,
        cycles: (usize, usize),
    ) -> Instruction {
        let not_taken = if lhs == Some(Operand::Conditional(Condition::None)) {
            None
        } else {
            Some(cycles.1)
        };

        Instruction {
            cycles: (cycles.0, not_taken),
            ..Instruction::new(opcode, lhs, rhs, length, cycles.0)
        }
    }

    fn illegal() -> Instruction {
        Instruction::new(Opcode::Illegal, None, None, 1, 1)
    }
}

macro_rules! define_decoder {
    ( $pattern:expr, $opcode:expr, $function:expr ) => {{
        (String::from($pattern), $opcode, $function)
    }};
}

/// Decoder for the SM83 instruction set. Both opcode pages are expanded into
/// 256-entry tables once, so decoding is an index plus an immediate fetch.
#[derive(Clone)]
pub struct Sm83 {
    lut: Vec<Instruction>,
    lut_prefixed: Vec<Instruction>,
}

impl Sm83 {
    pub fn new() -> Sm83 {
        let mut decoder_lut = Vec::new();
        let mut decoder_lut_prefixed = Vec::new();

        Sm83::propagate_decoders(&mut decoder_lut);
        Sm83::propagate_decoders_prefixed(&mut decoder_lut_prefixed);

        Sm83 {
            lut: Sm83::expand(&decoder_lut),
            lut_prefixed: Sm83::expand(&decoder_lut_prefixed),
        }
    }

    pub fn decode(&self, mmu: &Mmu, current_pc: u16) -> Instruction {
        let opcode_byte = mmu.read(current_pc);

        let mut instruction = if opcode_byte == PREFIX {
            self.lut_prefixed[mmu.read(current_pc.wrapping_add(1)) as usize]
        } else {
            self.lut[opcode_byte as usize]
        };

        instruction.lhs = instruction.lhs.map(|operand| Sm83::patch_immediate(operand, mmu, current_pc));
        instruction.rhs = instruction.rhs.map(|operand| Sm83::patch_immediate(operand, mmu, current_pc));

        instruction
    }

    fn patch_immediate(operand: Operand, mmu: &Mmu, current_pc: u16) -> Operand {
        let operand_address = current_pc.wrapping_add(1);
        match operand {
            Operand::Imm8(_, mode) => Operand::Imm8(mmu.read(operand_address), mode),
            Operand::Imm16(_, mode) => Operand::Imm16(mmu.read16(operand_address), mode),
            Operand::Offset(_) => Operand::Offset(mmu.read(operand_address) as i8),
            Operand::DisplacedReg16(reg, _, mode) => {
                Operand::DisplacedReg16(reg, mmu.read(operand_address) as i8, mode)
            }
            _ => operand,
        }
    }

    fn expand(decoders: &[(String, Opcode, FDecode)]) -> Vec<Instruction> {
        (0..=0xffu8)
            .map(|byte| {
                let opcode_str = format!("{:08b}", byte);
                decoders
                    .iter()
                    .find(|(pattern, _, _)| Sm83::matches(pattern, &opcode_str))
                    .map(|(_, opcode, decoder_fn)| decoder_fn(byte, *opcode))
                    .unwrap_or_else(|| {
                        trace!("No decoder for opcode {:#04x}, marking as illegal", byte);
                        Instruction::illegal()
                    })
            })
            .collect()
    }

    fn matches(pattern: &str, opcode_str: &str) -> bool {
        pattern.len() == opcode_str.len() && pattern.chars().zip(opcode_str.chars()).all(|(p, c)| p == 'x' || p == c)
    }

    fn lookup_register(data: u8) -> Register {
        match data & 0b111 {
            0b000 => Register::B,
            0b001 => Register::C,
            0b010 => Register::D,
            0b011 => Register::E,
            0b100 => Register::H,
            0b101 => Register::L,
            0b110 => Register::HL,
            _ => Register::A,
        }
    }

    fn lookup_register_16(data: u8) -> Register {
        match data & 0b11 {
            0b00 => Register::BC,
            0b01 => Register::DE,
            0b10 => Register::HL,
            _ => Register::SP,
        }
    }

    fn lookup_stack_pair(data: u8) -> StackPair {
        match data & 0b11 {
            0b00 => StackPair::BC,
            0b01 => StackPair::DE,
            0b10 => StackPair::HL,
            _ => StackPair::AF,
        }
    }

    /// Memory operand selected by bits 4-5 of `ld (r16), a` and `ld a, (r16)`.
    fn lookup_register_16_memory(data: u8) -> Operand {
        match data & 0b11 {
            0b00 => Operand::Reg16(Register::BC, AddressingMode::INDIRECT),
            0b01 => Operand::Reg16(Register::DE, AddressingMode::INDIRECT),
            0b10 => Operand::Reg16(Register::HL, AddressingMode::INDIRECT | AddressingMode::INCREMENT),
            _ => Operand::Reg16(Register::HL, AddressingMode::INDIRECT | AddressingMode::DECREMENT),
        }
    }

    fn lookup_condition_3bits(data: u8) -> Condition {
        match data & 0b111 {
            0b100 => Condition::NZ,
            0b101 => Condition::Z,
            0b110 => Condition::NC,
            0b111 => Condition::C,
            _ => Condition::None,
        }
    }

    fn lookup_condition_2bits(data: u8) -> Condition {
        match data & 0b11 {
            0b00 => Condition::NZ,
            0b01 => Condition::Z,
            0b10 => Condition::NC,
            _ => Condition::C,
        }
    }

    fn decode_8bit_operand(value: u8, base_cycles: usize, hl_cycles: usize) -> (Operand, usize) {
        if value & 0b111 == 0b110 {
            (Operand::Reg16(Register::HL, AddressingMode::INDIRECT), hl_cycles)
        } else {
            (Operand::Reg8(Sm83::lookup_register(value), AddressingMode::DIRECT), base_cycles)
        }
    }

    fn accumulator() -> Option<Operand> {
        Some(Operand::Reg8(Register::A, AddressingMode::DIRECT))
    }

    fn alu_register(opcode_byte: u8, opcode: Opcode) -> Instruction {
        let (rhs, cycles) = Sm83::decode_8bit_operand(opcode_byte, 1, 2);
        Instruction::new(opcode, Sm83::accumulator(), Some(rhs), 1, cycles)
    }

    fn alu_immediate(_: u8, opcode: Opcode) -> Instruction {
        Instruction::new(opcode, Sm83::accumulator(), Some(Operand::Imm8(0, AddressingMode::DIRECT)), 2, 2)
    }

    fn implied(_: u8, opcode: Opcode) -> Instruction {
        Instruction::new(opcode, None, None, 1, 1)
    }

    fn propagate_decoders(lut: &mut Vec<(String, Opcode, FDecode)>) {
        // nop
        lut.push(define_decoder!("00000000", Opcode::Nop, Sm83::implied));

        // ld (imm16), SP
        lut.push(define_decoder!("00001000", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Imm16(0, AddressingMode::INDIRECT)),
                Some(Operand::Reg16(Register::SP, AddressingMode::DIRECT)),
                3,
                5,
            )
        }));

        // stop imm8
        lut.push(define_decoder!("00010000", Opcode::Stop, |_, opcode| {
            Instruction::new(opcode, Some(Operand::Imm8(0, AddressingMode::DIRECT)), None, 2, 1)
        }));

        // rotates on the accumulator
        lut.push(define_decoder!("00000111", Opcode::Rlca, Sm83::implied));
        lut.push(define_decoder!("00001111", Opcode::Rrca, Sm83::implied));
        lut.push(define_decoder!("00010111", Opcode::Rla, Sm83::implied));
        lut.push(define_decoder!("00011111", Opcode::Rra, Sm83::implied));

        // daa / cpl / scf / ccf
        lut.push(define_decoder!("00100111", Opcode::Daa, Sm83::implied));
        lut.push(define_decoder!("00101111", Opcode::Cpl, Sm83::implied));
        lut.push(define_decoder!("00110111", Opcode::Scf, Sm83::implied));
        lut.push(define_decoder!("00111111", Opcode::Ccf, Sm83::implied));

        // halt, must come before ld r8, r8
        lut.push(define_decoder!("01110110", Opcode::Halt, Sm83::implied));

        // add sp, imm8
        lut.push(define_decoder!("11101000", Opcode::Add, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Reg16(Register::SP, AddressingMode::DIRECT)),
                Some(Operand::Offset(0)),
                2,
                4,
            )
        }));

        // ld hl, sp+/-imm8
        lut.push(define_decoder!("11111000", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Reg16(Register::HL, AddressingMode::DIRECT)),
                Some(Operand::DisplacedReg16(Register::SP, 0, AddressingMode::DIRECT)),
                2,
                3,
            )
        }));

        // ld sp, hl
        lut.push(define_decoder!("11111001", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Reg16(Register::SP, AddressingMode::DIRECT)),
                Some(Operand::Reg16(Register::HL, AddressingMode::DIRECT)),
                1,
                2,
            )
        }));

        // jp hl
        lut.push(define_decoder!("11101001", Opcode::Jp, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Conditional(Condition::None)),
                Some(Operand::Reg16(Register::HL, AddressingMode::DIRECT)),
                1,
                1,
            )
        }));

        // jp imm16
        lut.push(define_decoder!("11000011", Opcode::Jp, |_, opcode| {
            Instruction::branch(
                opcode,
                Some(Operand::Conditional(Condition::None)),
                Some(Operand::Imm16(0, AddressingMode::DIRECT)),
                3,
                (4, 4),
            )
        }));

        // call imm16
        lut.push(define_decoder!("11001101", Opcode::Call, |_, opcode| {
            Instruction::branch(
                opcode,
                Some(Operand::Conditional(Condition::None)),
                Some(Operand::Imm16(0, AddressingMode::DIRECT)),
                3,
                (6, 6),
            )
        }));

        // ret
        lut.push(define_decoder!("11001001", Opcode::Ret, |_, opcode| {
            Instruction::branch(opcode, Some(Operand::Conditional(Condition::None)), None, 1, (4, 4))
        }));

        // reti
        lut.push(define_decoder!("11011001", Opcode::Reti, |_, opcode| {
            Instruction::new(opcode, None, None, 1, 4)
        }));

        // ldh (imm8), A
        lut.push(define_decoder!("11100000", Opcode::Ldh, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Imm8(0, AddressingMode::INDIRECT)),
                Sm83::accumulator(),
                2,
                3,
            )
        }));

        // ldh A, (imm8)
        lut.push(define_decoder!("11110000", Opcode::Ldh, |_, opcode| {
            Instruction::new(
                opcode,
                Sm83::accumulator(),
                Some(Operand::Imm8(0, AddressingMode::INDIRECT)),
                2,
                3,
            )
        }));

        // ld (C), A
        lut.push(define_decoder!("11100010", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Reg8(Register::C, AddressingMode::INDIRECT)),
                Sm83::accumulator(),
                1,
                2,
            )
        }));

        // ld A, (C)
        lut.push(define_decoder!("11110010", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Sm83::accumulator(),
                Some(Operand::Reg8(Register::C, AddressingMode::INDIRECT)),
                1,
                2,
            )
        }));

        // ld (imm16), A
        lut.push(define_decoder!("11101010", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Some(Operand::Imm16(0, AddressingMode::INDIRECT)),
                Sm83::accumulator(),
                3,
                4,
            )
        }));

        // ld A, (imm16)
        lut.push(define_decoder!("11111010", Opcode::Ld, |_, opcode| {
            Instruction::new(
                opcode,
                Sm83::accumulator(),
                Some(Operand::Imm16(0, AddressingMode::INDIRECT)),
                3,
                4,
            )
        }));

        // di / ei
        lut.push(define_decoder!("11110011", Opcode::Di, Sm83::implied));
        lut.push(define_decoder!("11111011", Opcode::Ei, Sm83::implied));

        // ld r16, imm16
        lut.push(define_decoder!("00xx0001", Opcode::Ld, |opcode_byte, opcode| {
            let destination = Sm83::lookup_register_16(opcode_byte >> 4);
            Instruction::new(
                opcode,
                Some(Operand::Reg16(destination, AddressingMode::DIRECT)),
                Some(Operand::Imm16(0, AddressingMode::DIRECT)),
                3,
                3,
            )
        }));

        // ld (r16), A
        lut.push(define_decoder!("00xx0010", Opcode::Ld, |opcode_byte, opcode| {
            let destination = Sm83::lookup_register_16_memory(opcode_byte >> 4);
            Instruction::new(opcode, Some(destination), Sm83::accumulator(), 1, 2)
        }));

        // ld A, (r16)
        lut.push(define_decoder!("00xx1010", Opcode::Ld, |opcode_byte, opcode| {
            let source = Sm83::lookup_register_16_memory(opcode_byte >> 4);
            Instruction::new(opcode, Sm83::accumulator(), Some(source), 1, 2)
        }));

        // inc r16
        lut.push(define_decoder!("00xx0011", Opcode::Inc, |opcode_byte, opcode| {
            let register = Sm83::lookup_register_16(opcode_byte >> 4);
            Instruction::new(opcode, Some(Operand::Reg16(register, AddressingMode::DIRECT)), None, 1, 2)
        }));

        // dec r16
        lut.push(define_decoder!("00xx1011", Opcode::Dec, |opcode_byte, opcode| {
            let register = Sm83::lookup_register_16(opcode_byte >> 4);
            Instruction::new(opcode, Some(Operand::Reg16(register, AddressingMode::DIRECT)), None, 1, 2)
        }));

        // add hl, r16
        lut.push(define_decoder!("00xx1001", Opcode::Add, |opcode_byte, opcode| {
            let source = Sm83::lookup_register_16(opcode_byte >> 4);
            Instruction::new(
                opcode,
                Some(Operand::Reg16(Register::HL, AddressingMode::DIRECT)),
                Some(Operand::Reg16(source, AddressingMode::DIRECT)),
                1,
                2,
            )
        }));

        // inc r8 / inc (HL)
        lut.push(define_decoder!("00xxx100", Opcode::Inc, |opcode_byte, opcode| {
            let (lhs, cycles) = Sm83::decode_8bit_operand(opcode_byte >> 3, 1, 3);
            Instruction::new(opcode, Some(lhs), None, 1, cycles)
        }));

        // dec r8 / dec (HL)
        lut.push(define_decoder!("00xxx101", Opcode::Dec, |opcode_byte, opcode| {
            let (lhs, cycles) = Sm83::decode_8bit_operand(opcode_byte >> 3, 1, 3);
            Instruction::new(opcode, Some(lhs), None, 1, cycles)
        }));

        // ld r8, imm8 / ld (HL), imm8
        lut.push(define_decoder!("00xxx110", Opcode::Ld, |opcode_byte, opcode| {
            let (lhs, cycles) = Sm83::decode_8bit_operand(opcode_byte >> 3, 2, 3);
            Instruction::new(opcode, Some(lhs), Some(Operand::Imm8(0, AddressingMode::DIRECT)), 2, cycles)
        }));

        // jr cond, imm8 / jr imm8
        lut.push(define_decoder!("00xxx000", Opcode::Jr, |opcode_byte, opcode| {
            let condition = Sm83::lookup_condition_3bits(opcode_byte >> 3);
            Instruction::branch(
                opcode,
                Some(Operand::Conditional(condition)),
                Some(Operand::Offset(0)),
                2,
                (3, 2),
            )
        }));

        // ld r8, r8 / ld r8, (HL) / ld (HL), r8
        lut.push(define_decoder!("01xxxxxx", Opcode::Ld, |opcode_byte, opcode| {
            let (lhs, lhs_cycles) = Sm83::decode_8bit_operand(opcode_byte >> 3, 1, 2);
            let (rhs, rhs_cycles) = Sm83::decode_8bit_operand(opcode_byte, 1, 2);
            Instruction::new(opcode, Some(lhs), Some(rhs), 1, lhs_cycles.max(rhs_cycles))
        }));

        // alu A, r8 / alu A, (HL)
        lut.push(define_decoder!("10000xxx", Opcode::Add, Sm83::alu_register));
        lut.push(define_decoder!("10001xxx", Opcode::Adc, Sm83::alu_register));
        lut.push(define_decoder!("10010xxx", Opcode::Sub, Sm83::alu_register));
        lut.push(define_decoder!("10011xxx", Opcode::Sbc, Sm83::alu_register));
        lut.push(define_decoder!("10100xxx", Opcode::And, Sm83::alu_register));
        lut.push(define_decoder!("10101xxx", Opcode::Xor, Sm83::alu_register));
        lut.push(define_decoder!("10110xxx", Opcode::Or, Sm83::alu_register));
        lut.push(define_decoder!("10111xxx", Opcode::Cp, Sm83::alu_register));

        // alu A, imm8
        lut.push(define_decoder!("11000110", Opcode::Add, Sm83::alu_immediate));
        lut.push(define_decoder!("11001110", Opcode::Adc, Sm83::alu_immediate));
        lut.push(define_decoder!("11010110", Opcode::Sub, Sm83::alu_immediate));
        lut.push(define_decoder!("11011110", Opcode::Sbc, Sm83::alu_immediate));
        lut.push(define_decoder!("11100110", Opcode::And, Sm83::alu_immediate));
        lut.push(define_decoder!("11101110", Opcode::Xor, Sm83::alu_immediate));
        lut.push(define_decoder!("11110110", Opcode::Or, Sm83::alu_immediate));
        lut.push(define_decoder!("11111110", Opcode::Cp, Sm83::alu_immediate));

        // ret cond
        lut.push(define_decoder!("110xx000", Opcode::Ret, |opcode_byte, opcode| {
            let condition = Sm83::lookup_condition_2bits(opcode_byte >> 3);
            Instruction::branch(opcode, Some(Operand::Conditional(condition)), None, 1, (5, 2))
        }));

        // jp cond, imm16
        lut.push(define_decoder!("110xx010", Opcode::Jp, |opcode_byte, opcode| {
            let condition = Sm83::lookup_condition_2bits(opcode_byte >> 3);
            Instruction::branch(
                opcode,
                Some(Operand::Conditional(condition)),
                Some(Operand::Imm16(0, AddressingMode::DIRECT)),
                3,
                (4, 3),
            )
        }));

        // call cond, imm16
        lut.push(define_decoder!("110xx100", Opcode::Call, |opcode_byte, opcode| {
            let condition = Sm83::lookup_condition_2bits(opcode_byte >> 3);
            Instruction::branch(
                opcode,
                Some(Operand::Conditional(condition)),
                Some(Operand::Imm16(0, AddressingMode::DIRECT)),
                3,
                (6, 3),
            )
        }));

        // pop r16
        lut.push(define_decoder!("11xx0001", Opcode::Pop, |opcode_byte, opcode| {
            let pair = Sm83::lookup_stack_pair(opcode_byte >> 4);
            Instruction::new(opcode, Some(Operand::Pair(pair)), None, 1, 3)
        }));

        // push r16
        lut.push(define_decoder!("11xx0101", Opcode::Push, |opcode_byte, opcode| {
            let pair = Sm83::lookup_stack_pair(opcode_byte >> 4);
            Instruction::new(opcode, Some(Operand::Pair(pair)), None, 1, 4)
        }));

        // rst vec
        lut.push(define_decoder!("11xxx111", Opcode::Rst, |opcode_byte, opcode| {
            let target = (opcode_byte & 0b0011_1000) as u16;
            Instruction::new(opcode, Some(Operand::Vector(target)), None, 1, 4)
        }));
    }

    fn propagate_decoders_prefixed(lut: &mut Vec<(String, Opcode, FDecode)>) {
        fn shift(opcode_byte: u8, opcode: Opcode) -> Instruction {
            let (lhs, cycles) = Sm83::decode_8bit_operand(opcode_byte, 2, 4);
            Instruction::new(opcode, Some(lhs), None, 2, cycles)
        }

        lut.push(define_decoder!("00000xxx", Opcode::Rlc, shift));
        lut.push(define_decoder!("00001xxx", Opcode::Rrc, shift));
        lut.push(define_decoder!("00010xxx", Opcode::Rl, shift));
        lut.push(define_decoder!("00011xxx", Opcode::Rr, shift));
        lut.push(define_decoder!("00100xxx", Opcode::Sla, shift));
        lut.push(define_decoder!("00101xxx", Opcode::Sra, shift));
        lut.push(define_decoder!("00110xxx", Opcode::Swap, shift));
        lut.push(define_decoder!("00111xxx", Opcode::Srl, shift));

        // bit n, r8 / bit n, (HL)
        lut.push(define_decoder!("01xxxxxx", Opcode::Bit, |opcode_byte, opcode| {
            let bit = (opcode_byte & 0b0011_1000) >> 3;
            let (rhs, cycles) = Sm83::decode_8bit_operand(opcode_byte, 2, 3);
            Instruction::new(opcode, Some(Operand::Bit(bit)), Some(rhs), 2, cycles)
        }));

        // res n, r8 / res n, (HL)
        lut.push(define_decoder!("10xxxxxx", Opcode::Res, |opcode_byte, opcode| {
            let bit = (opcode_byte & 0b0011_1000) >> 3;
            let (rhs, cycles) = Sm83::decode_8bit_operand(opcode_byte, 2, 4);
            Instruction::new(opcode, Some(Operand::Bit(bit)), Some(rhs), 2, cycles)
        }));

        // set n, r8 / set n, (HL)
        lut.push(define_decoder!("11xxxxxx", Opcode::Set, |opcode_byte, opcode| {
            let bit = (opcode_byte & 0b0011_1000) >> 3;
            let (rhs, cycles) = Sm83::decode_8bit_operand(opcode_byte, 2, 4);
            Instruction::new(opcode, Some(Operand::Bit(bit)), Some(rhs), 2, cycles)
        }));
    }
}

impl Default for Sm83 {
    fn default() -> Sm83 {
        Sm83::new()
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut output = format!("{:?}", self.opcode).to_lowercase();

        let mut ignore_destination = false;
        if let Some(destination) = &self.lhs {
            match destination {
                Operand::Conditional(Condition::None) => ignore_destination = true,
                _ => output.push_str(&format!(" {}", destination)),
            };
        }

        if let Some(source) = &self.rhs {
            if !ignore_destination {
                output.push_str(&format!(", {}", source));
            } else {
                output.push_str(&format!(" {}", source));
            }
        }

        write!(f, "{}", output)
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let output = match self {
            Register::A => "a",
            Register::B => "b",
            Register::C => "c",
            Register::D => "d",
            Register::E => "e",
            Register::H => "h",
            Register::L => "l",
            Register::BC => "bc",
            Register::DE => "de",
            Register::HL => "hl",
            Register::SP => "sp",
        };

        write!(f, "{}", output)
    }
}

impl std::fmt::Display for StackPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let output = match self {
            StackPair::BC => "bc",
            StackPair::DE => "de",
            StackPair::HL => "hl",
            StackPair::AF => "af",
        };

        write!(f, "{}", output)
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let output = match self {
            Operand::Reg8(reg, mode) => {
                if mode.contains(AddressingMode::INDIRECT) {
                    format!("({})", reg)
                } else {
                    format!("{}", reg)
                }
            }
            Operand::Reg16(reg, mode) => {
                if mode.contains(AddressingMode::INDIRECT) {
                    if mode.contains(AddressingMode::INCREMENT) {
                        format!("({}+)", reg)
                    } else if mode.contains(AddressingMode::DECREMENT) {
                        format!("({}-)", reg)
                    } else {
                        format!("({})", reg)
                    }
                } else {
                    format!("{}", reg)
                }
            }
            Operand::Pair(pair) => format!("{}", pair),
            Operand::Imm8(value, mode) => {
                if mode.contains(AddressingMode::INDIRECT) {
                    format!("(${:02x})", value)
                } else {
                    format!("${:02x}", value)
                }
            }
            Operand::Imm16(value, mode) => {
                if mode.contains(AddressingMode::INDIRECT) {
                    format!("(${:04x})", value)
                } else {
                    format!("${:04x}", value)
                }
            }
            Operand::Conditional(cond) => format!("{}", cond),
            Operand::Offset(value) => {
                if *value >= 0 {
                    format!("+{}", value)
                } else {
                    format!("{}", value)
                }
            }
            Operand::Bit(value) => format!("{}", value),
            Operand::Vector(target) => format!("${:02x}", target),
            Operand::DisplacedReg16(reg, value, _) => {
                if *value >= 0 {
                    format!("{}+{}", reg, value)
                } else {
                    format!("{}{}", reg, value)
                }
            }
        };

        write!(f, "{}", output)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let output = match self {
            Condition::None => "",
            Condition::NZ => "nz",
            Condition::Z => "z",
            Condition::NC => "nc",
            Condition::C => "c",
        };

        write!(f, "{}", output)
    }
}
