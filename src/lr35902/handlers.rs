use crate::lr35902::cpu::Cpu;
use crate::lr35902::registers::Flags;
use crate::lr35902::sm83::{AddressingMode, Condition, Instruction, Opcode, Operand, Register};
use crate::memory::mmu::Mmu;
use log::{debug, error};

/// Executes one decoded instruction and returns the machine cycles it took.
pub type FHandler = fn(&mut Cpu, &mut Mmu, &Instruction) -> usize;

const HIGH_PAGE: u16 = 0xff00;

pub struct Handlers {}

#[allow(unused_variables)]
impl Handlers {
    pub fn lookup(opcode: Opcode) -> FHandler {
        match opcode {
            Opcode::Nop => Handlers::nop,
            Opcode::Ld | Opcode::Ldh => Handlers::load,
            Opcode::Inc => Handlers::increment,
            Opcode::Dec => Handlers::decrement,
            Opcode::Add => Handlers::add,
            Opcode::Adc => Handlers::add_with_carry,
            Opcode::Sub => Handlers::sub,
            Opcode::Sbc => Handlers::sub_with_carry,
            Opcode::And => Handlers::and,
            Opcode::Xor => Handlers::xor,
            Opcode::Or => Handlers::or,
            Opcode::Cp => Handlers::compare,
            Opcode::Rlca | Opcode::Rrca | Opcode::Rla | Opcode::Rra => Handlers::rotate_accumulator,
            Opcode::Daa => Handlers::decimal_adjust,
            Opcode::Cpl => Handlers::complement,
            Opcode::Scf => Handlers::set_carry,
            Opcode::Ccf => Handlers::complement_carry,
            Opcode::Jp | Opcode::Jr => Handlers::jump,
            Opcode::Call => Handlers::call,
            Opcode::Ret => Handlers::ret,
            Opcode::Reti => Handlers::reti,
            Opcode::Rst => Handlers::restart,
            Opcode::Push => Handlers::push,
            Opcode::Pop => Handlers::pop,
            Opcode::Halt => Handlers::halt,
            Opcode::Stop => Handlers::stop,
            Opcode::Di => Handlers::disable_interrupts,
            Opcode::Ei => Handlers::enable_interrupts,
            Opcode::Rlc
            | Opcode::Rrc
            | Opcode::Rl
            | Opcode::Rr
            | Opcode::Sla
            | Opcode::Sra
            | Opcode::Swap
            | Opcode::Srl => Handlers::shift,
            Opcode::Bit => Handlers::test_bit,
            Opcode::Res => Handlers::reset_bit,
            Opcode::Set => Handlers::set_bit,
            Opcode::Illegal => Handlers::illegal,
        }
    }

    pub fn nop(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        instruction.cycles.0
    }

    pub fn load(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, rhs) = Handlers::operands(instruction);

        match (lhs, rhs) {
            // ld r16, imm16 / ld sp, hl
            (Operand::Reg16(dst, dst_mode), Operand::Imm16(value, src_mode))
                if dst_mode == AddressingMode::DIRECT && src_mode == AddressingMode::DIRECT =>
            {
                cpu.write_register16(&dst, value)
            }
            (Operand::Reg16(dst, dst_mode), Operand::Reg16(src, src_mode))
                if dst_mode == AddressingMode::DIRECT && src_mode == AddressingMode::DIRECT =>
            {
                let value = cpu.read_register16(&src);
                cpu.write_register16(&dst, value);
            }
            // ld hl, sp+e8
            (Operand::Reg16(dst, _), Operand::DisplacedReg16(src, offset, _)) => {
                let base = cpu.read_register16(&src);
                let result = Handlers::add_signed_offset(cpu, base, offset);
                cpu.write_register16(&dst, result);
            }
            // ld (imm16), sp
            (Operand::Imm16(addr, _), Operand::Reg16(Register::SP, _)) => {
                let value = cpu.read_register16(&Register::SP);
                mmu.write16(addr, value);
            }
            _ => {
                let value = Handlers::read_operand(cpu, mmu, &rhs);
                Handlers::write_operand(cpu, mmu, &lhs, value);
                Handlers::post_adjust(cpu, &rhs);
                Handlers::post_adjust(cpu, &lhs);
            }
        }

        instruction.cycles.0
    }

    pub fn increment(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);

        match lhs {
            Operand::Reg16(reg, mode) if mode == AddressingMode::DIRECT => {
                let value = cpu.read_register16(&reg);
                cpu.write_register16(&reg, value.wrapping_add(1));
            }
            _ => {
                let value = Handlers::read_operand(cpu, mmu, &lhs);
                let result = value.wrapping_add(1);
                Handlers::write_operand(cpu, mmu, &lhs, result);

                cpu.update_flag(Flags::ZERO, result == 0);
                cpu.update_flag(Flags::SUBTRACT, false);
                cpu.update_flag(Flags::HALF_CARRY, (value & 0x0f) == 0x0f);
            }
        }

        instruction.cycles.0
    }

    pub fn decrement(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);

        match lhs {
            Operand::Reg16(reg, mode) if mode == AddressingMode::DIRECT => {
                let value = cpu.read_register16(&reg);
                cpu.write_register16(&reg, value.wrapping_sub(1));
            }
            _ => {
                let value = Handlers::read_operand(cpu, mmu, &lhs);
                let result = value.wrapping_sub(1);
                Handlers::write_operand(cpu, mmu, &lhs, result);

                cpu.update_flag(Flags::ZERO, result == 0);
                cpu.update_flag(Flags::SUBTRACT, true);
                cpu.update_flag(Flags::HALF_CARRY, (value & 0x0f) == 0);
            }
        }

        instruction.cycles.0
    }

    pub fn add(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, rhs) = Handlers::operands(instruction);

        match (lhs, rhs) {
            // add sp, e8
            (Operand::Reg16(Register::SP, _), Operand::Offset(offset)) => {
                let sp = cpu.read_register16(&Register::SP);
                let result = Handlers::add_signed_offset(cpu, sp, offset);
                cpu.write_register16(&Register::SP, result);
            }
            // add hl, r16
            (Operand::Reg16(dst, _), Operand::Reg16(src, _)) => {
                let x = cpu.read_register16(&dst);
                let y = cpu.read_register16(&src);
                let (result, carry) = x.overflowing_add(y);
                cpu.write_register16(&dst, result);

                cpu.update_flag(Flags::SUBTRACT, false);
                cpu.update_flag(Flags::HALF_CARRY, (x & 0x0fff) + (y & 0x0fff) > 0x0fff);
                cpu.update_flag(Flags::CARRY, carry);
            }
            _ => {
                let y = Handlers::read_operand(cpu, mmu, &rhs);
                Handlers::accumulate(cpu, y, false);
            }
        }

        instruction.cycles.0
    }

    pub fn add_with_carry(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let y = Handlers::read_operand(cpu, mmu, &rhs);
        let carry = cpu.read_flag(Flags::CARRY);
        Handlers::accumulate(cpu, y, carry);

        instruction.cycles.0
    }

    pub fn sub(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let y = Handlers::read_operand(cpu, mmu, &rhs);
        let result = Handlers::subtract(cpu, y, false);
        cpu.write_register(&Register::A, result);

        instruction.cycles.0
    }

    pub fn sub_with_carry(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let y = Handlers::read_operand(cpu, mmu, &rhs);
        let carry = cpu.read_flag(Flags::CARRY);
        let result = Handlers::subtract(cpu, y, carry);
        cpu.write_register(&Register::A, result);

        instruction.cycles.0
    }

    pub fn compare(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let y = Handlers::read_operand(cpu, mmu, &rhs);
        Handlers::subtract(cpu, y, false);

        instruction.cycles.0
    }

    pub fn and(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let result = cpu.read_register(&Register::A) & Handlers::read_operand(cpu, mmu, &rhs);
        cpu.write_register(&Register::A, result);
        cpu.set_flags(result == 0, false, true, false);

        instruction.cycles.0
    }

    pub fn xor(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let result = cpu.read_register(&Register::A) ^ Handlers::read_operand(cpu, mmu, &rhs);
        cpu.write_register(&Register::A, result);
        cpu.set_flags(result == 0, false, false, false);

        instruction.cycles.0
    }

    pub fn or(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (_, rhs) = Handlers::operands(instruction);
        let result = cpu.read_register(&Register::A) | Handlers::read_operand(cpu, mmu, &rhs);
        cpu.write_register(&Register::A, result);
        cpu.set_flags(result == 0, false, false, false);

        instruction.cycles.0
    }

    pub fn rotate_accumulator(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let value = cpu.read_register(&Register::A);
        let carry = cpu.read_flag(Flags::CARRY);

        let (result, carry_out) = match instruction.opcode {
            Opcode::Rlca => Handlers::rotate(Opcode::Rlc, value, carry),
            Opcode::Rrca => Handlers::rotate(Opcode::Rrc, value, carry),
            Opcode::Rla => Handlers::rotate(Opcode::Rl, value, carry),
            _ => Handlers::rotate(Opcode::Rr, value, carry),
        };

        cpu.write_register(&Register::A, result);
        cpu.set_flags(false, false, false, carry_out);

        instruction.cycles.0
    }

    pub fn decimal_adjust(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let mut value = cpu.read_register(&Register::A);
        let subtract = cpu.read_flag(Flags::SUBTRACT);
        let half_carry = cpu.read_flag(Flags::HALF_CARRY);
        let mut carry = cpu.read_flag(Flags::CARRY);

        if subtract {
            if half_carry {
                value = value.wrapping_sub(0x06);
            }
            if carry {
                value = value.wrapping_sub(0x60);
            }
        } else {
            if carry || value > 0x99 {
                value = value.wrapping_add(0x60);
                carry = true;
            }
            if half_carry || (value & 0x0f) > 0x09 {
                value = value.wrapping_add(0x06);
            }
        }

        cpu.write_register(&Register::A, value);
        cpu.set_flags(value == 0, subtract, false, carry);

        instruction.cycles.0
    }

    pub fn complement(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let value = cpu.read_register(&Register::A);
        cpu.write_register(&Register::A, !value);
        cpu.update_flag(Flags::SUBTRACT, true);
        cpu.update_flag(Flags::HALF_CARRY, true);

        instruction.cycles.0
    }

    pub fn set_carry(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        cpu.update_flag(Flags::SUBTRACT, false);
        cpu.update_flag(Flags::HALF_CARRY, false);
        cpu.update_flag(Flags::CARRY, true);

        instruction.cycles.0
    }

    pub fn complement_carry(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let carry = cpu.read_flag(Flags::CARRY);
        cpu.update_flag(Flags::SUBTRACT, false);
        cpu.update_flag(Flags::HALF_CARRY, false);
        cpu.update_flag(Flags::CARRY, !carry);

        instruction.cycles.0
    }

    pub fn jump(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, rhs) = Handlers::operands(instruction);

        if !Handlers::check_operand_condition(cpu, &lhs) {
            return Handlers::not_taken(instruction);
        }

        let target = match rhs {
            Operand::Imm16(addr, _) => addr,
            Operand::Reg16(reg, _) => cpu.read_register16(&reg),
            Operand::Offset(offset) => cpu.read_pc().wrapping_add_signed(offset as i16),
            _ => Handlers::unsupported(instruction),
        };
        cpu.write_pc(target);

        instruction.cycles.0
    }

    pub fn call(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, rhs) = Handlers::operands(instruction);

        if !Handlers::check_operand_condition(cpu, &lhs) {
            return Handlers::not_taken(instruction);
        }

        let Operand::Imm16(target, _) = rhs else {
            Handlers::unsupported(instruction)
        };
        let return_address = cpu.read_pc();
        cpu.push_stack(mmu, return_address);
        cpu.write_pc(target);

        instruction.cycles.0
    }

    pub fn ret(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);

        if !Handlers::check_operand_condition(cpu, &lhs) {
            return Handlers::not_taken(instruction);
        }

        let addr = cpu.pop_stack(mmu);
        cpu.write_pc(addr);

        instruction.cycles.0
    }

    pub fn reti(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let addr = cpu.pop_stack(mmu);
        cpu.write_pc(addr);
        cpu.ime.enabled = true;
        cpu.ime.enable_pending = false;

        instruction.cycles.0
    }

    pub fn restart(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);
        let Operand::Vector(target) = lhs else {
            Handlers::unsupported(instruction)
        };

        let return_address = cpu.read_pc();
        cpu.push_stack(mmu, return_address);
        cpu.write_pc(target);

        instruction.cycles.0
    }

    pub fn push(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);
        let Operand::Pair(pair) = lhs else {
            Handlers::unsupported(instruction)
        };

        let value = cpu.read_pair(&pair);
        cpu.push_stack(mmu, value);

        instruction.cycles.0
    }

    pub fn pop(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);
        let Operand::Pair(pair) = lhs else {
            Handlers::unsupported(instruction)
        };

        let value = cpu.pop_stack(mmu);
        cpu.write_pair(&pair, value);

        instruction.cycles.0
    }

    pub fn halt(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        cpu.halted = true;

        instruction.cycles.0
    }

    pub fn stop(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        debug!("stop at ${:04x} treated as nop", cpu.read_pc().wrapping_sub(2));

        instruction.cycles.0
    }

    pub fn disable_interrupts(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        cpu.ime.enabled = false;
        cpu.ime.enable_pending = false;

        instruction.cycles.0
    }

    pub fn enable_interrupts(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        cpu.ime.enable_pending = true;

        instruction.cycles.0
    }

    pub fn shift(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (lhs, _) = Handlers::operands(instruction);
        let value = Handlers::read_operand(cpu, mmu, &lhs);
        let carry = cpu.read_flag(Flags::CARRY);

        let (result, carry_out) = match instruction.opcode {
            Opcode::Sla => (value << 1, value & 0x80 != 0),
            Opcode::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            Opcode::Srl => (value >> 1, value & 0x01 != 0),
            Opcode::Swap => (value.rotate_left(4), false),
            opcode => Handlers::rotate(opcode, value, carry),
        };

        Handlers::write_operand(cpu, mmu, &lhs, result);
        cpu.set_flags(result == 0, false, false, carry_out);

        instruction.cycles.0
    }

    pub fn test_bit(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (bit, rhs) = Handlers::bit_operands(instruction);
        let value = Handlers::read_operand(cpu, mmu, &rhs);

        cpu.update_flag(Flags::ZERO, value & (1 << bit) == 0);
        cpu.update_flag(Flags::SUBTRACT, false);
        cpu.update_flag(Flags::HALF_CARRY, true);

        instruction.cycles.0
    }

    pub fn reset_bit(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (bit, rhs) = Handlers::bit_operands(instruction);
        let value = Handlers::read_operand(cpu, mmu, &rhs);
        Handlers::write_operand(cpu, mmu, &rhs, value & !(1 << bit));

        instruction.cycles.0
    }

    pub fn set_bit(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let (bit, rhs) = Handlers::bit_operands(instruction);
        let value = Handlers::read_operand(cpu, mmu, &rhs);
        Handlers::write_operand(cpu, mmu, &rhs, value | (1 << bit));

        instruction.cycles.0
    }

    pub fn illegal(cpu: &mut Cpu, mmu: &mut Mmu, instruction: &Instruction) -> usize {
        let pc = cpu.read_pc().wrapping_sub(1);
        error!("Illegal opcode {:#04x} at ${:04x}, cpu locked up\n{}", mmu.read(pc), pc, cpu);
        cpu.locked = true;

        instruction.cycles.0
    }

    /// 8-bit add into A; the carry-in is folded into both carry computations.
    fn accumulate(cpu: &mut Cpu, y: u8, carry: bool) {
        let x = cpu.read_register(&Register::A);
        let carry = carry as u8;
        let result = x.wrapping_add(y).wrapping_add(carry);

        cpu.write_register(&Register::A, result);
        cpu.set_flags(
            result == 0,
            false,
            (x & 0x0f) + (y & 0x0f) + carry > 0x0f,
            x as u16 + y as u16 + carry as u16 > 0xff,
        );
    }

    /// 8-bit subtract from A setting all four flags. The result is returned
    /// rather than stored so `cp` can share it.
    fn subtract(cpu: &mut Cpu, y: u8, carry: bool) -> u8 {
        let x = cpu.read_register(&Register::A);
        let carry = carry as u8;
        let result = x.wrapping_sub(y).wrapping_sub(carry);

        cpu.set_flags(
            result == 0,
            true,
            (x & 0x0f) < (y & 0x0f) + carry,
            (x as u16) < y as u16 + carry as u16,
        );

        result
    }

    /// `sp + e8` as used by `add sp, e8` and `ld hl, sp+e8`. Carries come from the low byte.
    fn add_signed_offset(cpu: &mut Cpu, base: u16, offset: i8) -> u16 {
        let unsigned = offset as u8 as u16;
        cpu.set_flags(
            false,
            false,
            (base & 0x000f) + (unsigned & 0x000f) > 0x000f,
            (base & 0x00ff) + unsigned > 0x00ff,
        );

        base.wrapping_add_signed(offset as i16)
    }

    fn rotate(opcode: Opcode, value: u8, carry: bool) -> (u8, bool) {
        match opcode {
            Opcode::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            Opcode::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            Opcode::Rl => ((value << 1) | carry as u8, value & 0x80 != 0),
            _ => ((value >> 1) | ((carry as u8) << 7), value & 0x01 != 0),
        }
    }

    fn read_operand(cpu: &Cpu, mmu: &Mmu, operand: &Operand) -> u8 {
        match *operand {
            Operand::Reg8(reg, mode) if mode.contains(AddressingMode::INDIRECT) => {
                // ld a, (c)
                mmu.read(HIGH_PAGE | cpu.read_register(&reg) as u16)
            }
            Operand::Reg8(reg, _) => cpu.read_register(&reg),
            Operand::Reg16(reg, _) => mmu.read(cpu.read_register16(&reg)),
            Operand::Imm8(imm, mode) if mode.contains(AddressingMode::INDIRECT) => mmu.read(HIGH_PAGE | imm as u16),
            Operand::Imm8(imm, _) => imm,
            Operand::Imm16(addr, _) => mmu.read(addr),
            _ => panic!("Operand {} cannot be read as a byte", operand),
        }
    }

    fn write_operand(cpu: &mut Cpu, mmu: &mut Mmu, operand: &Operand, data: u8) {
        match *operand {
            Operand::Reg8(reg, mode) if mode.contains(AddressingMode::INDIRECT) => {
                // ld (c), a
                mmu.write(HIGH_PAGE | cpu.read_register(&reg) as u16, data)
            }
            Operand::Reg8(reg, _) => cpu.write_register(&reg, data),
            Operand::Reg16(reg, _) => mmu.write(cpu.read_register16(&reg), data),
            Operand::Imm8(imm, _) => mmu.write(HIGH_PAGE | imm as u16, data),
            Operand::Imm16(addr, _) => mmu.write(addr, data),
            _ => panic!("Operand {} cannot be written as a byte", operand),
        }
    }

    /// Applies the `(hl+)` and `(hl-)` adjustment once the access is done.
    fn post_adjust(cpu: &mut Cpu, operand: &Operand) {
        if let Operand::Reg16(reg, mode) = *operand {
            let value = cpu.read_register16(&reg);
            if mode.contains(AddressingMode::INCREMENT) {
                cpu.write_register16(&reg, value.wrapping_add(1));
            } else if mode.contains(AddressingMode::DECREMENT) {
                cpu.write_register16(&reg, value.wrapping_sub(1));
            }
        }
    }

    fn operands(instruction: &Instruction) -> (Operand, Operand) {
        // placeholders for operand slots an instruction does not use
        let none = Operand::Conditional(Condition::None);
        (instruction.lhs.unwrap_or(none), instruction.rhs.unwrap_or(none))
    }

    fn bit_operands(instruction: &Instruction) -> (u8, Operand) {
        match Handlers::operands(instruction) {
            (Operand::Bit(bit), rhs) => (bit, rhs),
            _ => Handlers::unsupported(instruction),
        }
    }

    fn not_taken(instruction: &Instruction) -> usize {
        instruction.cycles.1.unwrap_or(instruction.cycles.0)
    }

    fn check_operand_condition(cpu: &Cpu, operand: &Operand) -> bool {
        match operand {
            Operand::Conditional(condition) => Handlers::check_condition(cpu, condition),
            _ => true,
        }
    }

    fn check_condition(cpu: &Cpu, condition: &Condition) -> bool {
        match condition {
            Condition::Z => cpu.read_flag(Flags::ZERO),
            Condition::NZ => !cpu.read_flag(Flags::ZERO),
            Condition::C => cpu.read_flag(Flags::CARRY),
            Condition::NC => !cpu.read_flag(Flags::CARRY),
            Condition::None => true,
        }
    }

    fn unsupported(instruction: &Instruction) -> ! {
        panic!("Decoder produced unsupported operands for {}", instruction)
    }
}
