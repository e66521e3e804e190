use crate::gameboy::RunOptions;
use crate::lr35902::irq::{Ime, Vector};
use crate::lr35902::registers::{Flags, Registers};
use crate::lr35902::sm83::{Register, Sm83, StackPair};
use crate::memory::mmu::Mmu;
use log::{debug, trace};

/// Machine cycles spent pushing PC and jumping to an interrupt vector.
const INTERRUPT_DISPATCH_CYCLES: usize = 5;

#[derive(Clone)]
pub struct Cpu {
    sm83: Sm83,
    pub registers: Registers,
    pub ime: Ime,
    pub halted: bool,
    /// Set by an illegal opcode. Nothing short of a reset brings the CPU back.
    pub locked: bool,
    cycles: u64,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            sm83: Sm83::new(),
            registers: Registers::default(),
            ime: Ime::default(),
            halted: false,
            locked: false,
            cycles: 0,
        }
    }

    /// CPU state right after the boot ROM hands over to the cartridge.
    pub fn post_boot() -> Cpu {
        Cpu {
            registers: Registers::post_boot(),
            ..Cpu::new()
        }
    }

    /// Runs one instruction, one interrupt dispatch or one idle halted cycle.
    /// Returns the machine cycles consumed.
    pub fn tick(&mut self, mmu: &mut Mmu, options: &RunOptions) -> usize {
        if self.locked {
            self.cycles += 1;
            return 1;
        }

        let pending = mmu.pending_interrupts();
        if !pending.is_empty() {
            if self.halted {
                trace!("Leaving halt, pending interrupts {:?}", pending);
                self.halted = false;
            }

            if self.ime.enabled {
                if let Some(vector) = Vector::from_flags(&pending) {
                    return self.service_interrupt(mmu, vector);
                }
            }
        }

        if self.halted {
            self.cycles += 1;
            return 1;
        }

        let enable_after = self.ime.enable_pending;
        let pc = self.registers.pc;
        let instruction = self.sm83.decode(mmu, pc);

        if options.trace {
            trace!(
                "[{:02x}:${:04x}] {:<20} {}  CY: {}  RAM: {}",
                mmu.current_rom_bank(),
                pc,
                instruction.to_string(),
                self,
                self.cycles,
                mmu.current_ram_bank()
            );
        }

        self.registers.pc = pc.wrapping_add(instruction.length as u16);
        let cycles = (instruction.handler)(self, mmu, &instruction);

        // ei only takes effect once the instruction after it has run
        if enable_after && self.ime.enable_pending {
            self.ime.enabled = true;
            self.ime.enable_pending = false;
        }

        self.cycles += cycles as u64;
        cycles
    }

    fn service_interrupt(&mut self, mmu: &mut Mmu, vector: Vector) -> usize {
        debug!("Servicing {} interrupt at ${:04x}", vector, self.registers.pc);

        self.ime.enabled = false;
        self.ime.enable_pending = false;
        mmu.acknowledge_interrupt(vector.flag());

        let pc = self.registers.pc;
        self.push_stack(mmu, pc);
        self.registers.pc = vector.to_address();

        self.cycles += INTERRUPT_DISPATCH_CYCLES as u64;
        INTERRUPT_DISPATCH_CYCLES
    }

    /// Total machine cycles executed since power on.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn read_register(&self, register: &Register) -> u8 {
        match register {
            Register::A => self.registers.a,
            Register::B => self.registers.b,
            Register::C => self.registers.c,
            Register::D => self.registers.d,
            Register::E => self.registers.e,
            Register::H => self.registers.h,
            Register::L => self.registers.l,
            _ => panic!("Invalid 8-bit register: {:?}", register),
        }
    }

    pub fn write_register(&mut self, register: &Register, data: u8) {
        match register {
            Register::A => self.registers.a = data,
            Register::B => self.registers.b = data,
            Register::C => self.registers.c = data,
            Register::D => self.registers.d = data,
            Register::E => self.registers.e = data,
            Register::H => self.registers.h = data,
            Register::L => self.registers.l = data,
            _ => panic!("Invalid 8-bit register: {:?}", register),
        }
    }

    pub fn read_register16(&self, register: &Register) -> u16 {
        match register {
            Register::BC => u16::from_be_bytes([self.registers.b, self.registers.c]),
            Register::DE => u16::from_be_bytes([self.registers.d, self.registers.e]),
            Register::HL => u16::from_be_bytes([self.registers.h, self.registers.l]),
            Register::SP => self.registers.sp,
            _ => panic!("Invalid 16-bit register: {:?}", register),
        }
    }

    pub fn write_register16(&mut self, register: &Register, value: u16) {
        let [high, low] = value.to_be_bytes();
        match register {
            Register::BC => {
                self.registers.b = high;
                self.registers.c = low;
            }
            Register::DE => {
                self.registers.d = high;
                self.registers.e = low;
            }
            Register::HL => {
                self.registers.h = high;
                self.registers.l = low;
            }
            Register::SP => self.registers.sp = value,
            _ => panic!("Invalid 16-bit register: {:?}", register),
        }
    }

    pub fn read_pair(&self, pair: &StackPair) -> u16 {
        match pair {
            StackPair::BC => self.read_register16(&Register::BC),
            StackPair::DE => self.read_register16(&Register::DE),
            StackPair::HL => self.read_register16(&Register::HL),
            StackPair::AF => u16::from_be_bytes([self.registers.a, self.registers.f.bits()]),
        }
    }

    pub fn write_pair(&mut self, pair: &StackPair, value: u16) {
        match pair {
            StackPair::BC => self.write_register16(&Register::BC, value),
            StackPair::DE => self.write_register16(&Register::DE, value),
            StackPair::HL => self.write_register16(&Register::HL, value),
            StackPair::AF => {
                let [high, low] = value.to_be_bytes();
                self.registers.a = high;
                // the low nibble of F does not exist
                self.registers.f = Flags::from_bits_truncate(low);
            }
        }
    }

    #[inline]
    pub fn read_pc(&self) -> u16 {
        self.registers.pc
    }

    #[inline]
    pub fn write_pc(&mut self, value: u16) {
        self.registers.pc = value;
    }

    #[inline]
    pub fn read_flag(&self, flag: Flags) -> bool {
        self.registers.f.contains(flag)
    }

    #[inline]
    pub fn update_flag(&mut self, flag: Flags, value: bool) {
        self.registers.f.set(flag, value);
    }

    pub fn set_flags(&mut self, zero: bool, subtract: bool, half_carry: bool, carry: bool) {
        let mut flags = Flags::empty();
        flags.set(Flags::ZERO, zero);
        flags.set(Flags::SUBTRACT, subtract);
        flags.set(Flags::HALF_CARRY, half_carry);
        flags.set(Flags::CARRY, carry);
        self.registers.f = flags;
    }

    pub fn push_stack(&mut self, mmu: &mut Mmu, value: u16) {
        self.registers.sp = self.registers.sp.wrapping_sub(2);
        mmu.write16(self.registers.sp, value);
    }

    pub fn pop_stack(&mut self, mmu: &mut Mmu) -> u16 {
        let value = mmu.read16(self.registers.sp);
        self.registers.sp = self.registers.sp.wrapping_add(2);
        value
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

impl std::fmt::Display for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            concat!(
                "A: ${:02x}  F: ${:02x}  B: ${:02x}  C: ${:02x}  D: ${:02x}  ",
                "E: ${:02x}  H: ${:02x}  L: ${:02x}  SP: ${:04x}  PC: ${:04x}"
            ),
            self.registers.a,
            self.registers.f.bits(),
            self.registers.b,
            self.registers.c,
            self.registers.d,
            self.registers.e,
            self.registers.h,
            self.registers.l,
            self.registers.sp,
            self.registers.pc
        )
    }
}
