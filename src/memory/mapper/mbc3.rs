use crate::memory::mapper::{bank_mask, restore_ram, Mapper};
use crate::memory::{EXTERNAL_RAM_END, EXTERNAL_RAM_START, RAM_BANK_SIZE, ROM_BANK_SIZE};
use log::debug;

/// Machine cycles per emulated second.
const CYCLES_PER_SECOND: usize = 1 << 20;

const DH_DAY_HIGH: u8 = 0b0000_0001;
const DH_HALT: u8 = 0b0100_0000;
const DH_DAY_CARRY: u8 = 0b1000_0000;

#[derive(Clone, Copy, Default, Debug, PartialEq)]
struct ClockRegisters {
    seconds: u8,
    minutes: u8,
    hours: u8,
    day_low: u8,
    day_high: u8,
}

impl ClockRegisters {
    fn read(&self, register: u8) -> u8 {
        match register {
            0x08 => self.seconds,
            0x09 => self.minutes,
            0x0a => self.hours,
            0x0b => self.day_low,
            0x0c => self.day_high,
            _ => 0xff,
        }
    }
}

/// Real-time clock, advanced by emulated time rather than by the host's wall clock.
#[derive(Clone, Default)]
struct RealTimeClock {
    live: ClockRegisters,
    latched: ClockRegisters,
    cycles: usize,
    latch_armed: bool,
}

impl RealTimeClock {
    fn tick(&mut self, cycles: usize) {
        if self.live.day_high & DH_HALT != 0 {
            return;
        }

        self.cycles += cycles;
        while self.cycles >= CYCLES_PER_SECOND {
            self.cycles -= CYCLES_PER_SECOND;
            self.advance_second();
        }
    }

    fn advance_second(&mut self) {
        let clock = &mut self.live;

        clock.seconds = (clock.seconds + 1) % 60;
        if clock.seconds != 0 {
            return;
        }
        clock.minutes = (clock.minutes + 1) % 60;
        if clock.minutes != 0 {
            return;
        }
        clock.hours = (clock.hours + 1) % 24;
        if clock.hours != 0 {
            return;
        }

        let days = (((clock.day_high & DH_DAY_HIGH) as u16) << 8 | clock.day_low as u16) + 1;
        clock.day_low = days as u8;
        clock.day_high = (clock.day_high & !DH_DAY_HIGH) | ((days >> 8) as u8 & DH_DAY_HIGH);
        if days > 0x1ff {
            clock.day_high |= DH_DAY_CARRY;
        }
    }

    fn write(&mut self, register: u8, data: u8) {
        let clock = &mut self.live;
        match register {
            0x08 => {
                clock.seconds = data % 60;
                self.cycles = 0;
            }
            0x09 => clock.minutes = data % 60,
            0x0a => clock.hours = data % 24,
            0x0b => clock.day_low = data,
            0x0c => clock.day_high = data & (DH_DAY_HIGH | DH_HALT | DH_DAY_CARRY),
            _ => {}
        }
    }

    fn latch(&mut self, data: u8) {
        // Writing $00 then $01 copies the live registers into the readable ones
        if data == 0x01 && self.latch_armed {
            self.latched = self.live;
            debug!("MBC3: Latched clock {:?}", self.latched);
        }
        self.latch_armed = data == 0x00;
    }
}

#[derive(Clone)]
pub struct Mbc3 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_bank: u8,
    ram_bank: u8,
    ram_enabled: bool,
    rtc: Option<RealTimeClock>,
    rom_mask: usize,
    ram_mask: usize,
}

impl Mbc3 {
    pub fn new(memory: Vec<u8>, ram_size: usize, has_timer: bool) -> Mbc3 {
        Mbc3 {
            rom_mask: bank_mask(memory.len(), ROM_BANK_SIZE),
            ram_mask: bank_mask(ram_size, RAM_BANK_SIZE),
            rom: memory,
            ram: vec![0; ram_size],
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
            rtc: has_timer.then(RealTimeClock::default),
        }
    }

    fn ram_offset(&self, addr: u16) -> Option<usize> {
        if self.ram.is_empty() {
            return None;
        }

        let bank = self.ram_bank as usize & self.ram_mask;
        let offset = (addr - EXTERNAL_RAM_START) as usize + bank * RAM_BANK_SIZE;
        Some(offset % self.ram.len())
    }

    #[inline]
    fn selects_clock(&self) -> bool {
        (0x08..=0x0c).contains(&self.ram_bank)
    }
}

impl Mapper for Mbc3 {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3fff => self.rom.get(addr as usize).copied().unwrap_or(0xff),
            0x4000..=0x7fff => {
                let bank = self.rom_bank as usize & self.rom_mask;
                let addr = (addr as usize % ROM_BANK_SIZE) + bank * ROM_BANK_SIZE;
                self.rom.get(addr).copied().unwrap_or(0xff)
            }
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END if self.ram_enabled => {
                if self.selects_clock() {
                    return match &self.rtc {
                        Some(rtc) => rtc.latched.read(self.ram_bank),
                        None => 0xff,
                    };
                }

                match self.ram_offset(addr) {
                    Some(offset) if self.ram_bank <= 0x03 => self.ram[offset],
                    _ => 0xff,
                }
            }
            _ => 0xff,
        }
    }

    #[inline]
    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1fff => {
                self.ram_enabled = data & 0x0f == 0x0a;
                debug!("MBC3: RAM and timer enabled: {}", self.ram_enabled);
            }
            0x2000..=0x3fff => {
                self.rom_bank = data & 0b0111_1111;
                if self.rom_bank == 0 {
                    self.rom_bank = 1;
                }
                debug!("MBC3: Switched to ROM bank {}", self.current_rom_bank());
            }
            0x4000..=0x5fff => {
                self.ram_bank = data & 0x0f;
                debug!("MBC3: Selected RAM bank or clock register {:02x}", self.ram_bank);
            }
            0x6000..=0x7fff => {
                if let Some(rtc) = self.rtc.as_mut() {
                    rtc.latch(data);
                }
            }
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END if self.ram_enabled => {
                if self.selects_clock() {
                    let register = self.ram_bank;
                    if let Some(rtc) = self.rtc.as_mut() {
                        rtc.write(register, data);
                    }
                } else if self.ram_bank <= 0x03 {
                    if let Some(offset) = self.ram_offset(addr) {
                        self.ram[offset] = data;
                    }
                }
            }
            _ => {}
        }
    }

    fn dump_ram(&self) -> Vec<u8> {
        self.ram.clone()
    }

    fn load_ram(&mut self, ram: Vec<u8>) {
        restore_ram(&mut self.ram, &ram);
    }

    #[inline]
    fn current_rom_bank(&self) -> u16 {
        (self.rom_bank as usize & self.rom_mask) as u16
    }

    #[inline]
    fn current_ram_bank(&self) -> u8 {
        self.ram_bank
    }

    #[inline]
    fn name(&self) -> String {
        match self.rtc {
            Some(_) => String::from("MBC3+TIMER"),
            None => String::from("MBC3"),
        }
    }

    fn tick(&mut self, cycles: usize) {
        if let Some(rtc) = self.rtc.as_mut() {
            rtc.tick(cycles);
        }
    }
}
