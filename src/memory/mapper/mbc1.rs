use crate::memory::mapper::{bank_mask, restore_ram, Mapper};
use crate::memory::{EXTERNAL_RAM_END, EXTERNAL_RAM_START, RAM_BANK_SIZE, ROM_BANK_SIZE};
use log::debug;

const RAM_ENABLE_RANGE: std::ops::RangeInclusive<u16> = 0x0000..=0x1fff;
const ROM_BANK_RANGE: std::ops::RangeInclusive<u16> = 0x2000..=0x3fff;
const SECONDARY_BANK_REGISTER: std::ops::RangeInclusive<u16> = 0x4000..=0x5fff;
const BANKING_MODE_REGISTER: std::ops::RangeInclusive<u16> = 0x6000..=0x7fff;
const ROM_SLOT_0_RANGE: std::ops::RangeInclusive<u16> = 0x0000..=0x3fff;
const ROM_SLOT_1_RANGE: std::ops::RangeInclusive<u16> = 0x4000..=0x7fff;
const EXTERNAL_RAM_RANGE: std::ops::RangeInclusive<u16> = EXTERNAL_RAM_START..=EXTERNAL_RAM_END;

#[derive(Clone)]
pub struct Mbc1 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_bank: u8,
    secondary_bank: u8,
    ram_enabled: bool,
    advanced_banking: bool,
    rom_mask: usize,
    ram_mask: usize,
}

impl Mbc1 {
    pub fn new(memory: Vec<u8>, ram_size: usize) -> Mbc1 {
        Mbc1 {
            rom_mask: bank_mask(memory.len(), ROM_BANK_SIZE),
            ram_mask: bank_mask(ram_size, RAM_BANK_SIZE),
            rom: memory,
            ram: vec![0; ram_size],
            rom_bank: 1,
            secondary_bank: 0,
            ram_enabled: false,
            advanced_banking: false,
        }
    }

    fn low_rom_bank(&self) -> usize {
        if self.advanced_banking {
            ((self.secondary_bank as usize) << 5) & self.rom_mask
        } else {
            0
        }
    }

    fn high_rom_bank(&self) -> usize {
        (((self.secondary_bank as usize) << 5) | self.rom_bank as usize) & self.rom_mask
    }

    fn ram_bank(&self) -> usize {
        if self.advanced_banking {
            self.secondary_bank as usize & self.ram_mask
        } else {
            0
        }
    }

    fn ram_offset(&self, addr: u16) -> Option<usize> {
        if !self.ram_enabled || self.ram.is_empty() {
            return None;
        }

        let offset = (addr - EXTERNAL_RAM_START) as usize + self.ram_bank() * RAM_BANK_SIZE;
        Some(offset % self.ram.len())
    }
}

impl Mapper for Mbc1 {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        match addr {
            addr if ROM_SLOT_0_RANGE.contains(&addr) => {
                let addr = addr as usize + self.low_rom_bank() * ROM_BANK_SIZE;
                self.rom.get(addr).copied().unwrap_or(0xff)
            }
            addr if ROM_SLOT_1_RANGE.contains(&addr) => {
                let addr = (addr as usize % ROM_BANK_SIZE) + self.high_rom_bank() * ROM_BANK_SIZE;
                self.rom.get(addr).copied().unwrap_or(0xff)
            }
            addr if EXTERNAL_RAM_RANGE.contains(&addr) => match self.ram_offset(addr) {
                Some(offset) => self.ram[offset],
                None => 0xff,
            },
            _ => 0xff,
        }
    }

    #[inline]
    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            addr if RAM_ENABLE_RANGE.contains(&addr) => {
                self.ram_enabled = (data & 0x0f) == 0x0a;
                debug!("MBC1: RAM enabled: {}", self.ram_enabled);
            }
            addr if ROM_BANK_RANGE.contains(&addr) => {
                // This 5-bit register selects the ROM bank number for the 4000–7FFF region.
                // Higher bits are discarded and bank 0 is translated to bank 1.
                self.rom_bank = data & 0b0001_1111;
                if self.rom_bank == 0 {
                    self.rom_bank = 1;
                }
                debug!("MBC1: Switched to ROM bank {}", self.high_rom_bank());
            }
            addr if SECONDARY_BANK_REGISTER.contains(&addr) => {
                // Either the RAM bank or bits 5-6 of the ROM bank, depending on the banking mode.
                self.secondary_bank = data & 0b11;
                debug!("MBC1: Secondary bank register set to {}", self.secondary_bank);
            }
            addr if BANKING_MODE_REGISTER.contains(&addr) => {
                self.advanced_banking = data & 0b0000_0001 == 1;
                debug!("MBC1: Switched to advanced banking mode: {}", self.advanced_banking);
            }
            addr if EXTERNAL_RAM_RANGE.contains(&addr) => {
                if let Some(offset) = self.ram_offset(addr) {
                    self.ram[offset] = data;
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
        self.high_rom_bank() as u16
    }

    #[inline]
    fn current_ram_bank(&self) -> u8 {
        self.ram_bank() as u8
    }

    #[inline]
    fn name(&self) -> String {
        String::from("MBC1")
    }
}
