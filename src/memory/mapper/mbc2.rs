use crate::memory::mapper::{bank_mask, restore_ram, Mapper};
use crate::memory::{EXTERNAL_RAM_END, EXTERNAL_RAM_START, ROM_BANK_SIZE};
use log::debug;

// 512 half-bytes of built-in RAM
const BUILTIN_RAM_SIZE: usize = 0x200;

#[derive(Clone)]
pub struct Mbc2 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_bank: u8,
    ram_enabled: bool,
    rom_mask: usize,
}

impl Mbc2 {
    pub fn new(memory: Vec<u8>) -> Mbc2 {
        Mbc2 {
            rom_mask: bank_mask(memory.len(), ROM_BANK_SIZE),
            rom: memory,
            ram: vec![0; BUILTIN_RAM_SIZE],
            rom_bank: 1,
            ram_enabled: false,
        }
    }

    #[inline]
    fn bank(&self) -> usize {
        self.rom_bank as usize & self.rom_mask
    }
}

impl Mapper for Mbc2 {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3fff => self.rom.get(addr as usize).copied().unwrap_or(0xff),
            0x4000..=0x7fff => {
                let addr = (addr as usize % ROM_BANK_SIZE) + self.bank() * ROM_BANK_SIZE;
                self.rom.get(addr).copied().unwrap_or(0xff)
            }
            // Only the lower nibble is wired, the upper one floats high
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END if self.ram_enabled => {
                self.ram[(addr as usize) % BUILTIN_RAM_SIZE] | 0xf0
            }
            _ => 0xff,
        }
    }

    #[inline]
    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            // Bit 8 of the address decides which register is written
            0x0000..=0x3fff if addr & 0x0100 == 0 => {
                self.ram_enabled = data & 0x0f == 0x0a;
                debug!("MBC2: RAM enabled: {}", self.ram_enabled);
            }
            0x0000..=0x3fff => {
                self.rom_bank = data & 0x0f;
                if self.rom_bank == 0 {
                    self.rom_bank = 1;
                }
                debug!("MBC2: Switched to ROM bank {}", self.bank());
            }
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END if self.ram_enabled => {
                self.ram[(addr as usize) % BUILTIN_RAM_SIZE] = data & 0x0f;
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
        self.bank() as u16
    }

    #[inline]
    fn current_ram_bank(&self) -> u8 {
        0
    }

    #[inline]
    fn name(&self) -> String {
        String::from("MBC2")
    }
}
