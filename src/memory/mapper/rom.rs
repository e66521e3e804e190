use crate::memory::mapper::{restore_ram, Mapper};
use crate::memory::{EXTERNAL_RAM_END, EXTERNAL_RAM_START, ROM_END};

#[derive(Clone)]
pub struct Rom {
    memory: Vec<u8>,
    ram: Vec<u8>,
}

impl Rom {
    pub fn new(memory: Vec<u8>, ram_size: usize) -> Rom {
        Rom {
            memory,
            ram: vec![0; ram_size],
        }
    }
}

impl Mapper for Rom {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=ROM_END => self.memory.get(addr as usize).copied().unwrap_or(0xff),
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => {
                self.ram.get((addr - EXTERNAL_RAM_START) as usize).copied().unwrap_or(0xff)
            }
            _ => 0xff,
        }
    }

    #[inline]
    fn write(&mut self, addr: u16, data: u8) {
        // We simply only have a ROM, writes to it go nowhere.
        if let EXTERNAL_RAM_START..=EXTERNAL_RAM_END = addr {
            if let Some(byte) = self.ram.get_mut((addr - EXTERNAL_RAM_START) as usize) {
                *byte = data;
            }
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
        1
    }

    #[inline]
    fn current_ram_bank(&self) -> u8 {
        0
    }

    #[inline]
    fn name(&self) -> String {
        String::from("ROM")
    }
}
