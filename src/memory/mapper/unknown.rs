use crate::memory::mapper::Mapper;

/// Stand-in for controllers we don't emulate: open bus on every read, writes go nowhere.
#[derive(Clone)]
pub struct Unknown {
    code: u8,
}

impl Unknown {
    pub fn new(code: u8) -> Unknown {
        Unknown { code }
    }
}

impl Mapper for Unknown {
    #[inline]
    fn read(&self, _addr: u16) -> u8 {
        0xff
    }

    #[inline]
    fn write(&mut self, _addr: u16, _data: u8) {}

    fn dump_ram(&self) -> Vec<u8> {
        Vec::new()
    }

    fn load_ram(&mut self, _ram: Vec<u8>) {}

    #[inline]
    fn current_rom_bank(&self) -> u16 {
        0
    }

    #[inline]
    fn current_ram_bank(&self) -> u8 {
        0
    }

    #[inline]
    fn name(&self) -> String {
        format!("UNKNOWN({:02x})", self.code)
    }
}
