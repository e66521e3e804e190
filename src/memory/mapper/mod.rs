use dyn_clone::DynClone;

pub mod mbc1;
pub mod mbc2;
pub mod mbc3;
pub mod rom;
pub mod unknown;

pub trait Mapper: DynClone {
    /// Reads from the ROM window ($0000-$7FFF) or the RAM window ($A000-$BFFF).
    fn read(&self, addr: u16) -> u8;
    /// Writes to the controller registers ($0000-$7FFF) or the RAM window ($A000-$BFFF).
    fn write(&mut self, addr: u16, data: u8);
    fn dump_ram(&self) -> Vec<u8>;
    fn load_ram(&mut self, ram: Vec<u8>);
    fn current_rom_bank(&self) -> u16;
    fn current_ram_bank(&self) -> u8;
    fn name(&self) -> String;

    /// Advances controller-side clocks by the given number of machine cycles.
    fn tick(&mut self, _cycles: usize) {}
}

dyn_clone::clone_trait_object!(Mapper);

/// Mask that wraps a bank index onto the banks physically present in `size` bytes.
pub(crate) fn bank_mask(size: usize, bank_size: usize) -> usize {
    (size / bank_size).max(1).next_power_of_two() - 1
}

/// Copies a save image into `ram`, keeping the size the header asked for.
pub(crate) fn restore_ram(ram: &mut [u8], save: &[u8]) {
    let len = ram.len().min(save.len());
    ram[..len].copy_from_slice(&save[..len]);
}
