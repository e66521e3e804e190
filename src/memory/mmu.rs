use crate::joypad::{Button, Joypad};
use crate::memory::cartridge::Cartridge;
use crate::memory::registers::InterruptFlags;
use crate::memory::*;
use log::{debug, trace};

const DMA_LENGTH: u16 = OAM_SIZE as u16;

// Bits of STAT the CPU may write, the rest belongs to the PPU
const STAT_WRITABLE: u8 = 0b0111_1000;
const JOYPAD_SELECT: u8 = 0b0011_0000;

#[derive(Clone)]
pub struct Mmu {
    cartridge: Cartridge,
    bootrom: Vec<u8>,
    bootrom_mapped: bool,
    vram: Box<[u8; VRAM_SIZE]>,
    wram: Box<[u8; WRAM_SIZE]>,
    oam: [u8; OAM_SIZE],
    io: [u8; IO_SIZE],
    hram: [u8; HRAM_SIZE],
    interrupt_enable: u8,
    joypad: Joypad,
    divider_reset: bool,
}

impl Mmu {
    /// Without a boot ROM the I/O block starts out the way the boot ROM leaves it.
    pub fn new(bootrom: Option<Vec<u8>>, cartridge: Cartridge) -> Mmu {
        let mut mmu = Mmu {
            cartridge,
            bootrom_mapped: bootrom.is_some(),
            bootrom: bootrom.unwrap_or_default(),
            vram: Box::new([0; VRAM_SIZE]),
            wram: Box::new([0; WRAM_SIZE]),
            oam: [0; OAM_SIZE],
            io: [0; IO_SIZE],
            hram: [0; HRAM_SIZE],
            interrupt_enable: 0,
            joypad: Joypad::new(),
            divider_reset: false,
        };

        if !mmu.bootrom_mapped {
            mmu.apply_post_boot_state();
        }

        mmu
    }

    fn apply_post_boot_state(&mut self) {
        self.io[(JOYPAD_REGISTER - IO_START) as usize] = JOYPAD_SELECT;
        self.io[(DIV_REGISTER - IO_START) as usize] = 0xab;
        self.io[(TAC_REGISTER - IO_START) as usize] = 0xf8;
        self.io[(INTERRUPT_FLAGS_REGISTER - IO_START) as usize] = 0xe1;
        self.io[(LCD_CONTROL_REGISTER - IO_START) as usize] = 0x91;
        self.io[(LCD_STATUS_REGISTER - IO_START) as usize] = 0x85;
        self.io[(OAM_DMA_REGISTER - IO_START) as usize] = 0xff;
        self.io[(BG_PALETTE_REGISTER - IO_START) as usize] = 0xfc;
        self.io[(OBJ0_PALETTE_REGISTER - IO_START) as usize] = 0xff;
        self.io[(OBJ1_PALETTE_REGISTER - IO_START) as usize] = 0xff;
        self.io[(BOOTROM_MAPPER_REGISTER - IO_START) as usize] = 0x01;
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x00ff if self.bootrom_mapped => self.bootrom.get(addr as usize).copied().unwrap_or(0xff),
            ROM_START..=ROM_END => self.cartridge.read(addr),
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize],
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.read(addr),
            WRAM_START..=WRAM_END => self.wram[(addr - WRAM_START) as usize],
            ECHO_RAM_START..=ECHO_RAM_END => self.wram[(addr - ECHO_RAM_START) as usize],
            OAM_START..=OAM_END => self.oam[(addr - OAM_START) as usize],
            // Nintendo says use of this area is prohibited
            UNUSABLE_START..=UNUSABLE_END => 0xff,
            JOYPAD_REGISTER => self.joypad.as_u8(self.read_unchecked(JOYPAD_REGISTER)),
            LCD_STATUS_REGISTER => self.read_unchecked(LCD_STATUS_REGISTER) | 0x80,
            IO_START..=IO_END => self.read_unchecked(addr),
            HRAM_START..=HRAM_END => self.hram[(addr - HRAM_START) as usize],
            INTERRUPT_ENABLE_REGISTER => self.interrupt_enable,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        match addr {
            ROM_START..=ROM_END => self.cartridge.write(addr, data),
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize] = data,
            EXTERNAL_RAM_START..=EXTERNAL_RAM_END => self.cartridge.write(addr, data),
            WRAM_START..=WRAM_END => self.wram[(addr - WRAM_START) as usize] = data,
            ECHO_RAM_START..=ECHO_RAM_END => self.wram[(addr - ECHO_RAM_START) as usize] = data,
            OAM_START..=OAM_END => self.oam[(addr - OAM_START) as usize] = data,
            UNUSABLE_START..=UNUSABLE_END => trace!("Ignoring write to unusable address {:04x}", addr),
            JOYPAD_REGISTER => self.write_unchecked(JOYPAD_REGISTER, data & JOYPAD_SELECT),
            DIV_REGISTER => {
                self.write_unchecked(DIV_REGISTER, 0);
                self.divider_reset = true;
            }
            LCD_STATUS_REGISTER => {
                let status = self.read_unchecked(LCD_STATUS_REGISTER);
                self.write_unchecked(LCD_STATUS_REGISTER, (data & STAT_WRITABLE) | (status & !STAT_WRITABLE));
            }
            SCANLINE_Y_REGISTER => trace!("Ignoring write to read-only LY register"),
            OAM_DMA_REGISTER => {
                self.write_unchecked(OAM_DMA_REGISTER, data);
                self.dma_transfer(data);
            }
            BOOTROM_MAPPER_REGISTER => {
                self.write_unchecked(BOOTROM_MAPPER_REGISTER, data);
                if self.bootrom_mapped {
                    debug!("Boot ROM unmapped");
                    self.bootrom_mapped = false;
                }
            }
            IO_START..=IO_END => self.write_unchecked(addr, data),
            HRAM_START..=HRAM_END => self.hram[(addr - HRAM_START) as usize] = data,
            INTERRUPT_ENABLE_REGISTER => self.interrupt_enable = data,
        }
    }

    pub fn read16(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn write16(&mut self, addr: u16, data: u16) {
        let [lo, hi] = data.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }

    /// Reads an I/O register as stored, without the CPU-facing read rules.
    #[inline]
    pub fn read_unchecked(&self, addr: u16) -> u8 {
        debug_assert!((IO_START..=IO_END).contains(&addr));
        self.io[(addr - IO_START) as usize]
    }

    /// Writes an I/O register as stored, bypassing read-only and write-mask rules.
    #[inline]
    pub fn write_unchecked(&mut self, addr: u16, data: u8) {
        debug_assert!((IO_START..=IO_END).contains(&addr));
        self.io[(addr - IO_START) as usize] = data;
    }

    #[inline]
    pub fn read_as_unchecked<T>(&self, addr: u16) -> T
    where
        T: From<u8>,
    {
        T::from(self.read_unchecked(addr))
    }

    fn dma_transfer(&mut self, data: u8) {
        let source = (data as u16) << 8;
        for offset in 0..DMA_LENGTH {
            self.oam[offset as usize] = self.read(source.wrapping_add(offset));
        }
        trace!("OAM DMA from {:04x}", source);
    }

    /// Raw VRAM access for the PPU, `addr` is a bus address in $8000-$9FFF.
    #[inline]
    pub fn read_vram(&self, addr: u16) -> u8 {
        self.vram[(addr - VRAM_START) as usize]
    }

    #[inline]
    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    pub fn request_interrupt(&mut self, interrupt: InterruptFlags) {
        let flags = self.read_unchecked(INTERRUPT_FLAGS_REGISTER);
        self.write_unchecked(INTERRUPT_FLAGS_REGISTER, flags | interrupt.bits());
    }

    pub fn acknowledge_interrupt(&mut self, interrupt: InterruptFlags) {
        let flags = self.read_unchecked(INTERRUPT_FLAGS_REGISTER);
        self.write_unchecked(INTERRUPT_FLAGS_REGISTER, flags & !interrupt.bits());
    }

    /// Interrupts that are both requested and enabled.
    pub fn pending_interrupts(&self) -> InterruptFlags {
        InterruptFlags::from(self.interrupt_enable & self.read_unchecked(INTERRUPT_FLAGS_REGISTER))
    }

    pub fn press_button(&mut self, button: Button) {
        self.joypad.press(button);
        self.request_interrupt(InterruptFlags::JOYPAD);
    }

    pub fn release_button(&mut self, button: Button) {
        self.joypad.release(button);
    }

    pub fn reset_buttons(&mut self) {
        self.joypad.reset();
    }

    /// Returns whether DIV was written since the last call.
    pub fn take_divider_reset(&mut self) -> bool {
        std::mem::take(&mut self.divider_reset)
    }

    pub fn tick_cartridge(&mut self, cycles: usize) {
        self.cartridge.tick(cycles);
    }

    pub fn is_bootrom_mapped(&self) -> bool {
        self.bootrom_mapped
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cartridge
    }

    pub fn current_rom_bank(&self) -> u16 {
        self.cartridge.current_rom_bank()
    }

    pub fn current_ram_bank(&self) -> u8 {
        self.cartridge.current_ram_bank()
    }
}
