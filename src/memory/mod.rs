pub mod cartridge;
pub mod mapper;
pub mod mmu;
pub mod registers;

pub const BOOTROM_SIZE: usize = 0x100;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

pub const ROM_START: u16 = 0x0000;
pub const ROM_END: u16 = 0x7fff;
pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9fff;
pub const EXTERNAL_RAM_START: u16 = 0xa000;
pub const EXTERNAL_RAM_END: u16 = 0xbfff;
pub const WRAM_START: u16 = 0xc000;
pub const WRAM_END: u16 = 0xdfff;
pub const ECHO_RAM_START: u16 = 0xe000;
pub const ECHO_RAM_END: u16 = 0xfdff;
pub const OAM_START: u16 = 0xfe00;
pub const OAM_END: u16 = 0xfe9f;
pub const UNUSABLE_START: u16 = 0xfea0;
pub const UNUSABLE_END: u16 = 0xfeff;
pub const IO_START: u16 = 0xff00;
pub const IO_END: u16 = 0xff7f;
pub const HRAM_START: u16 = 0xff80;
pub const HRAM_END: u16 = 0xfffe;

pub const VRAM_SIZE: usize = (VRAM_END - VRAM_START + 1) as usize;
pub const WRAM_SIZE: usize = (WRAM_END - WRAM_START + 1) as usize;
pub const OAM_SIZE: usize = (OAM_END - OAM_START + 1) as usize;
pub const IO_SIZE: usize = (IO_END - IO_START + 1) as usize;
pub const HRAM_SIZE: usize = (HRAM_END - HRAM_START + 1) as usize;

pub const JOYPAD_REGISTER: u16 = 0xff00;
pub const DIV_REGISTER: u16 = 0xff04;
pub const TIMA_REGISTER: u16 = 0xff05;
pub const TMA_REGISTER: u16 = 0xff06;
pub const TAC_REGISTER: u16 = 0xff07;
pub const INTERRUPT_FLAGS_REGISTER: u16 = 0xff0f;
pub const LCD_CONTROL_REGISTER: u16 = 0xff40;
pub const LCD_STATUS_REGISTER: u16 = 0xff41;
pub const SCROLL_Y_REGISTER: u16 = 0xff42;
pub const SCROLL_X_REGISTER: u16 = 0xff43;
pub const SCANLINE_Y_REGISTER: u16 = 0xff44;
pub const SCANLINE_Y_COMPARE_REGISTER: u16 = 0xff45;
pub const OAM_DMA_REGISTER: u16 = 0xff46;
pub const BG_PALETTE_REGISTER: u16 = 0xff47;
pub const OBJ0_PALETTE_REGISTER: u16 = 0xff48;
pub const OBJ1_PALETTE_REGISTER: u16 = 0xff49;
pub const WINDOW_Y_REGISTER: u16 = 0xff4a;
pub const WINDOW_X_REGISTER: u16 = 0xff4b;
pub const BOOTROM_MAPPER_REGISTER: u16 = 0xff50;
pub const INTERRUPT_ENABLE_REGISTER: u16 = 0xffff;
