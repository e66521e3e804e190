use crate::error::{DotError, TruncatedHeaderSnafu, TruncatedRomSnafu, UnknownRamSizeSnafu, UnknownRomSizeSnafu};
use crate::memory::mapper::mbc1::Mbc1;
use crate::memory::mapper::mbc2::Mbc2;
use crate::memory::mapper::mbc3::Mbc3;
use crate::memory::mapper::rom::Rom;
use crate::memory::mapper::unknown::Unknown;
use crate::memory::mapper::Mapper;
use log::{info, warn};
use snafu::prelude::*;

const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x143;
const CARTRIDGE_TYPE_ADDRESS: usize = 0x147;
const ROM_SIZE_ADDRESS: usize = 0x148;
const RAM_SIZE_ADDRESS: usize = 0x149;
const HEADER_END: usize = 0x150;

const MBC2_RAM_SIZE: usize = 0x200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartridgeKind {
    NoMbc,
    Mbc1,
    Mbc2,
    Mbc3 { timer: bool },
    Unknown(u8),
}

impl CartridgeKind {
    pub fn from_code(code: u8) -> CartridgeKind {
        match code {
            0x00 | 0x08 | 0x09 => CartridgeKind::NoMbc,
            0x01..=0x03 => CartridgeKind::Mbc1,
            0x05 | 0x06 => CartridgeKind::Mbc2,
            0x0f | 0x10 => CartridgeKind::Mbc3 { timer: true },
            0x11..=0x13 => CartridgeKind::Mbc3 { timer: false },
            _ => CartridgeKind::Unknown(code),
        }
    }
}

/// Type codes whose cartridge keeps its RAM alive with a battery.
fn has_battery(code: u8) -> bool {
    matches!(code, 0x03 | 0x06 | 0x09 | 0x0f | 0x10 | 0x13)
}

fn rom_size(code: u8) -> Option<usize> {
    match code {
        0x00..=0x08 => Some(0x8000 << code),
        _ => None,
    }
}

fn ram_size(code: u8) -> Option<usize> {
    match code {
        0x00 => Some(0),
        0x01 => Some(0x800),
        0x02 => Some(0x2000),
        0x03 => Some(0x8000),
        0x04 => Some(0x20000),
        0x05 => Some(0x10000),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub title: String,
    pub kind: CartridgeKind,
    pub battery: bool,
    pub rom_size: usize,
    pub ram_size: usize,
}

impl Header {
    pub fn parse(rom: &[u8]) -> Result<Header, DotError> {
        ensure!(rom.len() >= HEADER_END, TruncatedHeaderSnafu { size: rom.len() });

        let title = rom[TITLE_START..=TITLE_END]
            .iter()
            .take_while(|&&byte| byte != 0)
            .filter(|byte| byte.is_ascii_graphic() || **byte == b' ')
            .map(|&byte| byte as char)
            .collect::<String>()
            .trim()
            .to_string();

        let kind = CartridgeKind::from_code(rom[CARTRIDGE_TYPE_ADDRESS]);
        if let CartridgeKind::Unknown(code) = kind {
            warn!("Unknown cartridge type {:02x}, falling back to open bus", code);
            return Ok(Header {
                title,
                kind,
                battery: false,
                rom_size: rom.len(),
                ram_size: 0,
            });
        }

        let rom_code = rom[ROM_SIZE_ADDRESS];
        let rom_size = rom_size(rom_code).context(UnknownRomSizeSnafu { code: rom_code })?;
        ensure!(
            rom.len() >= rom_size,
            TruncatedRomSnafu {
                actual: rom.len(),
                declared: rom_size
            }
        );

        let ram_code = rom[RAM_SIZE_ADDRESS];
        let ram_size = match kind {
            CartridgeKind::Mbc2 => MBC2_RAM_SIZE,
            _ => ram_size(ram_code).context(UnknownRamSizeSnafu { code: ram_code })?,
        };

        Ok(Header {
            title,
            kind,
            battery: has_battery(rom[CARTRIDGE_TYPE_ADDRESS]),
            rom_size,
            ram_size,
        })
    }
}

#[derive(Clone)]
pub struct Cartridge {
    header: Header,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    pub fn from_rom(mut rom: Vec<u8>) -> Result<Cartridge, DotError> {
        let header = Header::parse(&rom)?;

        if rom.len() > header.rom_size {
            warn!(
                "ROM image is {} bytes, ignoring everything past the declared {} bytes",
                rom.len(),
                header.rom_size
            );
            rom.truncate(header.rom_size);
        }

        let mapper: Box<dyn Mapper> = match header.kind {
            CartridgeKind::NoMbc => Box::new(Rom::new(rom, header.ram_size)),
            CartridgeKind::Mbc1 => Box::new(Mbc1::new(rom, header.ram_size)),
            CartridgeKind::Mbc2 => Box::new(Mbc2::new(rom)),
            CartridgeKind::Mbc3 { timer } => Box::new(Mbc3::new(rom, header.ram_size, timer)),
            CartridgeKind::Unknown(code) => Box::new(Unknown::new(code)),
        };

        info!(
            "Loaded \"{}\" ({}, {} KiB ROM, {} KiB RAM)",
            header.title,
            mapper.name(),
            header.rom_size / 1024,
            header.ram_size / 1024
        );

        Ok(Cartridge { header, mapper })
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    #[inline]
    pub fn write(&mut self, addr: u16, data: u8) {
        self.mapper.write(addr, data)
    }

    #[inline]
    pub fn tick(&mut self, cycles: usize) {
        self.mapper.tick(cycles)
    }

    pub fn dump_ram(&self) -> Vec<u8> {
        self.mapper.dump_ram()
    }

    pub fn load_ram(&mut self, ram: Vec<u8>) {
        self.mapper.load_ram(ram)
    }

    pub fn has_ram(&self) -> bool {
        self.header.ram_size > 0
    }

    pub fn has_battery(&self) -> bool {
        self.header.battery
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn kind(&self) -> CartridgeKind {
        self.header.kind
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }

    pub fn current_rom_bank(&self) -> u16 {
        self.mapper.current_rom_bank()
    }

    pub fn current_ram_bank(&self) -> u8 {
        self.mapper.current_ram_bank()
    }

    pub fn name(&self) -> String {
        self.mapper.name()
    }
}
