use crate::error::{DotError, InvalidBootRomSnafu};
use crate::joypad::Button;
use crate::lr35902::cpu::Cpu;
use crate::lr35902::timer::Timer;
use crate::memory::cartridge::Cartridge;
use crate::memory::mmu::Mmu;
use crate::memory::BOOTROM_SIZE;
use crate::video::ppu::{Framebuffer, Ppu};
use crate::video::CYCLES_PER_FRAME;
use log::info;
use snafu::prelude::*;

/// Host-controlled switches for the emulation loop.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Log every executed instruction at trace level.
    pub trace: bool,
}

#[derive(Clone)]
pub struct GameBoy {
    cpu: Cpu,
    mmu: Mmu,
    ppu: Ppu,
    timer: Timer,
    options: RunOptions,
}

impl GameBoy {
    /// Builds a console around `rom`. Without a boot ROM the machine starts in
    /// the state the boot ROM would have left it in.
    pub fn new(rom: Vec<u8>, bootrom: Option<Vec<u8>>, options: RunOptions) -> Result<GameBoy, DotError> {
        if let Some(bootrom) = &bootrom {
            ensure!(
                bootrom.len() == BOOTROM_SIZE,
                InvalidBootRomSnafu {
                    expected: BOOTROM_SIZE,
                    actual: bootrom.len()
                }
            );
        }

        let cartridge = Cartridge::from_rom(rom)?;
        let cpu = if bootrom.is_some() {
            info!("Starting from the boot ROM");
            Cpu::new()
        } else {
            Cpu::post_boot()
        };

        Ok(GameBoy {
            cpu,
            mmu: Mmu::new(bootrom, cartridge),
            ppu: Ppu::new(),
            timer: Timer::new(),
            options,
        })
    }

    /// Runs one instruction (or interrupt dispatch) and lets the rest of the
    /// system catch up. Returns the machine cycles that passed.
    pub fn step(&mut self) -> usize {
        let cycles = self.cpu.tick(&mut self.mmu, &self.options);
        self.mmu.tick_cartridge(cycles);
        self.ppu.tick(&mut self.mmu, cycles);
        self.timer.tick(&mut self.mmu, cycles);
        cycles
    }

    /// Steps until the next frame is ready, or one frame's worth of cycles has
    /// passed while the LCD is off. The frame-ready flag is left for the caller.
    pub fn run_frame(&mut self) -> usize {
        self.ppu.clear_frame_ready();

        let mut cycles = 0;
        while !self.ppu.frame_ready() && cycles < CYCLES_PER_FRAME {
            cycles += self.step();
        }
        cycles
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.ppu.framebuffer()
    }

    pub fn frame_ready(&self) -> bool {
        self.ppu.frame_ready()
    }

    pub fn clear_frame_ready(&mut self) {
        self.ppu.clear_frame_ready();
    }

    pub fn press(&mut self, button: Button) {
        self.mmu.press_button(button);
    }

    pub fn release(&mut self, button: Button) {
        self.mmu.release_button(button);
    }

    pub fn reset_buttons(&mut self) {
        self.mmu.reset_buttons();
    }

    pub fn save_ram(&self) -> Vec<u8> {
        self.mmu.cartridge().dump_ram()
    }

    pub fn load_ram(&mut self, ram: Vec<u8>) {
        self.mmu.cartridge_mut().load_ram(ram);
    }

    /// True when the cartridge has RAM backed by a battery, which is what a
    /// host should persist between sessions.
    pub fn has_battery_ram(&self) -> bool {
        let cartridge = self.mmu.cartridge();
        cartridge.has_battery() && cartridge.has_ram()
    }

    pub fn cartridge_title(&self) -> &str {
        self.mmu.cartridge().title()
    }

    pub fn options_mut(&mut self) -> &mut RunOptions {
        &mut self.options
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }
}
