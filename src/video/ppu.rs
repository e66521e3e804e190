use crate::memory::mmu::Mmu;
use crate::memory::registers::{InterruptFlags, LcdControl, LcdStatus};
use crate::memory::{
    BG_PALETTE_REGISTER, LCD_CONTROL_REGISTER, LCD_STATUS_REGISTER, OBJ0_PALETTE_REGISTER, OBJ1_PALETTE_REGISTER,
    SCANLINE_Y_COMPARE_REGISTER, SCANLINE_Y_REGISTER, SCROLL_X_REGISTER, SCROLL_Y_REGISTER, WINDOW_X_REGISTER,
    WINDOW_Y_REGISTER,
};
use crate::video::palette::Palette;
use crate::video::sprite::{Sprite, SpriteAttributes};
use crate::video::state::State;
use crate::video::tile::{background_tile_address, sprite_tile_address, TileRow};
use crate::video::*;
use log::trace;

pub type Framebuffer = [u8; SCREEN_WIDTH * SCREEN_HEIGHT];

#[derive(Clone)]
pub struct Ppu {
    state: State,
    dot: usize,
    line: u8,
    window_line: u8,
    sprites: [Sprite; MAX_SPRITES_PER_LINE],
    sprite_count: usize,
    // OBJ size at the time of the scan
    sprite_height: u8,
    framebuffer: Box<Framebuffer>,
    frame_ready: bool,
    stat_line_was_high: bool,
}

impl Ppu {
    pub fn new() -> Ppu {
        Ppu {
            state: State::OamScan,
            dot: 0,
            line: 0,
            window_line: 0,
            sprites: [Sprite::default(); MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            sprite_height: 8,
            framebuffer: Box::new([0; SCREEN_WIDTH * SCREEN_HEIGHT]),
            frame_ready: false,
            stat_line_was_high: false,
        }
    }

    /// Advances the PPU by `cycles` machine cycles. Does nothing while the LCD is off.
    pub fn tick(&mut self, mmu: &mut Mmu, cycles: usize) {
        if !self.read_lcdc(mmu).contains(LcdControl::LCD_DISPLAY) {
            return;
        }

        for _ in 0..cycles * DOTS_PER_CYCLE {
            self.step_dot(mmu);
        }
    }

    fn step_dot(&mut self, mmu: &mut Mmu) {
        self.dot += 1;

        match self.state {
            State::OamScan if self.dot == OAM_SCAN_DOTS => {
                self.scan_oam(mmu);
                self.state = State::Drawing;
            }
            State::Drawing if self.dot == OAM_SCAN_DOTS + DRAWING_DOTS => {
                self.render_scanline(mmu);
                self.state = State::HBlank;
            }
            State::HBlank if self.dot == DOTS_PER_LINE => {
                self.dot = 0;
                self.line += 1;
                self.state = if self.line == VBLANK_START_LINE {
                    State::VBlank
                } else {
                    State::OamScan
                };
            }
            State::VBlank => {
                if self.line == VBLANK_START_LINE && self.dot == 1 {
                    trace!("Frame complete");
                    mmu.request_interrupt(InterruptFlags::VBLANK);
                    self.frame_ready = true;
                }

                if self.dot == DOTS_PER_LINE {
                    self.dot = 0;
                    self.line += 1;
                    if self.line == LINES_PER_FRAME {
                        self.line = 0;
                        self.window_line = 0;
                        self.state = State::OamScan;
                    }
                }
            }
            _ => {}
        }

        mmu.write_unchecked(SCANLINE_Y_REGISTER, self.line);
        self.update_status(mmu);
    }

    /// Refreshes the STAT mode and coincidence bits, then raises the STAT
    /// interrupt when any enabled source pulls the combined line high.
    fn update_status(&mut self, mmu: &mut Mmu) {
        let mut status = mmu.read_as_unchecked::<LcdStatus>(LCD_STATUS_REGISTER);
        let coincidence = self.line == mmu.read_unchecked(SCANLINE_Y_COMPARE_REGISTER);

        status.remove(LcdStatus::MODE);
        status |= LcdStatus::from_bits_truncate(self.state.as_u8());
        status.set(LcdStatus::COINCIDENCE, coincidence);
        mmu.write_unchecked(LCD_STATUS_REGISTER, status.bits());

        let stat_line_high = (coincidence && status.contains(LcdStatus::LYC_IRQ))
            || (self.state == State::HBlank && status.contains(LcdStatus::HBLANK_IRQ))
            || (self.state == State::VBlank && status.contains(LcdStatus::VBLANK_IRQ))
            || (self.state == State::OamScan && status.contains(LcdStatus::OAM_IRQ));

        if stat_line_high && !self.stat_line_was_high {
            mmu.request_interrupt(InterruptFlags::LCD_STAT);
        }
        self.stat_line_was_high = stat_line_high;
    }

    /// Picks the sprites for this line. They are copied out of OAM, so writes
    /// during drawing do not affect the line being drawn.
    fn scan_oam(&mut self, mmu: &Mmu) {
        let height = self.read_sprite_height(mmu);

        self.sprite_height = height;
        self.sprite_count = 0;
        for index in 0..SPRITE_COUNT {
            if self.sprite_count == MAX_SPRITES_PER_LINE {
                break;
            }

            let sprite = Sprite::from_oam(mmu.oam(), index);
            if sprite.covers_line(self.line, height) {
                self.sprites[self.sprite_count] = sprite;
                self.sprite_count += 1;
            }
        }
    }

    fn render_scanline(&mut self, mmu: &Mmu) {
        let lcdc = self.read_lcdc(mmu);
        let mut bg_colors = [0u8; SCREEN_WIDTH];

        if lcdc.contains(LcdControl::BG_DISPLAY) {
            self.render_background(mmu, lcdc, &mut bg_colors);
            self.render_window(mmu, lcdc, &mut bg_colors);
        }

        let bgp = mmu.read_unchecked(BG_PALETTE_REGISTER);
        let row_start = self.line as usize * SCREEN_WIDTH;
        for (x, color) in bg_colors.iter().enumerate() {
            self.framebuffer[row_start + x] = Palette::from_register(bgp, *color).as_u8();
        }

        if lcdc.contains(LcdControl::OBJ_DISPLAY) {
            self.render_sprites(mmu, &bg_colors);
        }
    }

    fn render_background(&self, mmu: &Mmu, lcdc: LcdControl, bg_colors: &mut [u8; SCREEN_WIDTH]) {
        let map = if lcdc.contains(LcdControl::BG_TILE_MAP) {
            TILEMAP_1_ADDRESS
        } else {
            TILEMAP_0_ADDRESS
        };
        let y = self.line.wrapping_add(mmu.read_unchecked(SCROLL_Y_REGISTER));
        let scroll_x = mmu.read_unchecked(SCROLL_X_REGISTER);

        for (x, color) in bg_colors.iter_mut().enumerate() {
            let x = (x as u8).wrapping_add(scroll_x);
            *color = self.map_color(mmu, lcdc, map, x, y);
        }
    }

    fn render_window(&mut self, mmu: &Mmu, lcdc: LcdControl, bg_colors: &mut [u8; SCREEN_WIDTH]) {
        let window_y = mmu.read_unchecked(WINDOW_Y_REGISTER);
        let window_x = mmu.read_unchecked(WINDOW_X_REGISTER);

        if !lcdc.contains(LcdControl::WINDOW_DISPLAY) || window_x > WINDOW_X_MAX || self.line < window_y {
            return;
        }

        let map = if lcdc.contains(LcdControl::WINDOW_TILE_MAP) {
            TILEMAP_1_ADDRESS
        } else {
            TILEMAP_0_ADDRESS
        };

        for (x, color) in bg_colors.iter_mut().enumerate() {
            let Some(window_column) = (x + WINDOW_X_OFFSET as usize).checked_sub(window_x as usize) else {
                continue;
            };
            *color = self.map_color(mmu, lcdc, map, window_column as u8, self.window_line);
        }

        self.window_line = self.window_line.wrapping_add(1);
    }

    /// Colour index of pixel (`x`, `y`) of the 256x256 tile map at `map`.
    fn map_color(&self, mmu: &Mmu, lcdc: LcdControl, map: u16, x: u8, y: u8) -> u8 {
        let map_offset = (y as u16 / 8) * TILEMAP_WIDTH + x as u16 / 8;
        let tile_index = mmu.read_vram(map + map_offset);
        let address = background_tile_address(lcdc, tile_index) + (y as u16 % 8) * 2;
        TileRow::fetch(mmu, address).color(x % 8)
    }

    fn render_sprites(&mut self, mmu: &Mmu, bg_colors: &[u8; SCREEN_WIDTH]) {
        let height = self.sprite_height;
        let obp0 = mmu.read_unchecked(OBJ0_PALETTE_REGISTER);
        let obp1 = mmu.read_unchecked(OBJ1_PALETTE_REGISTER);

        // lower X first, OAM order breaks ties
        let mut sprites = self.sprites[..self.sprite_count].to_vec();
        sprites.sort_by_key(|sprite| (sprite.x, sprite.index));

        let rows: Vec<TileRow> = sprites
            .iter()
            .map(|sprite| {
                let row = sprite.row_at(self.line, height) as u16;
                TileRow::fetch(mmu, sprite_tile_address(sprite.tile_for_height(height)) + row * 2)
            })
            .collect();

        let row_start = self.line as usize * SCREEN_WIDTH;
        for (x, bg_color) in bg_colors.iter().enumerate() {
            let pixel = sprites.iter().zip(rows.iter()).find_map(|(sprite, row)| {
                let color = row.color(sprite.column_at(x)?);
                (color != 0).then_some((sprite, color))
            });

            let Some((sprite, color)) = pixel else {
                continue;
            };

            if sprite.attributes.contains(SpriteAttributes::PRIORITY) && *bg_color != 0 {
                continue;
            }

            let palette = if sprite.attributes.contains(SpriteAttributes::PALETTE) {
                obp1
            } else {
                obp0
            };
            self.framebuffer[row_start + x] = Palette::from_register(palette, color).as_u8();
        }
    }

    fn read_sprite_height(&self, mmu: &Mmu) -> u8 {
        if self.read_lcdc(mmu).contains(LcdControl::OBJ_SIZE) {
            16
        } else {
            8
        }
    }

    #[inline]
    fn read_lcdc(&self, mmu: &Mmu) -> LcdControl {
        mmu.read_as_unchecked::<LcdControl>(LCD_CONTROL_REGISTER)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_ready(&mut self) {
        self.frame_ready = false;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn line(&self) -> u8 {
        self.line
    }
}

impl Default for Ppu {
    fn default() -> Ppu {
        Ppu::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::cartridge::tests::rom_with_header;
    use crate::memory::cartridge::Cartridge;
    use crate::memory::{INTERRUPT_FLAGS_REGISTER, OAM_DMA_REGISTER};

    const LCD_ON: u8 = 0b1001_0001;

    fn mmu() -> Mmu {
        let mut mmu = Mmu::new(None, Cartridge::from_rom(rom_with_header(0, 0, 0)).unwrap());
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON);
        mmu.write(BG_PALETTE_REGISTER, 0b11_10_01_00);
        mmu.write(OBJ0_PALETTE_REGISTER, 0b11_10_01_00);
        mmu.write(INTERRUPT_FLAGS_REGISTER, 0);
        mmu
    }

    fn interrupt_requested(mmu: &Mmu, interrupt: InterruptFlags) -> bool {
        mmu.read(INTERRUPT_FLAGS_REGISTER) & interrupt.bits() != 0
    }

    /// Sets every pixel of one row of tile `index` to `color`.
    fn tile_row(mmu: &mut Mmu, index: u8, row: u16, color: u8) {
        let low = if color & 1 != 0 { 0xff } else { 0x00 };
        let high = if color & 2 != 0 { 0xff } else { 0x00 };
        let base = sprite_tile_address(index);
        mmu.write(base + row * 2, low);
        mmu.write(base + row * 2 + 1, high);
    }

    /// Fills tile `index` so every pixel has colour `color`.
    fn solid_tile(mmu: &mut Mmu, index: u8, color: u8) {
        for row in 0..8 {
            tile_row(mmu, index, row, color);
        }
    }

    fn write_sprite(mmu: &mut Mmu, slot: u16, entry: [u8; 4]) {
        for (i, byte) in entry.iter().enumerate() {
            mmu.write(0xfe00 + slot * 4 + i as u16, *byte);
        }
    }

    #[test]
    fn frame_is_70224_dots_with_one_frame_ready() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();

        let mut raised = 0;
        for _ in 0..CYCLES_PER_FRAME * 2 {
            ppu.tick(&mut mmu, 1);
            if ppu.frame_ready() {
                raised += 1;
                ppu.clear_frame_ready();
            }
        }

        assert_eq!(raised, 2);
        assert_eq!(ppu.line(), 0);
        assert_eq!(ppu.state(), State::OamScan);
        assert_eq!(ppu.dot, 0);
    }

    #[test]
    fn mode_sequence_within_a_line() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();

        ppu.tick(&mut mmu, 19);
        assert_eq!(ppu.state(), State::OamScan);
        assert_eq!(mmu.read(LCD_STATUS_REGISTER) & 0b11, 2);

        ppu.tick(&mut mmu, 1);
        assert_eq!(ppu.state(), State::Drawing);
        assert_eq!(mmu.read(LCD_STATUS_REGISTER) & 0b11, 3);

        ppu.tick(&mut mmu, 43);
        assert_eq!(ppu.state(), State::HBlank);
        assert_eq!(mmu.read(LCD_STATUS_REGISTER) & 0b11, 0);

        ppu.tick(&mut mmu, 51);
        assert_eq!(ppu.state(), State::OamScan);
        assert_eq!(mmu.read(SCANLINE_Y_REGISTER), 1);
    }

    #[test]
    fn vblank_interrupt_at_line_144() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();

        ppu.tick(&mut mmu, 144 * DOTS_PER_LINE / DOTS_PER_CYCLE);
        assert_eq!(mmu.read(SCANLINE_Y_REGISTER), 144);
        assert!(!interrupt_requested(&mmu, InterruptFlags::VBLANK));

        ppu.tick(&mut mmu, 1);
        assert!(interrupt_requested(&mmu, InterruptFlags::VBLANK));
        assert_eq!(mmu.read(LCD_STATUS_REGISTER) & 0b11, 1);
        assert!(ppu.frame_ready());
    }

    #[test]
    fn lcd_off_freezes() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(LCD_CONTROL_REGISTER, 0x11);

        ppu.tick(&mut mmu, 10_000);
        assert_eq!(ppu.line(), 0);
        assert_eq!(ppu.dot, 0);
        assert!(!ppu.frame_ready());
    }

    #[test]
    fn stat_interrupt_on_rising_edge_only() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(SCANLINE_Y_COMPARE_REGISTER, 2);
        mmu.write(LCD_STATUS_REGISTER, LcdStatus::LYC_IRQ.bits());

        ppu.tick(&mut mmu, 2 * DOTS_PER_LINE / DOTS_PER_CYCLE - 1);
        assert!(!interrupt_requested(&mmu, InterruptFlags::LCD_STAT));

        ppu.tick(&mut mmu, 1);
        assert!(interrupt_requested(&mmu, InterruptFlags::LCD_STAT));
        assert_ne!(mmu.read(LCD_STATUS_REGISTER) & LcdStatus::COINCIDENCE.bits(), 0);

        // the line stays high for all of line 2, so no second request
        mmu.write(INTERRUPT_FLAGS_REGISTER, 0);
        ppu.tick(&mut mmu, 100);
        assert!(!interrupt_requested(&mmu, InterruptFlags::LCD_STAT));
    }

    #[test]
    fn oam_scan_keeps_first_ten_sprites() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        for index in 0..12u16 {
            mmu.write(0xfe00 + index * 4, 16);
            mmu.write(0xfe00 + index * 4 + 1, 8 + index as u8);
        }
        // off this line
        mmu.write(0xfe00 + 2 * 4, 40);

        ppu.tick(&mut mmu, 20);
        assert_eq!(ppu.sprite_count, 10);
        let indices: Vec<usize> = ppu.sprites.iter().map(|sprite| sprite.index).collect();
        assert_eq!(indices, vec![0, 1, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn renders_background_tiles() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        solid_tile(&mut mmu, 1, 3);
        // second column of the first tile map row
        mmu.write(TILEMAP_0_ADDRESS + 1, 1);

        ppu.tick(&mut mmu, DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[7], 0);
        assert_eq!(framebuffer[8], 3);
        assert_eq!(framebuffer[15], 3);
        assert_eq!(framebuffer[16], 0);
    }

    #[test]
    fn scroll_moves_background() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        solid_tile(&mut mmu, 1, 2);
        mmu.write(TILEMAP_0_ADDRESS + 1, 1);
        mmu.write(SCROLL_X_REGISTER, 4);

        ppu.tick(&mut mmu, DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[3], 0);
        assert_eq!(framebuffer[4], 2);
        assert_eq!(framebuffer[11], 2);
        assert_eq!(framebuffer[12], 0);
    }

    #[test]
    fn window_uses_its_own_line_counter() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        solid_tile(&mut mmu, 1, 1);
        let window = LcdControl::WINDOW_DISPLAY | LcdControl::WINDOW_TILE_MAP;
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | window.bits());
        mmu.write(TILEMAP_1_ADDRESS, 1);
        mmu.write(WINDOW_Y_REGISTER, 1);
        mmu.write(WINDOW_X_REGISTER, 7 + 80);

        ppu.tick(&mut mmu, 2 * DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[80], 0, "window starts at WY");
        assert_eq!(framebuffer[SCREEN_WIDTH + 79], 0);
        assert_eq!(framebuffer[SCREEN_WIDTH + 80], 1);
        assert_eq!(framebuffer[SCREEN_WIDTH + 87], 1);
        assert_eq!(framebuffer[SCREEN_WIDTH + 88], 0);
        assert_eq!(ppu.window_line, 1);
    }

    #[test]
    fn sprites_overlap_by_x_then_index() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | LcdControl::OBJ_DISPLAY.bits());
        solid_tile(&mut mmu, 1, 1);
        solid_tile(&mut mmu, 2, 2);
        solid_tile(&mut mmu, 3, 3);

        // sprite 0 at x=12 is drawn over by sprite 1 at x=10 where they overlap
        let oam = [16, 8 + 12, 1, 0, 16, 8 + 10, 2, 0, 16, 8 + 10, 3, 0];
        for (i, byte) in oam.iter().enumerate() {
            mmu.write(0xc100 + i as u16, *byte);
        }
        mmu.write(OAM_DMA_REGISTER, 0xc1);

        ppu.tick(&mut mmu, DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[9], 0);
        assert_eq!(framebuffer[10], 2);
        assert_eq!(framebuffer[17], 2);
        assert_eq!(framebuffer[18], 1);
        assert_eq!(framebuffer[19], 1);
        assert_eq!(framebuffer[20], 0);
    }

    #[test]
    fn sprite_priority_hides_behind_background() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | LcdControl::OBJ_DISPLAY.bits());
        solid_tile(&mut mmu, 1, 1);
        solid_tile(&mut mmu, 2, 3);
        mmu.write(TILEMAP_0_ADDRESS, 1);

        // behind the background, straddling the first two tiles
        let entry = [16, 8 + 4, 2, SpriteAttributes::PRIORITY.bits()];
        for (i, byte) in entry.iter().enumerate() {
            mmu.write(0xfe00 + i as u16, *byte);
        }

        ppu.tick(&mut mmu, DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[4], 1);
        assert_eq!(framebuffer[7], 1);
        assert_eq!(framebuffer[8], 3);
        assert_eq!(framebuffer[11], 3);
    }

    #[test]
    fn oam_writes_during_drawing_use_scanned_sprites() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | LcdControl::OBJ_DISPLAY.bits());
        solid_tile(&mut mmu, 1, 3);
        write_sprite(&mut mmu, 0, [16, 8, 1, 0]);

        ppu.tick(&mut mmu, 21);
        assert_eq!(ppu.state(), State::Drawing);
        // moved below the line after the scan picked it
        mmu.write(0xfe00, 100);
        ppu.tick(&mut mmu, 60);

        assert_eq!(ppu.state(), State::HBlank);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[0], 3);
        assert_eq!(framebuffer[7], 3);
        assert_eq!(framebuffer[8], 0);
    }

    #[test]
    fn obj_size_change_during_drawing_keeps_scanned_height() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        let tall = LCD_ON | LcdControl::OBJ_DISPLAY.bits() | LcdControl::OBJ_SIZE.bits();
        mmu.write(LCD_CONTROL_REGISTER, tall);
        // flipped 8x16 sprite whose lower half covers line 0
        tile_row(&mut mmu, 2, 3, 2);
        write_sprite(&mut mmu, 0, [4, 8, 2, SpriteAttributes::FLIP_Y.bits()]);

        ppu.tick(&mut mmu, 21);
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | LcdControl::OBJ_DISPLAY.bits());
        ppu.tick(&mut mmu, 60);

        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[0], 2);
        assert_eq!(framebuffer[7], 2);
    }

    #[test]
    fn tall_sprites_pair_tiles() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        let tall = LCD_ON | LcdControl::OBJ_DISPLAY.bits() | LcdControl::OBJ_SIZE.bits();
        mmu.write(LCD_CONTROL_REGISTER, tall);
        solid_tile(&mut mmu, 4, 1);
        solid_tile(&mut mmu, 5, 3);
        // the low bit of the tile index is ignored
        write_sprite(&mut mmu, 0, [16, 8, 5, 0]);

        ppu.tick(&mut mmu, 16 * DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[0], 1);
        assert_eq!(framebuffer[7 * SCREEN_WIDTH], 1);
        assert_eq!(framebuffer[8 * SCREEN_WIDTH], 3);
        assert_eq!(framebuffer[15 * SCREEN_WIDTH + 7], 3);
        assert_eq!(framebuffer[16 * SCREEN_WIDTH], 0);
    }

    #[test]
    fn vertical_flip_reverses_rows() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | LcdControl::OBJ_DISPLAY.bits());
        tile_row(&mut mmu, 1, 0, 1);
        tile_row(&mut mmu, 1, 7, 3);
        write_sprite(&mut mmu, 0, [16, 8, 1, SpriteAttributes::FLIP_Y.bits()]);
        write_sprite(&mut mmu, 1, [16, 16, 1, 0]);

        ppu.tick(&mut mmu, 8 * DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[0], 3);
        assert_eq!(framebuffer[7 * SCREEN_WIDTH], 1);
        assert_eq!(framebuffer[8], 1);
        assert_eq!(framebuffer[7 * SCREEN_WIDTH + 8], 3);
        // rows 1 to 6 are transparent
        assert_eq!(framebuffer[3 * SCREEN_WIDTH], 0);
    }

    #[test]
    fn palette_attribute_selects_obp1() {
        let mut mmu = mmu();
        let mut ppu = Ppu::new();
        mmu.write(LCD_CONTROL_REGISTER, LCD_ON | LcdControl::OBJ_DISPLAY.bits());
        mmu.write(OBJ1_PALETTE_REGISTER, 0b00_01_10_11);
        solid_tile(&mut mmu, 1, 1);
        write_sprite(&mut mmu, 0, [16, 8, 1, 0]);
        write_sprite(&mut mmu, 1, [16, 16, 1, SpriteAttributes::PALETTE.bits()]);

        ppu.tick(&mut mmu, DOTS_PER_LINE / DOTS_PER_CYCLE);
        let framebuffer = ppu.framebuffer();
        assert_eq!(framebuffer[0], 1);
        assert_eq!(framebuffer[8], 2);
    }
}
