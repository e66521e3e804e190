pub mod palette;
pub mod ppu;
pub mod sprite;
pub mod state;
pub mod tile;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

pub const TILESET_0_ADDRESS: u16 = 0x8000;
/// Base of the signed tile addressing mode, indices are `i8` offsets from here.
pub const TILESET_1_ADDRESS: u16 = 0x9000;
pub const TILEMAP_0_ADDRESS: u16 = 0x9800;
pub const TILEMAP_1_ADDRESS: u16 = 0x9c00;

pub const TILEMAP_WIDTH: u16 = 32;
pub const TILE_SIZE: u16 = 16;

pub const DOTS_PER_CYCLE: usize = 4;
pub const OAM_SCAN_DOTS: usize = 80;
pub const DRAWING_DOTS: usize = 172;
pub const DOTS_PER_LINE: usize = 456;
pub const VBLANK_START_LINE: u8 = 144;
pub const LINES_PER_FRAME: u8 = 154;
pub const DOTS_PER_FRAME: usize = DOTS_PER_LINE * LINES_PER_FRAME as usize;
pub const CYCLES_PER_FRAME: usize = DOTS_PER_FRAME / DOTS_PER_CYCLE;

pub const SPRITE_COUNT: usize = 40;
pub const MAX_SPRITES_PER_LINE: usize = 10;

/// WX values past this leave the window fully off screen.
pub const WINDOW_X_MAX: u8 = 166;
pub const WINDOW_X_OFFSET: u8 = 7;
