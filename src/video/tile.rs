use crate::memory::mmu::Mmu;
use crate::memory::registers::LcdControl;
use crate::video::{TILESET_0_ADDRESS, TILESET_1_ADDRESS, TILE_SIZE};

/// Eight pixels of a tile line. The two bitplanes are interleaved so pixel
/// `x` (0 = leftmost) occupies bits `15 - 2x` and `14 - 2x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRow(u16);

impl TileRow {
    pub fn from_bytes(low: u8, high: u8) -> TileRow {
        let mut row = 0u16;
        for bit in (0..8).rev() {
            let hi = ((high >> bit) & 1) as u16;
            let lo = ((low >> bit) & 1) as u16;
            row = (row << 2) | (hi << 1) | lo;
        }
        TileRow(row)
    }

    /// Reads the row at `address`, the low bitplane byte comes first.
    pub fn fetch(mmu: &Mmu, address: u16) -> TileRow {
        TileRow::from_bytes(mmu.read_vram(address), mmu.read_vram(address + 1))
    }

    /// 2-bit colour index of pixel `x`.
    #[inline]
    pub fn color(&self, x: u8) -> u8 {
        ((self.0 >> (14 - 2 * x as u16)) & 0b11) as u8
    }
}

/// Address of the first row of a background or window tile. LCDC bit 4 picks
/// between unsigned indices from $8000 and signed ones around $9000.
pub fn background_tile_address(lcdc: LcdControl, tile_index: u8) -> u16 {
    if lcdc.contains(LcdControl::BG_TILE_DATA) {
        TILESET_0_ADDRESS + tile_index as u16 * TILE_SIZE
    } else {
        TILESET_1_ADDRESS.wrapping_add_signed(tile_index as i8 as i16 * TILE_SIZE as i16)
    }
}

/// Sprites always use unsigned addressing from $8000.
pub fn sprite_tile_address(tile_index: u8) -> u16 {
    TILESET_0_ADDRESS + tile_index as u16 * TILE_SIZE
}
