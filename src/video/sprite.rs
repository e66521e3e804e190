use crate::memory::OAM_SIZE;
use bitflags::bitflags;

const SPRITE_ENTRY_SIZE: usize = 4;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SpriteAttributes: u8 {
        const PALETTE  = 0b0001_0000;
        const FLIP_X   = 0b0010_0000;
        const FLIP_Y   = 0b0100_0000;
        const PRIORITY = 0b1000_0000;
    }
}

/// One OAM entry. `y` and `x` are stored with their hardware offsets of 16 and 8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    pub index: usize,
    pub y: u8,
    pub x: u8,
    pub tile_index: u8,
    pub attributes: SpriteAttributes,
}

impl Sprite {
    pub fn from_oam(oam: &[u8; OAM_SIZE], index: usize) -> Sprite {
        let entry = &oam[index * SPRITE_ENTRY_SIZE..(index + 1) * SPRITE_ENTRY_SIZE];

        Sprite {
            index,
            y: entry[0],
            x: entry[1],
            tile_index: entry[2],
            attributes: SpriteAttributes::from_bits_truncate(entry[3]),
        }
    }

    pub fn covers_line(&self, line: u8, height: u8) -> bool {
        let line = line as u16 + 16;
        let top = self.y as u16;
        line >= top && line < top + height as u16
    }

    /// Column inside the sprite for screen column `x`, if the sprite covers it.
    pub fn column_at(&self, x: usize) -> Option<u8> {
        let column = (x + 8).checked_sub(self.x as usize)?;
        if column >= 8 {
            return None;
        }

        if self.attributes.contains(SpriteAttributes::FLIP_X) {
            Some(7 - column as u8)
        } else {
            Some(column as u8)
        }
    }

    /// Row inside the sprite for `line`, with vertical flipping applied.
    /// `height` is 8 or 16; rows outside the sprite wrap into it.
    pub fn row_at(&self, line: u8, height: u8) -> u8 {
        let last = height - 1;
        let row = (line.wrapping_add(16).wrapping_sub(self.y)) & last;
        if self.attributes.contains(SpriteAttributes::FLIP_Y) {
            last - row
        } else {
            row
        }
    }

    /// Tall sprites ignore the lowest bit of the tile index.
    pub fn tile_for_height(&self, height: u8) -> u8 {
        if height == 16 {
            self.tile_index & 0xfe
        } else {
            self.tile_index
        }
    }
}
