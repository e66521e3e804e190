#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    White,
    LightGray,
    DarkGray,
    Black,
}

impl Palette {
    /// Looks up the shade a BGP/OBP0/OBP1 value assigns to `color`.
    pub fn from_register(register: u8, color: u8) -> Palette {
        Palette::from_shade(register >> ((color & 0b11) * 2))
    }

    pub fn from_shade(shade: u8) -> Palette {
        match shade & 0b11 {
            0b00 => Palette::White,
            0b01 => Palette::LightGray,
            0b10 => Palette::DarkGray,
            _ => Palette::Black,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Palette::White => 0,
            Palette::LightGray => 1,
            Palette::DarkGray => 2,
            Palette::Black => 3,
        }
    }

    /// 8-bit grey level used when writing frames to image files.
    pub fn luminance(self) -> u8 {
        match self {
            Palette::White => 0xff,
            Palette::LightGray => 0xaa,
            Palette::DarkGray => 0x55,
            Palette::Black => 0x00,
        }
    }
}
