use crate::memory::registers::InterruptFlags;

#[derive(Clone, Default)]
pub struct Ime {
    pub enabled: bool,
    pub enable_pending: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vector {
    VBlank,
    Stat,
    Timer,
    Serial,
    Joypad,
}

impl Vector {
    /// Picks the pending interrupt with the lowest bit index.
    pub fn from_flags(flags: &InterruptFlags) -> Option<Vector> {
        match flags.highest_priority()? {
            InterruptFlags::VBLANK => Some(Vector::VBlank),
            InterruptFlags::LCD_STAT => Some(Vector::Stat),
            InterruptFlags::TIMER => Some(Vector::Timer),
            InterruptFlags::SERIAL => Some(Vector::Serial),
            InterruptFlags::JOYPAD => Some(Vector::Joypad),
            _ => None,
        }
    }

    pub fn flag(&self) -> InterruptFlags {
        match self {
            Vector::VBlank => InterruptFlags::VBLANK,
            Vector::Stat => InterruptFlags::LCD_STAT,
            Vector::Timer => InterruptFlags::TIMER,
            Vector::Serial => InterruptFlags::SERIAL,
            Vector::Joypad => InterruptFlags::JOYPAD,
        }
    }

    pub fn to_address(&self) -> u16 {
        0x0040 + 8 * self.flag().bits().trailing_zeros() as u16
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Vector::VBlank => write!(f, "VBLANK"),
            Vector::Stat => write!(f, "STAT"),
            Vector::Timer => write!(f, "TIMER"),
            Vector::Serial => write!(f, "SERIAL"),
            Vector::Joypad => write!(f, "JOYPAD"),
        }
    }
}
