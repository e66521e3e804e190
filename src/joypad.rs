use log::trace;

const SELECT_MASK: u8 = 0b0011_0000;
const BUTTONS_DESELECTED: u8 = 0b0010_0000;
const DPAD_DESELECTED: u8 = 0b0001_0000;
const RELEASED: u8 = 0b0000_1111;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Button {
    /// Bit inside the latch group this button belongs to.
    fn mask(self) -> u8 {
        match self {
            Button::A | Button::Right => 0b0001,
            Button::B | Button::Left => 0b0010,
            Button::Select | Button::Up => 0b0100,
            Button::Start | Button::Down => 0b1000,
        }
    }

    fn is_direction(self) -> bool {
        matches!(self, Button::Right | Button::Left | Button::Up | Button::Down)
    }
}

/// Both latches are active-low: a cleared bit is a pressed button.
#[derive(Clone)]
pub struct Joypad {
    buttons: u8,
    dpad: u8,
}

impl Joypad {
    pub fn new() -> Joypad {
        Joypad {
            buttons: RELEASED,
            dpad: RELEASED,
        }
    }

    pub fn press(&mut self, button: Button) {
        *self.latch(button) &= !button.mask();
    }

    pub fn release(&mut self, button: Button) {
        *self.latch(button) |= button.mask();
    }

    pub fn reset(&mut self) {
        self.buttons = RELEASED;
        self.dpad = RELEASED;
    }

    fn latch(&mut self, button: Button) -> &mut u8 {
        if button.is_direction() {
            &mut self.dpad
        } else {
            &mut self.buttons
        }
    }

    /// Derives the readable JOYP value from the select bits currently stored in it.
    pub fn as_u8(&self, joypad_state: u8) -> u8 {
        let select = joypad_state & SELECT_MASK;
        let button_select = select & BUTTONS_DESELECTED == 0;
        let direction_select = select & DPAD_DESELECTED == 0;

        let state = match (button_select, direction_select) {
            (true, true) => {
                trace!("Joypad has buttons and d-pad mode selected");
                self.buttons & self.dpad
            }
            (true, false) => self.buttons,
            (false, true) => self.dpad,
            (false, false) => RELEASED,
        };

        0b1100_0000 | select | state
    }
}

impl Default for Joypad {
    fn default() -> Joypad {
        Joypad::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_buttons_start_released() {
        let joypad = Joypad::new();
        assert_eq!(joypad.as_u8(0x10) & 0x0f, 0x0f);
        assert_eq!(joypad.as_u8(0x20) & 0x0f, 0x0f);
    }

    #[test]
    fn press_clears_bit_in_selected_group() {
        let mut joypad = Joypad::new();
        joypad.press(Button::Start);
        joypad.press(Button::Left);

        // bit 5 clear selects the action buttons
        assert_eq!(joypad.as_u8(0x10), 0xd0 | 0b0111);
        // bit 4 clear selects the d-pad
        assert_eq!(joypad.as_u8(0x20), 0xe0 | 0b1101);
    }

    #[test]
    fn nothing_selected_reads_released() {
        let mut joypad = Joypad::new();
        joypad.press(Button::A);
        joypad.press(Button::Down);
        assert_eq!(joypad.as_u8(0x30), 0xff);
    }

    #[test]
    fn both_groups_selected_combine_presses() {
        let mut joypad = Joypad::new();
        joypad.press(Button::A);
        joypad.press(Button::Down);
        assert_eq!(joypad.as_u8(0x00), 0xc0 | 0b0110);
    }

    #[test]
    fn release_and_reset() {
        let mut joypad = Joypad::new();
        joypad.press(Button::B);
        joypad.press(Button::Up);
        joypad.release(Button::B);
        assert_eq!(joypad.as_u8(0x10) & 0x0f, 0x0f);
        assert_eq!(joypad.as_u8(0x20) & 0x0f, 0b1011);

        joypad.reset();
        assert_eq!(joypad.as_u8(0x20) & 0x0f, 0x0f);
    }
}
