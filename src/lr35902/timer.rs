use crate::memory::mmu::Mmu;
use crate::memory::registers::{InterruptFlags, TimerControl};
use crate::memory::{DIV_REGISTER, TAC_REGISTER, TIMA_REGISTER, TMA_REGISTER};

/// Machine cycles between two DIV increments.
const DIVIDER_PERIOD: usize = 64;

#[derive(Clone)]
pub struct Timer {
    divider_cycles: usize,
    timer_cycles: usize,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            divider_cycles: 0,
            timer_cycles: 0,
        }
    }

    pub fn tick(&mut self, mmu: &mut Mmu, cycles: usize) {
        if mmu.take_divider_reset() {
            self.divider_cycles = 0;
        }

        for _ in 0..cycles {
            self.divider_cycles += 1;
            if self.divider_cycles == DIVIDER_PERIOD {
                self.divider_cycles = 0;
                let div = mmu.read_unchecked(DIV_REGISTER);
                mmu.write_unchecked(DIV_REGISTER, div.wrapping_add(1));
            }

            let tac = self.read_tac(mmu);
            if !tac.contains(TimerControl::ENABLE) {
                continue;
            }

            self.timer_cycles += 1;
            if self.timer_cycles >= Timer::period(tac) {
                self.timer_cycles = 0;
                self.increment_tima(mmu);
            }
        }
    }

    fn increment_tima(&self, mmu: &mut Mmu) {
        let tima = mmu.read_unchecked(TIMA_REGISTER);
        if tima == 0xff {
            let tma = mmu.read_unchecked(TMA_REGISTER);
            mmu.write_unchecked(TIMA_REGISTER, tma);
            mmu.request_interrupt(InterruptFlags::TIMER);
        } else {
            mmu.write_unchecked(TIMA_REGISTER, tima + 1);
        }
    }

    fn period(tac: TimerControl) -> usize {
        match tac.bits() & TimerControl::CLOCK_SELECT.bits() {
            0b00 => 256,
            0b01 => 4,
            0b10 => 16,
            _ => 64,
        }
    }

    #[inline]
    fn read_tac(&self, mmu: &Mmu) -> TimerControl {
        mmu.read_as_unchecked::<TimerControl>(TAC_REGISTER)
    }
}

impl Default for Timer {
    fn default() -> Timer {
        Timer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::cartridge::tests::rom_with_header;
    use crate::memory::cartridge::Cartridge;
    use crate::memory::INTERRUPT_FLAGS_REGISTER;

    fn mmu() -> Mmu {
        let mut mmu = Mmu::new(None, Cartridge::from_rom(rom_with_header(0, 0, 0)).unwrap());
        mmu.write(DIV_REGISTER, 0);
        mmu.write(TAC_REGISTER, 0);
        mmu.write(INTERRUPT_FLAGS_REGISTER, 0);
        mmu
    }

    #[test]
    fn divider_ticks_every_64_cycles() {
        let mut mmu = mmu();
        let mut timer = Timer::new();

        timer.tick(&mut mmu, 63);
        assert_eq!(mmu.read(DIV_REGISTER), 0);
        timer.tick(&mut mmu, 1);
        assert_eq!(mmu.read(DIV_REGISTER), 1);
        timer.tick(&mut mmu, 64 * 10);
        assert_eq!(mmu.read(DIV_REGISTER), 11);
    }

    #[test]
    fn divider_write_restarts_count() {
        let mut mmu = mmu();
        let mut timer = Timer::new();

        timer.tick(&mut mmu, 60);
        mmu.write(DIV_REGISTER, 0x12);
        timer.tick(&mut mmu, 10);
        assert_eq!(mmu.read(DIV_REGISTER), 0);
        timer.tick(&mut mmu, 54);
        assert_eq!(mmu.read(DIV_REGISTER), 1);
    }

    #[test]
    fn disabled_timer_does_not_count() {
        let mut mmu = mmu();
        let mut timer = Timer::new();
        mmu.write(TAC_REGISTER, 0b01);
        timer.tick(&mut mmu, 100);
        assert_eq!(mmu.read(TIMA_REGISTER), 0);
    }

    #[test]
    fn clock_select_rates() {
        for (select, period) in [(0b00, 256), (0b01, 4), (0b10, 16), (0b11, 64)] {
            let mut mmu = mmu();
            let mut timer = Timer::new();
            mmu.write(TAC_REGISTER, 0b100 | select);

            timer.tick(&mut mmu, period - 1);
            assert_eq!(mmu.read(TIMA_REGISTER), 0, "select {:02b}", select);
            timer.tick(&mut mmu, 1);
            assert_eq!(mmu.read(TIMA_REGISTER), 1, "select {:02b}", select);
            timer.tick(&mut mmu, period * 3);
            assert_eq!(mmu.read(TIMA_REGISTER), 4, "select {:02b}", select);
        }
    }

    #[test]
    fn overflow_reloads_and_interrupts() {
        let mut mmu = mmu();
        let mut timer = Timer::new();
        mmu.write(TAC_REGISTER, 0b101);
        mmu.write(TIMA_REGISTER, 0xfe);
        mmu.write(TMA_REGISTER, 0x80);

        timer.tick(&mut mmu, 4);
        assert_eq!(mmu.read(TIMA_REGISTER), 0xff);
        assert_eq!(mmu.read(INTERRUPT_FLAGS_REGISTER) & InterruptFlags::TIMER.bits(), 0);

        timer.tick(&mut mmu, 4);
        assert_eq!(mmu.read(TIMA_REGISTER), 0x80);
        assert_ne!(mmu.read(INTERRUPT_FLAGS_REGISTER) & InterruptFlags::TIMER.bits(), 0);
    }
}
