//! The SAA-1099 sound generator as seen from the card.
//!
//! Synthesis itself lives behind [`SoundChip`]; the card only needs to poke
//! registers and pull one stereo sample pair per render tick.

use core::fmt::Debug;

use crate::ports::{ChipPort, ChipSelect, RegisterPort};

/// Crystal feeding both chips (the ISA bus' 14.31818 MHz, halved).
pub const CHIP_CLOCK_HZ: u32 = 14_318_180 / 2;

/// Chip clocks per rendered sample.
pub const RENDER_DIVISOR: u32 = 32;

/// Rate at which the chip pair is pulled, rounded up to whole Hz.
pub const RENDER_RATE_HZ: u32 = CHIP_CLOCK_HZ.div_ceil(RENDER_DIVISOR);

/// Emulated milliseconds covered by one render tick.
pub const MS_PER_RENDER: f64 = 1000.0 / RENDER_RATE_HZ as f64;

/// Clocking handed to chip implementations when they are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipTiming {
    pub clock_hz: u32,
    pub render_divisor: u32,
}

impl ChipTiming {
    pub const fn render_rate_hz(self) -> u32 {
        self.clock_hz.div_ceil(self.render_divisor)
    }
}

impl Default for ChipTiming {
    fn default() -> Self {
        Self {
            clock_hz: CHIP_CLOCK_HZ,
            render_divisor: RENDER_DIVISOR,
        }
    }
}

/// One raw stereo sample pair as produced by a chip.
pub type StereoSample = [i16; 2];

/// Opaque stereo sound generator driven by byte-wide register writes.
pub trait SoundChip: Debug {
    /// Writes the currently selected register.
    fn write_data(&mut self, value: u8);

    /// Selects the register the next data write targets.
    fn write_control(&mut self, value: u8);

    /// Advances the chip by one render tick and returns its output.
    fn render(&mut self) -> StereoSample;
}

/// The two chips on the card, addressed by [`ChipSelect`].
#[derive(Debug)]
pub struct ChipPair<C> {
    chips: [C; 2],
}

impl<C: SoundChip> ChipPair<C> {
    pub fn new(chips: [C; 2]) -> Self {
        Self { chips }
    }

    /// Starts both chips from a factory.
    pub fn start(timing: ChipTiming, mut make: impl FnMut(ChipTiming) -> C) -> Self {
        Self::new([make(timing), make(timing)])
    }

    pub fn chip(&self, select: ChipSelect) -> &C {
        &self.chips[select.idx()]
    }

    pub fn chip_mut(&mut self, select: ChipSelect) -> &mut C {
        &mut self.chips[select.idx()]
    }

    /// Routes a byte to the chip register port it was written to.
    pub fn write(&mut self, target: ChipPort, value: u8) {
        let chip = self.chip_mut(target.chip);
        match target.port {
            RegisterPort::Data => chip.write_data(value),
            RegisterPort::Control => chip.write_control(value),
        }
    }

    /// Pulls one tick from both chips and mixes them additively.
    pub fn render(&mut self) -> [i32; 2] {
        self.chips.iter_mut().fold([0, 0], |[left, right], chip| {
            let [l, r] = chip.render();
            [left + i32::from(l), right + i32::from(r)]
        })
    }
}
