//! Register writes from the emulated CPU.

use crate::{
    chip::SoundChip,
    ports::ChipPort,
    render::RenderEngine,
    resample::Resampler,
};

impl<C: SoundChip, R: Resampler> RenderEngine<C, R> {
    /// Applies a register write at the current emulated time.
    ///
    /// Audio up to this instant is rendered with the old register state
    /// before the new value reaches the chip.
    pub fn write_register(&mut self, target: ChipPort, value: u8) {
        self.render_up_to_now();
        self.chips.write(target, value);
    }

    /// Writes to a port given as an offset from the card's base port.
    /// Offsets outside the chip ports are ignored.
    pub fn write_port(&mut self, offset: u16, value: u8) {
        if let Some(target) = ChipPort::from_offset(offset) {
            self.write_register(target, value);
        }
    }
}
