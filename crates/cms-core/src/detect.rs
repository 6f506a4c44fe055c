//! Detection chip fitted to the standalone Game Blaster.
//!
//! Software probes for the card by reading a fixed signature and by writing
//! a byte that is then read back. Offsets are relative to the base port.

use crate::ports::{DETECT_PROBE_VALUE, UNMAPPED_READ_VALUE};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectionChip {
    latch: u8,
}

impl DetectionChip {
    pub fn read(&self, offset: u16) -> u8 {
        match offset {
            0x0 => DETECT_PROBE_VALUE,
            0xa | 0xb => self.latch,
            _ => UNMAPPED_READ_VALUE,
        }
    }

    pub fn write(&mut self, offset: u16, value: u8) {
        if let 0x6 | 0x7 = offset {
            self.latch = value;
        }
    }

    pub fn latched(&self) -> u8 {
        self.latch
    }
}
