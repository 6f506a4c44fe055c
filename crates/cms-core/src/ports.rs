//! Port layout of the Game Blaster / C/MS card.
//!
//! Everything is addressed relative to the configured base port. The two
//! SAA-1099 chips occupy the first four ports; the standalone card adds a
//! small detection chip above them.

/// Base ports the standalone Game Blaster can be jumpered to.
pub const GAME_BLASTER_PORTS: [u16; 6] = [0x210, 0x220, 0x230, 0x240, 0x250, 0x260];

/// Base ports available when the chips sit on a Sound Blaster.
pub const SOUND_BLASTER_CMS_PORTS: [u16; 8] = [0x220, 0x240, 0x260, 0x280, 0x2a0, 0x2c0, 0x2e0, 0x300];

/// Number of chip register ports starting at the base.
pub const CHIP_PORT_COUNT: u16 = 4;

/// Detection chip read window, relative to the base port.
pub const DETECT_READ_OFFSET: u16 = 0x0;
pub const DETECT_READ_LEN: u16 = 16;

/// Detection chip write window, relative to the base port.
pub const DETECT_WRITE_OFFSET: u16 = 0x4;
pub const DETECT_WRITE_LEN: u16 = 12;

/// Byte returned by the detection chip's presence probe.
pub const DETECT_PROBE_VALUE: u8 = 0x7f;

/// Value floating on the bus for reads nothing answers.
pub const UNMAPPED_READ_VALUE: u8 = 0xff;

/// Which of the two SAA-1099 chips a port addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipSelect {
    Left = 0,
    Right = 1,
}

impl ChipSelect {
    pub fn idx(self) -> usize {
        self as usize
    }
}

/// Chip register port kind. Even offsets carry data, odd offsets select the
/// register (control/address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterPort {
    Data,
    Control,
}

/// One of the four write-only chip ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipPort {
    pub chip: ChipSelect,
    pub port: RegisterPort,
}

const CHIP_PORTS: [ChipPort; CHIP_PORT_COUNT as usize] = [
    ChipPort {
        chip: ChipSelect::Left,
        port: RegisterPort::Data,
    },
    ChipPort {
        chip: ChipSelect::Left,
        port: RegisterPort::Control,
    },
    ChipPort {
        chip: ChipSelect::Right,
        port: RegisterPort::Data,
    },
    ChipPort {
        chip: ChipSelect::Right,
        port: RegisterPort::Control,
    },
];

impl ChipPort {
    /// Decodes a chip port from its offset relative to the base port.
    pub fn from_offset(offset: u16) -> Option<Self> {
        CHIP_PORTS.get(usize::from(offset)).copied()
    }
}

/// Ports permitted for a card variant.
pub fn valid_base_ports(standalone: bool) -> &'static [u16] {
    if standalone {
        &GAME_BLASTER_PORTS
    } else {
        &SOUND_BLASTER_CMS_PORTS
    }
}
