//! Contract with the host mixer that owns the output channel.
//!
//! The mixer pulls audio on its own schedule: it invokes the channel's
//! [`AudioCallback`] with a frame count and expects exactly that many frames
//! back. Filtering, sleeping and level control are the mixer's business; the
//! card only configures them.

use std::rc::Rc;

use bitflags::bitflags;

/// Name the card registers its channel under.
pub const CHANNEL_NAME: &str = "CMS";

/// Low-pass settings that make the output match recordings of the real card.
pub const LOW_PASS_ORDER: u8 = 1;
pub const LOW_PASS_CUTOFF_HZ: u16 = 6000;

bitflags! {
    /// Capabilities requested when a channel is added.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelFeatures: u8 {
        /// The mixer may put the channel to sleep while it is silent.
        const SLEEP = 1 << 0;
        const STEREO = 1 << 1;
        const REVERB_SEND = 1 << 2;
        const CHORUS_SEND = 1 << 3;
        /// Classifies the channel as a synthesizer for mixer-side defaults.
        const SYNTHESIZER = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterState {
    On,
    Off,
}

/// One stereo output frame, in 16-bit sample units.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AudioFrame {
    pub left: f32,
    pub right: f32,
}

impl AudioFrame {
    pub const SILENT: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

impl From<[f32; 2]> for AudioFrame {
    fn from([left, right]: [f32; 2]) -> Self {
        Self { left, right }
    }
}

/// Invoked by the mixer with the number of frames it wants; the callee
/// appends exactly that many frames to the buffer.
pub type AudioCallback = Box<dyn FnMut(usize, &mut Vec<AudioFrame>)>;

/// Handle to a channel registered with the mixer.
pub trait MixerChannel {
    /// Wakes a sleeping channel. Returns `true` if it was asleep.
    fn wake_up(&self) -> bool;

    /// Frame rate the mixer runs this channel at.
    fn sample_rate(&self) -> u32;

    fn configure_low_pass_filter(&self, order: u8, cutoff_hz: u16);

    fn set_low_pass_filter(&self, state: FilterState);

    /// Applies a user-supplied filter description. Returns `false` if the
    /// description is not understood.
    fn try_parse_and_set_custom_filter(&self, spec: &str) -> bool;

    fn enable(&self, enabled: bool);
}

/// The host mixer.
pub trait Mixer {
    fn add_channel(
        &mut self,
        callback: AudioCallback,
        name: &str,
        features: ChannelFeatures,
    ) -> Rc<dyn MixerChannel>;

    fn deregister_channel(&mut self, channel: &Rc<dyn MixerChannel>);
}
