//! Game Blaster / Creative Music System (C/MS) sound card.
//!
//! Two SAA-1099 chips sit behind four write-only I/O ports. Register writes
//! arrive on the emulated CPU's clock while audio is pulled by the host
//! mixer on its own schedule; [`render::RenderEngine`] reconciles the two so
//! every write is heard at the moment it happened.
//!
//! [`GameBlaster`] owns a session: it installs the port handlers on an
//! [`IoBus`], registers a channel with a [`Mixer`] and tears both down again
//! on close.

pub mod chip;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod gameblaster;
pub mod io;
pub mod mixer;
pub mod ports;
pub mod pull;
pub mod render;
pub mod resample;
pub mod time;

pub use chip::{ChipTiming, SoundChip, StereoSample};
pub use config::{CardVariant, CmsConfig, ConfigSection, FilterSetting};
pub use error::ConfigError;
pub use gameblaster::GameBlaster;
pub use io::IoBus;
pub use mixer::{AudioCallback, AudioFrame, ChannelFeatures, FilterState, Mixer, MixerChannel};
pub use time::{EmulatedClock, ManualClock};

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .pretty()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
    }
}
