//! Card session: wiring the chips, ports and mixer channel together.
//!
//! The Game Blaster is a rebranding of Creative's first PC sound card, the
//! Creative Music System (C/MS): two Philips SAA-1099 chips behind four
//! write-only ports, plus a small detection chip on the standalone card.
//! Sound Blaster 1.0 carried the same chips on-board and 2.0 had sockets for
//! them, so the chip ports are installed for every card variant.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use cms_blip::BlipResampler;
use tracing::{info, warn};

use crate::{
    chip::{CHIP_CLOCK_HZ, ChipPair, ChipTiming, SoundChip},
    config::{CmsConfig, ConfigSection, FilterSetting},
    detect::DetectionChip,
    error::ConfigError,
    io::{HandlerId, IoBus},
    mixer::{
        AudioCallback, AudioFrame, CHANNEL_NAME, ChannelFeatures, FilterState,
        LOW_PASS_CUTOFF_HZ, LOW_PASS_ORDER, Mixer, MixerChannel,
    },
    ports::{
        CHIP_PORT_COUNT, ChipPort, DETECT_READ_LEN, DETECT_READ_OFFSET, DETECT_WRITE_LEN,
        DETECT_WRITE_OFFSET, UNMAPPED_READ_VALUE,
    },
    render::RenderEngine,
    resample::{Resampler, ResamplerParams, ResamplerPair},
    time::EmulatedClock,
};

type SharedEngine<C, R> = Rc<RefCell<RenderEngine<C, R>>>;

/// Everything that exists only while the card is open.
struct Session<C, R> {
    config: CmsConfig,
    engine: SharedEngine<C, R>,
    detection: Option<Rc<RefCell<DetectionChip>>>,
    channel: Rc<dyn MixerChannel>,
    handlers: Vec<HandlerId>,
}

/// A Game Blaster / C/MS card that can be opened and closed repeatedly.
///
/// Opening builds fresh chips and resamplers, installs the port handlers and
/// registers a mixer channel; closing tears all of that down. Nothing carries
/// over from one session to the next.
///
/// Port handlers and the mixer callback hold weak references to the session,
/// so a card dropped without [`GameBlaster::close`] leaves them inert: writes
/// are ignored, reads float high and pulls return silence.
pub struct GameBlaster<C, R = BlipResampler> {
    make_chip: Box<dyn FnMut(ChipTiming) -> C>,
    session: Option<Session<C, R>>,
}

impl<C, R> core::fmt::Debug for GameBlaster<C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameBlaster")
            .field("config", &self.config())
            .finish()
    }
}

impl<C, R> GameBlaster<C, R>
where
    C: SoundChip + 'static,
    R: Resampler + 'static,
{
    /// Creates a closed card. `make_chip` builds each SAA-1099 on open.
    pub fn new(make_chip: impl FnMut(ChipTiming) -> C + 'static) -> Self {
        Self {
            make_chip: Box::new(make_chip),
            session: None,
        }
    }

    /// Configuration entry point: reads the Sound Blaster section and opens
    /// the card. Any previous session is closed first.
    pub fn init(
        &mut self,
        section: &impl ConfigSection,
        io: &mut IoBus,
        mixer: &mut dyn Mixer,
        clock: Rc<dyn EmulatedClock>,
    ) -> Result<(), ConfigError> {
        let config = CmsConfig::from_section(section)?;
        self.open(config, io, mixer, clock);
        Ok(())
    }

    /// Configuration teardown entry point.
    pub fn shutdown(&mut self, io: &mut IoBus, mixer: &mut dyn Mixer) {
        self.close(io, mixer);
    }

    /// Opens the card, closing any current session first.
    ///
    /// # Panics
    ///
    /// Panics if `config.base_port` is not a port the selected card can use;
    /// configurations are expected to be validated beforehand
    /// ([`CmsConfig::validate`]).
    pub fn open(
        &mut self,
        mut config: CmsConfig,
        io: &mut IoBus,
        mixer: &mut dyn Mixer,
        clock: Rc<dyn EmulatedClock>,
    ) {
        self.close(io, mixer);
        debug_assert!(self.session.is_none());

        let standalone = config.card.is_standalone();
        let base_port = config.base_port;
        assert!(
            config.card.valid_ports().contains(&base_port),
            "CMS: port {base_port:#x} is not valid for the {} card",
            config.card
        );

        let timing = ChipTiming::default();
        let chips = ChipPair::start(timing, &mut self.make_chip);

        // The engine needs the channel's rate, and the channel needs a
        // callback into the engine.
        let engine: SharedEngine<C, R> = Rc::new_cyclic(|weak| {
            let channel = mixer.add_channel(
                audio_callback(weak.clone()),
                CHANNEL_NAME,
                ChannelFeatures::SLEEP
                    | ChannelFeatures::STEREO
                    | ChannelFeatures::REVERB_SEND
                    | ChannelFeatures::CHORUS_SEND
                    | ChannelFeatures::SYNTHESIZER,
            );
            let params = ResamplerParams::for_output_rate(
                f64::from(timing.render_rate_hz()),
                f64::from(channel.sample_rate()),
            );
            RefCell::new(RenderEngine::new(
                timing,
                chips,
                ResamplerPair::create(params),
                channel,
                clock,
            ))
        });
        let channel = Rc::clone(engine.borrow().channel());

        config.filter = configure_filter(channel.as_ref(), &config.filter);

        let mut handlers = Vec::with_capacity(6);
        for offset in 0..CHIP_PORT_COUNT {
            let Some(target) = ChipPort::from_offset(offset) else {
                continue;
            };
            let weak = Rc::downgrade(&engine);
            let id = io.install_write(
                base_port + offset,
                1,
                Box::new(move |_port: u16, value: u8| {
                    if let Some(engine) = weak.upgrade() {
                        engine.borrow_mut().write_register(target, value);
                    }
                }),
            );
            handlers.push(id);
        }

        // Only the standalone card has the detection chip.
        let detection = standalone.then(|| {
            let chip = Rc::new(RefCell::new(DetectionChip::default()));

            let reader = Rc::downgrade(&chip);
            handlers.push(io.install_read(
                base_port + DETECT_READ_OFFSET,
                DETECT_READ_LEN,
                Box::new(move |port: u16| {
                    reader
                        .upgrade()
                        .map_or(UNMAPPED_READ_VALUE, |c| c.borrow().read(port - base_port))
                }),
            ));

            let writer = Rc::downgrade(&chip);
            handlers.push(io.install_write(
                base_port + DETECT_WRITE_OFFSET,
                DETECT_WRITE_LEN,
                Box::new(move |port: u16, value: u8| {
                    if let Some(c) = writer.upgrade() {
                        c.borrow_mut().write(port - base_port, value);
                    }
                }),
            ));

            chip
        });

        info!(
            "CMS: Running on port {:x}h with two {:.3} MHz Philips SAA-1099 chips",
            base_port,
            f64::from(CHIP_CLOCK_HZ) / 1e6
        );

        self.session = Some(Session {
            config,
            engine,
            detection,
            channel,
            handlers,
        });
    }

    /// Closes the card. Does nothing if it is not open.
    pub fn close(&mut self, io: &mut IoBus, mixer: &mut dyn Mixer) {
        let Some(session) = self.session.take() else {
            return;
        };

        info!("CMS: Shutting down");

        for id in session.handlers {
            io.uninstall(id);
        }

        session.channel.enable(false);
        mixer.deregister_channel(&session.channel);
        // Chips, resamplers and queued audio go with the session.
    }

    /// Current emulated time datum, while open.
    pub fn last_rendered_ms(&self) -> Option<f64> {
        self.session
            .as_ref()
            .map(|s| s.engine.borrow().last_rendered_ms())
    }

    /// Frames rendered ahead of the mixer, while open.
    pub fn queued_frames(&self) -> Option<usize> {
        self.session
            .as_ref()
            .map(|s| s.engine.borrow().queued_frames())
    }
}

impl<C, R> GameBlaster<C, R> {
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Effective configuration of the open session. An invalid custom filter
    /// shows up here already corrected to [`FilterSetting::On`].
    pub fn config(&self) -> Option<&CmsConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    /// Byte latched in the detection chip, if the card has one and is open.
    pub fn detection_latch(&self) -> Option<u8> {
        self.session
            .as_ref()
            .and_then(|s| s.detection.as_ref())
            .map(|c| c.borrow().latched())
    }
}

fn audio_callback<C, R>(engine: Weak<RefCell<RenderEngine<C, R>>>) -> AudioCallback
where
    C: SoundChip + 'static,
    R: Resampler + 'static,
{
    Box::new(move |requested: usize, out: &mut Vec<AudioFrame>| {
        match engine.upgrade() {
            Some(engine) => engine.borrow_mut().pull_frames(requested, out),
            None => out.resize(out.len() + requested, AudioFrame::SILENT),
        }
    })
}

/// Applies the filter setting to the channel and returns the setting that
/// actually took effect.
fn configure_filter(channel: &dyn MixerChannel, setting: &FilterSetting) -> FilterSetting {
    // Tuned against recordings of real hardware; indistinguishable by ear.
    let enable_default = || {
        channel.configure_low_pass_filter(LOW_PASS_ORDER, LOW_PASS_CUTOFF_HZ);
        channel.set_low_pass_filter(FilterState::On);
    };

    match setting {
        FilterSetting::On => {
            enable_default();
            FilterSetting::On
        }
        FilterSetting::Off => {
            channel.set_low_pass_filter(FilterState::Off);
            FilterSetting::Off
        }
        FilterSetting::Custom(spec) => {
            if channel.try_parse_and_set_custom_filter(spec) {
                setting.clone()
            } else {
                warn!("CMS: Invalid 'cms_filter' setting: '{spec}', using 'on'");
                enable_default();
                FilterSetting::On
            }
        }
    }
}
