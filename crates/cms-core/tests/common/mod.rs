#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use cms_core::{
    AudioCallback, AudioFrame, ChannelFeatures, ChipTiming, FilterState, GameBlaster, Mixer,
    MixerChannel, SoundChip, StereoSample,
};
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

pub const SAMPLE_RATE: u32 = 48_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipWrite {
    Data(u8),
    Control(u8),
}

/// Writes seen by every chip a factory built, tagged with the chip's serial.
pub type WriteLog = Rc<RefCell<Vec<(usize, ChipWrite)>>>;

/// Chip that outputs a DC level set by its last data write.
#[derive(Debug)]
pub struct RecordingChip {
    serial: usize,
    level: i16,
    log: WriteLog,
}

impl SoundChip for RecordingChip {
    fn write_data(&mut self, value: u8) {
        self.level = i16::from(value) * 64;
        self.log.borrow_mut().push((self.serial, ChipWrite::Data(value)));
    }

    fn write_control(&mut self, value: u8) {
        self.log
            .borrow_mut()
            .push((self.serial, ChipWrite::Control(value)));
    }

    fn render(&mut self) -> StereoSample {
        [self.level, self.level]
    }
}

pub fn card() -> (GameBlaster<RecordingChip>, WriteLog) {
    let log = WriteLog::default();
    let shared = Rc::clone(&log);
    let mut serial = 0;
    let card = GameBlaster::new(move |timing: ChipTiming| {
        assert_eq!(timing, ChipTiming::default());
        let chip = RecordingChip {
            serial,
            level: 0,
            log: Rc::clone(&shared),
        };
        serial += 1;
        chip
    });
    (card, log)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCall {
    Configure { order: u8, cutoff_hz: u16 },
    Set(FilterState),
    Custom(String),
}

#[derive(Debug)]
pub struct FakeChannel {
    rate: u32,
    accept_custom: bool,
    pub asleep: Cell<bool>,
    pub enabled: Cell<bool>,
    pub filter_calls: RefCell<Vec<FilterCall>>,
}

impl MixerChannel for FakeChannel {
    fn wake_up(&self) -> bool {
        self.asleep.replace(false)
    }

    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn configure_low_pass_filter(&self, order: u8, cutoff_hz: u16) {
        self.filter_calls
            .borrow_mut()
            .push(FilterCall::Configure { order, cutoff_hz });
    }

    fn set_low_pass_filter(&self, state: FilterState) {
        self.filter_calls.borrow_mut().push(FilterCall::Set(state));
    }

    fn try_parse_and_set_custom_filter(&self, spec: &str) -> bool {
        if self.accept_custom {
            self.filter_calls
                .borrow_mut()
                .push(FilterCall::Custom(spec.to_owned()));
        }
        self.accept_custom
    }

    fn enable(&self, enabled: bool) {
        self.enabled.set(enabled);
    }
}

pub struct Registration {
    pub name: String,
    pub features: ChannelFeatures,
    pub channel: Rc<FakeChannel>,
    callback: AudioCallback,
}

/// Mixer that keeps registered channels and pulls them on demand.
#[derive(Default)]
pub struct FakeMixer {
    pub accept_custom_filters: bool,
    pub channels: Vec<Registration>,
}

impl FakeMixer {
    pub fn channel(&self) -> &Rc<FakeChannel> {
        &self.only().channel
    }

    pub fn only(&self) -> &Registration {
        assert_eq!(self.channels.len(), 1, "expected exactly one channel");
        &self.channels[0]
    }

    /// Asks the only registered channel for `frames` frames.
    pub fn pull(&mut self, frames: usize) -> Vec<AudioFrame> {
        assert_eq!(self.channels.len(), 1, "expected exactly one channel");
        let mut out = Vec::new();
        (self.channels[0].callback)(frames, &mut out);
        out
    }
}

impl Mixer for FakeMixer {
    fn add_channel(
        &mut self,
        callback: AudioCallback,
        name: &str,
        features: ChannelFeatures,
    ) -> Rc<dyn MixerChannel> {
        let channel = Rc::new(FakeChannel {
            rate: SAMPLE_RATE,
            accept_custom: self.accept_custom_filters,
            asleep: Cell::new(false),
            enabled: Cell::new(true),
            filter_calls: RefCell::default(),
        });
        self.channels.push(Registration {
            name: name.to_owned(),
            features,
            channel: Rc::clone(&channel),
            callback,
        });
        channel
    }

    fn deregister_channel(&mut self, channel: &Rc<dyn MixerChannel>) {
        let target = Rc::as_ptr(channel) as *const ();
        self.channels
            .retain(|r| Rc::as_ptr(&r.channel) as *const () != target);
    }
}
