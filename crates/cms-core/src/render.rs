//! Reconciles emulated time with rendered audio.
//!
//! Register writes arrive at emulated-CPU time while the mixer pulls frames
//! on the host's schedule. The engine keeps a time datum marking how far the
//! chips have been rendered. Before every register write it catches up to the
//! present, queueing the frames produced, so each write only affects audio
//! after the instant it happened. The mixer drains that queue first when it
//! pulls (see `pull.rs`).

use core::fmt;
use std::{collections::VecDeque, rc::Rc};

use tracing::trace;

use crate::{
    chip::{ChipPair, ChipTiming, SoundChip},
    mixer::{AudioFrame, MixerChannel},
    resample::{Resampler, ResamplerPair},
    time::EmulatedClock,
};

pub struct RenderEngine<C, R> {
    pub(crate) chips: ChipPair<C>,
    resamplers: ResamplerPair<R>,
    channel: Rc<dyn MixerChannel>,
    pub(crate) clock: Rc<dyn EmulatedClock>,
    /// Frames rendered ahead of the mixer, oldest first.
    pub(crate) fifo: VecDeque<AudioFrame>,
    /// Emulated time (ms) up to which the chips have been rendered.
    pub(crate) last_rendered_ms: f64,
    ms_per_render: f64,
}

impl<C: fmt::Debug, R: fmt::Debug> fmt::Debug for RenderEngine<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("chips", &self.chips)
            .field("resamplers", &self.resamplers)
            .field("queued", &self.fifo.len())
            .field("last_rendered_ms", &self.last_rendered_ms)
            .finish()
    }
}

impl<C: SoundChip, R: Resampler> RenderEngine<C, R> {
    /// Creates an engine whose time datum starts at the clock's present.
    pub fn new(
        timing: ChipTiming,
        chips: ChipPair<C>,
        resamplers: ResamplerPair<R>,
        channel: Rc<dyn MixerChannel>,
        clock: Rc<dyn EmulatedClock>,
    ) -> Self {
        let last_rendered_ms = clock.now_ms();
        Self {
            chips,
            resamplers,
            channel,
            clock,
            fifo: VecDeque::new(),
            last_rendered_ms,
            ms_per_render: 1000.0 / f64::from(timing.render_rate_hz()),
        }
    }

    /// Renders every tick between the time datum and the present, queueing
    /// the frames that come out of the resamplers.
    ///
    /// If the output channel was asleep the backlog is discarded instead: the
    /// datum jumps to the present and nothing is rendered.
    pub fn render_up_to_now(&mut self) {
        let now = self.clock.now_ms();

        if self.channel.wake_up() {
            trace!(
                skipped_ms = now - self.last_rendered_ms,
                "CMS: channel woke up, resyncing time datum"
            );
            self.last_rendered_ms = now;
            return;
        }

        while self.last_rendered_ms < now {
            self.last_rendered_ms += self.ms_per_render;
            if let Some(frame) = self.maybe_render_frame() {
                self.fifo.push_back(frame);
            }
        }
    }

    /// Pulls one tick from both chips and feeds the mix through the
    /// resamplers. Returns a frame when the resamplers have one ready.
    ///
    /// Does not move the time datum.
    pub fn maybe_render_frame(&mut self) -> Option<AudioFrame> {
        let mixed = self.chips.render();
        self.resamplers.input(mixed).map(AudioFrame::from)
    }

    pub fn last_rendered_ms(&self) -> f64 {
        self.last_rendered_ms
    }

    pub fn ms_per_render(&self) -> f64 {
        self.ms_per_render
    }

    /// Frames rendered ahead of the mixer.
    pub fn queued_frames(&self) -> usize {
        self.fifo.len()
    }

    pub fn chips(&self) -> &ChipPair<C> {
        &self.chips
    }

    pub fn channel(&self) -> &Rc<dyn MixerChannel> {
        &self.channel
    }
}
