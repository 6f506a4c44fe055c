//! Servicing the mixer's requests for audio.

use tracing::trace;

use crate::{
    chip::SoundChip,
    mixer::AudioFrame,
    render::RenderEngine,
    resample::Resampler,
};

impl<C: SoundChip, R: Resampler> RenderEngine<C, R> {
    /// Appends exactly `requested` frames to `out`.
    ///
    /// Frames already rendered by register-write catch-up go first, in the
    /// order they were rendered. The remainder is rendered on the spot, one
    /// render tick per requested frame; a tick that leaves the resamplers
    /// without output contributes a silent frame. Afterwards the time datum
    /// is resynchronised to the present.
    pub fn pull_frames(&mut self, requested: usize, out: &mut Vec<AudioFrame>) {
        let queued = self.fifo.len().min(requested);
        if !self.fifo.is_empty() {
            trace!(
                queued = self.fifo.len(),
                requested,
                "CMS: draining cycle-accurate frames"
            );
        }

        out.reserve(requested);
        out.extend(self.fifo.drain(..queued));
        for _ in queued..requested {
            out.push(self.maybe_render_frame().unwrap_or(AudioFrame::SILENT));
        }

        self.last_rendered_ms = self.clock.now_ms();
    }
}
