//! Rate conversion from the chip render rate to the mixer's frame rate.

use cms_blip::BlipResampler;

/// Lowest passband handed to a resampler, regardless of output rate.
pub const MIN_PASSBAND_HZ: f64 = 8_000.0;

/// Parameters a resampler is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResamplerParams {
    pub input_hz: f64,
    pub output_hz: f64,
    /// Highest frequency expected to pass unattenuated.
    pub passband_hz: f64,
}

impl ResamplerParams {
    /// Parameters for converting `input_hz` to a mixer running at
    /// `output_hz`: the passband sits at 90% of the output Nyquist
    /// frequency, but never below [`MIN_PASSBAND_HZ`].
    pub fn for_output_rate(input_hz: f64, output_hz: f64) -> Self {
        Self {
            input_hz,
            output_hz,
            passband_hz: (output_hz * 0.9 / 2.0).max(MIN_PASSBAND_HZ),
        }
    }
}

/// Single-channel stream transformer: accepts one input sample at a time and
/// signals when an output sample is available.
pub trait Resampler {
    fn create(params: ResamplerParams) -> Self
    where
        Self: Sized;

    /// Feeds one input sample. Returns `true` when [`Resampler::output`] holds
    /// a new sample.
    fn input(&mut self, sample: i32) -> bool;

    fn output(&self) -> f32;
}

impl Resampler for BlipResampler {
    /// The blip kernel's passband is fixed near 90% of Nyquist, which is what
    /// [`ResamplerParams::for_output_rate`] asks for above 17.8 kHz output.
    fn create(params: ResamplerParams) -> Self {
        BlipResampler::new(params.input_hz, params.output_hz)
    }

    fn input(&mut self, sample: i32) -> bool {
        BlipResampler::input(self, sample)
    }

    fn output(&self) -> f32 {
        BlipResampler::output(self)
    }
}

/// Left and right resamplers, fed in lockstep.
#[derive(Debug)]
pub struct ResamplerPair<R> {
    left: R,
    right: R,
}

impl<R: Resampler> ResamplerPair<R> {
    pub fn new(left: R, right: R) -> Self {
        Self { left, right }
    }

    pub fn create(params: ResamplerParams) -> Self {
        Self::new(R::create(params), R::create(params))
    }

    /// Feeds one stereo input sample and returns the converted pair once both
    /// channels have one ready.
    ///
    /// # Panics
    ///
    /// Panics if the channels disagree on readiness; identically configured
    /// resamplers fed in lockstep never do.
    pub fn input(&mut self, [left, right]: [i32; 2]) -> Option<[f32; 2]> {
        let left_ready = self.left.input(left);
        let right_ready = self.right.input(right);
        assert_eq!(
            left_ready, right_ready,
            "left and right resamplers disagree on readiness"
        );
        left_ready.then(|| [self.left.output(), self.right.output()])
    }
}
