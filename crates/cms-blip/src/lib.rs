//! Band-limited rate conversion for sample streams rendered at a chip's
//! native clock.
//!
//! The resampler here is built on Shay Green's blip_buf (1.1.0) synthesis
//! kernel, reshaped into a push/pull stream: feed one input sample at a time
//! with [`BlipResampler::input`], and whenever it reports readiness fetch the
//! converted sample with [`BlipResampler::output`].
//!
//! - Original C source: http://www.slack.net/~ant/blip_buf.html (LGPL-2.1).

mod resampler;

pub use resampler::BlipResampler;
