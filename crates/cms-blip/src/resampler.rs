//! Push-style [`BlipResampler`].
//!
//! Every input sample is one clock of the source rate. Amplitude changes are
//! turned into band-limited steps and integrated back into PCM at the output
//! rate, keeping the fixed-point timing, kernel and bass leak of blip_buf.
//! Accumulators are 64-bit so inputs wider than 16 bits (for example two
//! chips summed together) cannot wrap.

const PRE_SHIFT: u32 = 32;
const TIME_BITS: u32 = PRE_SHIFT + 20;
const TIME_UNIT: u64 = 1u64 << TIME_BITS;
const BASS_SHIFT: u32 = 9;
const END_FRAME_EXTRA: usize = 2;
const HALF_WIDTH: usize = 8;
const BUF_EXTRA: usize = HALF_WIDTH * 2 + END_FRAME_EXTRA;
const PHASE_BITS: u32 = 5;
const PHASE_COUNT: usize = 1 << PHASE_BITS;
const DELTA_BITS: u32 = 15;
const DELTA_UNIT: u64 = 1 << DELTA_BITS;
const FRAC_BITS: u32 = TIME_BITS - PRE_SHIFT;
const MAX_RATIO: u64 = 1 << 20;

/// Output samples that may be pending at once. Downsampling produces at most
/// one per input and `input` drains it immediately.
const PENDING_CAPACITY: usize = 2;

// Sinc_Generator(0.9, 0.55, 4.5)
const BL_STEP: [[i16; HALF_WIDTH]; PHASE_COUNT + 1] = [
    [43, -115, 350, -488, 1136, -914, 5861, 21022],
    [44, -118, 348, -473, 1076, -799, 5274, 21001],
    [45, -121, 344, -454, 1011, -677, 4706, 20936],
    [46, -122, 336, -431, 942, -549, 4156, 20829],
    [47, -123, 327, -404, 868, -418, 3629, 20679],
    [47, -122, 316, -375, 792, -285, 3124, 20488],
    [47, -120, 303, -344, 714, -151, 2644, 20256],
    [46, -117, 289, -310, 634, -17, 2188, 19985],
    [46, -114, 273, -275, 553, 117, 1758, 19675],
    [44, -108, 255, -237, 471, 247, 1356, 19327],
    [43, -103, 237, -199, 390, 373, 981, 18944],
    [42, -98, 218, -160, 310, 495, 633, 18527],
    [40, -91, 198, -121, 231, 611, 314, 18078],
    [38, -84, 178, -81, 153, 722, 22, 17599],
    [36, -76, 157, -43, 80, 824, -241, 17092],
    [34, -68, 135, -3, 8, 919, -476, 16558],
    [32, -61, 115, 34, -60, 1006, -683, 16001],
    [29, -52, 94, 70, -123, 1083, -862, 15422],
    [27, -44, 73, 106, -184, 1152, -1015, 14824],
    [25, -36, 53, 139, -239, 1211, -1142, 14210],
    [22, -27, 34, 170, -290, 1261, -1244, 13582],
    [20, -20, 16, 199, -335, 1301, -1322, 12942],
    [18, -12, -3, 226, -375, 1331, -1376, 12293],
    [15, -4, -19, 250, -410, 1351, -1408, 11638],
    [13, 3, -35, 272, -439, 1361, -1419, 10979],
    [11, 9, -49, 292, -464, 1362, -1410, 10319],
    [9, 16, -63, 309, -483, 1354, -1383, 9660],
    [7, 22, -75, 322, -496, 1337, -1339, 9005],
    [6, 26, -85, 333, -504, 1312, -1280, 8355],
    [4, 31, -94, 341, -507, 1278, -1205, 7713],
    [3, 35, -102, 347, -506, 1238, -1119, 7082],
    [1, 40, -110, 350, -499, 1190, -1021, 6464],
    [0, 43, -115, 350, -488, 1136, -914, 5861],
];

/// Converts a stream clocked at `input_hz` down to `output_hz`, one input
/// sample at a time.
///
/// The kernel's passband is fixed at roughly 90% of the output Nyquist
/// frequency. A slow bass leak in the integrator removes any DC offset.
#[derive(Debug, Clone)]
pub struct BlipResampler {
    input_hz: f64,
    output_hz: f64,
    factor: u64,
    offset: u64,
    avail: usize,
    integrator: i64,
    last_input: i32,
    last_output: f32,
    buf: [i64; PENDING_CAPACITY + BUF_EXTRA],
}

impl BlipResampler {
    /// Builds a resampler converting from `input_hz` to `output_hz`.
    ///
    /// # Panics
    ///
    /// Panics if either rate is not positive, if `output_hz` exceeds
    /// `input_hz`, or if the ratio is beyond what the fixed-point clock can
    /// represent (2^20).
    pub fn new(input_hz: f64, output_hz: f64) -> Self {
        assert!(input_hz > 0.0, "input rate must be positive");
        assert!(output_hz > 0.0, "output rate must be positive");
        assert!(
            output_hz <= input_hz,
            "BlipResampler only converts downwards ({input_hz} Hz -> {output_hz} Hz)"
        );
        assert!(
            input_hz <= output_hz * MAX_RATIO as f64,
            "input/output ratio exceeds {MAX_RATIO}"
        );

        let factor = compute_factor(input_hz, output_hz);
        let mut this = Self {
            input_hz,
            output_hz,
            factor,
            offset: 0,
            avail: 0,
            integrator: 0,
            last_input: 0,
            last_output: 0.0,
            buf: [0; PENDING_CAPACITY + BUF_EXTRA],
        };
        // blip_new() seeds the offset from the maximum-ratio factor, not the
        // configured one.
        this.offset = (TIME_UNIT / MAX_RATIO) / 2;
        this
    }

    /// Source rate in Hz.
    pub fn input_rate(&self) -> f64 {
        self.input_hz
    }

    /// Destination rate in Hz.
    pub fn output_rate(&self) -> f64 {
        self.output_hz
    }

    /// Output samples produced per input sample.
    pub fn ratio(&self) -> f64 {
        self.output_hz / self.input_hz
    }

    /// Drops all history, returning the stream to silence.
    pub fn clear(&mut self) {
        self.offset = self.factor / 2;
        self.avail = 0;
        self.integrator = 0;
        self.last_input = 0;
        self.last_output = 0.0;
        self.buf.fill(0);
    }

    /// Pushes one input sample. Returns `true` when a new output sample is
    /// ready, in which case [`Self::output`] yields it.
    pub fn input(&mut self, sample: i32) -> bool {
        let delta = i64::from(sample) - i64::from(self.last_input);
        self.last_input = sample;
        if delta != 0 {
            self.add_step(delta);
        }
        self.end_clock();

        if self.avail == 0 {
            return false;
        }
        self.last_output = self.read_one() as f32;
        true
    }

    /// Most recent output sample.
    pub fn output(&self) -> f32 {
        self.last_output
    }

    /// Adds a band-limited step of `delta` at the start of the current clock.
    fn add_step(&mut self, delta: i64) {
        let fixed = self.offset >> PRE_SHIFT;
        let out_index = self.avail + (fixed >> FRAC_BITS) as usize;
        debug_assert!(out_index <= PENDING_CAPACITY + END_FRAME_EXTRA);

        let phase_shift = FRAC_BITS - PHASE_BITS;
        let phase = ((fixed >> phase_shift) & (PHASE_COUNT as u64 - 1)) as usize;
        let interp = ((fixed >> (phase_shift - DELTA_BITS)) & (DELTA_UNIT - 1)) as i64;
        let delta2 = (delta * interp) >> DELTA_BITS;
        let delta1 = delta - delta2;

        let in0 = &BL_STEP[phase];
        let in1 = &BL_STEP[phase + 1];
        for k in 0..HALF_WIDTH {
            self.buf[out_index + k] += i64::from(in0[k]) * delta1 + i64::from(in1[k]) * delta2;
        }

        let rev = &BL_STEP[PHASE_COUNT - phase];
        let rev_prev = &BL_STEP[PHASE_COUNT - phase - 1];
        for k in 0..HALF_WIDTH {
            let idx = HALF_WIDTH - 1 - k;
            self.buf[out_index + HALF_WIDTH + k] +=
                i64::from(rev[idx]) * delta1 + i64::from(rev_prev[idx]) * delta2;
        }
    }

    /// Advances time by one input clock.
    fn end_clock(&mut self) {
        let off = self.offset + self.factor;
        self.avail += (off >> TIME_BITS) as usize;
        self.offset = off & (TIME_UNIT - 1);
        debug_assert!(self.avail <= PENDING_CAPACITY);
    }

    fn read_one(&mut self) -> i64 {
        let s = self.integrator >> DELTA_BITS;
        self.integrator += self.buf[0];
        self.integrator -= s << (DELTA_BITS - BASS_SHIFT);

        let remain = self.avail + BUF_EXTRA - 1;
        self.buf.copy_within(1..1 + remain, 0);
        self.buf[remain] = 0;
        self.avail -= 1;
        s
    }
}

fn compute_factor(input_hz: f64, output_hz: f64) -> u64 {
    let exact = TIME_UNIT as f64 * output_hz / input_hz;
    let mut factor = exact as u64;
    if (factor as f64) < exact {
        factor += 1;
    }
    factor
}
