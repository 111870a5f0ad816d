use std::f32::consts::TAU;

/// A sine oscillator that accumulates phase per sample.
///
/// Phase lives in [0, TAU) and wraps after every sample, so long tones do not
/// lose precision the way a `sin(TAU * f * n / sr)` formulation does once `n`
/// grows large.
pub struct SineOsc {
    phase: f32,
    phase_increment: f32,
}

impl SineOsc {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: TAU * frequency / sample_rate,
        }
    }

    /// Produce the next sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = self.phase.sin();
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }

    /// Fill a buffer with oscillator output (overwrites, no mixing).
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
