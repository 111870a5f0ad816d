//! Schroeder reverb for the wet path of the tone engine.
//!
//! Four parallel feedback comb filters build the tail; two series allpass
//! filters diffuse it. Comb delay times are mutually prime so their echoes
//! interleave instead of reinforcing one periodicity:
//!
//! ```text
//! input ──┬──→ [comb] ──┐
//!         ├──→ [comb] ──┼──→ (+) ──→ [allpass] ──→ [allpass] ──→ wet out
//!         ├──→ [comb] ──┤
//!         └──→ [comb] ──┘
//! ```
//!
//! Each comb runs a one-pole lowpass in its feedback loop (damping), which
//! darkens the tail the way air and walls absorb treble. Delay lines are
//! allocated once at construction for the engine's sample rate; `process`
//! never allocates.

/// Comb delay times in milliseconds, mutually prime.
const COMB_DELAYS_MS: [f32; 4] = [25.3, 31.9, 38.3, 42.1];
/// Allpass delay times in milliseconds.
const ALLPASS_DELAYS_MS: [f32; 2] = [6.1, 2.3];

/// Feedback comb filter with damped feedback
struct Comb {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl Comb {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass in the feedback path absorbs high frequencies
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;

        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }
}

/// Allpass diffusion filter
struct Allpass {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl Allpass {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.feedback * input + delayed;

        self.buffer[self.write_pos] = input + self.feedback * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }
}

/// Schroeder reverb tuned at construction for one sample rate.
pub struct SchroederReverb {
    combs: [Comb; 4],
    allpasses: [Allpass; 2],
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        let comb = |ms: f32| Comb::new((ms * sample_rate / 1000.0) as usize);
        let allpass = |ms: f32| Allpass::new((ms * sample_rate / 1000.0) as usize);

        let mut reverb = Self {
            combs: [
                comb(COMB_DELAYS_MS[0]),
                comb(COMB_DELAYS_MS[1]),
                comb(COMB_DELAYS_MS[2]),
                comb(COMB_DELAYS_MS[3]),
            ],
            allpasses: [allpass(ALLPASS_DELAYS_MS[0]), allpass(ALLPASS_DELAYS_MS[1])],
        };
        reverb.set_room_size(0.5);
        reverb.set_damping(0.4);
        reverb
    }

    /// Room size scales comb feedback: 0.0 is a short tail, 1.0 rings out.
    pub fn set_room_size(&mut self, size: f32) {
        let feedback = 0.7 + size.clamp(0.0, 1.0) * 0.28;
        for comb in &mut self.combs {
            comb.feedback = feedback;
        }
    }

    /// Damping darkens the tail: 0.0 bright and metallic, 1.0 muffled.
    pub fn set_damping(&mut self, damp: f32) {
        let damp = damp.clamp(0.0, 1.0);
        for comb in &mut self.combs {
            comb.damp = damp;
        }
    }

    /// Process one dry sample, returning the wet sample.
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25; // normalize the four parallel combs

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    /// Clear all delay lines.
    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.buffer.fill(0.0);
            comb.filter_state = 0.0;
            comb.write_pos = 0;
        }
        for allpass in &mut self.allpasses {
            allpass.buffer.fill(0.0);
            allpass.write_pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_produces_a_tail() {
        let mut reverb = SchroederReverb::new(48_000.0);

        let _ = reverb.process(1.0);

        // Longest comb delay is ~42ms = ~2000 samples at 48kHz
        let mut has_tail = false;
        for _ in 0..5_000 {
            if reverb.process(0.0).abs() > 0.001 {
                has_tail = true;
                break;
            }
        }
        assert!(has_tail, "reverb should produce a tail after an impulse");
    }

    #[test]
    fn stays_stable_at_max_room_size() {
        let mut reverb = SchroederReverb::new(48_000.0);
        reverb.set_room_size(1.0);

        for _ in 0..20_000 {
            let out = reverb.process(0.1);
            assert!(out.is_finite());
            assert!(out.abs() < 10.0, "reverb output unstable: {}", out);
        }
    }

    #[test]
    fn tail_decays_after_input_stops() {
        let mut reverb = SchroederReverb::new(48_000.0);
        reverb.set_room_size(0.3);

        for _ in 0..2_000 {
            reverb.process(0.5);
        }

        let early: f32 = (0..4_800).map(|_| reverb.process(0.0).abs()).sum();
        // Skip two seconds ahead
        for _ in 0..96_000 {
            reverb.process(0.0);
        }
        let late: f32 = (0..4_800).map(|_| reverb.process(0.0).abs()).sum();

        assert!(late < early * 0.1, "tail should decay: early {early}, late {late}");
    }

    #[test]
    fn reset_silences_the_tail() {
        let mut reverb = SchroederReverb::new(48_000.0);
        for _ in 0..5_000 {
            reverb.process(1.0);
        }
        reverb.reset();
        for _ in 0..5_000 {
            assert_eq!(reverb.process(0.0), 0.0);
        }
    }
}
