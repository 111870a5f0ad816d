use crate::dsp::envelope::PluckEnvelope;
use crate::dsp::oscillator::SineOsc;
use crate::synth::command::ToneRequest;

/// Amplitude of the octave partial relative to the request velocity.
const OCTAVE_LEVEL: f32 = 0.15;
/// The octave partial decays over this fraction of the tone's span.
const OCTAVE_SPAN: f32 = 0.5;

/// One sounding tone: a sine fundamental plus a quieter octave partial.
///
/// The partial at 2x the frequency fades in half the time, which reads as
/// brightness on the attack and warmth in the tail rather than as a second
/// note. Both layers share the request's envelope contract; the mix is
/// handled entirely by each layer's own envelope velocity.
pub struct Tone {
    start_frame: u64,
    fundamental: SineOsc,
    env: PluckEnvelope,
    octave: SineOsc,
    octave_env: PluckEnvelope,
}

impl Tone {
    /// Build a tone from a request, pinning its start to a frame on the
    /// engine clock. Requests whose start has already passed begin at
    /// `current_frame`.
    pub fn new(request: &ToneRequest, sample_rate: f32, current_frame: u64) -> Self {
        let requested = (request.start.max(0.0) * sample_rate as f64) as u64;
        let start_frame = requested.max(current_frame);
        let duration = request.duration as f32;

        Self {
            start_frame,
            fundamental: SineOsc::new(request.frequency, sample_rate),
            env: PluckEnvelope::new(request.velocity, duration),
            octave: SineOsc::new(request.frequency * 2.0, sample_rate),
            octave_env: PluckEnvelope::new(request.velocity * OCTAVE_LEVEL, duration * OCTAVE_SPAN),
        }
    }

    /// Add this tone's samples into `out`, where `out[0]` is absolute frame
    /// `block_start` on the engine clock.
    pub fn mix_into(&mut self, out: &mut [f32], block_start: u64, sample_rate: f32) {
        for (i, sample) in out.iter_mut().enumerate() {
            if block_start + (i as u64) < self.start_frame {
                continue;
            }
            *sample += self.fundamental.next_sample() * self.env.next_sample(sample_rate)
                + self.octave.next_sample() * self.octave_env.next_sample(sample_rate);
        }
    }

    /// False once the envelope has rendered past the tone's end.
    pub fn is_active(&self, sample_rate: f32) -> bool {
        self.env.is_active(sample_rate)
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }
}
