use crate::MIN_TIME;

/*
Pluck Envelope
==============

Amplitude contour for a struck or plucked tone. Unlike a gated ADSR there is
no sustain and no note-off: the whole shape is determined up front by the
event's duration and velocity.

  Level
    v   ┐  ╱╲
        │ ╱   ╲
  0.3v  │╱      ╲──
        │           ╲────
    0   └────────────────╲──→ Time
        A      mid       end

Three segments:

  attack   linear ramp 0 → velocity over a fixed 20ms window
  body     exponential decay, velocity → 0.3·velocity at the midpoint
  tail     exponential decay, 0.3·velocity → a near-zero floor at the end

Exponential decay is computed in closed form as

  level = start * ratio^progress

which makes the amplitude a pure function of elapsed time. That keeps the
per-sample path branch-cheap and lets tests probe exact points on the curve
without rendering up to them.
*/

/// Fixed attack window in seconds.
pub const ATTACK_TIME: f32 = 0.02;
/// Fraction of peak remaining at the event midpoint.
pub const MID_RATIO: f32 = 0.3;
/// Absolute level at the event end. Inaudible but nonzero, so the tail
/// decay stays a well-defined exponential.
pub const END_FLOOR: f32 = 1e-3;

/// Attack/decay envelope for one scheduled tone.
#[derive(Debug, Clone)]
pub struct PluckEnvelope {
    velocity: f32,
    duration: f32,
    attack: f32,
    midpoint: f32,
    elapsed_samples: u64,
}

impl PluckEnvelope {
    /// Shape an envelope for a tone of `duration` seconds peaking at
    /// `velocity`. Velocity is clamped to [0, 1]; very short durations
    /// shrink the attack so the peak always lands before the midpoint.
    pub fn new(velocity: f32, duration: f32) -> Self {
        let velocity = velocity.clamp(0.0, 1.0);
        let duration = duration.max(MIN_TIME * 4.0);
        let attack = ATTACK_TIME.min(duration * 0.25).max(MIN_TIME);
        let midpoint = (duration * 0.5).max(attack + MIN_TIME);

        Self {
            velocity,
            duration,
            attack,
            midpoint,
            elapsed_samples: 0,
        }
    }

    /// Amplitude at `t` seconds after tone start. Zero before the start and
    /// after the end.
    pub fn amplitude_at(&self, t: f32) -> f32 {
        if t < 0.0 || t >= self.duration || self.velocity == 0.0 {
            return 0.0;
        }

        if t < self.attack {
            return self.velocity * (t / self.attack);
        }

        let mid_level = self.velocity * MID_RATIO;
        if t < self.midpoint {
            let progress = (t - self.attack) / (self.midpoint - self.attack);
            return self.velocity * MID_RATIO.powf(progress);
        }

        let floor = END_FLOOR.min(mid_level);
        let progress = (t - self.midpoint) / (self.duration - self.midpoint);
        mid_level * (floor / mid_level).powf(progress)
    }

    /// Advance one sample and return the amplitude.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let t = self.elapsed_samples as f32 / sample_rate;
        self.elapsed_samples += 1;
        self.amplitude_at(t)
    }

    /// Multiply a rendered block by the envelope in place.
    pub fn apply(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample(sample_rate);
        }
    }

    /// True until the envelope has run past the event end.
    pub fn is_active(&self, sample_rate: f32) -> bool {
        (self.elapsed_samples as f32 / sample_rate) < self.duration
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_end_hits_velocity() {
        for v in [0.05, 0.25, 0.5, 1.0] {
            let env = PluckEnvelope::new(v, 1.0);
            let peak = env.amplitude_at(ATTACK_TIME);
            assert!(
                (peak - v).abs() < 1e-6,
                "velocity {v}: expected peak {v}, got {peak}"
            );
        }
    }

    #[test]
    fn midpoint_is_three_tenths_of_velocity() {
        let v = 0.8;
        let env = PluckEnvelope::new(v, 2.0);
        let mid = env.amplitude_at(1.0);
        assert!((mid - v * MID_RATIO).abs() < 1e-5);
    }

    #[test]
    fn end_is_near_zero_for_all_velocities() {
        for v in [0.01, 0.1, 0.5, 1.0] {
            let duration = 1.5;
            let env = PluckEnvelope::new(v, duration);
            let near_end = env.amplitude_at(duration - 1e-4);
            assert!(
                near_end < 0.01,
                "velocity {v}: end level {near_end} not near zero"
            );
            assert_eq!(env.amplitude_at(duration), 0.0);
        }
    }

    #[test]
    fn decay_is_monotonic_after_attack() {
        let env = PluckEnvelope::new(1.0, 1.0);
        let mut last = env.amplitude_at(ATTACK_TIME);
        let mut t = ATTACK_TIME;
        while t < 1.0 {
            t += 0.01;
            let level = env.amplitude_at(t);
            assert!(level <= last + 1e-6, "level rose at t={t}");
            last = level;
        }
    }

    #[test]
    fn silent_outside_event_window() {
        let env = PluckEnvelope::new(0.7, 0.5);
        assert_eq!(env.amplitude_at(-0.1), 0.0);
        assert_eq!(env.amplitude_at(0.5), 0.0);
        assert_eq!(env.amplitude_at(10.0), 0.0);
    }

    #[test]
    fn short_duration_shrinks_attack() {
        // 40ms event: a full 20ms attack would overlap the midpoint
        let env = PluckEnvelope::new(1.0, 0.04);
        let peak_t = 0.04 * 0.25;
        assert!((env.amplitude_at(peak_t) - 1.0).abs() < 1e-5);
        assert!(env.amplitude_at(0.039) < 0.05);
    }

    #[test]
    fn per_sample_render_tracks_analytic_curve() {
        let sample_rate = 1_000.0;
        let mut env = PluckEnvelope::new(0.9, 0.5);
        let reference = env.clone();

        for n in 0..500 {
            let t = n as f32 / sample_rate;
            let rendered = env.next_sample(sample_rate);
            assert!((rendered - reference.amplitude_at(t)).abs() < 1e-6);
        }
        assert!(!env.is_active(sample_rate));
    }
}
