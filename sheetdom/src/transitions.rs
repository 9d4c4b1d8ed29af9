use std::time::Duration;

/// Residual amplitude at which a spring is considered settled.
const SPRING_SETTLE_AMPLITUDE: f32 = 1.0e-3;

/// Easing function for time-based transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply easing to progress (0.0 to 1.0).
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Damped harmonic oscillator normalized to a fixed duration.
///
/// `initial_velocity` is expressed in "total distances per second": a value
/// of 1.0 means the animated value starts out moving as fast as it would if
/// it covered the whole distance in one second. Positive values point toward
/// the target, negative values away from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub damping_ratio: f32,
    pub initial_velocity: f32,
}

impl Spring {
    pub const fn new(damping_ratio: f32, initial_velocity: f32) -> Self {
        Self {
            damping_ratio,
            initial_velocity,
        }
    }

    /// Progress toward the target after `elapsed` seconds, for a spring tuned
    /// to settle within `duration` seconds. Starts at 0.0 and ends at exactly
    /// 1.0; may overshoot in between.
    pub fn progress(&self, elapsed: f32, duration: f32) -> f32 {
        if duration <= 0.0 || elapsed >= duration {
            return 1.0;
        }
        if elapsed <= 0.0 {
            return 0.0;
        }
        let zeta = self.damping_ratio.max(0.01);
        let v0 = self.initial_velocity;
        // Natural frequency chosen so the envelope decays to the settle
        // amplitude exactly at `duration`.
        let omega = -SPRING_SETTLE_AMPLITUDE.ln() / (zeta.min(1.0) * duration);
        let t = elapsed;

        // Displacement from the target, starting at 1.0.
        let displacement = if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega * t).exp();
            let b = (zeta * omega - v0) / omega_d;
            envelope * ((omega_d * t).cos() + b * (omega_d * t).sin())
        } else {
            (1.0 + (omega - v0) * t) * (-omega * t).exp()
        };
        1.0 - displacement
    }
}

/// Timing curve of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Eased(Easing),
    Spring(Spring),
}

impl Default for Curve {
    fn default() -> Self {
        Curve::Eased(Easing::Linear)
    }
}

impl Curve {
    pub fn progress(&self, elapsed: Duration, duration: Duration) -> f32 {
        match self {
            Curve::Eased(easing) => {
                let t = if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
                };
                easing.apply(t)
            }
            Curve::Spring(spring) => spring.progress(elapsed.as_secs_f32(), duration.as_secs_f32()),
        }
    }
}

/// Configuration for a single property transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    pub duration: Duration,
    pub curve: Curve,
}

impl TransitionConfig {
    pub fn new(duration: Duration, curve: Curve) -> Self {
        Self { duration, curve }
    }

    pub fn eased(duration: Duration, easing: Easing) -> Self {
        Self::new(duration, Curve::Eased(easing))
    }

    pub fn spring(duration: Duration, damping_ratio: f32, initial_velocity: f32) -> Self {
        Self::new(
            duration,
            Curve::Spring(Spring::new(damping_ratio, initial_velocity)),
        )
    }

    pub fn progress(&self, elapsed: Duration) -> f32 {
        self.curve.progress(elapsed, self.duration)
    }
}
