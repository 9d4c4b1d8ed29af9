//! One-shot appear and disappear animations.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sheetdom::{AnimationState, Completion, Easing, TransitionConfig};

use crate::controller::PanelProperty;

/// Nominal duration of the slide-in.
pub const PRESENT_DURATION: Duration = Duration::from_millis(520);
/// Duration of cross-fades, and the upper bound for dismissals.
pub const DISMISS_DURATION: Duration = Duration::from_millis(210);
/// Damping ratio shared by every spring the panel uses.
pub const SPRING_DAMPING: f32 = 0.86;
/// Dismiss velocities above this (points per second) finish linearly.
const FAST_FLICK_VELOCITY: f32 = 5.0;

/// Accessibility preferences that affect motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPreferences {
    pub reduce_motion: bool,
    pub prefers_cross_fade: bool,
}

impl MotionPreferences {
    pub fn should_cross_fade(&self) -> bool {
        self.reduce_motion || self.prefers_cross_fade
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionDirection {
    Presenting,
    Dismissing,
}

/// What an animator gets to work with: the panel's animated properties and
/// where "fully below the screen" is.
pub struct TransitionContext<'a> {
    pub animations: &'a mut AnimationState<PanelProperty>,
    pub now: Instant,
    pub animated: bool,
    /// Translation that moves the panel entirely off screen.
    pub offscreen_translation: f32,
}

/// Plays the presentation or dismissal of a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionAnimator {
    direction: TransitionDirection,
    dismiss_velocity: f32,
    motion: MotionPreferences,
}

impl TransitionAnimator {
    pub fn presenting(motion: MotionPreferences) -> Self {
        Self {
            direction: TransitionDirection::Presenting,
            dismiss_velocity: 0.0,
            motion,
        }
    }

    pub fn dismissing(dismiss_velocity: f32, motion: MotionPreferences) -> Self {
        Self {
            direction: TransitionDirection::Dismissing,
            dismiss_velocity,
            motion,
        }
    }

    pub fn direction(&self) -> TransitionDirection {
        self.direction
    }

    pub fn dismiss_velocity(&self) -> f32 {
        self.dismiss_velocity
    }

    /// Nominal duration, before any velocity shortening.
    pub fn transition_duration(&self) -> Duration {
        match self.direction {
            TransitionDirection::Presenting if !self.motion.should_cross_fade() => PRESENT_DURATION,
            _ => DISMISS_DURATION,
        }
    }

    /// Animate the panel in or out. The returned completion fires exactly
    /// once; immediately when `ctx.animated` is false.
    pub fn animate_transition(&self, ctx: &mut TransitionContext<'_>) -> Completion {
        let cross_fade = self.motion.should_cross_fade();
        log::debug!(
            "{:?} transition (animated: {}, cross-fade: {})",
            self.direction,
            ctx.animated,
            cross_fade
        );

        if !ctx.animated {
            self.apply_final_values(ctx, cross_fade);
            return Completion::ready(true);
        }

        match self.direction {
            TransitionDirection::Presenting => self.animate_presentation(ctx, cross_fade),
            TransitionDirection::Dismissing => self.animate_dismissal(ctx, cross_fade),
        }
    }

    fn apply_final_values(&self, ctx: &mut TransitionContext<'_>, cross_fade: bool) {
        let animations = &mut *ctx.animations;
        match self.direction {
            TransitionDirection::Presenting => {
                animations.set(PanelProperty::Translation, 0.0);
                animations.set(PanelProperty::Opacity, 1.0);
                animations.set(PanelProperty::DimAlpha, 1.0);
            }
            TransitionDirection::Dismissing => {
                if cross_fade {
                    animations.set(PanelProperty::Opacity, 0.0);
                } else {
                    animations.set(PanelProperty::Translation, ctx.offscreen_translation);
                }
                animations.set(PanelProperty::DimAlpha, 0.0);
            }
        }
    }

    fn animate_presentation(&self, ctx: &mut TransitionContext<'_>, cross_fade: bool) -> Completion {
        let duration = self.transition_duration();
        let now = ctx.now;
        let animations = &mut *ctx.animations;

        animations.set(PanelProperty::DimAlpha, 0.0);
        animations.animate(
            PanelProperty::DimAlpha,
            1.0,
            TransitionConfig::eased(duration, Easing::EaseOut),
            now,
        );

        if cross_fade {
            animations.set(PanelProperty::Translation, 0.0);
            animations.set(PanelProperty::Opacity, 0.0);
            return animations.animate(
                PanelProperty::Opacity,
                1.0,
                TransitionConfig::eased(duration, Easing::EaseOut),
                now,
            );
        }

        animations.set(PanelProperty::Opacity, 1.0);
        animations.set(PanelProperty::Translation, ctx.offscreen_translation);
        animations.animate(
            PanelProperty::Translation,
            0.0,
            TransitionConfig::spring(duration, SPRING_DAMPING, 0.0),
            now,
        )
    }

    fn animate_dismissal(&self, ctx: &mut TransitionContext<'_>, cross_fade: bool) -> Completion {
        let now = ctx.now;
        let animations = &mut *ctx.animations;

        let current = animations.value(PanelProperty::Translation, now);
        let remaining = ctx.offscreen_translation - current;
        let duration = dismiss_duration(DISMISS_DURATION, remaining, self.dismiss_velocity);
        let easing = if self.dismiss_velocity > FAST_FLICK_VELOCITY {
            Easing::Linear
        } else {
            Easing::EaseIn
        };
        let config = TransitionConfig::eased(duration, easing);
        log::trace!("dismissing from {} over {:?} ({:?})", current, duration, easing);

        animations.animate(PanelProperty::DimAlpha, 0.0, config, now);
        if cross_fade {
            return animations.animate(PanelProperty::Opacity, 0.0, config, now);
        }
        animations.animate(
            PanelProperty::Translation,
            ctx.offscreen_translation,
            config,
            now,
        )
    }
}

/// Duration of a dismissal covering `remaining` points at `velocity` points
/// per second, never longer than `baseline`. Non-positive or non-finite
/// velocities use the baseline.
pub fn dismiss_duration(baseline: Duration, remaining: f32, velocity: f32) -> Duration {
    if !velocity.is_finite() || velocity <= 0.0 {
        return baseline;
    }
    let seconds = remaining.max(0.0) / velocity;
    if !seconds.is_finite() || seconds >= baseline.as_secs_f32() {
        return baseline;
    }
    Duration::from_secs_f32(seconds)
}
