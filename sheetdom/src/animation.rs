//! Keyed scalar animations that can be interrupted mid-flight.
//!
//! Every key holds a resting value. Starting a transition on a key always
//! begins from the value currently on screen (the interpolated value if a
//! transition is already running), so interrupting never snaps. Each
//! transition carries a single-fire [`Completion`] that resolves to `true`
//! when it runs to the end and to `false` when it is replaced or cancelled.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::sync::oneshot;

use crate::transitions::TransitionConfig;

/// Receiving half of a single-fire completion signal.
///
/// Resolves to `true` if the work finished, `false` if it was interrupted
/// or its sender was dropped without firing.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<bool>,
    outcome: Option<bool>,
}

/// Sending half of a [`Completion`]. Consumed on use.
#[derive(Debug)]
pub struct CompletionSender {
    tx: oneshot::Sender<bool>,
}

impl CompletionSender {
    pub fn fire(self, finished: bool) {
        let _ = self.tx.send(finished);
    }
}

impl Completion {
    pub fn pair() -> (CompletionSender, Completion) {
        let (tx, rx) = oneshot::channel();
        (
            CompletionSender { tx },
            Completion { rx, outcome: None },
        )
    }

    /// A completion that has already fired.
    pub fn ready(finished: bool) -> Self {
        let (tx, completion) = Self::pair();
        tx.fire(finished);
        completion
    }

    /// Non-blocking check. Returns `None` while still pending.
    pub fn try_finished(&mut self) -> Option<bool> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(finished) => Some(finished),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(false),
            };
        }
        self.outcome
    }
}

impl Future for Completion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        let outcome = match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(result) => result.unwrap_or(false),
            Poll::Pending => return Poll::Pending,
        };
        self.outcome = Some(outcome);
        Poll::Ready(outcome)
    }
}

/// A single active transition.
#[derive(Debug)]
struct ActiveTransition {
    from: f32,
    to: f32,
    start: Instant,
    config: TransitionConfig,
    done: Option<CompletionSender>,
}

impl ActiveTransition {
    fn value_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start);
        let progress = self.config.progress(elapsed);
        self.from + (self.to - self.from) * progress
    }

    fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.config.duration
    }

    fn finish(mut self, finished: bool) {
        if let Some(done) = self.done.take() {
            done.fire(finished);
        }
    }
}

/// Manages animated scalar properties across frames.
#[derive(Debug)]
pub struct AnimationState<K> {
    /// Resting value per property.
    values: HashMap<K, f32>,
    /// Currently active transitions.
    active: HashMap<K, ActiveTransition>,
    /// Reduced motion flag - when true, transitions complete instantly.
    reduced_motion: bool,
}

impl<K> Default for AnimationState<K> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            active: HashMap::new(),
            reduced_motion: false,
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> AnimationState<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, new transitions jump straight to their target.
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        self.reduced_motion = enabled;
    }

    pub fn has_active_transitions(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn is_animating(&self, key: K) -> bool {
        self.active.contains_key(&key)
    }

    /// Value on screen at `now`: interpolated if animating, else the resting
    /// value, else 0.0.
    pub fn value(&self, key: K, now: Instant) -> f32 {
        match self.active.get(&key) {
            Some(transition) => transition.value_at(now),
            None => self.values.get(&key).copied().unwrap_or(0.0),
        }
    }

    /// Resting value, ignoring any active transition's progress.
    pub fn target(&self, key: K) -> f32 {
        match self.active.get(&key) {
            Some(transition) => transition.to,
            None => self.values.get(&key).copied().unwrap_or(0.0),
        }
    }

    /// Jump to `value`. Any running transition on `key` is interrupted.
    pub fn set(&mut self, key: K, value: f32) {
        if let Some(transition) = self.active.remove(&key) {
            log::trace!("{:?}: transition replaced by direct set", key);
            transition.finish(false);
        }
        self.values.insert(key, value);
    }

    /// Update the destination of a running transition without restarting it,
    /// or set the value directly if nothing is running.
    pub fn retarget(&mut self, key: K, value: f32) {
        match self.active.get_mut(&key) {
            Some(transition) => transition.to = value,
            None => {
                self.values.insert(key, value);
            }
        }
    }

    /// Start a transition from the value currently on screen toward `to`.
    pub fn animate(&mut self, key: K, to: f32, config: TransitionConfig, now: Instant) -> Completion {
        let from = self.value(key, now);
        if let Some(previous) = self.active.remove(&key) {
            previous.finish(false);
        }
        self.values.insert(key, to);

        if self.reduced_motion || config.duration.is_zero() {
            return Completion::ready(true);
        }

        let (done, completion) = Completion::pair();
        log::trace!("{:?}: {} -> {} over {:?}", key, from, to, config.duration);
        self.active.insert(
            key,
            ActiveTransition {
                from,
                to,
                start: now,
                config,
                done: Some(done),
            },
        );
        completion
    }

    /// Freeze `key` at its current on-screen value and return it.
    pub fn cancel(&mut self, key: K, now: Instant) -> f32 {
        let value = self.value(key, now);
        if let Some(transition) = self.active.remove(&key) {
            transition.finish(false);
        }
        self.values.insert(key, value);
        value
    }

    /// Retire transitions that have run their full duration.
    /// Returns the keys that finished during this tick.
    pub fn tick(&mut self, now: Instant) -> Vec<K> {
        let finished: Vec<K> = self
            .active
            .iter()
            .filter(|(_, transition)| transition.is_finished(now))
            .map(|(key, _)| *key)
            .collect();

        for key in &finished {
            if let Some(transition) = self.active.remove(key) {
                self.values.insert(*key, transition.to);
                transition.finish(true);
            }
        }
        finished
    }
}
