//! Change notifications for one scroll region at a time.

use sheetdom::{ScrollHandle, ScrollMetrics};
use tokio::sync::watch;

#[derive(Debug)]
struct Observed {
    region: ScrollHandle,
    updates: watch::Receiver<ScrollMetrics>,
}

/// Watches a single scroll region's offset, insets, frame and content size.
///
/// The owner calls [`dispatch`](Self::dispatch) at each of its dispatch
/// points; the callback runs once if anything changed since the previous
/// dispatch. Replacing the observed region drops the previous subscription
/// right away, so changes to the old region are never reported afterwards.
#[derive(Debug)]
pub struct ScrollCoordinationObserver {
    label: &'static str,
    observed: Option<Observed>,
}

impl ScrollCoordinationObserver {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            observed: None,
        }
    }

    /// Observe `region`, or stop observing with `None`. The next dispatch
    /// always fires for a newly set region.
    pub fn observe(&mut self, region: Option<ScrollHandle>) {
        let previous = self.observed.take();
        match (&previous, &region) {
            (Some(old), Some(new)) if old.region.ptr_eq(new) => {
                log::trace!("{}: re-observing {}", self.label, new.id());
            }
            (Some(old), _) => log::debug!("{}: detached from {}", self.label, old.region.id()),
            _ => {}
        }
        drop(previous);

        self.observed = region.map(|region| {
            let mut updates = region.subscribe();
            updates.mark_changed();
            log::debug!("{}: observing {}", self.label, region.id());
            Observed { region, updates }
        });
    }

    /// Stop observing. A no-op when nothing is observed.
    pub fn clear(&mut self) {
        self.observe(None);
    }

    pub fn region(&self) -> Option<&ScrollHandle> {
        self.observed.as_ref().map(|observed| &observed.region)
    }

    pub fn is_observing(&self, region: &ScrollHandle) -> bool {
        self.region().is_some_and(|current| current.ptr_eq(region))
    }

    /// Latest metrics if they changed since the last poll.
    pub fn poll(&mut self) -> Option<(ScrollHandle, ScrollMetrics)> {
        let observed = self.observed.as_mut()?;
        if !observed.updates.has_changed().unwrap_or(false) {
            return None;
        }
        let metrics = *observed.updates.borrow_and_update();
        Some((observed.region.clone(), metrics))
    }

    /// Run `on_update` with the latest metrics if they changed since the
    /// last dispatch. Returns whether it ran.
    pub fn dispatch(&mut self, on_update: impl FnOnce(&ScrollHandle, ScrollMetrics)) -> bool {
        match self.poll() {
            Some((region, metrics)) => {
                on_update(&region, metrics);
                true
            }
            None => false,
        }
    }
}
