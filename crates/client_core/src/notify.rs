//! Transient status messages with a single-slot dismissal timer.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::domain::Severity;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::view::StatusRegion;

pub const DISMISS_AFTER: Duration = Duration::from_secs(3);
pub const FADE_DURATION: Duration = Duration::from_millis(500);

#[derive(Default)]
struct TimerSlot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

/// Owns the status region and its dismissal timer.
///
/// Every message bumps a generation and replaces the pending timer; a timer
/// only fades or hides the region while its generation is still current.
pub struct Notifier {
    region: Arc<dyn StatusRegion>,
    slot: Arc<Mutex<TimerSlot>>,
    dismiss_after: Duration,
    fade_duration: Duration,
}

fn lock(slot: &Mutex<TimerSlot>) -> MutexGuard<'_, TimerSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Notifier {
    pub fn new(region: Arc<dyn StatusRegion>) -> Self {
        Self::with_timings(region, DISMISS_AFTER, FADE_DURATION)
    }

    pub fn with_timings(
        region: Arc<dyn StatusRegion>,
        dismiss_after: Duration,
        fade_duration: Duration,
    ) -> Self {
        Self {
            region,
            slot: Arc::new(Mutex::new(TimerSlot::default())),
            dismiss_after,
            fade_duration,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn show_message(&self, text: &str, severity: Severity) {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        if let Some(previous) = slot.pending.take() {
            previous.abort();
        }
        self.region.show(text, severity);

        let generation = slot.generation;
        let region = Arc::clone(&self.region);
        let timer_slot = Arc::clone(&self.slot);
        let (dismiss_after, fade_duration) = (self.dismiss_after, self.fade_duration);
        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            {
                let slot = lock(&timer_slot);
                if slot.generation != generation {
                    return;
                }
                region.fade();
            }
            tokio::time::sleep(fade_duration).await;
            let mut slot = lock(&timer_slot);
            if slot.generation == generation {
                region.hide();
                slot.pending = None;
                debug!(generation, "status message dismissed");
            }
        }));
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.slot).pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
