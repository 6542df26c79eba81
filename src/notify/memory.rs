//! In-process notifier that records published events

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::RemoteError;
use crate::notify::channel::{ChangeEvent, ChangeNotifier};

#[derive(Default)]
pub struct MemoryNotifier {
    events: Mutex<Vec<ChangeEvent>>,
    failing: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn events_guard(&self) -> MutexGuard<'_, Vec<ChangeEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events_guard().clone()
    }

    /// Makes every later publish fail
    pub fn fail(&self) {
        self.failing.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl ChangeNotifier for MemoryNotifier {
    async fn publish(&self, event: &ChangeEvent) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(RemoteError::Injected("publish".into()));
        }
        self.events_guard().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fail_rejects_later_publishes() {
        let notifier = MemoryNotifier::new();
        let event = ChangeEvent::new("100 - OldCo", "100 - NewCo", true);
        notifier.publish(&event).await.unwrap();

        notifier.fail();
        assert!(notifier.publish(&event).await.is_err());
        assert_eq!(notifier.events().len(), 1);
    }
}
