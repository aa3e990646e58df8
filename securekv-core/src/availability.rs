//! Protected-data availability notifications.
//!
//! Records stored with a lock-bound accessibility level become unreadable
//! while the device is locked. The platform integration layer owns a
//! [`ProtectedDataMonitor`], feeds it the OS notifications, and hands out
//! [`Subscription`]s to whoever needs to react. Dropping a subscription
//! unsubscribes it. The storage core itself never consults the monitor.

use tokio::sync::watch;

/// Tracks whether protected data is currently available.
#[derive(Debug)]
pub struct ProtectedDataMonitor {
    sender: watch::Sender<bool>,
}

impl ProtectedDataMonitor {
    /// Creates a monitor reporting protected data as available.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial(true)
    }

    /// Creates a monitor with an explicit initial state.
    #[must_use]
    pub fn with_initial(available: bool) -> Self {
        let (sender, _) = watch::channel(available);
        Self { sender }
    }

    /// Current availability.
    #[must_use]
    pub fn is_available(&self) -> bool {
        *self.sender.borrow()
    }

    /// Records a platform transition. Subscribers are only woken on an actual change.
    pub fn set_available(&self, available: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == available {
                return false;
            }
            *current = available;
            true
        });
        if changed {
            log::debug!("protected data available={available}");
        }
    }

    /// Subscribes to availability changes.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProtectedDataMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle receiving availability changes. Drop it to unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    receiver: watch::Receiver<bool>,
}

impl Subscription {
    /// Availability as last observed.
    #[must_use]
    pub fn current(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Waits for the next transition and returns the new availability.
    ///
    /// Returns `None` once the monitor has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}
