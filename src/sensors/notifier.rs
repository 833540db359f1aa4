//! Cluster change notifier for live host subscription updates.
//!
//! When a virtual sensor changes, the host should learn about it right away
//! instead of waiting for its next poll of the attribute cache.

use crate::clusters::ClusterKind;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal type shared between sensors and the host's subscription processor.
pub type ChangeSignal = Signal<CriticalSectionRawMutex, ()>;

/// Notifies host subscriptions when sensor values change.
///
/// Several notifiers may share one signal; the host wakes once and reads
/// whatever changed.
///
/// # Usage
/// ```ignore
/// static CHANGED: ChangeSignal = Signal::new();
///
/// sensor.set_notifier(ClusterNotifier::new(&CHANGED, 1, ClusterKind::TemperatureMeasurement));
/// CHANGED.wait().await;
/// ```
pub struct ClusterNotifier {
    signal: &'static ChangeSignal,
    endpoint_id: u8,
    cluster: ClusterKind,
}

impl ClusterNotifier {
    /// Create a new notifier for a specific cluster.
    ///
    /// # Arguments
    /// * `signal` - Static signal that wakes the subscription processor
    /// * `endpoint_id` - Endpoint the cluster lives on
    /// * `cluster` - Cluster whose value changes are reported
    pub fn new(signal: &'static ChangeSignal, endpoint_id: u8, cluster: ClusterKind) -> Self {
        Self {
            signal,
            endpoint_id,
            cluster,
        }
    }

    pub fn endpoint_id(&self) -> u8 {
        self.endpoint_id
    }

    pub fn cluster(&self) -> ClusterKind {
        self.cluster
    }

    /// Notify that this cluster's data changed. Non-blocking.
    pub fn notify(&self) {
        self.signal.signal(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SIGNAL: ChangeSignal = Signal::new();

    #[test]
    fn test_notify_raises_signal() {
        let notifier = ClusterNotifier::new(&SIGNAL, 3, ClusterKind::PressureMeasurement);
        assert_eq!(notifier.endpoint_id(), 3);
        assert_eq!(notifier.cluster(), ClusterKind::PressureMeasurement);

        SIGNAL.reset();
        notifier.notify();
        assert!(SIGNAL.signaled());
        assert_eq!(SIGNAL.try_take(), Some(()));
        assert!(!SIGNAL.signaled());
    }
}
