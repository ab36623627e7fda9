//! Capture flow orchestration.
//!
//! The add-location flow from a user intent: check the name against the
//! ledger before touching the sensor, raise the busy signal, request one
//! fix, then either append a record or drop the attempt on a sensor fault.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ledger::Ledger;
use crate::provider::LocationProvider;
use crate::record::LocationRecord;

/// A shared busy flag for the interval a sensor fetch is outstanding.
///
/// The display layer holds a clone and disables re-entry while the flag is
/// raised. Cloneable; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct BusySignal {
    flag: Arc<AtomicBool>,
}

impl BusySignal {
    /// Create a new, lowered busy signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a fetch is currently outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn set(&self, busy: bool) {
        self.flag.store(busy, Ordering::SeqCst);
    }
}

/// Orchestrates the prompt-fetch-add sequence for one ledger.
///
/// Holds the ledger mutably for its lifetime, so mutations are serialized by
/// construction: one intent at a time, one fetch in flight.
#[derive(Debug)]
pub struct CaptureFlow<'a, P: LocationProvider + ?Sized> {
    ledger: &'a mut Ledger,
    provider: &'a P,
    busy: BusySignal,
}

impl<'a, P: LocationProvider + ?Sized> CaptureFlow<'a, P> {
    /// Create a flow over a ledger and sensor provider.
    ///
    /// The busy signal is supplied by the display layer, which watches it to
    /// disable re-entry during the fetch.
    pub fn new(ledger: &'a mut Ledger, provider: &'a P, busy: BusySignal) -> Self {
        Self {
            ledger,
            provider,
            busy,
        }
    }

    /// Run the add-location flow for a user-supplied name.
    ///
    /// Returns the new record, or `None` when nothing was added: an empty
    /// name (the user cancelled the prompt) or a sensor fault. Faults never
    /// reach the ledger; the busy signal is lowered on every path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`](crate::Error::DuplicateName) if the
    /// name collides with an existing record (checked before any sensor
    /// access), or a storage error if persisting the new record fails.
    pub async fn capture(&mut self, name: &str) -> Result<Option<LocationRecord>> {
        if name.is_empty() {
            debug!("Capture cancelled: no name given");
            return Ok(None);
        }
        // Reject collisions before any sensor work
        if self.ledger.contains(name) {
            return Err(crate::Error::duplicate_name(name));
        }

        self.busy.set(true);
        let fix = self.provider.current_fix().await;
        self.busy.set(false);

        match fix {
            Ok(fix) => {
                info!(
                    "Latitude: {}, Longitude: {}, Altitude: {:?}",
                    fix.latitude, fix.longitude, fix.altitude
                );
                let record = LocationRecord::from_fix(name, &fix);
                self.ledger
                    .add(&record.name, &record.latitude, &record.longitude)?;
                Ok(Some(record))
            }
            Err(fault) => {
                warn!(provider = self.provider.name(), "Sensor fault: {fault}");
                Ok(None)
            }
        }
    }

    /// The ledger this flow mutates.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FixedProvider, SensorFault};
    use crate::record::Fix;
    use crate::storage::PrefStore;

    /// Provider that always faults.
    struct FaultyProvider(SensorFault);

    #[async_trait::async_trait]
    impl LocationProvider for FaultyProvider {
        fn name(&self) -> &'static str {
            "faulty"
        }

        async fn current_fix(&self) -> std::result::Result<Fix, SensorFault> {
            Err(self.0.clone())
        }
    }

    /// Provider that records the busy flag as seen mid-fetch.
    struct BusyObservingProvider {
        busy: BusySignal,
        seen_busy: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl LocationProvider for BusyObservingProvider {
        fn name(&self) -> &'static str {
            "observing"
        }

        async fn current_fix(&self) -> std::result::Result<Fix, SensorFault> {
            self.seen_busy.store(self.busy.is_busy(), Ordering::SeqCst);
            Ok(Fix::new(1.0, 2.0))
        }
    }

    fn create_test_ledger() -> Ledger {
        let store = PrefStore::open_in_memory().expect("failed to create test store");
        Ledger::open(store).expect("failed to open ledger")
    }

    #[tokio::test]
    async fn test_capture_adds_record() {
        let mut ledger = create_test_ledger();
        let provider = FixedProvider::new(Fix::new(37.5, 127.0));
        let mut flow = CaptureFlow::new(&mut ledger, &provider, BusySignal::new());

        let record = flow.capture("Home").await.unwrap().unwrap();
        assert_eq!(record.name, "Home");
        assert_eq!(record.latitude, "37.5");
        assert_eq!(record.longitude, "127");

        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_capture_empty_name_cancels() {
        let mut ledger = create_test_ledger();
        let provider = FixedProvider::new(Fix::new(1.0, 2.0));
        let mut flow = CaptureFlow::new(&mut ledger, &provider, BusySignal::new());

        let outcome = flow.capture("").await.unwrap();
        assert!(outcome.is_none());
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_capture_duplicate_rejected_before_sensor() {
        let mut ledger = create_test_ledger();
        ledger.add("Home", "37.5", "127").unwrap();

        // A faulting provider would surface if the sensor were consulted;
        // the duplicate check must come first.
        let provider = FaultyProvider(SensorFault::NotSupported);
        let mut flow = CaptureFlow::new(&mut ledger, &provider, BusySignal::new());

        let err = flow.capture("Home").await.unwrap_err();
        assert!(err.is_duplicate_name());
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_sensor_fault_drops_attempt() {
        let mut ledger = create_test_ledger();
        let busy = BusySignal::new();
        let provider =
            FaultyProvider(SensorFault::permission_denied("location access blocked"));
        let mut flow = CaptureFlow::new(&mut ledger, &provider, busy.clone());

        let outcome = flow.capture("Home").await.unwrap();
        assert!(outcome.is_none());
        assert!(ledger.is_empty());
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn test_busy_raised_during_fetch_and_lowered_after() {
        let mut ledger = create_test_ledger();
        let busy = BusySignal::new();
        let seen_busy = Arc::new(AtomicBool::new(false));
        let provider = BusyObservingProvider {
            busy: busy.clone(),
            seen_busy: seen_busy.clone(),
        };
        let mut flow = CaptureFlow::new(&mut ledger, &provider, busy.clone());

        assert!(!busy.is_busy());
        flow.capture("Somewhere").await.unwrap();

        assert!(seen_busy.load(Ordering::SeqCst), "busy not raised mid-fetch");
        assert!(!busy.is_busy(), "busy not lowered after fetch");
    }

    #[tokio::test]
    async fn test_every_fault_kind_leaves_ledger_unchanged() {
        let faults = [
            SensorFault::NotSupported,
            SensorFault::not_enabled("sensor off"),
            SensorFault::permission_denied("denied"),
            SensorFault::unknown("lost signal"),
        ];

        for fault in faults {
            let mut ledger = create_test_ledger();
            let provider = FaultyProvider(fault);
            let mut flow = CaptureFlow::new(&mut ledger, &provider, BusySignal::new());

            assert!(flow.capture("Spot").await.unwrap().is_none());
            assert!(ledger.is_empty());
        }
    }

    #[test]
    fn test_busy_signal_clones_share_state() {
        let signal = BusySignal::new();
        let clone = signal.clone();

        signal.set(true);
        assert!(clone.is_busy());

        signal.set(false);
        assert!(!clone.is_busy());
    }
}
