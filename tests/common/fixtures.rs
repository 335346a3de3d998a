use std::sync::{Arc, Mutex};
use std::time::Duration;

use fastighetsportal::{LoginFlow, ManualClock, PortalDb, SessionIdentity};
use time::{Date, Month};

/// Creates a PortalDb in a temporary directory.
/// Returns both the database and the temp directory (which must be kept alive).
pub async fn create_test_db() -> (PortalDb, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("portal.db");
    let db = PortalDb::open(&path)
        .await
        .expect("Failed to create test database");
    (db, dir)
}

/// Identities handed to a completion handler, in call order.
pub type Delivered = Arc<Mutex<Vec<SessionIdentity>>>;

/// A login flow on a manual clock whose completion handler records every
/// identity it receives.
pub fn make_recording_flow() -> (LoginFlow<ManualClock>, ManualClock, Delivered) {
    let clock = ManualClock::new();
    let delivered: Delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    let flow = LoginFlow::new(clock.clone()).with_completion_handler(move |identity| {
        sink.lock().unwrap().push(identity.clone());
        Ok(())
    });
    (flow, clock, delivered)
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

pub fn millis(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Fixed "today" so date arithmetic in tests does not drift.
pub fn test_today() -> Date {
    Date::from_calendar_date(2025, Month::June, 15).expect("valid test date")
}

pub fn demo_identity(order_ref: &str) -> SessionIdentity {
    SessionIdentity {
        personal_number: "198001011234".to_string(),
        name: "Demo User".to_string(),
        order_ref: order_ref.to_string(),
    }
}
