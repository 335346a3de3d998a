mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from fastighetsportal for tests
pub use fastighetsportal::core::property::{PROPERTY_KEY, parse_date};
pub use fastighetsportal::core::session::SESSION_KEY;
pub use fastighetsportal::{
    Dashboard, DashboardSummary, KeyValueStore, LoginError, LoginEvent, LoginFlow, LoginSchedule,
    LoginStep, ManualClock, MemoryDb, PortalDb, PropertyField, PropertyRecord, PropertyRepository,
    SessionIdentity, SessionStore, ValuationPeriod, ValuationService, WriteOrder,
};
