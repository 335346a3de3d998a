pub mod core;
pub mod login;
pub mod models;
pub mod valuation;

pub use models::{PropertyField, PropertyRecord, SessionIdentity};
pub use login::{
    Clock, LoginError, LoginEvent, LoginFlow, LoginSchedule, LoginStep, ManualClock, OrderRef,
    TokioClock,
};
pub use core::db::{KeyValueStore, MemoryDb, PortalDb, WriteOrder};
pub use core::property::{Dashboard, DashboardSummary, PropertyRepository};
pub use core::session::SessionStore;
pub use valuation::{ValuationPeriod, ValuationReport, ValuationService};

#[cfg(feature = "gui")]
pub mod gui;
