//! Compliance calendar workflow: deadline calculation, calendar
//! materialization, reminder scheduling, and delivery dispatch.

pub mod channel;
pub mod clock;
pub mod deadline;
pub mod domain;
pub mod policy;
pub mod report;
pub mod store;

mod catalog;
mod dispatch;
mod message;
mod router;
mod scheduler;

#[cfg(test)]
mod tests;

pub use catalog::{
    ComplianceCatalog, ComplianceTemplate, EffectiveTemplate, RuleOverride, RuleOverrides,
    StateScope,
};
pub use dispatch::{DispatchError, DispatchReport, NotificationDispatcher};
pub use message::OutboundMessage;
pub use router::{compliance_router, EngineState};
pub use scheduler::{ComplianceScheduler, CompletionOutcome, ScheduleError};
