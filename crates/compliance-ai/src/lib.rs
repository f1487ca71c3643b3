//! Compliance calendar engine for formed business entities: deadline
//! computation, reminder scheduling, and delivery dispatch.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
