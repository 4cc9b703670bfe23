//! Heartbeat service core
//!
//! Registration of the service's attribute group and the event-driven
//! state machine tracking the single active link.

pub mod events;
pub mod service;

pub use events::{LinkState, ServiceEvent};
pub use service::{ConfigListener, HeartbeatInit, HeartbeatService};
