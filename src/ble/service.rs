//! Heartbeat GATT service definition
//!
//! Vendor service exposing the heartbeat reading and its reporting interval.
//! - Service UUID: 02351400-99C5-4197-B856-69219C030201
//! - Value characteristic: 02351401-... (read, notify), u32 LE
//! - Interval characteristic: 02351402-... (read, write), u16 LE seconds

use trouble_host::prelude::*;

/// Heartbeat Service
///
/// The application pushes readings into `value`; the central subscribes for
/// notifications and tunes the reporting cadence through `interval_secs`.
#[gatt_service(uuid = "02351400-99c5-4197-b856-69219c030201")]
pub struct HeartbeatGattService {
    /// Heartbeat value - updated by the sampler, notified to the central
    #[characteristic(uuid = "02351401-99c5-4197-b856-69219c030201", read, notify, value = 0)]
    pub value: u32,

    /// Reporting interval in seconds - written by the central
    #[characteristic(uuid = "02351402-99c5-4197-b856-69219c030201", read, write, value = 300)]
    pub interval_secs: u16,
}

// The macro attribute needs a literal; keep it tied to the shared default
const _: () = assert!(crate::config::reporting::DEFAULT_INTERVAL_SECS == 300);
