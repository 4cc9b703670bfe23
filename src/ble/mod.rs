//! Bluetooth Low Energy module
//!
//! Provides the GATT definition of the heartbeat service for the
//! trouble-host stack.

pub mod service;

pub use service::HeartbeatGattService;
