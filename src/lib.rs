#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod gatt;
pub mod heartbeat;

// These modules depend on embassy/trouble-host only available with embedded feature
#[cfg(feature = "embedded")]
pub mod ble;
#[cfg(feature = "embedded")]
pub mod tasks;
