//! Attribute-server abstraction
//!
//! Defines the interface consumed from the vendor BLE stack's attribute
//! server, plus the strongly typed handles shared across the crate.

pub mod bound;
pub mod traits;

pub use bound::BoundRegistry;
pub use traits::{
    AccessLevel, AttributeHandle, AttributeServer, CharProps, CharacteristicHandles,
    CharacteristicSpec, ConnectionToken, GattError, GattUuid, SecurityMode, ServiceHandle,
    UuidSpace,
};
