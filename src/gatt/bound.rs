//! Attribute-server binding for statically declared tables
//!
//! Some stacks declare and register the whole attribute table up front
//! (trouble-host's gatt_server macro) instead of exposing registration
//! calls. [`BoundRegistry`] bridges that gap: registration binds to the
//! handles the stack already assigned, and an accepted value write is
//! queued for the transport loop to deliver asynchronously.

use heapless::Vec;

use crate::config::attr;
use crate::gatt::traits::{
    AttributeHandle, AttributeServer, CharacteristicHandles, CharacteristicSpec, ConnectionToken,
    GattError, GattUuid, ServiceHandle, UuidSpace,
};

/// Largest payload a queued value write can carry
pub const QUEUED_LEN: usize = attr::VALUE_LEN;

/// Attribute server backed by a stack-declared table
///
/// `N` characteristics, each identified by its 16-bit short UUID and bound
/// to the value handle the stack assigned at table construction.
pub struct BoundRegistry<const N: usize> {
    /// 16-bit short UUID mapped to the stack-assigned value handle
    entries: [(u16, AttributeHandle); N],
    /// Payload accepted by the last value write, awaiting delivery
    queued: Option<(AttributeHandle, Vec<u8, QUEUED_LEN>)>,
}

impl<const N: usize> BoundRegistry<N> {
    /// Bind to the given `(short UUID, value handle)` pairs
    pub fn new(entries: [(u16, AttributeHandle); N]) -> Self {
        Self {
            entries,
            queued: None,
        }
    }

    /// Take the accepted write, if any, for delivery by the transport loop
    pub fn take_queued(&mut self) -> Option<(AttributeHandle, Vec<u8, QUEUED_LEN>)> {
        self.queued.take()
    }

    fn lookup(&self, short: u16) -> Option<AttributeHandle> {
        self.entries
            .iter()
            .find(|(s, _)| *s == short)
            .map(|(_, handle)| *handle)
    }
}

impl<const N: usize> AttributeServer for BoundRegistry<N> {
    fn register_uuid_base(&mut self, _base: &[u8; 16]) -> Result<UuidSpace, GattError> {
        // The table declares full 128-bit UUIDs; there is no vendor space
        // to allocate.
        Ok(UuidSpace::new(0))
    }

    fn register_service(&mut self, _uuid: GattUuid) -> Result<ServiceHandle, GattError> {
        // The service declaration handle stays inside the stack.
        Ok(ServiceHandle::new(0))
    }

    fn register_characteristic(
        &mut self,
        _service: ServiceHandle,
        spec: &CharacteristicSpec<'_>,
    ) -> Result<CharacteristicHandles, GattError> {
        let value = self
            .lookup(spec.uuid.short)
            .ok_or(GattError::InvalidHandle)?;
        // The notification configuration descriptor stays with the stack.
        Ok(CharacteristicHandles { value, cccd: None })
    }

    fn write_value(
        &mut self,
        conn: Option<ConnectionToken>,
        handle: AttributeHandle,
        value: &[u8],
    ) -> Result<(), GattError> {
        if conn.is_none() {
            return Err(GattError::InvalidConnection);
        }
        if !self.entries.iter().any(|(_, h)| *h == handle) {
            return Err(GattError::InvalidHandle);
        }
        let mut data = Vec::new();
        data.extend_from_slice(value)
            .map_err(|_| GattError::InvalidArgument)?;
        self.queued = Some((handle, data));
        Ok(())
    }
}
