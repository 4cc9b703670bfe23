//! Heartbeat GATT service: registration and event state machine
//!
//! One service, two characteristics:
//! - heartbeat value: u32 LE, read + notify, pushed by the application
//! - reporting interval: u16 LE seconds, read + write, written by the central
//!
//! The service tracks the single active link and forwards remote interval
//! writes to an owner-supplied listener. It does not interpret the interval
//! itself; scheduling of the heartbeat cadence belongs to the owning
//! application.

use log::{debug, warn};

use crate::config::{attr, uuid};
use crate::gatt::{
    AttributeHandle, AttributeServer, CharProps, CharacteristicHandles, CharacteristicSpec,
    GattError, GattUuid, SecurityMode, ServiceHandle, UuidSpace,
};
use crate::heartbeat::events::{LinkState, ServiceEvent};

/// Receiver of remotely written reporting intervals
///
/// Invoked synchronously from within event handling, so implementations
/// must not block; defer heavy work to the application's own scheduling.
pub trait ConfigListener {
    /// The central wrote a new reporting interval, in seconds
    fn interval_changed(&mut self, seconds: u16);
}

impl<F: FnMut(u16)> ConfigListener for F {
    fn interval_changed(&mut self, seconds: u16) {
        self(seconds)
    }
}

/// Decode a config-characteristic payload as a little-endian interval.
///
/// Returns `None` unless the payload matches the characteristic's declared
/// 2-byte size; the stack enforces that size, but don't trust it enough to
/// read past the payload.
pub fn decode_interval(data: &[u8]) -> Option<u16> {
    if data.len() != attr::CONFIG_LEN {
        return None;
    }
    Some(u16::from_le_bytes([data[0], data[1]]))
}

/// Options for registering the heartbeat service
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatInit {
    /// Initial reporting interval exposed by the config characteristic
    pub initial_interval_secs: u16,
    /// Access-control metadata for the value characteristic
    pub value_access: SecurityMode,
    /// Access-control metadata for the config characteristic
    pub config_access: SecurityMode,
}

impl Default for HeartbeatInit {
    fn default() -> Self {
        Self {
            initial_interval_secs: crate::config::reporting::DEFAULT_INTERVAL_SECS,
            value_access: SecurityMode::open(),
            config_access: SecurityMode::open(),
        }
    }
}

/// A registered heartbeat service instance
///
/// Exclusively owned by the embedding application. All mutable state is
/// touched only from the stack's serialized callback context; callers must
/// confine [`HeartbeatService::push_reading`] to that same context.
pub struct HeartbeatService<L: ConfigListener> {
    service: ServiceHandle,
    uuid_space: UuidSpace,
    value_handles: CharacteristicHandles,
    config_handles: CharacteristicHandles,
    link: LinkState,
    listener: L,
}

impl<L: ConfigListener> HeartbeatService<L> {
    /// Register the service and both characteristics with the attribute
    /// server, returning the ready instance.
    ///
    /// Registration aborts on the first stack rejection and returns it
    /// unchanged. There is no rollback; the caller discards the partial
    /// registration along with the error, the stack reclaims its table at
    /// process level.
    pub fn register<S: AttributeServer>(
        server: &mut S,
        init: &HeartbeatInit,
        listener: L,
    ) -> Result<Self, GattError> {
        let space = server.register_uuid_base(&uuid::SERVICE_BASE)?;

        let service = server.register_service(GattUuid {
            space,
            short: uuid::SERVICE,
        })?;

        let value_handles = server.register_characteristic(
            service,
            &CharacteristicSpec {
                uuid: GattUuid {
                    space,
                    short: uuid::VALUE_CHAR,
                },
                props: CharProps {
                    read: true,
                    write: false,
                    notify: true,
                },
                security: init.value_access,
                len: attr::VALUE_LEN,
                initial: None,
            },
        )?;

        let initial_interval = init.initial_interval_secs.to_le_bytes();
        let config_handles = server.register_characteristic(
            service,
            &CharacteristicSpec {
                uuid: GattUuid {
                    space,
                    short: uuid::CONFIG_CHAR,
                },
                props: CharProps {
                    read: true,
                    write: true,
                    notify: false,
                },
                security: init.config_access,
                len: attr::CONFIG_LEN,
                initial: Some(&initial_interval),
            },
        )?;

        Ok(Self {
            service,
            uuid_space: space,
            value_handles,
            config_handles,
            link: LinkState::Idle,
            listener,
        })
    }

    /// Handle of the registered service
    pub fn service_handle(&self) -> ServiceHandle {
        self.service
    }

    /// Identifier space assigned for the vendor UUID base
    pub fn uuid_space(&self) -> UuidSpace {
        self.uuid_space
    }

    /// Value-attribute handle of the heartbeat value characteristic
    pub fn value_handle(&self) -> AttributeHandle {
        self.value_handles.value
    }

    /// Value-attribute handle of the reporting-interval characteristic
    pub fn config_handle(&self) -> AttributeHandle {
        self.config_handles.value
    }

    /// Current link status
    pub fn link(&self) -> LinkState {
        self.link
    }

    /// React to one stack-delivered event.
    ///
    /// Must return promptly: event handling only mutates local state and,
    /// for config writes, invokes the listener synchronously. Events this
    /// service does not understand are ignored.
    pub fn handle_event(&mut self, event: ServiceEvent<'_>) {
        match event {
            ServiceEvent::Connected { token } => {
                if let LinkState::Connected(old) = self.link {
                    // Single-link radio: a connect while connected should
                    // not happen. The newer token wins.
                    debug!("link {:?} replaced by {:?} while active", old, token);
                }
                self.link = LinkState::Connected(token);
            }
            ServiceEvent::Disconnected => {
                self.link = LinkState::Idle;
            }
            ServiceEvent::Write { handle, data } => {
                self.on_remote_write(handle, data);
            }
            ServiceEvent::MtuUpdated { .. } => {}
        }
    }

    /// Interpret a remote write if it targets the config characteristic;
    /// writes to any other handle are not ours to interpret.
    fn on_remote_write(&mut self, handle: AttributeHandle, data: &[u8]) {
        if handle != self.config_handles.value {
            return;
        }
        match decode_interval(data) {
            Some(seconds) => {
                debug!("reporting interval written: {}s", seconds);
                self.listener.interval_changed(seconds);
            }
            None => {
                warn!("config write with length {} ignored", data.len());
            }
        }
    }

    /// Push a new heartbeat reading to the value characteristic.
    ///
    /// The write is addressed by the currently stored link token without
    /// pre-checking link state; with no active link the stack rejects it
    /// with [`GattError::InvalidConnection`]. That is a routine outcome:
    /// retry later or drop the reading. On an active link an accepted push
    /// also triggers a notification if the central has subscribed.
    pub fn push_reading<S: AttributeServer>(
        &mut self,
        server: &mut S,
        reading: u32,
    ) -> Result<(), GattError> {
        server.write_value(
            self.link.token(),
            self.value_handles.value,
            &reading.to_le_bytes(),
        )
    }
}
