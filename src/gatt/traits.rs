//! Attribute-server trait for abstraction and testability
//!
//! This trait defines the interface to the vendor BLE stack's attribute
//! server (vendor UUID registration, service/characteristic registration,
//! value writes), allowing the real stack to be swapped with a mock for
//! testing.

/// Errors reported by the attribute server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattError {
    /// An argument was rejected by the stack
    InvalidArgument,
    /// The addressed connection does not exist or is no longer active
    InvalidConnection,
    /// The addressed attribute handle is unknown
    InvalidHandle,
    /// The operation is not permitted for this attribute
    NotPermitted,
    /// The stack has no resources left for the registration
    NoResources,
    /// The stack is busy and cannot accept the request
    Busy,
}

/// Opaque token identifying the single active wireless link.
///
/// Newtype over the stack's raw connection handle so it cannot be confused
/// with attribute or service handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionToken(u16);

impl ConnectionToken {
    /// Wrap a raw connection handle delivered by the stack
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw handle, as the stack expects it back
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Handle of a registered service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHandle(u16);

impl ServiceHandle {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }
}

/// Handle of a single attribute within the server's table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeHandle(u16);

impl AttributeHandle {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }
}

/// Identifier space assigned by the stack for a registered 128-bit UUID base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UuidSpace(u8);

impl UuidSpace {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }
}

/// 16-bit UUID qualified by its identifier space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GattUuid {
    pub space: UuidSpace,
    pub short: u16,
}

/// Access level required for one direction of attribute access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Access disabled
    NoAccess,
    /// No security required
    Open,
    /// Encrypted link required
    Encrypted,
    /// Encrypted link with MITM protection required
    EncryptedMitm,
}

/// Per-attribute access-control metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityMode {
    pub read: AccessLevel,
    pub write: AccessLevel,
}

impl SecurityMode {
    /// Open access in both directions
    pub const fn open() -> Self {
        Self {
            read: AccessLevel::Open,
            write: AccessLevel::Open,
        }
    }
}

/// Characteristic capabilities exposed to the remote central
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharProps {
    pub read: bool,
    pub write: bool,
    pub notify: bool,
}

/// Everything the attribute server needs to register one characteristic
#[derive(Debug, Clone, Copy)]
pub struct CharacteristicSpec<'a> {
    pub uuid: GattUuid,
    pub props: CharProps,
    pub security: SecurityMode,
    /// Fixed declared payload size in bytes
    pub len: usize,
    /// Initial payload; `None` leaves the stack's zeroed default
    pub initial: Option<&'a [u8]>,
}

/// Handles returned by a characteristic registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicHandles {
    /// Handle of the characteristic's value attribute
    pub value: AttributeHandle,
    /// Handle of the client configuration descriptor, present only for
    /// notifying characteristics (owned entirely by the stack)
    pub cccd: Option<AttributeHandle>,
}

/// Abstract attribute-server interface for testability
///
/// All operations are synchronous submissions: the stack either accepts the
/// request immediately or rejects it with a [`GattError`]. Radio traffic
/// resulting from an accepted request happens asynchronously inside the
/// stack and is not observable here.
pub trait AttributeServer {
    /// Register a 128-bit vendor UUID base, obtaining an identifier space
    /// for 16-bit short UUIDs
    fn register_uuid_base(&mut self, base: &[u8; 16]) -> Result<UuidSpace, GattError>;

    /// Register a primary service under the given UUID
    fn register_service(&mut self, uuid: GattUuid) -> Result<ServiceHandle, GattError>;

    /// Register a characteristic within a previously registered service
    fn register_characteristic(
        &mut self,
        service: ServiceHandle,
        spec: &CharacteristicSpec<'_>,
    ) -> Result<CharacteristicHandles, GattError>;

    /// Write an attribute's stored value, addressed by connection token.
    ///
    /// For notifying characteristics an accepted write also triggers a
    /// notification if the remote has subscribed. The stack rejects the
    /// write with [`GattError::InvalidConnection`] when no matching link
    /// is active.
    fn write_value(
        &mut self,
        conn: Option<ConnectionToken>,
        handle: AttributeHandle,
        value: &[u8],
    ) -> Result<(), GattError>;
}

#[cfg(test)]
pub mod mock {
    //! Mock attribute server for testing

    use super::*;
    use heapless::Vec;

    /// Maximum payload recorded per mock write
    pub const MOCK_VALUE_LEN: usize = 8;

    /// One registration or write observed by the mock, in call order
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MockCall {
        UuidBase,
        Service { short: u16 },
        Characteristic { short: u16 },
        Write {
            conn: Option<ConnectionToken>,
            handle: AttributeHandle,
            data: Vec<u8, MOCK_VALUE_LEN>,
        },
    }

    /// Mock attribute server for unit testing
    pub struct MockAttributeServer {
        /// Next handle to assign; mock handles count up from here
        next_handle: u16,
        /// Record of every call, in order
        history: Vec<MockCall, 16>,
        /// Error to return on the next UUID-base registration
        next_uuid_base_error: Option<GattError>,
        /// Error to return on the next service registration
        next_service_error: Option<GattError>,
        /// Error to return on the next characteristic registration
        next_characteristic_error: Option<GattError>,
        /// Error to return on the next value write
        next_write_error: Option<GattError>,
    }

    impl MockAttributeServer {
        /// Create a new mock server
        pub fn new() -> Self {
            Self {
                next_handle: 0x0010,
                history: Vec::new(),
                next_uuid_base_error: None,
                next_service_error: None,
                next_characteristic_error: None,
                next_write_error: None,
            }
        }

        /// Set an error to be returned by the next UUID-base registration
        pub fn set_next_uuid_base_error(&mut self, error: GattError) {
            self.next_uuid_base_error = Some(error);
        }

        /// Set an error to be returned by the next service registration
        pub fn set_next_service_error(&mut self, error: GattError) {
            self.next_service_error = Some(error);
        }

        /// Set an error to be returned by the next characteristic registration
        pub fn set_next_characteristic_error(&mut self, error: GattError) {
            self.next_characteristic_error = Some(error);
        }

        /// Set an error to be returned by the next value write
        pub fn set_next_write_error(&mut self, error: GattError) {
            self.next_write_error = Some(error);
        }

        /// All calls observed so far, in order
        pub fn history(&self) -> &[MockCall] {
            &self.history
        }

        /// Payloads of accepted writes to the given handle, in order
        pub fn writes_to(&self, handle: AttributeHandle) -> Vec<Vec<u8, MOCK_VALUE_LEN>, 16> {
            let mut out = Vec::new();
            for call in &self.history {
                if let MockCall::Write { handle: h, data, .. } = call {
                    if *h == handle {
                        let _ = out.push(data.clone());
                    }
                }
            }
            out
        }

        fn alloc_handle(&mut self) -> AttributeHandle {
            let handle = AttributeHandle::new(self.next_handle);
            self.next_handle += 1;
            handle
        }
    }

    impl Default for MockAttributeServer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AttributeServer for MockAttributeServer {
        fn register_uuid_base(&mut self, _base: &[u8; 16]) -> Result<UuidSpace, GattError> {
            if let Some(error) = self.next_uuid_base_error.take() {
                return Err(error);
            }
            let _ = self.history.push(MockCall::UuidBase);
            Ok(UuidSpace::new(2))
        }

        fn register_service(&mut self, uuid: GattUuid) -> Result<ServiceHandle, GattError> {
            if let Some(error) = self.next_service_error.take() {
                return Err(error);
            }
            let _ = self.history.push(MockCall::Service { short: uuid.short });
            let handle = self.next_handle;
            self.next_handle += 1;
            Ok(ServiceHandle::new(handle))
        }

        fn register_characteristic(
            &mut self,
            _service: ServiceHandle,
            spec: &CharacteristicSpec<'_>,
        ) -> Result<CharacteristicHandles, GattError> {
            if let Some(error) = self.next_characteristic_error.take() {
                return Err(error);
            }
            let _ = self.history.push(MockCall::Characteristic {
                short: spec.uuid.short,
            });
            let value = self.alloc_handle();
            let cccd = if spec.props.notify {
                Some(self.alloc_handle())
            } else {
                None
            };
            Ok(CharacteristicHandles { value, cccd })
        }

        fn write_value(
            &mut self,
            conn: Option<ConnectionToken>,
            handle: AttributeHandle,
            value: &[u8],
        ) -> Result<(), GattError> {
            if let Some(error) = self.next_write_error.take() {
                return Err(error);
            }
            // The real stack rejects connection-addressed writes when no
            // link is active.
            if conn.is_none() {
                return Err(GattError::InvalidConnection);
            }

            let mut data = Vec::new();
            data.extend_from_slice(value)
                .map_err(|_| GattError::InvalidArgument)?;
            let _ = self.history.push(MockCall::Write { conn, handle, data });
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mock_assigns_distinct_handles() {
            let mut server = MockAttributeServer::new();
            let space = server.register_uuid_base(&[0u8; 16]).unwrap();
            let service = server
                .register_service(GattUuid { space, short: 0x1400 })
                .unwrap();

            let spec = CharacteristicSpec {
                uuid: GattUuid { space, short: 0x1401 },
                props: CharProps {
                    read: true,
                    write: false,
                    notify: true,
                },
                security: SecurityMode::open(),
                len: 4,
                initial: None,
            };
            let a = server.register_characteristic(service, &spec).unwrap();
            let b = server.register_characteristic(service, &spec).unwrap();

            assert_ne!(a.value, b.value);
            assert!(a.cccd.is_some());
        }

        #[test]
        fn test_mock_write_without_connection_rejected() {
            let mut server = MockAttributeServer::new();
            let result = server.write_value(None, AttributeHandle::new(0x20), &[1, 2, 3, 4]);
            assert_eq!(result, Err(GattError::InvalidConnection));
        }

        #[test]
        fn test_mock_scripted_error_cleared_after_use() {
            let mut server = MockAttributeServer::new();
            server.set_next_write_error(GattError::Busy);

            let conn = Some(ConnectionToken::new(1));
            let handle = AttributeHandle::new(0x20);
            assert_eq!(server.write_value(conn, handle, &[0]), Err(GattError::Busy));
            assert_eq!(server.write_value(conn, handle, &[0]), Ok(()));
        }

        #[test]
        fn test_mock_no_cccd_without_notify() {
            let mut server = MockAttributeServer::new();
            let space = server.register_uuid_base(&[0u8; 16]).unwrap();
            let service = server
                .register_service(GattUuid { space, short: 0x1400 })
                .unwrap();

            let spec = CharacteristicSpec {
                uuid: GattUuid { space, short: 0x1402 },
                props: CharProps {
                    read: true,
                    write: true,
                    notify: false,
                },
                security: SecurityMode::open(),
                len: 2,
                initial: Some(&[0x2C, 0x01]),
            };
            let handles = server.register_characteristic(service, &spec).unwrap();
            assert!(handles.cccd.is_none());
        }
    }
}
