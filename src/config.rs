//! Service configuration constants for the heartbeat peripheral

/// Heartbeat service identifiers
pub mod uuid {
    /// 128-bit vendor UUID base, little-endian as consumed by the stack's
    /// vendor-UUID registration. String form of the full service UUID:
    /// `02351400-99c5-4197-b856-69219c030201`.
    pub const SERVICE_BASE: [u8; 16] = [
        0x01, 0x02, 0x03, 0x9c, 0x21, 0x69, 0x56, 0xb8,
        0x97, 0x41, 0xc5, 0x99, 0x3b, 0x73, 0x35, 0x02,
    ];

    /// 16-bit short id of the primary service within the vendor base
    pub const SERVICE: u16 = 0x1400;

    /// 16-bit short id of the heartbeat value characteristic
    pub const VALUE_CHAR: u16 = 0x1401;

    /// 16-bit short id of the reporting-interval characteristic
    pub const CONFIG_CHAR: u16 = 0x1402;
}

/// Attribute payload sizes
pub mod attr {
    /// Declared size of the heartbeat value characteristic (u32 LE)
    pub const VALUE_LEN: usize = 4;

    /// Declared size of the reporting-interval characteristic (u16 LE, seconds)
    pub const CONFIG_LEN: usize = 2;
}

/// Reporting defaults
pub mod reporting {
    /// Default reporting interval in seconds, used until the remote
    /// central writes a new one
    pub const DEFAULT_INTERVAL_SECS: u16 = 300;
}

/// BLE advertising configuration (embedded target)
pub mod advertising {
    /// Device name prefix; a device-id suffix is appended at runtime
    pub const DEVICE_NAME_PREFIX: &str = "HeartBeat-";
}
