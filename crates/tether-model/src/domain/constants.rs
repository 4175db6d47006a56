/// Heartbeat period used when the settings don't override it.
pub const DEFAULT_LEASE_RENEWAL_SECS: u32 = 30;

/// Lease lifetime on the server side; three missed heartbeats at the default period.
pub const DEFAULT_LEASE_EXPIRATION_SECS: u32 = 90;

pub const DEFAULT_NON_SECURE_PORT: u16 = 80;

pub const DEFAULT_SECURE_PORT: u16 = 443;
