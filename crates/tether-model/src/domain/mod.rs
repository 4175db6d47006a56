mod settings;
pub use settings::InstanceSettings;

mod descriptor;
pub use descriptor::{InstanceConfig, InstanceDescriptor};

mod datacenter;
pub use datacenter::{CloudMetadata, DataCenterInfo, OWN_DATA_CENTER};

mod status;
pub use status::InstanceStatus;

mod payload;
pub use payload::{DataCenterPayload, LeaseInfo, PortSpec, RegistrationPayload};

mod constants;
pub use constants::{
    DEFAULT_LEASE_EXPIRATION_SECS, DEFAULT_LEASE_RENEWAL_SECS, DEFAULT_NON_SECURE_PORT,
    DEFAULT_SECURE_PORT,
};

/// Free-form per-instance annotations sent with every registration.
pub type Metadata = std::collections::HashMap<String, String>;
