mod domain;
pub use domain::*;

mod lease;
pub use lease::*;

mod error;
pub use error::ConfigError;
