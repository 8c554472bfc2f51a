mod campus_relay;
mod error;

pub use campus_relay::{CampusRelay, DefaultCredentialStore};
pub use error::{ErrorKind, RelayError};
