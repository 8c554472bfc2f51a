pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{HttpSettings, RelaySettings, SessionSettings, SettingsError, SsoSettings};
