pub mod broker;
pub mod session_http;
pub mod sso_gateway;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use campus_relay_core::Session;
use tokio::sync::RwLock;

pub use broker::{BrokerOptions, FetchError, SessionBroker};
pub use session_http::SessionHttp;
pub use sso_gateway::{HandshakeError, LoginOutcome, LoginPage, PreparedLogin, SsoGateway};
pub use use_cases::{
    sign_in::{SignInError, SignInUseCase},
    sign_out::{SignOutError, SignOutUseCase},
    ticket_url::{TicketUrlError, TicketUrlUseCase},
};

/// The one `Session` of the process, shared by the broker and the use cases.
pub type SharedSession = Arc<RwLock<Session>>;

pub fn new_shared_session() -> SharedSession {
    Arc::new(RwLock::new(Session::new()))
}
