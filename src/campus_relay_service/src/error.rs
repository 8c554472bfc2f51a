use campus_relay_adapters::SettingsError;
use campus_relay_application::{FetchError, SignInError, SignOutError, TicketUrlError};
use campus_relay_core::{
    CredentialError, CredentialStoreError, IdentityProviderError, TransportError,
};
use campus_relay_scrape::DecodeError;
use thiserror::Error;

/// What a caller should do about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Nothing stored; prompt for sign-in.
    CredentialMissing,
    /// Fall back to the interactive browser login.
    CaptchaRequired,
    /// Ask the user to sign in again.
    AuthenticationFailed,
    /// Show "no data".
    MalformedResponse,
    /// Network failure; the caller may retry.
    Transport,
    Internal,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No stored credential")]
    CredentialMissing,
    #[error("Identity provider requires a CAPTCHA")]
    CaptchaRequired,
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] CredentialError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialMissing => ErrorKind::CredentialMissing,
            Self::CaptchaRequired => ErrorKind::CaptchaRequired,
            Self::AuthenticationFailed(_) | Self::InvalidCredential(_) => {
                ErrorKind::AuthenticationFailed
            }
            Self::Decode(DecodeError::MalformedResponse(_)) => ErrorKind::MalformedResponse,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Decode(_)
            | Self::CredentialStore(_)
            | Self::InvalidRequest(_)
            | Self::Settings(_)
            | Self::HttpClient(_) => ErrorKind::Internal,
        }
    }

    /// Only transport failures are worth retrying; the relay itself never does.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<IdentityProviderError> for RelayError {
    fn from(error: IdentityProviderError) -> Self {
        Self::Settings(SettingsError::from(error))
    }
}

impl From<FetchError> for RelayError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::CredentialMissing => Self::CredentialMissing,
            FetchError::CaptchaRequired => Self::CaptchaRequired,
            FetchError::AuthenticationFailed(reason) => Self::AuthenticationFailed(reason),
            FetchError::Transport(e) => Self::Transport(e),
            FetchError::CredentialStore(e) => Self::CredentialStore(e),
            FetchError::InvalidRequest(reason) => Self::InvalidRequest(reason),
        }
    }
}

impl From<SignInError> for RelayError {
    fn from(error: SignInError) -> Self {
        match error {
            SignInError::EmptyCredential(e) => Self::InvalidCredential(e),
            SignInError::CaptchaRequired => Self::CaptchaRequired,
            SignInError::AuthenticationFailed(reason) => Self::AuthenticationFailed(reason),
            SignInError::Transport(e) => Self::Transport(e),
            SignInError::CredentialStore(e) => Self::CredentialStore(e),
        }
    }
}

impl From<SignOutError> for RelayError {
    fn from(error: SignOutError) -> Self {
        match error {
            SignOutError::CredentialStore(e) => Self::CredentialStore(e),
        }
    }
}

impl From<TicketUrlError> for RelayError {
    fn from(error: TicketUrlError) -> Self {
        match error {
            TicketUrlError::CredentialMissing => Self::CredentialMissing,
            TicketUrlError::CaptchaRequired => Self::CaptchaRequired,
            TicketUrlError::AuthenticationFailed(reason) => Self::AuthenticationFailed(reason),
            TicketUrlError::Transport(e) => Self::Transport(e),
            TicketUrlError::CredentialStore(e) => Self::CredentialStore(e),
        }
    }
}
