//! # Campus Relay - SSO Session Client Library
//!
//! This is a facade crate that re-exports all public APIs from the campus relay components.
//! Use this crate to reach campus services that sit behind a central-authentication
//! single sign-on gateway, and to decode the pages they return.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! campus_relay = { path = "../campus_relay" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Credential`, `IdentityProvider`, `ResourceRequest`, `Session`, etc.
//! - **Port traits**: `HttpTransport`, `CredentialStore`, `CredentialVault`
//! - **Decoders**: `decode_rows`, `decode_pattern`, `decode_jsonish` and the `ScrapeTarget` contracts
//! - **Use cases**: `SessionBroker`, `SignInUseCase`, `SignOutUseCase`, `TicketUrlUseCase`
//! - **Adapters**: `ReqwestTransport`, `VaultCredentialStore`, `RelaySettings`, etc.
//! - **Service**: `CampusRelay` - The main entry point

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use campus_relay_core::*;
}

// Re-export most commonly used core types at the root level
pub use campus_relay_core::{
    CookieJar, Credential, CredentialError, FetchedResource, IdentityId, IdentityProvider,
    ResourceRequest, Session,
};

// ============================================================================
// Ports
// ============================================================================

/// Port trait definitions
pub mod ports {
    pub use campus_relay_core::{
        CredentialStore, CredentialStoreError, CredentialVault, HttpTransport, TransportError,
        TransportRequest, TransportResponse, VaultError,
    };
}

// Re-export port traits at root level
pub use ports::{CredentialStore, CredentialVault, HttpTransport, TransportError};

// ============================================================================
// Response Decoder
// ============================================================================

/// Selector, pattern and near-JSON decoding plus the bundled scrape targets
pub mod scrape {
    pub use campus_relay_scrape::*;
}

pub use campus_relay_scrape::{DecodeError, ResponseShape, ScrapeTarget};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Session broker and application use cases
pub mod use_cases {
    pub use campus_relay_application::*;
}

// Re-export use cases at root level
pub use campus_relay_application::{
    BrokerOptions, FetchError, SessionBroker, SignInUseCase, SignOutUseCase, TicketUrlUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// HTTP transport implementations
    pub mod http {
        pub use campus_relay_adapters::http::*;
    }

    /// Credential persistence implementations
    pub mod persistence {
        pub use campus_relay_adapters::persistence::*;
    }

    /// Configuration
    pub mod config {
        pub use campus_relay_adapters::config::*;
    }

    /// Tracing subscriber setup
    pub mod telemetry {
        pub use campus_relay_adapters::telemetry::*;
    }
}

// Re-export commonly used adapters at root level
pub use campus_relay_adapters::{
    InMemoryCredentialVault, RelaySettings, ReqwestTransport, VaultCredentialStore, init_tracing,
};

// ============================================================================
// Campus Relay (Main Entry Point)
// ============================================================================

/// Main relay service
pub use campus_relay_service::{CampusRelay, DefaultCredentialStore, ErrorKind, RelayError};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
pub use url::Url;
