pub mod cookie_jar;
pub mod credential;
pub mod identity_provider;
pub mod resource;
pub mod session;
