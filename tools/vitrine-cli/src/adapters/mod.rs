//! Concrete collaborators for the commerce core.

pub mod http;
pub mod profile_store;

pub use http::HttpBackend;
pub use profile_store::JsonProfileStore;
