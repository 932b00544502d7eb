/// Patching domain: catalog records, identities, and the pure rules that
/// govern ingestion, acquisition and dispatch.
pub mod domain;
pub mod policies;
pub mod services;
