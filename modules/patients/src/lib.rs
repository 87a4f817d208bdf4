// === PUBLIC CONTRACT ===
// Only the contract module should be needed by other crates to consume
// the patient registry.
pub mod contract;

// Re-export the public contract components
pub use contract::model;

// === INTERNAL MODULES ===
// Exposed for the server binary wiring and for comprehensive testing;
// external consumers should stick to `contract`.
pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
