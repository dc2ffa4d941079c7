//! Context Store adapter (SPEC_FULL §2 item 1): the one external,
//! read-only collaborator every department agent consults at Phase 2.

pub mod http;

pub use http::HttpContextStore;
