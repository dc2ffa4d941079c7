//! Static, compile-time configuration data that isn't loaded from YAML/env
//! (SPEC_FULL §6 "Configuration"): the request-type → department map.

pub mod agent_mapping;
