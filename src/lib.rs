//! Muniops: a multi-agent decision-support service for municipal
//! departments (SPEC_FULL §1 "Overview"). Six department agents share one
//! 14-phase pipeline, a Coordinator that serializes plan conflicts, and a
//! deterministic Rules Engine that is never overruled by LLM output.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod infrastructure;
pub mod jobmanager;
pub mod llm;
pub mod pipeline;
pub mod rules;
pub mod tools;
