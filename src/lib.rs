//! rcs - Restore Control Service
//!
//! A multi-tenant control plane that turns CDC-derived restore plans into
//! durable, auditable restore executions: plan admission and hashing,
//! scope-locked job admission, chunked execution with checkpointed resume,
//! and signed evidence manifests.

pub mod auth;
pub mod canonical;
pub mod cli;
pub mod config;
pub mod error;
pub mod evidence;
pub mod execution;
pub mod index_reader;
pub mod job;
pub mod observability;
pub mod orchestrator;
pub mod plan;
pub mod scope_lock;
pub mod source_registry;
pub mod store;

