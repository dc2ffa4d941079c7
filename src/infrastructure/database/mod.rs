//! `SQLite` persistence (SPEC_FULL §6 "Persistence"): connection pool,
//! embedded migrations, and repository adapters for the two tables the
//! Coordinator and audit log own.

pub mod audit_repo;
pub mod connection;
pub mod coordination_repo;

pub use audit_repo::AuditRepositoryImpl;
pub use connection::DatabasePool;
pub use coordination_repo::CoordinationRepositoryImpl;
