//! Core types and the case lifecycle engine for the Casework compliance
//! dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! live data store is reached through the [`store::CaseStore`] trait; concrete
//! backends (e.g. `casework-store-sqlite`) implement it.
//!
//! The engine is made of six parts, leaves first:
//!
//! - [`schema`]: per-kind statuses, transitions, deadline rules, legal-basis
//!   flags.
//! - [`deadline`]: pure deadline classification.
//! - [`lifecycle`]: the status state machine and its deadline side effects.
//! - [`legal_basis`]: flag set → canonical short code.
//! - [`repository`]: live reads with demo fallback, hard-failing writes.
//! - [`filter`]: in-memory search and filtering.
//!
//! [`service::CaseService`] ties them together behind the operations the UI
//! calls.

pub mod case;
pub mod clock;
pub mod deadline;
pub mod demo;
pub mod error;
pub mod filter;
pub mod legal_basis;
pub mod lifecycle;
pub mod repository;
pub mod schema;
pub mod service;
pub mod store;
pub mod subject;

pub use error::{Error, Result, ValidationError};
pub use service::{CaseService, CaseView, classify_deadline, encode_legal_basis};
