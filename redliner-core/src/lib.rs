//! # redliner-core
//!
//! Core library for redliner - a contract risk analysis client.
//!
//! This library provides:
//! - Domain types for documents, classified clauses, and notifications
//! - The session controller driving the upload → analyze → review workflow
//! - An HTTP client for the analysis backend
//! - Export artifacts for completed analyses
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! All substantive analysis work (PDF text extraction, clause segmentation,
//! risk classification, redlined HTML generation) happens in an external
//! backend. This crate is the client side: the [`session::SessionController`]
//! owns every piece of mutable session state, calls the backend through
//! [`backend::AnalysisClient`], and exposes read-only accessors to whatever
//! presentation layer drives it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use redliner_core::{AnalysisClient, Config, SyncSession};
//!
//! let config = Config::load().expect("failed to load config");
//! let client = AnalysisClient::new(&config.backend).expect("bad backend config");
//! let mut session = SyncSession::new(client).expect("failed to create session");
//! session.initialize();
//! ```

// Re-export commonly used items at the crate root
pub use backend::AnalysisClient;
pub use config::Config;
pub use error::{Error, Result, MAX_UPLOAD_BYTES};
pub use export::ExportArtifact;
pub use session::{SessionController, SyncSession};
pub use types::*;

// Public modules
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod session;
pub mod types;
