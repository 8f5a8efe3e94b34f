//! Analysis Backend Client
//!
//! This module talks to the contract analysis backend, which owns all of the
//! heavy lifting: PDF text extraction, clause segmentation, rule-based and
//! RAG risk classification, and redlined HTML generation. The client consumes
//! five endpoints (`/upload`, `/analyze/{doc_id}`, `/search`,
//! `/classify-text`, `/health`) and performs none of that work itself.
//!
//! ## Usage
//!
//! Point the client at a backend in `~/.config/redliner/config.toml`:
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//! ```

mod client;

pub use client::{
    AnalysisClient, AnalyzeResponse, ClassifyResponse, HealthResponse, SearchHit, SearchResponse,
    UploadResponse,
};
