//! Export artifacts for completed analyses
//!
//! An export is a pure snapshot of one analyzed document: the upload
//! metadata, the document-level analysis, and every classified clause. It is
//! serialized as indented JSON so the file is diffable and readable without
//! tooling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AnalysisResult, ClassifiedClause, DocumentMetadata};

/// Snapshot of a completed analysis, detached from the live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub document: DocumentMetadata,
    pub analysis: AnalysisResult,
    pub clauses: Vec<ClassifiedClause>,
}

impl ExportArtifact {
    /// Filename for this artifact: `contract-analysis-<stem>.json`, with the
    /// document's `.pdf` extension stripped case-insensitively.
    pub fn file_name(&self) -> String {
        let filename = &self.document.filename;
        let stem = if filename.to_lowercase().ends_with(".pdf") {
            &filename[..filename.len() - 4]
        } else {
            filename.as_str()
        };
        format!("contract-analysis-{}.json", stem)
    }

    /// Render the artifact as indented JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the artifact into `dir`, creating it if needed.
    ///
    /// Returns the path of the written file.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "Export artifact written");
        Ok(path)
    }
}
