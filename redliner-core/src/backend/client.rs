//! HTTP client for the contract analysis backend
//!
//! The backend speaks plain JSON over five endpoints. Every mutating or
//! query endpoint signals failure two ways: a non-2xx status (with a
//! `detail` message), or a 2xx body carrying `success: false`. Both are
//! collapsed into [`Error::Backend`] here so callers see a single failure
//! channel, with the backend's own message preserved verbatim.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::types::{AnalysisResult, ClassifiedClause, Classification, DocumentMetadata};

/// Response from GET /health
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Backend-reported status string ("healthy" when all models are up)
    pub status: String,
    /// Load state per backend model component, keyed by component name
    #[serde(default)]
    pub models_loaded: BTreeMap<String, bool>,
}

/// Response from POST /upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Human-readable status message
    #[serde(default)]
    pub message: String,
    pub doc_id: String,
    pub metadata: DocumentMetadata,
}

/// Response from POST /analyze/{doc_id}
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub doc_id: String,
    pub analysis: AnalysisResult,
    pub classified_clauses: Vec<ClassifiedClause>,
    pub redlined_html: String,
}

/// One hit from GET /search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub text: String,
    /// Opaque chunk metadata (document id, clause flags, ...)
    pub metadata: serde_json::Value,
    /// Embedding distance; smaller is closer
    pub distance: f64,
    pub id: String,
}

/// Response from GET /search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// Response from POST /classify-text
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    pub success: bool,
    pub classification: Classification,
}

/// Error body the backend attaches to non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP client for the analysis backend
pub struct AnalysisClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL this client targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a contract PDF for processing
    ///
    /// Sends the raw bytes as the `file` field of a multipart form. The
    /// caller is responsible for local validation (extension, size ceiling)
    /// before any bytes hit the network.
    pub async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        let url = format!("{}/upload", self.base_url);

        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| Error::Backend(format!("invalid upload part: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("HTTP request failed: {}", e)))?;

        let upload: UploadResponse = Self::parse_response(response).await?;
        if !upload.success {
            return Err(Error::Backend(if upload.message.is_empty() {
                "upload rejected by backend".to_string()
            } else {
                upload.message
            }));
        }
        Ok(upload)
    }

    /// Run the risk analysis for an uploaded document
    pub async fn analyze_document(&self, doc_id: &str) -> Result<AnalyzeResponse> {
        let url = format!("{}/analyze/{}", self.base_url, urlencoding::encode(doc_id));

        let response = self
            .http_client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("HTTP request failed: {}", e)))?;

        let analysis: AnalyzeResponse = Self::parse_response(response).await?;
        if !analysis.success {
            return Err(Error::Backend("analysis rejected by backend".to_string()));
        }
        Ok(analysis)
    }

    /// Semantic search over ingested clauses
    pub async fn search_clauses(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| Error::Backend(format!("HTTP request failed: {}", e)))?;

        let search: SearchResponse = Self::parse_response(response).await?;
        if !search.success {
            return Err(Error::Backend("search rejected by backend".to_string()));
        }
        Ok(search)
    }

    /// Classify a single clause of text
    pub async fn classify_text(&self, text: &str) -> Result<ClassifyResponse> {
        let url = format!("{}/classify-text", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| Error::Backend(format!("HTTP request failed: {}", e)))?;

        let classify: ClassifyResponse = Self::parse_response(response).await?;
        if !classify.success {
            return Err(Error::Backend(
                "classification rejected by backend".to_string(),
            ));
        }
        Ok(classify)
    }

    /// Fetch the backend health report
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("HTTP request failed: {}", e)))?;

        Self::parse_response(response).await
    }

    /// Check whether the backend is reachable and healthy
    ///
    /// Transport errors are swallowed: health is advisory, never fatal.
    pub async fn health_check(&self) -> bool {
        match self.health().await {
            Ok(health) => health.status == "healthy",
            Err(_) => false,
        }
    }

    /// Decode a 2xx body, or surface the backend's error detail verbatim.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Backend(format!("failed to parse response: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        "unknown".to_string()
                    } else {
                        body
                    }
                });
            Err(Error::Backend(format!(
                "API error ({}): {}",
                status, detail
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn test_client_requires_valid_config() {
        let config = BackendConfig {
            base_url: "".to_string(),
            ..Default::default()
        };
        assert!(AnalysisClient::new(&config).is_err());
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        let client = AnalysisClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_upload_response_shape() {
        let json = r#"{
            "success": true,
            "message": "Document uploaded and processed successfully",
            "doc_id": "d1",
            "metadata": {
                "doc_id": "d1",
                "filename": "contract.pdf",
                "total_chunks": 12,
                "total_clauses": 5,
                "word_count": 3400
            }
        }"#;
        let upload: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(upload.success);
        assert_eq!(upload.metadata.filename, "contract.pdf");
        assert_eq!(upload.metadata.total_clauses, 5);
    }

    #[test]
    fn test_health_response_shape() {
        let json = r#"{
            "status": "healthy",
            "models_loaded": {
                "document_processor": true,
                "rag_engine": true,
                "redlining_classifier": false
            }
        }"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.models_loaded.get("rag_engine"), Some(&true));
        assert_eq!(
            health.models_loaded.get("redlining_classifier"),
            Some(&false)
        );
    }
}
