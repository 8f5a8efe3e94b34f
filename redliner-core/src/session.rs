//! Session controller for the upload → analyze → review workflow
//!
//! [`SessionController`] is the only component in the client that owns
//! mutable state. The presentation layer translates raw input events into
//! calls on it, renders from its accessors, and holds no state of its own
//! that outlives a render.
//!
//! Phase transitions are deliberately narrow:
//!
//! ```text
//! Upload --(upload success)--> Dashboard --(analysis success)--> Results
//!    ^                              |                               |
//!    +---------- reset ------------+----------- reset -------------+
//! ```
//!
//! There is no path from `Results` back to `Dashboard`; re-analysis always
//! starts a fresh session.
//!
//! The controller runs on a single logical thread (the UI event loop). The
//! `busy` flag is the concurrency gate: while an upload or analysis is in
//! flight, re-entry into either is rejected at the boundary. Selection,
//! dismissal, export, and reset only touch already-resident state and stay
//! callable regardless of `busy`.

use std::time::Instant;

use chrono::Utc;

use crate::backend::{AnalysisClient, AnalyzeResponse, UploadResponse};
use crate::error::{Error, Result, MAX_UPLOAD_BYTES};
use crate::export::ExportArtifact;
use crate::types::{
    AnalysisResult, ClassifiedClause, DocumentMetadata, Notification, SessionPhase, Severity,
    NOTIFICATION_TTL,
};

/// Validate an upload locally, before any bytes hit the network.
fn validate_upload(filename: &str, size_bytes: u64) -> Result<()> {
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(Error::InvalidFileType(filename.to_string()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(Error::FileTooLarge {
            size: size_bytes,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Owns all client-side session state and mediates every transition.
pub struct SessionController {
    client: AnalysisClient,
    phase: SessionPhase,
    document: Option<DocumentMetadata>,
    result: Option<AnalysisResult>,
    clauses: Vec<ClassifiedClause>,
    redlined_html: String,
    selected_clause: Option<usize>,
    busy: bool,
    notifications: Vec<Notification>,
    /// Sequence counter folded into notification ids so two notifications
    /// created in the same millisecond still get distinct ids
    notification_seq: u64,
}

impl SessionController {
    /// Create a controller in the `Upload` phase with no document.
    pub fn new(client: AnalysisClient) -> Self {
        Self {
            client,
            phase: SessionPhase::default(),
            document: None,
            result: None,
            clauses: Vec::new(),
            redlined_html: String::new(),
            selected_clause: None,
            busy: false,
            notifications: Vec::new(),
            notification_seq: 0,
        }
    }

    // ========== Accessors ==========

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn document(&self) -> Option<&DocumentMetadata> {
        self.document.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn clauses(&self) -> &[ClassifiedClause] {
        &self.clauses
    }

    pub fn redlined_html(&self) -> &str {
        &self.redlined_html
    }

    /// Index of the clause open in the detail view, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_clause
    }

    /// The clause open in the detail view, if any.
    pub fn selected_clause(&self) -> Option<&ClassifiedClause> {
        self.selected_clause.and_then(|i| self.clauses.get(i))
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn backend_url(&self) -> &str {
        self.client.base_url()
    }

    // ========== Startup ==========

    /// One-shot startup health check.
    ///
    /// A failing check emits a warning notification and nothing else: the
    /// backend may come up later, and every real operation carries its own
    /// error path.
    pub async fn initialize(&mut self) {
        if self.client.health_check().await {
            tracing::info!(backend = %self.client.base_url(), "Backend health check passed");
        } else {
            tracing::warn!(backend = %self.client.base_url(), "Backend health check failed");
            self.notify("System health check failed", Severity::Warning);
        }
    }

    // ========== Upload ==========

    /// Upload a contract PDF and move to the Dashboard phase on success.
    ///
    /// Validation failures (wrong extension, oversize) are rejected locally:
    /// exactly one error notification, no network call, no state change. A
    /// backend failure leaves the session in the Upload phase with no
    /// document, carrying the backend's message in the notification.
    pub async fn submit_upload(&mut self, filename: &str, bytes: Vec<u8>) {
        if self.busy {
            tracing::debug!("Upload rejected: another request is in flight");
            return;
        }

        if let Err(e) = validate_upload(filename, bytes.len() as u64) {
            tracing::warn!(filename, error = %e, "Upload rejected locally");
            self.notify(&e.to_string(), Severity::Error);
            return;
        }

        self.busy = true;
        tracing::info!(filename, size = bytes.len(), "Uploading document");
        let outcome = self.client.upload_document(filename, bytes).await;
        self.complete_upload(outcome);
    }

    /// Apply the outcome of an upload request.
    fn complete_upload(&mut self, outcome: Result<UploadResponse>) {
        self.busy = false;

        match outcome {
            Ok(upload) => {
                tracing::info!(doc_id = %upload.doc_id, "Document uploaded");
                self.document = Some(upload.metadata);
                self.phase = SessionPhase::Dashboard;
                self.notify("Document uploaded successfully!", Severity::Success);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload failed");
                self.notify(&format!("Upload error: {}", e), Severity::Error);
            }
        }
    }

    // ========== Analysis ==========

    /// Run the risk analysis for the uploaded document.
    ///
    /// Without a document this is a defensive no-op: the presentation layer
    /// should not have offered the action. On success the analysis result,
    /// classified clauses, and redlined HTML are replaced together; on
    /// failure the session stays on the Dashboard with its document intact,
    /// so the user can retry without re-uploading.
    pub async fn run_analysis(&mut self) {
        if self.busy {
            tracing::debug!("Analysis rejected: another request is in flight");
            return;
        }

        let doc_id = match &self.document {
            Some(doc) => doc.doc_id.clone(),
            None => {
                tracing::warn!("Analysis requested without a document");
                return;
            }
        };

        self.busy = true;
        tracing::info!(doc_id = %doc_id, "Running analysis");
        let outcome = self.client.analyze_document(&doc_id).await;
        self.complete_analysis(outcome);
    }

    /// Apply the outcome of an analysis request.
    fn complete_analysis(&mut self, outcome: Result<AnalyzeResponse>) {
        self.busy = false;

        match outcome {
            Ok(analysis) => {
                if !analysis.analysis.is_consistent() {
                    tracing::warn!(
                        doc_id = %analysis.doc_id,
                        "Risk summary does not cover every clause"
                    );
                }
                tracing::info!(
                    doc_id = %analysis.doc_id,
                    clauses = analysis.classified_clauses.len(),
                    overall = %analysis.analysis.overall_risk,
                    "Analysis complete"
                );
                // Result, clauses, and redline replace each other together;
                // a render never observes one updated and another stale.
                self.result = Some(analysis.analysis);
                self.clauses = analysis.classified_clauses;
                self.redlined_html = analysis.redlined_html;
                self.selected_clause = None;
                self.phase = SessionPhase::Results;
                self.notify("Analysis completed!", Severity::Success);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed");
                self.notify(&format!("Analysis failed: {}", e), Severity::Error);
            }
        }
    }

    // ========== Clause Selection ==========

    /// Open the detail view for the clause behind a redline marker.
    ///
    /// Marker indices come from backend-generated HTML the client does not
    /// control; anything out of range is ignored rather than surfaced.
    pub fn select_clause(&mut self, marker_index: usize) {
        if marker_index < self.clauses.len() {
            self.selected_clause = Some(marker_index);
        } else {
            tracing::debug!(
                marker_index,
                clauses = self.clauses.len(),
                "Ignoring out-of-range clause marker"
            );
        }
    }

    /// Close the clause detail view.
    pub fn close_clause_detail(&mut self) {
        self.selected_clause = None;
    }

    // ========== Export ==========

    /// Snapshot the current analysis as an export artifact.
    ///
    /// The artifact is a deep copy: later session mutations never reach an
    /// artifact that was already produced. Without a document and result
    /// this is a no-op with a warning notification — the presentation layer
    /// should have disabled the action.
    pub fn export_snapshot(&mut self) -> Option<ExportArtifact> {
        let (document, result) = match (&self.document, &self.result) {
            (Some(d), Some(r)) => (d.clone(), r.clone()),
            _ => {
                tracing::warn!(error = %Error::NothingToExport, "Export requested too early");
                self.notify("Nothing to export yet", Severity::Warning);
                return None;
            }
        };

        let artifact = ExportArtifact {
            document,
            analysis: result,
            clauses: self.clauses.clone(),
        };
        self.notify("Analysis exported successfully!", Severity::Success);
        Some(artifact)
    }

    // ========== Reset ==========

    /// Drop the session back to the Upload phase.
    ///
    /// Clears the document, analysis, clauses, redline, and selection.
    /// Notifications are left alone: each runs out its own clock
    /// independently of the phase.
    pub fn reset(&mut self) {
        tracing::info!("Session reset");
        self.document = None;
        self.result = None;
        self.clauses.clear();
        self.redlined_html.clear();
        self.selected_clause = None;
        self.phase = SessionPhase::Upload;
    }

    // ========== Notifications ==========

    /// Append a notification with a fresh id and a 5 second expiry deadline.
    pub fn notify(&mut self, message: &str, severity: Severity) {
        let created_at = Utc::now();
        let id = format!("{}-{}", created_at.timestamp_millis(), self.notification_seq);
        self.notification_seq += 1;

        self.notifications.push(Notification {
            id,
            message: message.to_string(),
            severity,
            created_at,
            deadline: Instant::now() + NOTIFICATION_TTL,
        });
    }

    /// Dismiss one notification early. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: &str) {
        self.notifications.retain(|n| n.id != id);
    }

    /// Drop every notification whose deadline has passed.
    ///
    /// Driven by the presentation layer's tick. Expiry state lives entirely
    /// in the notifications themselves, so dropping the controller cancels
    /// every pending expiry with it.
    pub fn expire_notifications(&mut self, now: Instant) {
        self.notifications.retain(|n| !n.is_expired(now));
    }
}

/// Blocking wrapper around [`SessionController`]
///
/// Owns a current-thread tokio runtime so synchronous callers (the terminal
/// event loop) can drive the async operations to completion without holding
/// a runtime of their own.
pub struct SyncSession {
    inner: SessionController,
    runtime: tokio::runtime::Runtime,
}

impl SyncSession {
    /// Create a blocking session over the given backend client.
    pub fn new(client: AnalysisClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: SessionController::new(client),
            runtime,
        })
    }

    /// Startup health check (blocking)
    pub fn initialize(&mut self) {
        let Self { inner, runtime } = self;
        runtime.block_on(inner.initialize());
    }

    /// Upload a contract PDF (blocking)
    pub fn submit_upload(&mut self, filename: &str, bytes: Vec<u8>) {
        let Self { inner, runtime } = self;
        runtime.block_on(inner.submit_upload(filename, bytes));
    }

    /// Run the risk analysis (blocking)
    pub fn run_analysis(&mut self) {
        let Self { inner, runtime } = self;
        runtime.block_on(inner.run_analysis());
    }

    /// Shared access to the controller for accessors
    pub fn session(&self) -> &SessionController {
        &self.inner
    }

    /// Mutable access to the controller for the synchronous operations
    /// (selection, dismissal, export, reset, expiry)
    pub fn session_mut(&mut self) -> &mut SessionController {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AnalysisClient;
    use crate::config::BackendConfig;
    use crate::types::{Classification, RiskLevel, RiskPercentage, RiskSummary};

    /// Client pointed at a port nothing listens on, so any request that
    /// does reach the network fails fast with a transport error.
    fn unreachable_client() -> AnalysisClient {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        };
        AnalysisClient::new(&config).unwrap()
    }

    fn controller() -> SessionController {
        SessionController::new(unreachable_client())
    }

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            doc_id: "d1".to_string(),
            filename: "contract.pdf".to_string(),
            total_chunks: 12,
            total_clauses: 5,
            word_count: 3400,
        }
    }

    fn sample_clause(level: RiskLevel, text: &str) -> ClassifiedClause {
        ClassifiedClause {
            text: text.to_string(),
            classification: Classification {
                risk_level: level,
                explanation: "test clause".to_string(),
                confidence: 0.9,
                rule_based: None,
                rag_based: None,
                recommendations: vec![],
            },
        }
    }

    fn sample_analysis() -> AnalyzeResponse {
        AnalyzeResponse {
            success: true,
            doc_id: "d1".to_string(),
            analysis: AnalysisResult {
                risk_summary: RiskSummary {
                    red: 1,
                    amber: 2,
                    green: 2,
                },
                risk_percentage: RiskPercentage {
                    red: 20.0,
                    amber: 40.0,
                    green: 40.0,
                },
                overall_risk: RiskLevel::Amber,
                total_clauses: 5,
                recommendations: vec!["Review indemnification language".to_string()],
            },
            classified_clauses: vec![
                sample_clause(RiskLevel::Red, "Unlimited liability clause"),
                sample_clause(RiskLevel::Amber, "Auto-renewal clause"),
                sample_clause(RiskLevel::Amber, "Late payment penalty"),
                sample_clause(RiskLevel::Green, "Governing law clause"),
                sample_clause(RiskLevel::Green, "Notice clause"),
            ],
            redlined_html: "<div data-clause-index=\"0\">...</div>".to_string(),
        }
    }

    fn sample_upload() -> UploadResponse {
        UploadResponse {
            success: true,
            message: "Document uploaded and processed successfully".to_string(),
            doc_id: "d1".to_string(),
            metadata: sample_metadata(),
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf_locally() {
        let mut session = controller();
        // The client targets an unreachable backend; a fast clean rejection
        // proves validation short-circuits before the network.
        session.submit_upload("notes.txt", vec![0u8; 128]).await;

        assert_eq!(session.phase(), SessionPhase::Upload);
        assert!(session.document().is_none());
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversize_locally() {
        let mut session = controller();
        session
            .submit_upload("contract.pdf", vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize])
            .await;

        assert_eq!(session.phase(), SessionPhase::Upload);
        assert!(session.document().is_none());
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].severity, Severity::Error);
    }

    #[test]
    fn test_upload_extension_check_is_case_insensitive() {
        assert!(validate_upload("CONTRACT.PDF", 1024).is_ok());
        assert!(validate_upload("lease.Pdf", 1024).is_ok());
        assert!(validate_upload("lease.pdf.exe", 1024).is_err());
        assert!(validate_upload("contract.pdf", MAX_UPLOAD_BYTES).is_ok());
    }

    #[tokio::test]
    async fn test_upload_backend_failure_leaves_state_unchanged() {
        let mut session = controller();
        session.submit_upload("contract.pdf", vec![0u8; 128]).await;

        assert_eq!(session.phase(), SessionPhase::Upload);
        assert!(session.document().is_none());
        assert!(!session.is_busy());
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].severity, Severity::Error);
    }

    #[test]
    fn test_upload_success_moves_to_dashboard() {
        let mut session = controller();
        session.complete_upload(Ok(sample_upload()));

        assert_eq!(session.phase(), SessionPhase::Dashboard);
        assert_eq!(session.document(), Some(&sample_metadata()));
        assert!(!session.is_busy());
        assert_eq!(session.notifications()[0].severity, Severity::Success);
    }

    #[test]
    fn test_analysis_success_replaces_everything_together() {
        let mut session = controller();
        session.complete_upload(Ok(sample_upload()));
        session.complete_analysis(Ok(sample_analysis()));

        assert_eq!(session.phase(), SessionPhase::Results);
        let result = session.result().unwrap();
        assert!(result.is_consistent());
        assert_eq!(result.risk_summary.total(), result.total_clauses);
        assert_eq!(session.clauses().len(), 5);
        assert!(!session.redlined_html().is_empty());
    }

    #[test]
    fn test_analysis_failure_keeps_document_for_retry() {
        let mut session = controller();
        session.complete_upload(Ok(sample_upload()));
        session.complete_analysis(Err(Error::Backend("API error (500): boom".to_string())));

        assert_eq!(session.phase(), SessionPhase::Dashboard);
        assert!(session.document().is_some());
        assert!(session.result().is_none());
        assert!(session.clauses().is_empty());
        assert!(!session.is_busy());
        let last = session.notifications().last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert!(last.message.contains("boom"));
    }

    #[tokio::test]
    async fn test_analysis_without_document_is_noop() {
        let mut session = controller();
        session.run_analysis().await;

        assert_eq!(session.phase(), SessionPhase::Upload);
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_select_clause_bounds() {
        let mut session = controller();
        session.complete_upload(Ok(sample_upload()));
        session.complete_analysis(Ok(sample_analysis()));

        session.select_clause(2);
        assert_eq!(session.selected_index(), Some(2));
        assert!(session.selected_clause().is_some());

        // Out-of-range markers never move or clear the selection
        session.select_clause(99);
        assert_eq!(session.selected_index(), Some(2));

        session.close_clause_detail();
        assert_eq!(session.selected_index(), None);

        // Selecting on an empty session is equally harmless
        session.reset();
        session.select_clause(0);
        assert_eq!(session.selected_index(), None);
    }

    #[test]
    fn test_reset_clears_session_but_not_notifications() {
        let mut session = controller();
        session.complete_upload(Ok(sample_upload()));
        session.complete_analysis(Ok(sample_analysis()));
        let notifications_before = session.notifications().len();
        assert!(notifications_before > 0);

        session.reset();

        assert_eq!(session.phase(), SessionPhase::Upload);
        assert!(session.document().is_none());
        assert!(session.result().is_none());
        assert!(session.clauses().is_empty());
        assert!(session.redlined_html().is_empty());
        assert_eq!(session.selected_index(), None);
        assert_eq!(session.notifications().len(), notifications_before);
    }

    #[test]
    fn test_export_requires_analysis() {
        let mut session = controller();
        assert!(session.export_snapshot().is_none());
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].severity, Severity::Warning);

        // Document alone is not enough
        session.complete_upload(Ok(sample_upload()));
        assert!(session.export_snapshot().is_none());
    }

    #[test]
    fn test_export_snapshots_are_deep_equal_and_detached() {
        let mut session = controller();
        session.complete_upload(Ok(sample_upload()));
        session.complete_analysis(Ok(sample_analysis()));

        let first = session.export_snapshot().unwrap();
        let second = session.export_snapshot().unwrap();
        assert_eq!(first, second);

        // A later reset must not reach into an already-produced artifact
        session.reset();
        assert_eq!(first.document.doc_id, "d1");
        assert_eq!(first.clauses.len(), 5);
    }

    #[test]
    fn test_notification_ids_distinct_within_same_instant() {
        let mut session = controller();
        session.notify("first", Severity::Info);
        session.notify("second", Severity::Info);

        let ids: Vec<&str> = session.notifications().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_notification_expiry_and_dismissal_are_independent() {
        let mut session = controller();
        session.notify("one", Severity::Info);
        session.notify("two", Severity::Warning);
        session.notify("three", Severity::Error);

        let second_id = session.notifications()[1].id.clone();
        session.dismiss(&second_id);
        assert_eq!(session.notifications().len(), 2);
        assert!(session.notifications().iter().all(|n| n.id != second_id));

        // Nothing has hit its deadline yet
        session.expire_notifications(Instant::now());
        assert_eq!(session.notifications().len(), 2);

        // Past the deadline everything goes
        session.expire_notifications(Instant::now() + NOTIFICATION_TTL);
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_busy_gate_rejects_reentry() {
        let mut session = controller();
        session.busy = true;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(session.submit_upload("contract.pdf", vec![0u8; 16]));
        runtime.block_on(session.run_analysis());

        // Rejected at the boundary: no notifications, no phase change
        assert!(session.notifications().is_empty());
        assert_eq!(session.phase(), SessionPhase::Upload);
    }
}
