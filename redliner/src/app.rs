//! Application state for the TUI.
//!
//! [`App`] owns the presentation-side state only: file picker rows, table
//! selections, scroll offsets. Everything about the session itself (phase,
//! document, analysis, notifications) lives in the session controller and is
//! read back through its accessors at render time.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;
use redliner_core::{SessionPhase, Severity, SyncSession};

use crate::redline::{parse_redlined_html, RedlineBlock};

/// A backend call queued by a key handler, executed by the main loop after
/// the busy overlay has been drawn.
#[derive(Debug, Clone)]
pub enum PendingAction {
    Upload { path: PathBuf, filename: String },
    Analyze,
}

impl PendingAction {
    /// Overlay label shown while the call is in flight.
    pub fn label(&self) -> &'static str {
        match self {
            PendingAction::Upload { .. } => "Uploading and processing...",
            PendingAction::Analyze => "Analyzing contract clauses...",
        }
    }
}

/// One selectable row in the upload view's file picker.
#[derive(Debug, Clone)]
pub struct PdfEntry {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Main application state.
pub struct App {
    /// Session controller behind its blocking wrapper
    pub session: SyncSession,
    /// Directory scanned for contract PDFs
    scan_dir: PathBuf,
    /// Directory export artifacts are written to
    export_dir: PathBuf,
    /// PDFs found in the scan directory
    pub pdf_files: Vec<PdfEntry>,
    /// File picker selection state
    pub file_table_state: TableState,
    /// Error from the last directory scan, if any
    pub scan_error: Option<String>,
    /// Redline blocks parsed from the current analysis
    pub blocks: Vec<RedlineBlock>,
    /// Redline block selection state
    pub block_table_state: TableState,
    /// Scroll offset for the clause detail overlay
    pub detail_scroll: usize,
    /// Backend call queued for the main loop
    pending: Option<PendingAction>,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    /// Create a new App and scan for PDFs.
    pub fn new(session: SyncSession, scan_dir: PathBuf, export_dir: PathBuf) -> Self {
        let mut app = Self {
            session,
            scan_dir,
            export_dir,
            pdf_files: Vec::new(),
            file_table_state: TableState::default(),
            scan_error: None,
            blocks: Vec::new(),
            block_table_state: TableState::default(),
            detail_scroll: 0,
            pending: None,
            should_quit: false,
        };
        app.rescan_files();
        app
    }

    /// Directory the upload view scans.
    pub fn scan_dir(&self) -> &PathBuf {
        &self.scan_dir
    }

    /// Advance per-frame state: expire notification deadlines.
    pub fn tick(&mut self) {
        self.session
            .session_mut()
            .expire_notifications(Instant::now());
    }

    /// Take the queued backend call, if any.
    pub fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Execute a queued backend call on the blocking session.
    pub fn run_pending(&mut self, action: PendingAction) {
        match action {
            PendingAction::Upload { path, filename } => match std::fs::read(&path) {
                Ok(bytes) => self.session.submit_upload(&filename, bytes),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not read file");
                    self.session.session_mut().notify(
                        &format!("Could not read {}: {}", filename, e),
                        Severity::Error,
                    );
                }
            },
            PendingAction::Analyze => {
                self.session.run_analysis();
                self.refresh_blocks();
            }
        }
    }

    /// Rebuild the redline block cache from the session's current analysis.
    fn refresh_blocks(&mut self) {
        self.blocks = parse_redlined_html(self.session.session().redlined_html());
        self.block_table_state = TableState::default();
        if !self.blocks.is_empty() {
            self.block_table_state.select(Some(0));
        }
    }

    /// Scan the working directory for PDF files.
    pub fn rescan_files(&mut self) {
        self.pdf_files.clear();
        self.scan_error = None;

        let entries = match std::fs::read_dir(&self.scan_dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.scan_error = Some(format!("{}: {}", self.scan_dir.display(), e));
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf || !path.is_file() {
                continue;
            }
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            self.pdf_files.push(PdfEntry {
                name,
                path,
                size_bytes,
            });
        }

        self.pdf_files.sort_by(|a, b| a.name.cmp(&b.name));

        self.file_table_state = TableState::default();
        if !self.pdf_files.is_empty() {
            self.file_table_state.select(Some(0));
        }
    }

    // ========== Key Handling ==========

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // The clause detail overlay captures input while open
        if self.session.session().selected_clause().is_some() {
            self.handle_detail_key(key);
            return;
        }

        match self.session.session().phase() {
            SessionPhase::Upload => self.handle_upload_key(key),
            SessionPhase::Dashboard => self.handle_dashboard_key(key),
            SessionPhase::Results => self.handle_results_key(key),
        }
    }

    /// Handle keyboard input in the upload view.
    fn handle_upload_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Enter => {
                self.queue_upload();
            }
            KeyCode::Char('r') => {
                self.rescan_files();
            }
            KeyCode::Char('x') => {
                self.dismiss_newest_notification();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                select_next(&mut self.file_table_state, self.pdf_files.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                select_previous(&mut self.file_table_state, self.pdf_files.len());
            }
            KeyCode::Home | KeyCode::Char('g') => {
                if !self.pdf_files.is_empty() {
                    self.file_table_state.select(Some(0));
                }
            }
            KeyCode::End | KeyCode::Char('G') => {
                if !self.pdf_files.is_empty() {
                    self.file_table_state.select(Some(self.pdf_files.len() - 1));
                }
            }
            _ => {}
        }
    }

    /// Handle keyboard input in the dashboard view.
    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('a') | KeyCode::Enter => {
                if !self.session.session().is_busy() {
                    self.pending = Some(PendingAction::Analyze);
                }
            }
            KeyCode::Char('e') => {
                self.export();
            }
            KeyCode::Char('n') => {
                self.reset();
            }
            KeyCode::Char('x') => {
                self.dismiss_newest_notification();
            }
            _ => {}
        }
    }

    /// Handle keyboard input in the results view.
    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Enter => {
                self.open_selected_block();
            }
            KeyCode::Char('e') => {
                self.export();
            }
            KeyCode::Char('n') => {
                self.reset();
            }
            KeyCode::Char('x') => {
                self.dismiss_newest_notification();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                select_next(&mut self.block_table_state, self.blocks.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                select_previous(&mut self.block_table_state, self.blocks.len());
            }
            KeyCode::Home | KeyCode::Char('g') => {
                if !self.blocks.is_empty() {
                    self.block_table_state.select(Some(0));
                }
            }
            KeyCode::End | KeyCode::Char('G') => {
                if !self.blocks.is_empty() {
                    self.block_table_state.select(Some(self.blocks.len() - 1));
                }
            }
            _ => {}
        }
    }

    /// Handle keyboard input while the clause detail overlay is open.
    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.session.session_mut().close_clause_detail();
                self.detail_scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    // ========== Actions ==========

    /// Queue an upload for the selected file.
    fn queue_upload(&mut self) {
        if self.session.session().is_busy() {
            return;
        }
        if let Some(idx) = self.file_table_state.selected() {
            if let Some(entry) = self.pdf_files.get(idx) {
                self.pending = Some(PendingAction::Upload {
                    path: entry.path.clone(),
                    filename: entry.name.clone(),
                });
            }
        }
    }

    /// Map the selected redline block to its clause and open the detail view.
    ///
    /// Blocks without a marker are informational and not selectable; an
    /// out-of-range marker falls through the controller's bounds check.
    fn open_selected_block(&mut self) {
        if let Some(idx) = self.block_table_state.selected() {
            if let Some(block) = self.blocks.get(idx) {
                if let Some(marker_index) = block.marker_index {
                    self.session.session_mut().select_clause(marker_index);
                    self.detail_scroll = 0;
                }
            }
        }
    }

    /// Snapshot the current analysis and write it to the export directory.
    fn export(&mut self) {
        let artifact = match self.session.session_mut().export_snapshot() {
            Some(artifact) => artifact,
            None => return,
        };

        if let Err(e) = artifact.write_to(&self.export_dir) {
            tracing::warn!(error = %e, "Failed to write export artifact");
            self.session
                .session_mut()
                .notify(&format!("Export failed: {}", e), Severity::Error);
        }
    }

    /// Start a fresh session.
    fn reset(&mut self) {
        self.session.session_mut().reset();
        self.blocks.clear();
        self.block_table_state = TableState::default();
        self.detail_scroll = 0;
        self.rescan_files();
    }

    /// Dismiss the newest notification, if any.
    fn dismiss_newest_notification(&mut self) {
        let id = self
            .session
            .session()
            .notifications()
            .last()
            .map(|n| n.id.clone());
        if let Some(id) = id {
            self.session.session_mut().dismiss(&id);
        }
    }
}

/// Select the next row in a table, wrapping at the end.
fn select_next(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

/// Select the previous row in a table, wrapping at the start.
fn select_previous(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use redliner_core::config::BackendConfig;
    use redliner_core::AnalysisClient;

    fn test_app(scan_dir: PathBuf) -> App {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        };
        let client = AnalysisClient::new(&config).unwrap();
        let session = SyncSession::new(client).unwrap();
        App::new(session, scan_dir, PathBuf::from("/tmp"))
    }

    #[test]
    fn test_scan_finds_only_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lease.pdf"), b"%PDF-").unwrap();
        std::fs::write(dir.path().join("NOTES.PDF"), b"%PDF-").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let app = test_app(dir.path().to_path_buf());
        let names: Vec<&str> = app.pdf_files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["NOTES.PDF", "lease.pdf"]);
        assert_eq!(app.file_table_state.selected(), Some(0));
    }

    #[test]
    fn test_scan_missing_directory_sets_error() {
        let app = test_app(PathBuf::from("/definitely/not/here"));
        assert!(app.pdf_files.is_empty());
        assert!(app.scan_error.is_some());
    }

    #[test]
    fn test_enter_queues_upload_for_selected_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lease.pdf"), b"%PDF-").unwrap();

        let mut app = test_app(dir.path().to_path_buf());
        app.handle_key(KeyEvent::from(KeyCode::Enter));

        match app.take_pending() {
            Some(PendingAction::Upload { filename, .. }) => assert_eq!(filename, "lease.pdf"),
            other => panic!("expected queued upload, got {:?}", other),
        }
    }

    #[test]
    fn test_selection_wraps() {
        let mut state = TableState::default();
        select_next(&mut state, 2);
        assert_eq!(state.selected(), Some(0));
        select_next(&mut state, 2);
        assert_eq!(state.selected(), Some(1));
        select_next(&mut state, 2);
        assert_eq!(state.selected(), Some(0));
        select_previous(&mut state, 2);
        assert_eq!(state.selected(), Some(1));
    }

    #[test]
    fn test_selection_noop_when_empty() {
        let mut state = TableState::default();
        select_next(&mut state, 0);
        assert_eq!(state.selected(), None);
    }
}
