//! Core domain types for redliner
//!
//! These types mirror the analysis backend's wire model: a document is
//! uploaded once, segmented into clauses server-side, and every clause comes
//! back with an independent risk classification. The client never derives or
//! re-orders any of this — it stores what the backend returns.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Document** | One uploaded contract PDF, identified by a backend-issued `doc_id` |
//! | **Clause** | A segmented unit of contract text classified independently for risk |
//! | **Risk level** | RED (high), AMBER (medium), GREEN (low) |
//! | **Redlined HTML** | Backend-produced markup embedding clause boundaries as interactive markers |
//! | **Notification** | A transient user-facing toast with its own expiry |
//! | **Session phase** | Current stage of the upload → analyze → review workflow |

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Risk Levels
// ============================================

/// Risk classification for a clause or a whole document.
///
/// Ordered by severity: `Green < Amber < Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "GREEN")]
    Green,
    #[serde(rename = "AMBER")]
    Amber,
    #[serde(rename = "RED")]
    Red,
}

impl RiskLevel {
    /// Returns the wire identifier for this risk level
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Red => "RED",
            RiskLevel::Amber => "AMBER",
            RiskLevel::Green => "GREEN",
        }
    }

    /// Returns the human-facing label
    pub fn display_name(&self) -> &'static str {
        match self {
            RiskLevel::Red => "High Risk",
            RiskLevel::Amber => "Medium Risk",
            RiskLevel::Green => "Low Risk",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RED" | "red" => Ok(RiskLevel::Red),
            "AMBER" | "amber" => Ok(RiskLevel::Amber),
            "GREEN" | "green" => Ok(RiskLevel::Green),
            _ => Err(format!("unknown risk level: {}", s)),
        }
    }
}

// ============================================
// Document Metadata
// ============================================

/// Metadata for an uploaded document, as returned by the backend.
///
/// Immutable once the upload succeeds; cleared only by a session reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Opaque backend identifier, unique per upload
    pub doc_id: String,
    /// Original filename as uploaded
    pub filename: String,
    /// Number of text chunks extracted server-side
    pub total_chunks: u64,
    /// Number of clauses detected server-side
    pub total_clauses: u64,
    /// Word count of the extracted text
    pub word_count: u64,
}

// ============================================
// Analysis Result
// ============================================

/// Per-level clause counts for one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    #[serde(rename = "RED")]
    pub red: u64,
    #[serde(rename = "AMBER")]
    pub amber: u64,
    #[serde(rename = "GREEN")]
    pub green: u64,
}

impl RiskSummary {
    /// Total clauses across all risk levels
    pub fn total(&self) -> u64 {
        self.red + self.amber + self.green
    }

    /// Count for a single risk level
    pub fn count(&self, level: RiskLevel) -> u64 {
        match level {
            RiskLevel::Red => self.red,
            RiskLevel::Amber => self.amber,
            RiskLevel::Green => self.green,
        }
    }
}

/// Per-level clause percentages for one analysis (sums to ~100).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskPercentage {
    #[serde(rename = "RED")]
    pub red: f64,
    #[serde(rename = "AMBER")]
    pub amber: f64,
    #[serde(rename = "GREEN")]
    pub green: f64,
}

/// Document-level analysis outcome.
///
/// Replaced wholesale on each analysis, never merged with a previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_summary: RiskSummary,
    pub risk_percentage: RiskPercentage,
    pub overall_risk: RiskLevel,
    pub total_clauses: u64,
    /// Document-level recommendations, in backend order
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Invariant check: the per-level counts must cover every clause.
    pub fn is_consistent(&self) -> bool {
        self.risk_summary.total() == self.total_clauses
    }
}

// ============================================
// Classified Clauses
// ============================================

/// Risk classification for a single clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub risk_level: RiskLevel,
    pub explanation: String,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
    /// Opaque rule-based classifier record, when the backend ran one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_based: Option<serde_json::Value>,
    /// Opaque RAG classifier record, when the backend ran one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_based: Option<serde_json::Value>,
    /// Clause-level recommendations, in backend order
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// One clause with its classification.
///
/// The backend returns these in document order, positionally aligned with the
/// clause markers embedded in the redlined HTML: index `i` in the sequence is
/// the clause carrying marker index `i`. The client must not re-sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedClause {
    pub text: String,
    pub classification: Classification,
}

// ============================================
// Session Phase
// ============================================

/// Current stage of the upload → analyze → review workflow.
///
/// Exactly one phase is active at a time. Transitions:
/// `Upload → Dashboard` on upload success, `Dashboard → Results` on analysis
/// success, and any phase back to `Upload` via reset. There is no path from
/// `Results` back to `Dashboard` — re-analysis starts a fresh session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Upload,
    Dashboard,
    Results,
}

// ============================================
// Notifications
// ============================================

/// How long a notification stays visible unless dismissed earlier.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

/// A transient user-facing message with its own expiry deadline.
///
/// Notifications are independent of each other and of the session phase:
/// dismissing or expiring one never affects the rest, and a reset leaves
/// in-flight notifications running out their own clocks.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Unique id: millisecond timestamp plus a per-session sequence counter,
    /// so ids stay distinct even for notifications created in the same instant
    pub id: String,
    pub message: String,
    pub severity: Severity,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
    /// Instant after which the notification expires
    pub deadline: Instant,
}

impl Notification {
    /// True once the expiry deadline has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_wire_format() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::Amber).unwrap(),
            "\"AMBER\""
        );
        let parsed: RiskLevel = serde_json::from_str("\"RED\"").unwrap();
        assert_eq!(parsed, RiskLevel::Red);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Red > RiskLevel::Amber);
        assert!(RiskLevel::Amber > RiskLevel::Green);
    }

    #[test]
    fn test_risk_level_from_str() {
        assert_eq!("GREEN".parse::<RiskLevel>().unwrap(), RiskLevel::Green);
        assert!("PURPLE".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_risk_summary_total() {
        let summary = RiskSummary {
            red: 1,
            amber: 2,
            green: 2,
        };
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.count(RiskLevel::Amber), 2);
    }

    #[test]
    fn test_risk_summary_upper_case_keys() {
        let json = serde_json::to_value(RiskSummary {
            red: 3,
            amber: 0,
            green: 1,
        })
        .unwrap();
        assert_eq!(json["RED"], 3);
        assert_eq!(json["GREEN"], 1);
    }

    #[test]
    fn test_analysis_result_consistency() {
        let result = AnalysisResult {
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
            recommendations: vec![],
        };
        assert!(result.is_consistent());

        let inconsistent = AnalysisResult {
            total_clauses: 7,
            ..result
        };
        assert!(!inconsistent.is_consistent());
    }

    #[test]
    fn test_classification_optional_records() {
        // rule_based / rag_based may be absent entirely
        let json = r#"{
            "risk_level": "GREEN",
            "explanation": "standard boilerplate",
            "confidence": 0.92,
            "recommendations": []
        }"#;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert!(c.rule_based.is_none());
        assert!(c.rag_based.is_none());
        assert_eq!(c.risk_level, RiskLevel::Green);
    }

    #[test]
    fn test_notification_expiry() {
        let now = Instant::now();
        let n = Notification {
            id: "1-0".to_string(),
            message: "uploaded".to_string(),
            severity: Severity::Success,
            created_at: Utc::now(),
            deadline: now + NOTIFICATION_TTL,
        };
        assert!(!n.is_expired(now));
        assert!(n.is_expired(now + NOTIFICATION_TTL));
    }
}
