//! Terminal rendering of backend redlined HTML.
//!
//! The backend returns the analyzed contract as markup with one element per
//! clause, each carrying a `data-clause-index` attribute whose value is the
//! clause's position in the classified-clause sequence. That attribute is the
//! marker contract: blocks without it are still rendered as plain text but
//! cannot be selected. The markup itself is trusted content from a controlled
//! backend and is only flattened here, never interpreted.

use std::sync::OnceLock;

use redliner_core::RiskLevel;
use regex::Regex;

/// One renderable block of the redlined document.
#[derive(Debug, Clone, PartialEq)]
pub struct RedlineBlock {
    /// Clause marker parsed from `data-clause-index`, when present
    pub marker_index: Option<usize>,
    /// Risk class parsed from the block's `risk-*` CSS class, when present
    pub risk: Option<RiskLevel>,
    /// Tag-stripped, whitespace-collapsed text content
    pub text: String,
}

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"data-clause-index\s*=\s*"(\d+)""#).expect("valid regex"))
}

fn risk_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"risk-(red|amber|green)").expect("valid regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

fn container_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // <style>/<script> content is styling noise, not document text
    RE.get_or_init(|| {
        Regex::new(r"(?s)<style[^>]*>.*?</style>|<script[^>]*>.*?</script>")
            .expect("valid regex")
    })
}

/// Split redlined HTML into renderable blocks, one per clause marker.
///
/// Content before the first marker (legends, styling) becomes an unmarked
/// leading block when it has any visible text. Marker values are taken
/// verbatim: an out-of-range index is passed through and rejected later by
/// the session controller's bounds check.
pub fn parse_redlined_html(html: &str) -> Vec<RedlineBlock> {
    let html = container_regex().replace_all(html, " ").into_owned();

    let mut blocks = Vec::new();
    let mut boundaries: Vec<(usize, usize)> = Vec::new();

    for capture in marker_regex().captures_iter(&html) {
        let whole = capture.get(0).expect("match exists");
        // Walk back to the start of the tag carrying the attribute, so the
        // block boundary sits before the element rather than inside it.
        let tag_start = html[..whole.start()].rfind('<').unwrap_or(whole.start());
        let index: usize = match capture[1].parse() {
            Ok(i) => i,
            Err(_) => continue,
        };
        boundaries.push((tag_start, index));
    }

    let lead_end = boundaries.first().map(|(start, _)| *start).unwrap_or(html.len());
    let lead_text = flatten(&html[..lead_end]);
    if !lead_text.is_empty() {
        blocks.push(RedlineBlock {
            marker_index: None,
            risk: risk_of(&html[..lead_end]),
            text: lead_text,
        });
    }

    for (i, (start, marker_index)) in boundaries.iter().enumerate() {
        let end = boundaries
            .get(i + 1)
            .map(|(next_start, _)| *next_start)
            .unwrap_or(html.len());
        let segment = &html[*start..end];
        let text = flatten(segment);
        if text.is_empty() {
            continue;
        }
        blocks.push(RedlineBlock {
            marker_index: Some(*marker_index),
            risk: risk_of(segment),
            text,
        });
    }

    blocks
}

/// First risk class mentioned in a segment, if any.
fn risk_of(segment: &str) -> Option<RiskLevel> {
    risk_class_regex()
        .captures(segment)
        .and_then(|c| c[1].parse().ok())
}

/// Strip tags, decode common entities, and collapse whitespace.
fn flatten(segment: &str) -> String {
    let stripped = tag_regex().replace_all(segment, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of entities the backend's generator emits.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <div class="redlined-document">
        <style>.risk-red { background-color: #ffebee; }</style>
        <div class="risk-red" data-clause-index="0">
            <div class="risk-indicator">RED RISK <span class="confidence-score">(Confidence: 0.91)</span></div>
            <div class="clause-text">Tenant shall indemnify Landlord &amp; its agents.</div>
        </div>
        <div class="risk-green" data-clause-index="1">
            <div class="clause-text">Notices shall be in writing.</div>
        </div>
    </div>
    "#;

    #[test]
    fn test_parses_marked_blocks_in_order() {
        let blocks = parse_redlined_html(SAMPLE);
        let marked: Vec<&RedlineBlock> =
            blocks.iter().filter(|b| b.marker_index.is_some()).collect();

        assert_eq!(marked.len(), 2);
        assert_eq!(marked[0].marker_index, Some(0));
        assert_eq!(marked[0].risk, Some(RiskLevel::Red));
        assert!(marked[0].text.contains("indemnify Landlord & its agents"));
        assert_eq!(marked[1].marker_index, Some(1));
        assert_eq!(marked[1].risk, Some(RiskLevel::Green));
    }

    #[test]
    fn test_style_content_is_dropped() {
        let blocks = parse_redlined_html(SAMPLE);
        assert!(blocks.iter().all(|b| !b.text.contains("background-color")));
    }

    #[test]
    fn test_unmarked_html_renders_as_plain_block() {
        let blocks = parse_redlined_html("<div class=\"risk-amber\">Auto-renewal clause</div>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].marker_index, None);
        assert_eq!(blocks[0].risk, Some(RiskLevel::Amber));
        assert_eq!(blocks[0].text, "Auto-renewal clause");
    }

    #[test]
    fn test_out_of_range_marker_is_passed_through() {
        let blocks = parse_redlined_html(r#"<div data-clause-index="42">orphan</div>"#);
        assert_eq!(blocks[0].marker_index, Some(42));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_redlined_html("").is_empty());
        assert!(parse_redlined_html("<div></div>").is_empty());
    }

    #[test]
    fn test_entity_decoding() {
        let blocks =
            parse_redlined_html(r#"<div data-clause-index="0">&quot;as is&quot; &#39;basis&#39;</div>"#);
        assert_eq!(blocks[0].text, "\"as is\" 'basis'");
    }
}
