//! Recovery of a JSON document from free-form model output.
//!
//! The model is asked for bare JSON but is not bound to it: answers arrive
//! wrapped in markdown fences or surrounded by prose. Strategies are tried in
//! a fixed order and the first one that yields a document wins.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::core::error::BridgeError;
use crate::core::text::truncate_preview;

/// Maximum characters of the offending text kept in an extraction error.
pub const MAX_EXTRACTION_PREVIEW: usize = 200;

const FENCE: &str = "```";

/// The strategy that produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// The whole (trimmed) text was JSON.
    Direct,
    /// The interior of the first fenced code block was JSON.
    FencedBlock,
    /// The span from the first `{` to the last `}` was JSON.
    BraceSpan,
}

impl ExtractionStrategy {
    /// All strategies in the order they are tried.
    pub const ORDER: [Self; 3] = [Self::Direct, Self::FencedBlock, Self::BraceSpan];

    /// Runs this strategy on `text`.
    #[must_use]
    pub fn apply(self, text: &str) -> Option<Value> {
        match self {
            Self::Direct => parse_direct(text),
            Self::FencedBlock => parse_fenced_block(text),
            Self::BraceSpan => parse_brace_span(text),
        }
    }

    /// Returns the strategy name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::FencedBlock => "fenced-block",
            Self::BraceSpan => "brace-span",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JSON document and the strategy that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub value: Value,
    pub strategy: ExtractionStrategy,
}

/// Recovers a JSON document from `text`.
///
/// # Errors
///
/// Returns [`BridgeError::Extraction`] with a truncated preview of `text`
/// when no strategy succeeds.
pub fn extract(text: &str) -> Result<ExtractedDocument, BridgeError> {
    for strategy in ExtractionStrategy::ORDER {
        if let Some(value) = strategy.apply(text) {
            debug!(strategy = %strategy, "extracted JSON document");
            return Ok(ExtractedDocument { value, strategy });
        }
        debug!(strategy = %strategy, "extraction strategy did not match");
    }

    Err(BridgeError::Extraction {
        preview: truncate_preview(text.trim(), MAX_EXTRACTION_PREVIEW),
    })
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

/// Parses the interior of the first ```` ``` ```` fence, skipping a `json` tag.
fn parse_fenced_block(text: &str) -> Option<Value> {
    let open = text.find(FENCE)? + FENCE.len();
    let rest = &text[open..];
    let rest = strip_prefix_ignore_ascii_case(rest, "json").unwrap_or(rest);
    let close = rest.find(FENCE)?;
    serde_json::from_str(rest[..close].trim()).ok()
}

fn parse_brace_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Strategy ordering
    // =========================================================================

    mod ordering {
        use super::*;

        /// Tests that bare JSON is handled by the direct strategy.
        #[test]
        fn bare_object_uses_direct() -> anyhow::Result<()> {
            let doc = extract(r#"{"tasks": [], "metadata": {}}"#)?;
            assert_eq!(doc.strategy, ExtractionStrategy::Direct);
            assert_eq!(doc.value, json!({"tasks": [], "metadata": {}}));
            Ok(())
        }

        /// Tests that a bare array is handled by the direct strategy.
        #[test]
        fn bare_array_uses_direct() -> anyhow::Result<()> {
            let doc = extract("  [1, 2, 3]\n")?;
            assert_eq!(doc.strategy, ExtractionStrategy::Direct);
            assert_eq!(doc.value, json!([1, 2, 3]));
            Ok(())
        }

        /// Tests that a json-tagged fence is handled by the fenced strategy.
        #[test]
        fn json_fence_uses_fenced_block() -> anyhow::Result<()> {
            let doc = extract("```json\n{\"a\":1}\n```")?;
            assert_eq!(doc.strategy, ExtractionStrategy::FencedBlock);
            assert_eq!(doc.value, json!({"a": 1}));
            Ok(())
        }

        /// Tests that prose around an object falls through to the brace span.
        #[test]
        fn prose_uses_brace_span() -> anyhow::Result<()> {
            let doc = extract("Here is the result: {\"a\":1} — done")?;
            assert_eq!(doc.strategy, ExtractionStrategy::BraceSpan);
            assert_eq!(doc.value, json!({"a": 1}));
            Ok(())
        }

        /// Tests that text without any brace pair fails.
        #[test]
        fn no_braces_fails() {
            match extract("I could not produce any tasks for this document.") {
                Err(BridgeError::Extraction { preview }) => {
                    assert_eq!(preview, "I could not produce any tasks for this document.");
                }
                other => panic!("Expected Extraction error, got {other:?}"),
            }
        }
    }

    // =========================================================================
    // Individual strategies
    // =========================================================================

    mod strategies {
        use super::*;

        /// Tests that an untagged fence is accepted.
        #[test]
        fn untagged_fence() {
            let value = ExtractionStrategy::FencedBlock.apply("Result:\n```\n{\"a\": [1]}\n```\nThanks");
            assert_eq!(value, Some(json!({"a": [1]})));
        }

        /// Tests that the json tag is matched case-insensitively.
        #[test]
        fn uppercase_json_tag() {
            let value = ExtractionStrategy::FencedBlock.apply("```JSON\n[{\"taskId\": 1}]\n```");
            assert_eq!(value, Some(json!([{"taskId": 1}])));
        }

        /// Tests that a fenced array is recovered, which the brace span cannot do.
        #[test]
        fn fenced_array_with_prose() -> anyhow::Result<()> {
            let text = "Analysis below.\n```json\n[{\"taskId\": 1}, {\"taskId\": 2}]\n```";
            let doc = extract(text)?;
            assert_eq!(doc.strategy, ExtractionStrategy::FencedBlock);
            assert_eq!(doc.value, json!([{"taskId": 1}, {"taskId": 2}]));
            Ok(())
        }

        /// Tests that an unterminated fence does not match.
        #[test]
        fn unterminated_fence() {
            assert_eq!(ExtractionStrategy::FencedBlock.apply("```json\n{\"a\":1}"), None);
        }

        /// Tests that a broken fence is not repaired by the brace span.
        #[test]
        fn invalid_fence_and_span_fail() {
            let text = "```json\n{\"a\": 1,}\n```\nCorrected: {\"a\": 2}";
            assert!(matches!(extract(text), Err(BridgeError::Extraction { .. })));
        }

        /// Tests that a fence with prose inside falls through to the brace span.
        #[test]
        fn prose_in_fence_falls_through() -> anyhow::Result<()> {
            let text = "```\nThe answer is {\"a\": 2}\n```";
            let doc = extract(text)?;
            assert_eq!(doc.strategy, ExtractionStrategy::BraceSpan);
            assert_eq!(doc.value, json!({"a": 2}));
            Ok(())
        }

        /// Tests that a closing brace before the opening brace does not match.
        #[test]
        fn reversed_braces() {
            assert_eq!(ExtractionStrategy::BraceSpan.apply("} nothing {"), None);
        }

        /// Tests that nested objects are recovered whole.
        #[test]
        fn nested_brace_span() {
            let value = ExtractionStrategy::BraceSpan
                .apply("Sure! {\"tasks\": [{\"id\": 1, \"meta\": {\"x\": true}}]} Let me know.");
            assert_eq!(value, Some(json!({"tasks": [{"id": 1, "meta": {"x": true}}]})));
        }

        /// Tests that the preview in the error is truncated.
        #[test]
        fn preview_is_truncated() {
            let text = "no json here ".repeat(100);
            match extract(&text) {
                Err(BridgeError::Extraction { preview }) => {
                    assert_eq!(preview.chars().count(), MAX_EXTRACTION_PREVIEW);
                }
                other => panic!("Expected Extraction error, got {other:?}"),
            }
        }
    }
}
