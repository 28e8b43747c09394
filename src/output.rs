//! Human-readable and JSON rendering of ranked results.

use hybrid_search::RankedResult;
use serde::Serialize;

use crate::error::{AppError, Result};

/// JSON envelope printed by `search --json`.
#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    /// The query as entered.
    pub query: &'a str,
    /// Number of results returned.
    pub count: usize,
    /// Ranked results, best first.
    pub results: &'a [RankedResult],
}

/// Render results as pretty JSON.
///
/// # Errors
///
/// Returns [`AppError::Config`] if serialization fails.
pub fn render_json(query: &str, results: &[RankedResult]) -> Result<String> {
    let output = SearchOutput {
        query,
        count: results.len(),
        results,
    };
    serde_json::to_string_pretty(&output).map_err(|e| AppError::Config(e.to_string()))
}

/// Render results as a numbered list with their score breakdown.
pub fn render_text(results: &[RankedResult]) -> String {
    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let explain = result.explain.rounded();
        let sources: Vec<&str> = result.sources.iter().map(|s| s.name()).collect();
        out.push_str(&format!(
            "{:>2}. {:.4}  {}  [{}]\n",
            rank + 1,
            result.final_score,
            display_title(result),
            result.document_id
        ));
        out.push_str(&format!(
            "    semantic {:.4}  lexical {:.4}  phrase {:.4}  fuzzy {:.4}  via {}\n",
            explain.semantic,
            explain.lexical,
            explain.phrase,
            explain.fuzzy,
            sources.join("+")
        ));
    }
    out
}

fn display_title(result: &RankedResult) -> &str {
    if result.title.is_empty() {
        "(untitled)"
    } else {
        &result.title
    }
}
