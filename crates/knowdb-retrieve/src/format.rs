//! Renders ranked results into the citation block injected into a prompt.

use std::fmt::Write as _;

use knowdb_core::{CitationStyle, Result, RetrievedDocument};

/// Returned instead of an empty string when nothing matched.
pub const NO_RESULTS_MARKER: &str = "No relevant documents found.";

pub fn render(results: &[RetrievedDocument], style: CitationStyle) -> Result<String> {
    if results.is_empty() {
        return Ok(NO_RESULTS_MARKER.to_string());
    }
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        match style {
            CitationStyle::Inline => {
                if i > 0 {
                    out.push('\n');
                }
                write!(out, "{}. {}: {}", r.rank, one_line(&r.document.title), one_line(&r.document.content))?;
            }
            CitationStyle::Block => {
                if i > 0 {
                    out.push_str("\n\n");
                }
                write!(out, "[{}] {}:\n{}", r.rank, r.document.title.trim(), r.document.content.trim())?;
            }
        }
    }
    Ok(out)
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
