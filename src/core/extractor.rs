//! Narrow contract for the report extractor. Prompting an LLM over filing
//! text and building the Excel/Graphviz/dashboard surfaces is explicitly
//! out of scope (`spec.md` §1) — this crate only defines the shape a
//! caller's extractor must produce so `core::scheduler::worker` can render
//! and hand it to a [`crate::core::notifier::Notifier`].

use async_trait::async_trait;

use crate::core::domain::Filing;
use crate::error::Result;

/// Extracted report content, rendered by the worker into the Markdown
/// template grounded in `original_source`'s `_save_report`
/// (KPIs / Guidance / Summary sections).
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub kpis: Vec<(String, String)>,
    pub guidance: Option<String>,
    pub summary: String,
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, filing: &Filing, text: &str) -> Result<Report>;
}

/// An extractor that skips KPI/guidance extraction and reports only the
/// filing text's length, for deployments running without an LLM-backed
/// extractor wired in.
pub struct PlaceholderExtractor;

#[async_trait]
impl Extractor for PlaceholderExtractor {
    async fn extract(&self, _filing: &Filing, text: &str) -> Result<Report> {
        Ok(Report {
            kpis: Vec::new(),
            guidance: None,
            summary: format!("Filing text captured ({} bytes); no extractor configured.", text.len()),
        })
    }
}

/// Render a [`Report`] into the Markdown template the worker writes to
/// `reports/<ticker>_<accession>.md`.
pub fn render_report_markdown(filing: &Filing, report: &Report) -> String {
    let mut out = format!(
        "# {} — {} ({})\n\n",
        filing.ticker, filing.form_type, filing.filing_date
    );

    if !report.kpis.is_empty() {
        out.push_str("## KPIs\n\n");
        for (name, value) in &report.kpis {
            out.push_str(&format!("- **{name}**: {value}\n"));
        }
        out.push('\n');
    }

    if let Some(guidance) = &report.guidance {
        out.push_str("## Guidance\n\n");
        out.push_str(guidance);
        out.push_str("\n\n");
    }

    out.push_str("## Summary\n\n");
    out.push_str(&report.summary);
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_sections_when_present() {
        let filing = Filing {
            accession_number: "0001".into(),
            ticker: "AAPL".into(),
            filing_date: "2026-01-01".into(),
            form_type: "8-K".into(),
            title: "title".into(),
            url: None,
        };
        let report = Report {
            kpis: vec![("Revenue".into(), "$1B".into())],
            guidance: Some("Raised FY guidance".into()),
            summary: "Strong quarter.".into(),
        };

        let md = render_report_markdown(&filing, &report);
        assert!(md.contains("## KPIs"));
        assert!(md.contains("## Guidance"));
        assert!(md.contains("## Summary"));
        assert!(md.contains("Revenue"));
    }

    #[test]
    fn omits_optional_sections_when_absent() {
        let filing = Filing {
            accession_number: "0001".into(),
            ticker: "AAPL".into(),
            filing_date: "2026-01-01".into(),
            form_type: "8-K".into(),
            title: "title".into(),
            url: None,
        };
        let report = Report {
            kpis: vec![],
            guidance: None,
            summary: "No notable KPIs.".into(),
        };

        let md = render_report_markdown(&filing, &report);
        assert!(!md.contains("## KPIs"));
        assert!(!md.contains("## Guidance"));
    }
}
