//! NSE (India) corporate-announcements filing adapter.
//!
//! Grounded in `original_source`'s `nse_client.py`: filings arrive as an
//! RSS feed rather than a structured API, so there is no accession number —
//! the entry's feed id stands in for one.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;

use super::pdf::PdfFetcher;
use super::MarketAdapter;
use crate::core::domain::Filing;
use crate::error::{Error, Result};

const RSS_URL: &str = "https://nsearchives.nseindia.com/content/RSS/Corporate_Announcements.xml";

pub struct NseAdapter {
    client: reqwest::Client,
    pdf_fetcher: PdfFetcher,
}

impl NseAdapter {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let pdf_fetcher = PdfFetcher::new(client.clone());
        Ok(Self { client, pdf_fetcher })
    }

    fn ticker_matches(ticker: &str, title: &str) -> bool {
        let symbol = ticker.trim_end_matches(".NS");
        title.to_uppercase().contains(&symbol.to_uppercase())
    }
}

#[async_trait]
impl MarketAdapter for NseAdapter {
    async fn get_latest_filings(&self, tickers: &[String], limit: usize) -> Result<Vec<Filing>> {
        let body = self.client.get(RSS_URL).send().await?.bytes().await?;
        let feed = parser::parse(&body[..]).map_err(|e| Error::Parse(e.to_string()))?;

        let mut filings = Vec::new();
        for ticker in tickers {
            let mut matched = 0usize;
            for entry in &feed.entries {
                let title = entry
                    .title
                    .as_ref()
                    .map(|t| t.content.clone())
                    .unwrap_or_default();

                if !Self::ticker_matches(ticker, &title) {
                    continue;
                }

                let filing_date = entry
                    .published
                    .or(entry.updated)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();

                filings.push(Filing {
                    accession_number: entry.id.clone(),
                    ticker: ticker.clone(),
                    filing_date,
                    form_type: "ANNOUNCEMENT".to_string(),
                    title,
                    url: entry.links.first().map(|l| l.href.clone()),
                });

                matched += 1;
                if matched >= limit {
                    break;
                }
            }
        }

        Ok(filings)
    }

    async fn get_filing_text(&self, filing: &Filing) -> Result<String> {
        let mut text = filing.title.clone();

        if let Some(url) = &filing.url {
            if url.to_lowercase().ends_with(".pdf") {
                let downloaded = self.pdf_fetcher.download(url).await;
                text.push('\n');
                text.push_str(&PdfFetcher::marker(downloaded.as_ref()));
            }
        }

        Ok(text)
    }
}
