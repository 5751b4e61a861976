//! Ticker-to-market routing, generalized from the original's two-key dict
//! (`edgar`/`nse`) into an open enum so a third market can be added without
//! touching `group_tickers_by_market`'s signature.

use std::collections::HashMap;
use std::sync::Arc;

use super::MarketAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKey {
    Edgar,
    Nse,
}

impl MarketKey {
    /// Classify a ticker by its suffix. `.NS` routes to the Indian
    /// exchange; everything else defaults to EDGAR, matching
    /// `original_source`'s `MarketRegistry.get_client`.
    pub fn for_ticker(ticker: &str) -> Self {
        if ticker.ends_with(".NS") {
            MarketKey::Nse
        } else {
            MarketKey::Edgar
        }
    }
}

/// Holds one [`MarketAdapter`] per [`MarketKey`] and partitions ticker
/// lists across them.
pub struct AdapterRegistry {
    adapters: HashMap<MarketKey, Arc<dyn MarketAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: MarketKey, adapter: Arc<dyn MarketAdapter>) -> &mut Self {
        self.adapters.insert(key, adapter);
        self
    }

    pub fn get_client(&self, ticker: &str) -> Option<Arc<dyn MarketAdapter>> {
        self.adapters.get(&MarketKey::for_ticker(ticker)).cloned()
    }

    /// Partition tickers into per-market groups, mirroring
    /// `MarketRegistry.group_tickers_by_market`.
    pub fn group_tickers_by_market(&self, tickers: &[String]) -> HashMap<MarketKey, Vec<String>> {
        let mut groups: HashMap<MarketKey, Vec<String>> = HashMap::new();
        for ticker in tickers {
            groups
                .entry(MarketKey::for_ticker(ticker))
                .or_default()
                .push(ticker.clone());
        }
        groups
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_ns_suffix_to_nse() {
        assert_eq!(MarketKey::for_ticker("RELIANCE.NS"), MarketKey::Nse);
        assert_eq!(MarketKey::for_ticker("AAPL"), MarketKey::Edgar);
    }

    #[test]
    fn groups_mixed_tickers_by_market() {
        let registry = AdapterRegistry::new();
        let tickers = vec![
            "AAPL".to_string(),
            "RELIANCE.NS".to_string(),
            "MSFT".to_string(),
            "TCS.NS".to_string(),
        ];

        let groups = registry.group_tickers_by_market(&tickers);
        assert_eq!(groups[&MarketKey::Edgar].len(), 2);
        assert_eq!(groups[&MarketKey::Nse].len(), 2);
    }

    #[test]
    fn get_client_returns_none_when_unregistered() {
        let registry = AdapterRegistry::new();
        assert!(registry.get_client("AAPL").is_none());
    }
}
