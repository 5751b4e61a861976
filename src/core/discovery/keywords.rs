//! Static ticker→theme and macro-theme keyword tables, carried over as
//! data (not Python identifiers) from `original_source`'s
//! `macro_core/scrapers/discovery.py`.

use std::collections::HashMap;
use std::sync::OnceLock;

pub struct TickerTheme {
    pub sector: &'static str,
    pub keywords: &'static [&'static str],
}

fn ticker_theme_map() -> &'static HashMap<&'static str, TickerTheme> {
    static MAP: OnceLock<HashMap<&'static str, TickerTheme>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            (
                "NVDA",
                TickerTheme {
                    sector: "Semiconductors",
                    keywords: &["AI chips", "GPU", "data center", "Nvidia"],
                },
            ),
            (
                "MSFT",
                TickerTheme {
                    sector: "Software",
                    keywords: &["Azure", "Copilot", "cloud computing", "Microsoft"],
                },
            ),
            (
                "AAPL",
                TickerTheme {
                    sector: "Consumer Hardware",
                    keywords: &["iPhone", "Apple", "App Store", "Vision Pro"],
                },
            ),
            (
                "TSLA",
                TickerTheme {
                    sector: "Automotive",
                    keywords: &["Tesla", "EV", "Full Self-Driving", "Elon Musk"],
                },
            ),
            (
                "META",
                TickerTheme {
                    sector: "Social Media",
                    keywords: &["Meta", "Facebook", "Instagram", "Llama"],
                },
            ),
            (
                "GOOGL",
                TickerTheme {
                    sector: "Internet",
                    keywords: &["Google", "Alphabet", "Search", "Gemini"],
                },
            ),
            (
                "AMZN",
                TickerTheme {
                    sector: "E-commerce",
                    keywords: &["Amazon", "AWS", "Prime", "logistics"],
                },
            ),
        ])
    })
}

/// Keywords to expand a ticker into for catalog search, or `&[]` for an
/// unmapped ticker (the original's default "Other").
pub fn get_keywords_for_ticker(ticker: &str) -> &'static [&'static str] {
    ticker_theme_map().get(ticker).map(|t| t.keywords).unwrap_or(&[])
}

pub fn get_sector_for_ticker(ticker: &str) -> &'static str {
    ticker_theme_map().get(ticker).map(|t| t.sector).unwrap_or("Other")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ticker_resolves_sector_and_keywords() {
        assert_eq!(get_sector_for_ticker("NVDA"), "Semiconductors");
        assert!(get_keywords_for_ticker("NVDA").contains(&"GPU"));
    }

    #[test]
    fn unknown_ticker_defaults_to_other() {
        assert_eq!(get_sector_for_ticker("ZZZZ"), "Other");
        assert!(get_keywords_for_ticker("ZZZZ").is_empty());
    }
}
