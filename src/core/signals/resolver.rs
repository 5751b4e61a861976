//! Hybrid entity resolver: exact alias lookup, then pure-vector similarity
//! search, grounded in `original_source`'s
//! `gravitic-nebula/core/entity_resolver/engine.py` (`HybridResolver`).

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::fuzzy::token_set_ratio;
use crate::error::Result;

/// Above this many known entities, narrow the vector scan with lexical
/// blocking first; below it, scanning every entity is cheap enough that
/// blocking would only add overhead (`spec.md` §4.5.2).
const LARGE_CORPUS_THRESHOLD: usize = 500;

/// External collaborator: the embedding model itself is an upstream
/// contract (`spec.md` §6), not something this crate trains or ships
/// weights for.
pub trait EmbeddingClient: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Clone)]
pub struct EntitySeed {
    pub ticker: String,
    pub canonical_name: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    AliasLookup,
    PureVector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    pub ticker: String,
    pub confidence: f64,
    pub method: ResolutionMethod,
}

/// Swapped atomically via [`ArcSwap`] so a concurrent `resolve` call never
/// observes a half-rebuilt corpus (`spec.md` §5).
struct ResolverCorpus {
    known_entities: Vec<String>,
    entity_map: HashMap<String, String>,
    alias_map: HashMap<String, String>,
    entity_vectors: Vec<Vec<f32>>,
}

impl ResolverCorpus {
    fn empty() -> Self {
        Self {
            known_entities: Vec::new(),
            entity_map: HashMap::new(),
            alias_map: HashMap::new(),
            entity_vectors: Vec::new(),
        }
    }
}

pub struct HybridResolver {
    corpus: ArcSwap<ResolverCorpus>,
    /// Open question from `spec.md` §9 resolved by making this a
    /// constructor parameter, default `0.35`, rather than a literal buried
    /// in `resolve`.
    semantic_threshold: f64,
    fuzzy_threshold: u32,
}

impl HybridResolver {
    pub fn new(semantic_threshold: f64) -> Self {
        Self {
            corpus: ArcSwap::from_pointee(ResolverCorpus::empty()),
            semantic_threshold,
            fuzzy_threshold: 50,
        }
    }

    pub fn with_default_threshold() -> Self {
        Self::new(0.35)
    }

    /// Rebuild the corpus: alias map, canonical-name-to-ticker map, and
    /// embedding vectors for every canonical name, then atomically swap it
    /// in.
    pub fn load_entities(&self, entities: &[EntitySeed], embedder: &dyn EmbeddingClient) -> Result<()> {
        let known_entities: Vec<String> = entities.iter().map(|e| e.canonical_name.clone()).collect();
        let mut entity_map = HashMap::new();
        let mut alias_map = HashMap::new();

        for entity in entities {
            entity_map.insert(entity.canonical_name.to_lowercase(), entity.ticker.clone());
            alias_map.insert(entity.canonical_name.to_lowercase(), entity.canonical_name.clone());
            for alias in &entity.aliases {
                alias_map.insert(alias.to_lowercase(), entity.canonical_name.clone());
            }
        }

        let entity_vectors = if known_entities.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&known_entities)?
        };

        self.corpus.store(Arc::new(ResolverCorpus {
            known_entities,
            entity_map,
            alias_map,
            entity_vectors,
        }));

        Ok(())
    }

    /// Step 0: exact alias lookup (confidence `1.0`, method
    /// `AliasLookup`). Step 1: encode the query and score it against the
    /// candidate entity vectors by dot product (vectors are expected
    /// unit-normalized, making this cosine similarity), returning the
    /// argmax as `PureVector` when its score clears `semantic_threshold`,
    /// else `None`. Below `LARGE_CORPUS_THRESHOLD` known entities the
    /// candidate set is everyone — the small-corpus fast path is correct
    /// but O(N); above it, lexical blocking (token-set cutoff
    /// `fuzzy_threshold`) narrows the scan first.
    pub fn resolve(&self, query: &str, embedder: &dyn EmbeddingClient) -> Result<Option<ResolvedEntity>> {
        let corpus = self.corpus.load();

        if let Some(canonical) = corpus.alias_map.get(&query.to_lowercase()) {
            if let Some(ticker) = corpus.entity_map.get(&canonical.to_lowercase()) {
                return Ok(Some(ResolvedEntity {
                    ticker: ticker.clone(),
                    confidence: 1.0,
                    method: ResolutionMethod::AliasLookup,
                }));
            }
        }

        if corpus.known_entities.is_empty() {
            return Ok(None);
        }

        // Lexical blocking only kicks in above this corpus size; below it
        // the O(N) vector scan over every entity is cheap enough that
        // narrowing candidates first would just add overhead.
        let candidate_indices: Vec<usize> = if corpus.known_entities.len() > LARGE_CORPUS_THRESHOLD {
            let blocked: Vec<usize> = corpus
                .known_entities
                .iter()
                .enumerate()
                .filter(|(_, name)| token_set_ratio(query, name) >= self.fuzzy_threshold)
                .map(|(i, _)| i)
                .collect();
            if blocked.is_empty() {
                (0..corpus.known_entities.len()).collect()
            } else {
                blocked
            }
        } else {
            (0..corpus.known_entities.len()).collect()
        };

        let query_vec = embedder.embed(&[query.to_string()])?.into_iter().next();
        let Some(query_vec) = query_vec else {
            return Ok(None);
        };

        let mut best_score = f64::MIN;
        let mut best_index = None;
        for i in candidate_indices {
            let score = dot(&query_vec, &corpus.entity_vectors[i]) as f64;
            if score > best_score {
                best_score = score;
                best_index = Some(i);
            }
        }

        let Some(best_index) = best_index else {
            return Ok(None);
        };

        if best_score <= self.semantic_threshold {
            return Ok(None);
        }

        let canonical = &corpus.known_entities[best_index];
        Ok(corpus
            .entity_map
            .get(&canonical.to_lowercase())
            .cloned()
            .map(|ticker| ResolvedEntity {
                ticker,
                confidence: best_score,
                method: ResolutionMethod::PureVector,
            }))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for a real embedding model: maps a handful
    /// of semantically related keywords onto one dimension per entity so
    /// the scenario is reproducible without a real backend.
    struct FakeEmbeddingClient;

    impl EmbeddingClient for FakeEmbeddingClient {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| semantic_vector(t)).collect())
        }
    }

    fn semantic_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v = vec![0.0f32; 3];
        if lower.contains("apple") || lower.contains("iphone") || lower.contains("manufacturer") {
            v[0] = 1.0;
        }
        if lower.contains("foxconn") || lower.contains("hon hai") || lower.contains("assembly") {
            v[1] = 1.0;
        }
        if lower.contains("spacex") || lower.contains("rocket") || lower.contains("falcon") {
            v[2] = 1.0;
        }
        v
    }

    fn golden_set() -> Vec<EntitySeed> {
        vec![
            EntitySeed {
                ticker: "AAPL".to_string(),
                canonical_name: "Apple Inc".to_string(),
                aliases: vec!["Apple".to_string()],
            },
            EntitySeed {
                ticker: "2317.TW".to_string(),
                canonical_name: "Foxconn".to_string(),
                aliases: vec!["Hon Hai Precision".to_string()],
            },
            EntitySeed {
                ticker: "SPACEX".to_string(),
                canonical_name: "SpaceX".to_string(),
                aliases: vec!["Space Exploration Technologies".to_string()],
            },
        ]
    }

    #[test]
    fn exact_alias_resolves_with_full_confidence() {
        let resolver = HybridResolver::with_default_threshold();
        let embedder = FakeEmbeddingClient;
        resolver.load_entities(&golden_set(), &embedder).unwrap();

        let resolved = resolver.resolve("Apple", &embedder).unwrap().unwrap();
        assert_eq!(resolved.ticker, "AAPL");
        assert_eq!(resolved.confidence, 1.0);
        assert_eq!(resolved.method, ResolutionMethod::AliasLookup);
    }

    #[test]
    fn unaliased_query_resolves_via_pure_vector() {
        let resolver = HybridResolver::with_default_threshold();
        let embedder = FakeEmbeddingClient;
        resolver.load_entities(&golden_set(), &embedder).unwrap();

        let resolved = resolver.resolve("iPhone manufacturer", &embedder).unwrap().unwrap();
        assert_eq!(resolved.ticker, "AAPL");
        assert_eq!(resolved.method, ResolutionMethod::PureVector);
    }

    #[test]
    fn disjoint_query_resolves_to_the_matching_entity() {
        let resolver = HybridResolver::with_default_threshold();
        let embedder = FakeEmbeddingClient;
        resolver.load_entities(&golden_set(), &embedder).unwrap();

        let resolved = resolver.resolve("rocket launches", &embedder).unwrap().unwrap();
        assert_eq!(resolved.ticker, "SPACEX");
    }

    #[test]
    fn below_threshold_query_resolves_to_nothing() {
        let resolver = HybridResolver::with_default_threshold();
        let embedder = FakeEmbeddingClient;
        resolver.load_entities(&golden_set(), &embedder).unwrap();

        let resolved = resolver.resolve("unrelated query about nothing", &embedder).unwrap();
        assert!(resolved.is_none());
    }
}
