// Embedding model trait — the only view of the word model the engine needs.
//
// Expansion and clustering ask two questions of the model: is this term in
// the vocabulary, and what are its nearest neighbors. Keeping that behind a
// trait lets tests drive the engine with hand-written neighbor tables.

/// One entry of a nearest-neighbor list.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub term: String,
    /// Cosine similarity to the query term, in [-1, 1]
    pub similarity: f64,
}

impl Neighbor {
    pub fn new(term: impl Into<String>, similarity: f64) -> Self {
        Self {
            term: term.into(),
            similarity,
        }
    }
}

/// Read-only word embedding model.
pub trait EmbeddingModel {
    /// Whether `term` is in the model's vocabulary.
    fn contains(&self, term: &str) -> bool;

    /// Up to `top_k` nearest neighbors of `term`, most similar first.
    ///
    /// The query term itself is never included. Unknown terms have no
    /// neighbors.
    fn neighbors(&self, term: &str, top_k: usize) -> Vec<Neighbor>;

    /// Number of terms in the vocabulary.
    fn vocab_size(&self) -> usize;
}
