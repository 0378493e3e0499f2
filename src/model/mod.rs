// Embedding model adapter — neighbor lookups against a pretrained word model.

pub mod traits;
pub mod word2vec;
