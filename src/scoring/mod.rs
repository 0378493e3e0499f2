// Snippet scoring — estimate topic probabilities for text using a generated
// topic-terms document.

pub mod snippets;
