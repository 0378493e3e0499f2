// Near-synonym clustering of a topic's matched terms.
//
// Terms are visited in match order. Each starts as its own cluster, then
// looks at its top neighbors: any neighbor above the similarity threshold
// that was already visited lends it that neighbor's cluster label. Later
// qualifying neighbors overwrite earlier ones, so the least similar
// qualifying peer in the list decides. There is no transitive merging; a
// term can only borrow from peers resolved before it.

use std::collections::HashMap;

use crate::model::traits::EmbeddingModel;

/// Neighbors inspected per term when clustering.
pub const CLUSTER_NEIGHBORS: usize = 100;

/// A neighbor must be strictly more similar than this to share a cluster.
pub const CLUSTER_SIMILARITY: f64 = 0.75;

/// Assign a canonical cluster label to each term, returning
/// `(term, canonical)` pairs in input order.
pub fn assign_clusters<'a, I, M>(terms: I, model: &M) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
    M: EmbeddingModel + ?Sized,
{
    let mut resolved: HashMap<String, String> = HashMap::new();
    let mut assignments = Vec::new();

    for term in terms {
        let mut canonical = term;
        for neighbor in model.neighbors(term, CLUSTER_NEIGHBORS) {
            if neighbor.similarity > CLUSTER_SIMILARITY {
                if let Some(label) = resolved.get(&neighbor.term) {
                    canonical = label.as_str();
                }
            }
        }
        let canonical = canonical.to_string();
        resolved.insert(term.to_string(), canonical.clone());
        assignments.push((term.to_string(), canonical));
    }

    assignments
}
