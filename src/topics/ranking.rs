// Global ranking across topics, with optional one-topic-per-term enforcement.
//
// All topics' records are merged and stably sorted by strength, strongest
// first. Records arrive topic by topic in declaration order, so on exact
// strength ties the earlier-declared topic comes first. With disjoint
// enforcement the walk keeps only the first record seen for each term;
// records are dropped, never modified.

use std::collections::HashSet;

use tracing::debug;

use super::expansion::MatchRecord;

/// Sort `records` by descending strength and, if `enforce_disjoint` is set,
/// drop every record for a term already claimed earlier in the ranking.
pub fn rank_records(mut records: Vec<MatchRecord>, enforce_disjoint: bool) -> Vec<MatchRecord> {
    records.sort_by(|a, b| b.strength.total_cmp(&a.strength));

    if !enforce_disjoint {
        return records;
    }

    let mut claimed: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            if claimed.insert(record.term.clone()) {
                true
            } else {
                debug!(
                    topic = %record.topic_id,
                    term = %record.term,
                    strength = record.strength,
                    "Dropping term claimed by a stronger topic"
                );
                false
            }
        })
        .collect()
}
