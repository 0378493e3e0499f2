// Topic term generation — seed expansion, synonym clustering, global ranking.

pub mod cluster;
pub mod document;
pub mod expansion;
pub mod ranking;
pub mod spec;

use crate::model::traits::EmbeddingModel;

use self::document::TopicTermsDocument;
use self::expansion::expand_topic;
use self::ranking::rank_records;
use self::spec::TopicSpec;

/// Expand every topic, then rank all records together into the output
/// document.
///
/// Each topic is expanded and clustered on its own; ranking and disjoint
/// enforcement need every topic's records, so they run last.
pub fn generate<M>(topics: &[TopicSpec], model: &M, enforce_disjoint: bool) -> TopicTermsDocument
where
    M: EmbeddingModel + ?Sized,
{
    generate_with_progress(topics, model, enforce_disjoint, |_| {})
}

/// Like [`generate`], calling `on_topic` after each topic has been expanded.
pub fn generate_with_progress<M, F>(
    topics: &[TopicSpec],
    model: &M,
    enforce_disjoint: bool,
    mut on_topic: F,
) -> TopicTermsDocument
where
    M: EmbeddingModel + ?Sized,
    F: FnMut(&TopicSpec),
{
    let mut records = Vec::new();
    for topic in topics {
        records.extend(expand_topic(topic, model));
        on_topic(topic);
    }
    let ranked = rank_records(records, enforce_disjoint);
    TopicTermsDocument::from_ranked(topics.iter().map(|t| t.id.as_str()), ranked)
}
