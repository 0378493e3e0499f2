// Colored terminal output for generated topic vocabularies and neighbor lists.
//
// The expansion summary goes to stderr: stdout carries the JSON document and
// must stay machine-readable.

use std::collections::HashSet;

use colored::Colorize;

use crate::model::traits::Neighbor;
use crate::topics::document::TopicTermsDocument;

/// How many of a topic's strongest terms to list in the summary.
const PREVIEW_TERMS: usize = 8;

/// Character budget for one preview line.
const PREVIEW_WIDTH: usize = 100;

/// Print a per-topic summary of a generated document to stderr.
pub fn display_expansion_summary(doc: &TopicTermsDocument) {
    eprintln!(
        "\n{}",
        format!(
            "=== Topic Terms ({} topics, {} terms) ===",
            doc.topics.len(),
            doc.term_count()
        )
        .bold()
    );
    eprintln!();

    for (topic, terms) in &doc.topics {
        let seeds = terms.iter().filter(|t| t.strength >= 1.0).count();
        let clusters: HashSet<&str> = terms.iter().map(|t| t.canonical_term.as_str()).collect();

        let count = format!("{:>4} terms", terms.len());
        let colored_count = if terms.is_empty() {
            count.bright_red()
        } else if terms.len() == seeds {
            count.bright_yellow()
        } else {
            count.bright_green()
        };

        eprintln!(
            "  {:<24} {}  {} seeds, {} clusters",
            topic.bold(),
            colored_count,
            seeds,
            clusters.len()
        );

        if !terms.is_empty() {
            let entries: Vec<String> = terms
                .iter()
                .map(|t| format!("{} ({:.2})", t.term, t.strength))
                .collect();
            eprintln!("      {}", preview_line(&entries).dimmed());
        }
    }
    eprintln!();
}

/// Join entries with commas, stopping at `PREVIEW_TERMS` entries or before
/// the line would pass `PREVIEW_WIDTH` characters. Elided entries are
/// counted at the end.
fn preview_line(entries: &[String]) -> String {
    let mut line = String::new();
    let mut shown = 0;
    for entry in entries.iter().take(PREVIEW_TERMS) {
        let extra = if shown == 0 { 0 } else { 2 };
        if shown > 0 && line.chars().count() + extra + entry.chars().count() > PREVIEW_WIDTH {
            break;
        }
        if shown > 0 {
            line.push_str(", ");
        }
        line.push_str(entry);
        shown += 1;
    }
    if shown < entries.len() {
        line.push_str(&format!(", ... +{} more", entries.len() - shown));
    }
    line
}

/// Print a term's nearest neighbors, one per line, with a similarity bar.
pub fn display_neighbors(term: &str, neighbors: &[Neighbor]) {
    if neighbors.is_empty() {
        println!("'{}' is not in the model vocabulary.", term);
        return;
    }

    println!("\n{}", format!("=== Nearest neighbors of '{}' ===", term).bold());
    println!();

    let bar_width: usize = 20;
    for (i, neighbor) in neighbors.iter().enumerate() {
        let filled = (neighbor.similarity.clamp(0.0, 1.0) * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        let colored_bar = if neighbor.similarity > 0.75 {
            bar.bright_green()
        } else if neighbor.similarity >= 0.5 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  {:>3}. {:<32} {} {:.4}",
            i + 1,
            neighbor.term,
            colored_bar,
            neighbor.similarity
        );
    }
    println!();
}
