// Word2vec model loading and exhaustive nearest-neighbor search.
//
// Reads the standard word2vec export formats (the ones gensim writes with
// `save_word2vec_format`): binary when the file ends in `.bin`, text
// otherwise. Every vector is normalized to unit length at load time, so the
// cosine similarity between two terms is a plain dot product.
//
// Neighbor queries scan the whole vocabulary. The engine asks for at most one
// neighbor list per matched term, so a brute-force scan is fast enough and
// gives exact, deterministic rankings.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, info};

use super::traits::{EmbeddingModel, Neighbor};
use crate::error::SoftmatchError;

/// An in-memory word embedding model.
#[derive(Debug)]
pub struct Word2VecModel {
    vocab: Vec<String>,
    index: HashMap<String, usize>,
    /// Unit vectors, `dim` floats per vocabulary entry, in vocabulary order
    vectors: Vec<f32>,
    dim: usize,
}

impl Word2VecModel {
    /// Load a word2vec export from disk.
    ///
    /// Any I/O or format problem is reported as `ModelUnavailable` so the
    /// caller can abort before processing a single topic.
    pub fn load(path: &Path) -> Result<Self, SoftmatchError> {
        let file = File::open(path).map_err(|e| SoftmatchError::model(path, e.to_string()))?;
        let reader = BufReader::new(file);

        let binary = path.extension().is_some_and(|ext| ext == "bin");
        let (entries, header_dim) = if binary {
            read_binary(reader, path)?
        } else {
            read_text(reader, path)?
        };

        let model = Self::build(entries, header_dim).map_err(|r| SoftmatchError::model(path, r))?;

        info!(
            path = %path.display(),
            vocab = model.vocab.len(),
            dim = model.dim,
            "Loaded word embedding model"
        );

        Ok(model)
    }

    /// Build a model from in-memory `(term, vector)` pairs.
    ///
    /// All vectors must share one non-zero dimension. Later duplicates of a
    /// term are ignored.
    pub fn from_vectors<I, S>(entries: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let entries = entries.into_iter().map(|(t, v)| (t.into(), v)).collect();
        Self::build(entries, None).map_err(anyhow::Error::msg)
    }

    /// Dimension of every vector in the model.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn build(entries: Vec<(String, Vec<f32>)>, header_dim: Option<usize>) -> Result<Self, String> {
        let dim = match (header_dim, entries.first()) {
            (_, None) => return Err("model has an empty vocabulary".to_string()),
            (Some(d), _) => d,
            (None, Some((_, v))) => v.len(),
        };
        if dim == 0 {
            return Err("model vectors have zero dimensions".to_string());
        }

        let mut vocab = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        let mut vectors = Vec::with_capacity(entries.len() * dim);

        for (term, mut vector) in entries {
            if vector.len() != dim {
                return Err(format!(
                    "vector for '{}' has {} dimensions, expected {}",
                    term,
                    vector.len(),
                    dim
                ));
            }
            if index.contains_key(&term) {
                debug!(term = %term, "Skipping duplicate vocabulary entry");
                continue;
            }
            normalize(&mut vector);
            index.insert(term.clone(), vocab.len());
            vocab.push(term);
            vectors.extend_from_slice(&vector);
        }

        Ok(Self {
            vocab,
            index,
            vectors,
            dim,
        })
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.vectors[i * self.dim..(i + 1) * self.dim]
    }
}

impl EmbeddingModel for Word2VecModel {
    fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    fn neighbors(&self, term: &str, top_k: usize) -> Vec<Neighbor> {
        let Some(&query) = self.index.get(term) else {
            return Vec::new();
        };
        if top_k == 0 {
            return Vec::new();
        }

        let q = self.row(query);
        let mut scored: Vec<(usize, f32)> = (0..self.vocab.len())
            .filter(|&i| i != query)
            .map(|i| (i, dot(q, self.row(i))))
            .collect();

        // Most similar first; vocabulary position breaks ties.
        let by_rank = |a: &(usize, f32), b: &(usize, f32)| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0));

        if top_k < scored.len() {
            scored.select_nth_unstable_by(top_k - 1, by_rank);
            scored.truncate(top_k);
        }
        scored.sort_unstable_by(by_rank);

        scored
            .into_iter()
            .map(|(i, sim)| Neighbor::new(self.vocab[i].clone(), f64::from(sim)))
            .collect()
    }

    fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

/// Scale a vector to unit length in place. Zero vectors stay zero.
fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

type Entries = (Vec<(String, Vec<f32>)>, Option<usize>);

/// Text format: optional `<vocab> <dim>` header, then `word v1 v2 ...` lines.
fn read_text<R: BufRead>(reader: R, path: &Path) -> Result<Entries, SoftmatchError> {
    let mut entries = Vec::new();
    let mut header_dim = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SoftmatchError::model(path, e.to_string()))?;
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let values: Vec<&str> = fields.collect();

        if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
            if let Ok(dim) = values[0].parse::<usize>() {
                header_dim = Some(dim);
                continue;
            }
        }

        let vector = values
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SoftmatchError::model(path, format!("line {}: {}", line_no + 1, e)))?;
        entries.push((word.to_string(), vector));
    }

    Ok((entries, header_dim))
}

/// Largest vector dimension accepted from a binary header.
const MAX_BINARY_DIM: usize = 1 << 16;

/// Upper bound on entries reserved up front from a binary header.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

/// Binary format: `<vocab> <dim>\n` header, then per entry the word bytes, a
/// space, `dim` little-endian f32 values and an optional newline.
fn read_binary<R: BufRead>(mut reader: R, path: &Path) -> Result<Entries, SoftmatchError> {
    let io_err = |e: std::io::Error| SoftmatchError::model(path, e.to_string());

    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let mut parts = header.split_whitespace().map(|p| p.parse::<usize>().ok());
    let (vocab_size, dim) = match (parts.next().flatten(), parts.next().flatten()) {
        (Some(v), Some(d)) => (v, d),
        _ => {
            return Err(SoftmatchError::model(
                path,
                "missing '<vocab> <dim>' header in binary model",
            ))
        }
    };

    if dim == 0 || dim > MAX_BINARY_DIM {
        return Err(SoftmatchError::model(
            path,
            format!("unsupported vector dimension {} in binary header", dim),
        ));
    }
    let vector_bytes = dim
        .checked_mul(4)
        .ok_or_else(|| SoftmatchError::model(path, format!("vector dimension {} overflows", dim)))?;

    // The header count is only a hint until the entries are actually read.
    let mut entries = Vec::with_capacity(vocab_size.min(MAX_PREALLOCATED_ENTRIES));
    let mut word_buf = Vec::new();
    let mut vec_buf = vec![0u8; vector_bytes];

    for i in 0..vocab_size {
        word_buf.clear();
        reader.read_until(b' ', &mut word_buf).map_err(io_err)?;
        if word_buf.pop() != Some(b' ') {
            return Err(SoftmatchError::model(
                path,
                format!("truncated at entry {} of {}", i + 1, vocab_size),
            ));
        }
        let start = word_buf.iter().position(|&b| b != b'\n').unwrap_or(word_buf.len());
        let word = String::from_utf8_lossy(&word_buf[start..]).into_owned();
        if word.is_empty() {
            return Err(SoftmatchError::model(path, format!("empty word at entry {}", i + 1)));
        }

        reader.read_exact(&mut vec_buf).map_err(|e| {
            SoftmatchError::model(path, format!("vector for '{}' is truncated: {}", word, e))
        })?;
        let vector = vec_buf
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        entries.push((word, vector));
    }

    Ok((entries, Some(dim)))
}
