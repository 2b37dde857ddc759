//! Song catalog and similarity-based recommendation
//!
//! The catalog is a static table of songs with precomputed lyric
//! embeddings and emotion labels, loaded once at startup and never
//! mutated. Recommendation filters by emotion, then ranks candidates by
//! cosine similarity against the diary embedding. The catalog is small,
//! so a linear scan per call is sufficient.

use diary_common::{Emotion, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One catalog entry: identity, lyric text, and precomputed features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    pub title: String,
    pub artist: String,
    pub lyrics: String,
    pub emotion: Emotion,
    pub embedding: Vec<f32>,
}

/// Recommendation result returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub artist: String,
    pub lyrics: String,
    /// Cosine similarity in [-1, 1], rounded to 4 decimal places
    pub similarity: f64,
}

/// Static, read-only song table
#[derive(Debug)]
pub struct SongCatalog {
    rows: Vec<CatalogRow>,
}

impl SongCatalog {
    /// Load the catalog from a JSON array file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read catalog {} failed: {}", path.display(), e))
        })?;
        let rows: Vec<CatalogRow> = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Parse catalog {} failed: {}", path.display(), e))
        })?;

        if rows.is_empty() {
            return Err(Error::Config(format!(
                "Catalog {} contains no songs",
                path.display()
            )));
        }

        Ok(Self { rows })
    }

    /// Build a catalog from in-memory rows
    pub fn from_rows(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Recommend the song most similar to the diary embedding
    ///
    /// Candidates are the rows tagged with `emotion`. Returns `None`
    /// when no row carries that label (a normal outcome, not an error).
    /// Exact similarity ties resolve to the earliest row in catalog
    /// order, so repeated calls with the same inputs are deterministic.
    pub fn recommend(&self, diary_embedding: &[f32], emotion: Emotion) -> Option<Recommendation> {
        let mut best: Option<(&CatalogRow, f64)> = None;

        for row in self.rows.iter().filter(|r| r.emotion == emotion) {
            let sim = cosine_similarity(diary_embedding, &row.embedding);
            match best {
                Some((_, best_sim)) if sim <= best_sim => {}
                _ => best = Some((row, sim)),
            }
        }

        best.map(|(row, sim)| Recommendation {
            title: row.title.clone(),
            artist: row.artist.clone(),
            lyrics: row.lyrics.clone(),
            similarity: round4(sim.clamp(-1.0, 1.0)),
        })
    }
}

/// Cosine similarity between two vectors
///
/// Accumulates in f64. A zero-norm vector yields 0.0 rather than NaN.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|y| (*y as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
