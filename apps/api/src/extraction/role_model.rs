//! Role model files: a TF-IDF vectorizer and a linear classifier, both loaded
//! from JSON exported by the training pipeline.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed model file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Model shape mismatch: {0}")]
    Shape(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),
}

/// Sparse feature vector: `(index, weight)` pairs sorted by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    pub dim: usize,
    pub entries: Vec<(usize, f32)>,
}

impl FeatureVector {
    pub fn dot(&self, dense: &[f32]) -> f32 {
        self.entries
            .iter()
            .map(|&(i, w)| dense.get(i).copied().unwrap_or(0.0) * w)
            .sum()
    }
}

/// Turns document text into model features.
pub trait Vectorizer: Send + Sync {
    fn transform(&self, text: &str) -> Result<FeatureVector, ModelError>;
}

/// Predicts a single role label from features.
pub trait RoleModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<String, ModelError>;
}

// ────────────────────────────────────────────────────────────────────────────
// TF-IDF vectorizer
// ────────────────────────────────────────────────────────────────────────────

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Term-frequency × inverse-document-frequency weights, L2-normalized.
/// Tokens are runs of two or more word characters; n-grams are joined by a
/// single space.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
}

impl TfidfVectorizer {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let vectorizer: Self = serde_json::from_str(json)?;
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    fn validate(&self) -> Result<(), ModelError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::Shape(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        let out_of_range = self
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= self.idf.len());
        if let Some((term, index)) = out_of_range {
            return Err(ModelError::Shape(format!(
                "term '{term}' maps to index {index} but idf has {} entries",
                self.idf.len()
            )));
        }
        Ok(())
    }

    fn ngrams(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&text).map(|m| m.as_str()).collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n {
            grams.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        grams
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector, ModelError> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for gram in self.ngrams(text) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        entries.sort_by_key(|&(i, _)| i);

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }

        Ok(FeatureVector {
            dim: self.dim(),
            entries,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Linear classifier
// ────────────────────────────────────────────────────────────────────────────

/// One-vs-rest linear model. A binary model carries a single coefficient row
/// whose positive side selects `classes[1]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearRoleModel {
    classes: Vec<String>,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
}

impl LinearRoleModel {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coef.len() == 1
    }

    pub fn n_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.classes.len() < 2 {
            return Err(ModelError::Shape("at least two classes required".to_string()));
        }
        if !self.is_binary() && self.coef.len() != self.classes.len() {
            return Err(ModelError::Shape(format!(
                "{} coefficient rows for {} classes",
                self.coef.len(),
                self.classes.len()
            )));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(ModelError::Shape(format!(
                "{} intercepts for {} coefficient rows",
                self.intercept.len(),
                self.coef.len()
            )));
        }
        let width = self.n_features();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(ModelError::Shape("ragged coefficient rows".to_string()));
        }
        Ok(())
    }
}

impl RoleModel for LinearRoleModel {
    fn predict(&self, features: &FeatureVector) -> Result<String, ModelError> {
        if features.dim != self.n_features() {
            return Err(ModelError::Shape(format!(
                "model expects {} features, got {}",
                self.n_features(),
                features.dim
            )));
        }

        let decisions: Vec<f32> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| features.dot(row) + b)
            .collect();

        if decisions.iter().any(|d| !d.is_finite()) {
            return Err(ModelError::Inference("non-finite decision value".to_string()));
        }

        let class_index = if self.is_binary() {
            usize::from(decisions[0] > 0.0)
        } else {
            // First maximum wins on ties.
            decisions
                .iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &d)| {
                    if d > best.1 {
                        (i, d)
                    } else {
                        best
                    }
                })
                .0
        };

        Ok(self.classes[class_index].clone())
    }
}
