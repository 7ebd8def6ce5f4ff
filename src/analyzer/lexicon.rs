//! Lexicon-based polarity oracle
//!
//! The default [`PolarityOracle`]: every known word carries a polarity in
//! `[-1, 1]`, and a text's polarity is the mean over the words it contains.
//!
//! Two kinds of modifier change the *next* scored word:
//!
//! - **Intensifiers** (`very`, `really`, `so`, ...) multiply it.
//! - **Negations** (`not`, `never`, `dont`, ...) multiply it by `-0.5`.
//!   "not good" is mildly negative, not the exact opposite of "good".
//!
//! Normalization strips apostrophes, so "don't" reaches the oracle as
//! `don t`. A lone `t` after a contraction stem counts as a negation.
//!
//! Any other word between a modifier and a scored word cancels the
//! modifier. Text with no known words scores exactly `0.0`.

use super::polarity::{OracleError, PolarityOracle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const NEGATION_FACTOR: f64 = -0.5;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brilliant", 0.9),
    ("clean", 0.37),
    ("congrats", 0.6),
    ("congratulations", 0.6),
    ("cool", 0.35),
    ("enjoy", 0.4),
    ("epic", 0.5),
    ("excellent", 1.0),
    ("excited", 0.375),
    ("exciting", 0.3),
    ("fantastic", 0.4),
    ("favorite", 0.5),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("hype", 0.4),
    ("incredible", 0.9),
    ("insane", 0.3),
    ("interesting", 0.5),
    ("legendary", 0.6),
    ("like", 0.2),
    ("love", 0.5),
    ("loved", 0.7),
    ("lucky", 0.33),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("proud", 0.8),
    ("ready", 0.2),
    ("smooth", 0.4),
    ("special", 0.36),
    ("strong", 0.43),
    ("thank", 0.3),
    ("thanks", 0.3),
    ("welcome", 0.8),
    ("win", 0.8),
    ("wins", 0.8),
    ("winning", 0.5),
    ("wonderful", 1.0),
    ("wow", 0.1),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("angry", -0.5),
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("broken", -0.4),
    ("bug", -0.3),
    ("buggy", -0.5),
    ("cheater", -0.6),
    ("cheaters", -0.6),
    ("crash", -0.6),
    ("crashes", -0.6),
    ("delay", -0.3),
    ("delayed", -0.3),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("down", -0.16),
    ("fail", -0.5),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("issue", -0.2),
    ("issues", -0.2),
    ("lag", -0.4),
    ("lose", -0.5),
    ("losing", -0.4),
    ("lost", -0.3),
    ("mad", -0.6),
    ("poor", -0.4),
    ("problem", -0.5),
    ("problems", -0.5),
    ("sad", -0.5),
    ("sorry", -0.5),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("toxic", -0.7),
    ("trash", -0.6),
    ("ugly", -0.7),
    ("unfair", -0.5),
    ("unplayable", -0.8),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nothing", "nobody", "cannot", "cant",
    "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont", "wouldnt",
    "shouldnt", "couldnt", "aint", "hardly", "barely",
];

/// Stems left behind when normalization splits "don't" into `don t`.
const CONTRACTION_STEMS: &[&str] = &[
    "don", "doesn", "didn", "isn", "wasn", "aren", "weren", "won", "wouldn", "shouldn",
    "couldn", "can", "ain", "haven", "hasn", "hadn",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.5),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("totally", 1.3),
    ("absolutely", 1.5),
    ("quite", 1.1),
    ("pretty", 1.1),
    ("too", 1.2),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("kinda", 0.7),
];

/// Failure to load a lexicon file.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon is not a JSON object of word scores: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid lexicon entry {word:?}: {reason}")]
    InvalidEntry { word: String, reason: &'static str },
}

/// Word-list sentiment oracle.
#[derive(Debug, Clone)]
pub struct LexiconOracle {
    words: HashMap<String, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconOracle {
    /// Oracle with the built-in word list.
    pub fn new() -> Self {
        let words = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .map(|&(w, s)| (w.to_string(), s))
            .collect();

        Self {
            words,
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    /// Built-in word list extended (or overridden) by a JSON file of
    /// `{ "word": score }` pairs.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut oracle = Self::new();
        let added = oracle.extend_from_json(&content)?;
        debug!(path = %path.display(), added, "loaded lexicon overrides");
        Ok(oracle)
    }

    /// Merge word scores from a JSON object. Returns how many entries were read.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, LexiconError> {
        let entries: HashMap<String, f64> = serde_json::from_str(json)?;
        let count = entries.len();

        for (word, score) in entries {
            self.insert(&word, score)?;
        }

        Ok(count)
    }

    /// Add or replace one word's score.
    pub fn insert(&mut self, word: &str, score: f64) -> Result<(), LexiconError> {
        let word = word.trim().to_ascii_lowercase();

        if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LexiconError::InvalidEntry {
                word,
                reason: "words must be a single run of ASCII letters or digits",
            });
        }
        if !score.is_finite() {
            return Err(LexiconError::InvalidEntry { word, reason: "score must be finite" });
        }

        self.words.insert(word, score);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_score(&self, word: &str) -> Option<f64> {
        self.words.get(&word.to_ascii_lowercase()).copied()
    }

    /// Mean polarity of the scored words in `text`. Each word's boosted
    /// score is clamped to `[-1, 1]` before averaging.
    pub fn polarity(&self, text: &str) -> f64 {
        let mut scores: Vec<f64> = Vec::new();
        let mut negate = false;
        let mut boost = 1.0;
        let mut prev = String::new();

        for token in text.split_whitespace() {
            let word = token.to_ascii_lowercase();

            let is_negation = NEGATIONS.contains(&word.as_str())
                || (word == "t" && CONTRACTION_STEMS.contains(&prev.as_str()));

            if is_negation {
                negate = true;
            } else if let Some(&mult) = self.intensifiers.get(word.as_str()) {
                boost *= mult;
            } else {
                if let Some(&score) = self.words.get(&word) {
                    let mut score = score * boost;
                    if negate {
                        score *= NEGATION_FACTOR;
                    }
                    // A long run of intensifiers overflows to infinity
                    scores.push(score.clamp(-1.0, 1.0));
                }
                // Contraction stems must survive until their "t"
                if !CONTRACTION_STEMS.contains(&word.as_str()) {
                    negate = false;
                    boost = 1.0;
                }
            }

            prev = word;
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

impl PolarityOracle for LexiconOracle {
    fn score_polarity(&self, text: &str) -> Result<f64, OracleError> {
        Ok(self.polarity(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::polarity::{PolarityClassifier, SentimentClass};
    use std::io::Write;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==========================================================================
    // SCORING
    // ==========================================================================

    #[test]
    fn test_unknown_and_empty_text_is_zero() {
        let oracle = LexiconOracle::new();
        assert_eq!(oracle.polarity(""), 0.0);
        assert_eq!(oracle.polarity("patch notes tomorrow"), 0.0);
    }

    #[test]
    fn test_single_word_scores() {
        let oracle = LexiconOracle::new();
        assert!(approx(oracle.polarity("great"), 0.8));
        assert!(approx(oracle.polarity("GREAT"), 0.8));
        assert!(approx(oracle.polarity("terrible"), -1.0));
    }

    #[test]
    fn test_mean_over_scored_words() {
        let oracle = LexiconOracle::new();
        // (0.8 + -0.7) / 2
        assert!(approx(oracle.polarity("great map bad agent"), 0.05));
    }

    #[test]
    fn test_negation_flips_and_halves() {
        let oracle = LexiconOracle::new();
        assert!(approx(oracle.polarity("not good"), -0.35));
        assert!(approx(oracle.polarity("never boring"), 0.5));
    }

    #[test]
    fn test_split_contraction_negates() {
        let oracle = LexiconOracle::new();
        // "don't like" arrives as "don t like"
        assert!(approx(oracle.polarity("don t like"), -0.1));
        assert!(approx(oracle.polarity("can t lose"), 0.25));
    }

    #[test]
    fn test_intensifier_multiplies() {
        let oracle = LexiconOracle::new();
        assert!(approx(oracle.polarity("very nice"), 0.78));
        // Clamped to the unit interval
        assert_eq!(oracle.polarity("extremely awesome"), 1.0);
        assert_eq!(oracle.polarity("super worst"), -1.0);
    }

    #[test]
    fn test_each_term_clamped_before_averaging() {
        let oracle = LexiconOracle::new();
        // (1.0 + -0.7) / 2, not (1.2 + -0.7) / 2
        assert!(approx(oracle.polarity("super great bad"), 0.15));
    }

    #[test]
    fn test_runaway_intensifiers_stay_finite() {
        let oracle = LexiconOracle::new();
        let text = format!("{}great {}bad", "super ".repeat(1800), "super ".repeat(1800));

        let polarity = oracle.polarity(&text);
        assert!(polarity.is_finite());
        assert_eq!(polarity, 0.0);

        let classifier = PolarityClassifier::new(LexiconOracle::new());
        assert_eq!(classifier.classify(&text).unwrap(), SentimentClass::Neutral);
    }

    #[test]
    fn test_modifier_cancelled_by_plain_word() {
        let oracle = LexiconOracle::new();
        assert!(approx(oracle.polarity("not the best"), 1.0));
    }

    #[test]
    fn test_oracle_is_total() {
        let oracle = LexiconOracle::new();
        assert!(oracle.score_polarity("").is_ok());
        assert!(oracle.score_polarity("anything at all 123").is_ok());
    }

    #[test]
    fn test_through_classifier() {
        let classifier = PolarityClassifier::new(LexiconOracle::new());
        assert_eq!(
            classifier.classify("@user check http://x.co GREAT!!").unwrap(),
            SentimentClass::Positive
        );
        assert_eq!(classifier.classify("Servers are down :(").unwrap(), SentimentClass::Negative);
        assert_eq!(classifier.classify("Episode 7 starts today").unwrap(), SentimentClass::Neutral);
    }

    // ==========================================================================
    // CUSTOM LEXICONS
    // ==========================================================================

    #[test]
    fn test_extend_from_json_overrides() {
        let mut oracle = LexiconOracle::new();
        let before = oracle.len();
        let added = oracle.extend_from_json(r#"{"gg": 0.4, "Great": 0.1}"#).unwrap();

        assert_eq!(added, 2);
        assert_eq!(oracle.len(), before + 1);
        assert_eq!(oracle.word_score("gg"), Some(0.4));
        assert_eq!(oracle.word_score("great"), Some(0.1));
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let mut oracle = LexiconOracle::new();
        assert!(matches!(
            oracle.extend_from_json(r#"{"two words": 0.5}"#),
            Err(LexiconError::InvalidEntry { .. })
        ));
        assert!(matches!(oracle.insert("", 0.5), Err(LexiconError::InvalidEntry { .. })));
        assert!(matches!(
            oracle.insert("nan", f64::NAN),
            Err(LexiconError::InvalidEntry { .. })
        ));
        assert!(matches!(oracle.extend_from_json("[1, 2]"), Err(LexiconError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"clutch": 0.9}}"#).unwrap();

        let oracle = LexiconOracle::load(file.path()).unwrap();
        assert_eq!(oracle.word_score("clutch"), Some(0.9));
        assert!(approx(oracle.polarity("clutch"), 0.9));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LexiconOracle::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LexiconError::Io { .. }));
    }
}
