//! Hand scoring backed by a precomputed score table.
//!
//! A [`ScoreTable`] maps every canonical 5-card hand to a numeric score;
//! higher scores are better hands. The table is either read from a CSV
//! dataset (`hands,value` columns) or tabulated with the built-in
//! [`HandEvaluator`].
//!
//! [`HandScorer`] owns a table source and loads the table lazily, exactly
//! once, the first time a score is requested. After that the table is
//! read-only and the scorer can be shared across threads behind an `Arc`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::card::Card;
use super::hand::Hand;
use super::hand_eval::HandEvaluator;

/// How scores are read from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMode {
    /// Use the stored score.
    #[default]
    Exact,
    /// Floor the stored score, so hands with the same integer part tie.
    Floor,
}

impl ScoreMode {
    /// Mode for an optional floor flag.
    pub fn from_floor(floor: bool) -> Self {
        if floor {
            ScoreMode::Floor
        } else {
            ScoreMode::Exact
        }
    }

    #[inline]
    fn apply(self, score: f64) -> f64 {
        match self {
            ScoreMode::Exact => score,
            ScoreMode::Floor => score.floor(),
        }
    }
}

/// Errors raised while loading or querying scores.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// The table has no entry for a hand.
    MissingHand(Hand),
    /// The table file could not be read.
    Io(String),
    /// A table row could not be parsed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHand(hand) => write!(f, "No score for hand {}", hand),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse { line, message } => write!(f, "Parse error on line {}: {}", line, message),
        }
    }
}

impl std::error::Error for ScoreError {}

/// Scores of canonical hands.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: FxHashMap<Hand, f64>,
}

impl ScoreTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score of a hand.
    pub fn insert(&mut self, hand: Hand, score: f64) {
        self.scores.insert(hand, score);
    }

    /// Look up the score of a hand.
    #[inline]
    pub fn get(&self, hand: &Hand) -> Option<f64> {
        self.scores.get(hand).copied()
    }

    /// Number of hands in the table.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score the given hands with an evaluator.
    pub fn tabulate<I>(hands: I, evaluator: &HandEvaluator) -> Self
    where
        I: IntoIterator<Item = Hand>,
    {
        let scores = hands
            .into_iter()
            .map(|hand| (hand, evaluator.evaluate(&hand).score()))
            .collect();
        Self { scores }
    }

    /// Score every 5-card hand of the standard deck (2,598,960 hands).
    pub fn standard(evaluator: &HandEvaluator) -> Self {
        let rows: Vec<(Hand, f64)> = (0..52u8)
            .into_par_iter()
            .flat_map_iter(|a| {
                let mut rows = Vec::new();
                for b in a + 1..52 {
                    for c in b + 1..52 {
                        for d in c + 1..52 {
                            for e in d + 1..52 {
                                let cards = [a, b, c, d, e].map(Card::from_id);
                                let hand = Hand::complete(&cards, &[]);
                                rows.push((hand, evaluator.evaluate(&hand).score()));
                            }
                        }
                    }
                }
                rows
            })
            .collect();

        let mut scores = FxHashMap::default();
        scores.reserve(rows.len());
        scores.extend(rows);
        Self { scores }
    }

    /// Read a table from CSV text.
    ///
    /// The header must name a `hands` and a `value` column; other columns
    /// (such as a leading index) are ignored. Hand keys use the dataset
    /// layout `['S3' 'C4' 'D7' 'C11' 'D12']` or plain `S3 C4 D7 C11 D12`,
    /// in any card order.
    pub fn from_csv_reader<R: BufRead>(reader: R) -> Result<Self, ScoreError> {
        let mut lines = reader.lines().enumerate();

        let header = match lines.next() {
            Some((_, line)) => line.map_err(|e| ScoreError::Io(e.to_string()))?,
            None => {
                return Err(ScoreError::Parse {
                    line: 1,
                    message: "missing header".to_string(),
                })
            }
        };
        let columns: Vec<&str> = header.split(',').map(|c| c.trim().trim_matches('"')).collect();
        let column = |name: &str| {
            columns.iter().position(|&c| c == name).ok_or_else(|| ScoreError::Parse {
                line: 1,
                message: format!("missing column {:?}", name),
            })
        };
        let hand_column = column("hands")?;
        let value_column = column("value")?;

        let mut table = Self::new();
        for (index, line) in lines {
            let line = line.map_err(|e| ScoreError::Io(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let line_number = index + 1;
            let parse_error = |message: String| ScoreError::Parse {
                line: line_number,
                message,
            };

            let fields: Vec<&str> = line.split(',').collect();
            let key = fields
                .get(hand_column)
                .ok_or_else(|| parse_error("missing hands field".to_string()))?;
            let value = fields
                .get(value_column)
                .ok_or_else(|| parse_error("missing value field".to_string()))?;

            let hand = Hand::parse(key).map_err(|e| parse_error(e.to_string()))?;
            let score: f64 = value
                .trim()
                .parse()
                .map_err(|_| parse_error(format!("invalid value {:?}", value)))?;
            if !score.is_finite() {
                return Err(parse_error(format!("non-finite value {}", score)));
            }
            table.insert(hand, score);
        }

        Ok(table)
    }

    /// Read a table from a CSV file.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, ScoreError> {
        let file = File::open(path.as_ref()).map_err(|e| ScoreError::Io(e.to_string()))?;
        Self::from_csv_reader(BufReader::new(file))
    }
}

/// Where a scorer gets its table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreSource {
    /// A CSV dataset on disk.
    CsvFile(PathBuf),
    /// Tabulate every hand with the built-in evaluator.
    Evaluator,
}

impl ScoreSource {
    fn load(&self) -> Result<ScoreTable, ScoreError> {
        match self {
            ScoreSource::CsvFile(path) => ScoreTable::from_csv_file(path),
            ScoreSource::Evaluator => Ok(ScoreTable::standard(&HandEvaluator::new())),
        }
    }
}

impl std::fmt::Display for ScoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreSource::CsvFile(path) => write!(f, "{}", path.display()),
            ScoreSource::Evaluator => write!(f, "built-in evaluator"),
        }
    }
}

/// Scores and compares hands.
///
/// The table is loaded on first use; concurrent first calls block on a
/// mutex so the source is read once. A failed load is fatal: the error is
/// kept and returned by every later call without touching the source again.
#[derive(Debug)]
pub struct HandScorer {
    source: Option<ScoreSource>,
    table: OnceLock<ScoreTable>,
    failure: Mutex<Option<ScoreError>>,
}

impl HandScorer {
    /// Create a scorer that loads its table from `source` on first use.
    pub fn new(source: ScoreSource) -> Self {
        Self {
            source: Some(source),
            table: OnceLock::new(),
            failure: Mutex::new(None),
        }
    }

    /// Create a scorer over an already built table.
    pub fn from_table(table: ScoreTable) -> Self {
        Self {
            source: None,
            table: OnceLock::from(table),
            failure: Mutex::new(None),
        }
    }

    /// Load the table now instead of on the first score.
    ///
    /// Returns the first load error again if loading already failed.
    pub fn load(&self) -> Result<&ScoreTable, ScoreError> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }

        let mut failure = self.failure.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        if let Some(err) = failure.as_ref() {
            return Err(err.clone());
        }

        let table = match &self.source {
            Some(source) => {
                let start = Instant::now();
                let table = source.load().map_err(|err| {
                    log::error!("failed to load hand scores from {}: {}", source, err);
                    *failure = Some(err.clone());
                    err
                })?;
                log::info!(
                    "loaded {} hand scores from {} in {:.2}s",
                    table.len(),
                    source,
                    start.elapsed().as_secs_f64()
                );
                table
            }
            None => ScoreTable::new(),
        };
        Ok(self.table.get_or_init(|| table))
    }

    /// Whether the table has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Score a hand.
    #[inline]
    pub fn score(&self, hand: &Hand, mode: ScoreMode) -> Result<f64, ScoreError> {
        let table = self.load()?;
        table
            .get(hand)
            .map(|score| mode.apply(score))
            .ok_or(ScoreError::MissingHand(*hand))
    }

    /// Compare two hands: 1 if `left` scores higher, -1 if lower, 0 on a tie.
    #[inline]
    pub fn compare(&self, left: &Hand, right: &Hand, mode: ScoreMode) -> Result<i32, ScoreError> {
        let left = self.score(left, mode)?;
        let right = self.score(right, mode)?;
        Ok(if left > right {
            1
        } else if left < right {
            -1
        } else {
            0
        })
    }
}
