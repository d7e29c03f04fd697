use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

/// Default number of entries kept in the calculation history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default bound on parenthesis, function call and unary minus nesting.
pub const DEFAULT_MAX_NESTING: usize = 64;

/// Hard upper bound on any configured nesting limit.
pub const MAX_NESTING_CEILING: usize = 256;

/// Legacy π, fixed to 10 decimal places.
#[allow(clippy::approx_constant)]
pub const LEGACY_PI: f64 = 3.1415926536;

/// Legacy e, fixed to 10 decimal places.
#[allow(clippy::approx_constant)]
pub const LEGACY_E: f64 = 2.7182818285;

/// How the `π` and `e` symbols resolve to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstantPrecision {
    /// Constants truncated to 10 decimal digits, as the original calculator
    /// injected them into the expression.
    #[default]
    Legacy,
    /// Full `f64` precision.
    Full,
}

impl ConstantPrecision {
    pub fn pi(self) -> f64 {
        match self {
            ConstantPrecision::Legacy => LEGACY_PI,
            ConstantPrecision::Full => std::f64::consts::PI,
        }
    }

    pub fn e(self) -> f64 {
        match self {
            ConstantPrecision::Legacy => LEGACY_E,
            ConstantPrecision::Full => std::f64::consts::E,
        }
    }
}

/// Options the evaluator is called with. Passed in explicitly; the evaluator
/// keeps no state of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    pub constant_precision: ConstantPrecision,
    pub max_nesting: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            constant_precision: ConstantPrecision::default(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
    pub timestamp: String,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current local time (`HH:MM:SS`).
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// Completed calculations, newest first, capped at `limit` entries.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Records an entry at the front, dropping the oldest ones past the limit.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
