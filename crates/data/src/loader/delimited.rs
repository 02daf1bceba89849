//! Heuristic loader for header-less delimited text.
//!
//! The delimiter is not declared anywhere, so the file is offered to an
//! ordered list of [`TableStrategy`] values and the first that produces a
//! plausible table wins. Column roles are then picked from the table width.

use causal_compare_core::{LoadError, SourceKind, TimeSeriesPair};
use regex::Regex;
use std::path::Path;

/// A candidate delimiter must produce more than this many rows to be accepted.
pub const MIN_ROWS: usize = 10;

/// Rectangular table of raw cells. Short rows are padded with empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Table {
    /// Builds a table, padding every row to the widest row's length.
    #[must_use]
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows, width }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cells of column `idx`, top to bottom.
    #[must_use]
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows.iter().map(|r| r[idx].as_str()).collect()
    }
}

/// One way of splitting raw text into a [`Table`].
pub trait TableStrategy {
    /// Short description for logs.
    fn name(&self) -> String;

    /// Returns a table if this strategy considers the text parseable.
    fn parse(&self, text: &str) -> Option<Table>;
}

/// Parses with the `csv` reader using a fixed single-byte delimiter.
#[derive(Debug, Clone, Copy)]
pub struct DelimiterStrategy {
    delimiter: u8,
}

impl DelimiterStrategy {
    #[must_use]
    pub const fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl TableStrategy for DelimiterStrategy {
    fn name(&self) -> String {
        match self.delimiter {
            b'\t' => "delimiter '\\t'".to_string(),
            d => format!("delimiter '{}'", d as char),
        }
    }

    fn parse(&self, text: &str) -> Option<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.ok()?;
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if self.delimiter == b' ' {
                // runs of spaces separate a single pair of fields
                cells.retain(|c| !c.is_empty());
            }
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        let table = Table::from_rows(rows);
        (table.row_count() > MIN_ROWS && table.width() >= 2).then_some(table)
    }
}

/// Last resort: split every non-blank line on `;` by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemicolonSplitStrategy;

impl TableStrategy for SemicolonSplitStrategy {
    fn name(&self) -> String {
        "manual ';' split".to_string()
    }

    fn parse(&self, text: &str) -> Option<Table> {
        let rows: Vec<Vec<String>> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.split(';').map(|c| c.trim().to_string()).collect())
            .collect();
        (!rows.is_empty()).then(|| Table::from_rows(rows))
    }
}

/// Strategies in the order they are tried.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn TableStrategy>> {
    vec![
        Box::new(DelimiterStrategy::new(b',')),
        Box::new(DelimiterStrategy::new(b';')),
        Box::new(DelimiterStrategy::new(b'\t')),
        Box::new(DelimiterStrategy::new(b' ')),
        Box::new(SemicolonSplitStrategy),
    ]
}

/// Runs the strategies in order and returns the first table produced.
///
/// # Errors
/// Returns `UnparseableFormat` when every strategy declines the text.
pub fn sniff_table(text: &str) -> Result<Table, LoadError> {
    for strategy in default_strategies() {
        match strategy.parse(text) {
            Some(table) => {
                tracing::info!(
                    "Parsed {} rows x {} columns using {}",
                    table.row_count(),
                    table.width(),
                    strategy.name()
                );
                return Ok(table);
            }
            None => tracing::debug!("{} rejected input", strategy.name()),
        }
    }
    Err(LoadError::UnparseableFormat(
        "no delimiter produced a usable table".to_string(),
    ))
}

/// Which columns become X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPlan {
    /// Two distinct columns.
    Pair { x: usize, y: usize },
    /// A single column; Y is X shifted forward by one step.
    LagOfSingle(usize),
}

impl ColumnPlan {
    /// Picks column roles from the table width.
    ///
    /// With three or more columns the first is treated as an index or label
    /// and skipped.
    #[must_use]
    pub fn for_width(width: usize) -> Option<Self> {
        match width {
            0 => None,
            1 => Some(Self::LagOfSingle(0)),
            2 => Some(Self::Pair { x: 0, y: 1 }),
            _ => Some(Self::Pair { x: 1, y: 2 }),
        }
    }
}

fn is_valid(v: &Option<f64>) -> bool {
    matches!(v, Some(f) if !f.is_nan())
}

/// Converts cells to numbers; anything unparseable is `None`.
///
/// If plain parsing yields no valid value at all, the first numeric token
/// embedded in each cell is used instead (e.g. `"12.5 kg"` -> 12.5).
pub fn coerce_column(cells: &[&str]) -> anyhow::Result<Vec<Option<f64>>> {
    let direct: Vec<Option<f64>> = cells.iter().map(|c| c.trim().parse::<f64>().ok()).collect();
    if direct.iter().any(is_valid) {
        return Ok(direct);
    }

    let token = Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?")?;
    let extracted: Vec<Option<f64>> = cells
        .iter()
        .map(|c| token.find(c).and_then(|m| m.as_str().parse::<f64>().ok()))
        .collect();
    let found = extracted.iter().filter(|v| is_valid(v)).count();
    if found > 0 {
        tracing::info!("Extracted {} embedded numeric tokens", found);
    }
    Ok(extracted)
}

/// Pairs two coerced columns, dropping any row where either side is missing.
#[must_use]
pub fn paired_complete(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y.iter())
        .filter_map(|(xi, yi)| match (xi, yi) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .unzip()
}

/// Builds X and Y from a single column: X = v[..n-1], Y = v[1..].
#[must_use]
pub fn lag_pair(values: &[Option<f64>]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    if values.len() < 2 {
        return (Vec::new(), Vec::new());
    }
    (
        values[..values.len() - 1].to_vec(),
        values[1..].to_vec(),
    )
}

/// Extracts the X/Y pair from a sniffed table.
///
/// # Errors
/// `UnparseableFormat` for an empty table, `InsufficientSamples` when fewer
/// than `min_samples` complete rows remain.
pub fn pair_from_table(table: &Table, min_samples: usize) -> Result<TimeSeriesPair, LoadError> {
    let plan = ColumnPlan::for_width(table.width())
        .ok_or_else(|| LoadError::UnparseableFormat("table has no columns".to_string()))?;
    let coerce = |idx: usize| {
        coerce_column(&table.column(idx)).map_err(|e| LoadError::UnparseableFormat(e.to_string()))
    };

    let (x_raw, y_raw) = match plan {
        ColumnPlan::Pair { x, y } => {
            tracing::info!("Using column {} as X and column {} as Y", x + 1, y + 1);
            (coerce(x)?, coerce(y)?)
        }
        ColumnPlan::LagOfSingle(col) => {
            tracing::info!("Single column input; building lag-1 pair");
            lag_pair(&coerce(col)?)
        }
    };

    let (x, y) = paired_complete(&x_raw, &y_raw);
    let dropped = x_raw.len() - x.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} rows with missing values", dropped);
    }

    TimeSeriesPair::new(x, y, SourceKind::Delimited, min_samples)
}

/// Loads a delimited text file into a pair.
///
/// # Errors
/// Any [`LoadError`] from reading, sniffing, or column extraction.
pub fn load_delimited(path: &Path, min_samples: usize) -> Result<TimeSeriesPair, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let table = sniff_table(&text)?;
    pair_from_table(&table, min_samples)
}
