//! Heuristic table detection over extracted text.
//!
//! A line is tabular when it splits into enough cells on tabs, `|`, or wide
//! runs of spaces, or when it is a ruling line such as `----+----`. A table
//! is a run of consecutive tabular lines holding enough cell rows.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::TableConfig;

lazy_static! {
    /// Horizontal rules: `-----`, `|---|---|`, `===+===`, `:--|--:`.
    static ref RULE_LINE: Regex = Regex::new(r"^\s*[|+]?\s*[-=:]{3,}[-=:|+\s]*$").unwrap();
}

/// A detected tabular region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    /// Index of the first line (0-based).
    pub start_line: usize,
    /// Number of lines, ruling lines included.
    pub line_count: usize,
    /// Rows carrying cells.
    pub rows: usize,
    /// Widest row.
    pub columns: usize,
}

/// Counts tabular regions in plain text.
#[derive(Debug, Clone)]
pub struct TableDetector {
    min_rows: usize,
    min_columns: usize,
    min_column_gap: usize,
}

impl TableDetector {
    /// Create a detector from configuration.
    pub fn new(config: &TableConfig) -> Self {
        Self {
            min_rows: config.min_rows.max(1),
            min_columns: config.min_columns.max(2),
            min_column_gap: config.min_column_gap.max(1),
        }
    }

    /// Split a line into non-empty cells.
    pub fn split_cells<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut cells = Vec::new();

        for segment in line.split(['\t', '|']) {
            let bytes = segment.as_bytes();
            let mut start = 0;
            let mut i = 0;
            while i < bytes.len() {
                if bytes[i] == b' ' {
                    let run_start = i;
                    while i < bytes.len() && bytes[i] == b' ' {
                        i += 1;
                    }
                    if i - run_start >= self.min_column_gap {
                        cells.push(segment[start..run_start].trim());
                        start = i;
                    }
                } else {
                    i += 1;
                }
            }
            cells.push(segment[start..].trim());
        }

        cells.retain(|c| !c.is_empty());
        cells
    }

    fn is_rule(&self, line: &str) -> bool {
        RULE_LINE.is_match(line)
    }

    /// Find all table regions.
    pub fn detect(&self, text: &str) -> Vec<TableRegion> {
        let mut regions = Vec::new();
        let mut current: Option<TableRegion> = None;

        for (idx, line) in text.lines().enumerate() {
            let columns = if self.is_rule(line) {
                Some(0)
            } else {
                let cells = self.split_cells(line).len();
                (cells >= self.min_columns).then_some(cells)
            };

            match (columns, current.as_mut()) {
                (Some(cols), Some(region)) => {
                    region.line_count += 1;
                    if cols > 0 {
                        region.rows += 1;
                        region.columns = region.columns.max(cols);
                    }
                }
                (Some(cols), None) => {
                    current = Some(TableRegion {
                        start_line: idx,
                        line_count: 1,
                        rows: usize::from(cols > 0),
                        columns: cols,
                    });
                }
                (None, _) => {
                    if let Some(region) = current.take() {
                        self.keep(region, &mut regions);
                    }
                }
            }
        }

        if let Some(region) = current {
            self.keep(region, &mut regions);
        }
        regions
    }

    fn keep(&self, region: TableRegion, regions: &mut Vec<TableRegion>) {
        if region.rows >= self.min_rows {
            regions.push(region);
        }
    }

    /// Number of table regions.
    pub fn count(&self, text: &str) -> usize {
        self.detect(text).len()
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new(&TableConfig::default())
    }
}
