use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A broker export as loaded from disk: a header row plus loosely typed cells.
///
/// ```json
/// {"columns": ["成交日期", "股票代码"], "rows": [["2024-01-01", "000001"]]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl SourceTable {
    pub fn rows(&self) -> impl Iterator<Item = SourceRow<'_>> {
        self.rows.iter().map(move |cells| SourceRow { columns: &self.columns, cells })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SourceRow<'a> {
    columns: &'a [String],
    cells: &'a [Value],
}

impl<'a> SourceRow<'a> {
    /// The cell under `column`, treating JSON null, blank strings and short rows
    /// as absent.
    pub fn cell(&self, column: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        match self.cells.get(idx)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            v => Some(v),
        }
    }
}
