use crate::application::normalize::normalize_row;
use crate::application::positions::PositionsUseCase;
use crate::domain::entities::source_table::SourceTable;
use crate::domain::error::DomainError;
use crate::domain::ports::journal::Journal;
use crate::domain::ports::trade_repository::TradeRepository;
use crate::domain::values::column_mapping::ColumnMapping;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub duplicates: usize,
}

pub struct ImportUseCase {
    trades: Arc<dyn TradeRepository>,
    journal: Arc<dyn Journal>,
    positions: Arc<PositionsUseCase>,
}

impl ImportUseCase {
    pub fn new(
        trades: Arc<dyn TradeRepository>,
        journal: Arc<dyn Journal>,
        positions: Arc<PositionsUseCase>,
    ) -> Self {
        Self { trades, journal, positions }
    }

    /// Normalizes every row, stores the survivors, and recomputes positions.
    ///
    /// Without an explicit mapping the columns are detected from the header.
    /// Nothing is written when a required column is unmapped or when no row
    /// survives normalization.
    pub fn execute(&self, table: &SourceTable, mapping: Option<ColumnMapping>) -> Result<ImportReport, DomainError> {
        let mapping = mapping.unwrap_or_else(|| ColumnMapping::detect(&table.columns));
        let missing = mapping.missing_required();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
            return Err(DomainError::Import(format!("no column mapped for {}", names.join(", "))));
        }

        let mut report = ImportReport { total_rows: table.len(), ..Default::default() };
        let mut records = Vec::with_capacity(table.len());
        for (line, row) in table.rows().enumerate() {
            match normalize_row(&row, &mapping) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    report.rejected += 1;
                    tracing::debug!(row = line + 1, %reason, "row rejected");
                }
            }
        }
        report.accepted = records.len();
        if records.is_empty() {
            return Err(DomainError::Import(format!(
                "none of {} rows could be normalized",
                report.total_rows
            )));
        }

        for record in &records {
            if self.trades.insert_trade(record)? {
                report.inserted += 1;
            } else {
                report.duplicates += 1;
            }
        }

        self.positions.recompute_all()?;

        let details = serde_json::to_string(&report).ok();
        self.journal.add_log(
            "INFO",
            &format!("imported {} of {} rows", report.inserted, report.total_rows),
            Some("import"),
            details.as_deref(),
        )?;
        tracing::info!(
            total = report.total_rows,
            inserted = report.inserted,
            duplicates = report.duplicates,
            rejected = report.rejected,
            "import finished"
        );
        Ok(report)
    }
}
