mod common;

use common::{chinese_export, setup, simple_table, table};
use serde_json::json;
use trademind::domain::error::DomainError;
use trademind::domain::ports::journal::Journal;
use trademind::domain::ports::trade_repository::TradeFilter;
use trademind::domain::values::column_mapping::ColumnMapping;
use trademind::domain::values::trade_type::TradeType;

#[test]
fn test_chinese_export_scenario() {
    let tm = setup();
    let report = tm.import(&chinese_export(), None).unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.duplicates, 0);

    let positions = tm.positions().unwrap();
    assert_eq!(positions.len(), 2);
    let pingan = positions.iter().find(|p| p.stock_code == "000001").unwrap();
    assert_eq!(pingan.quantity, 50);
    assert!((pingan.avg_cost - 10.0).abs() < 1e-9);
    assert_eq!(pingan.stock_name.as_deref(), Some("平安银行"));

    let trades = tm.trades(&TradeFilter::default()).unwrap();
    let sell = trades.iter().find(|t| t.record.trade_type == TradeType::Sell).unwrap();
    assert!((sell.record.net_amount - 546.45).abs() < 1e-9);
}

#[test]
fn test_reimport_counts_duplicates() {
    let tm = setup();
    tm.import(&chinese_export(), None).unwrap();
    let before = tm.positions().unwrap();

    let report = tm.import(&chinese_export(), None).unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.duplicates, 3);
    assert_eq!(tm.trades(&TradeFilter::default()).unwrap().len(), 3);
    assert_eq!(tm.positions().unwrap(), before);
}

#[test]
fn test_unmapped_required_column_fails_batch() {
    let tm = setup();
    let t = table(&["when", "ticker", "side", "shares"], vec![json!(["2024-01-01", "1", "BUY", 10])]);
    let err = tm.import(&t, None).unwrap_err();
    assert!(matches!(err, DomainError::Import(_)), "{err}");
    assert!(tm.trades(&TradeFilter::default()).unwrap().is_empty());
}

#[test]
fn test_no_surviving_rows_fails_batch() {
    let tm = setup();
    let t = simple_table(&[("not a date", "1", "BUY", 10, 1.0), ("2024-01-01", "1", "HOLD", 10, 1.0)]);
    let err = tm.import(&t, None).unwrap_err();
    assert!(matches!(err, DomainError::Import(_)));
    assert!(tm.positions().unwrap().is_empty());
}

#[test]
fn test_bad_rows_skipped_good_rows_kept() {
    let tm = setup();
    let t = simple_table(&[
        ("2024-01-01", "600000.SH", "BUY", 100, 8.0),
        ("2024-01-02", "600000", "BUY", 0, 8.0),
        ("2024-01-03", "", "BUY", 10, 8.0),
    ]);
    let report = tm.import(&t, None).unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 2);
    assert_eq!(tm.positions().unwrap()[0].stock_code, "600000");
}

#[test]
fn test_explicit_mapping_overrides_detection() {
    let tm = setup();
    let t = table(
        &["when", "ticker", "side", "shares", "px"],
        vec![json!(["2024/02/01 10:00", 1, "S", 10, 5.0]), json!(["2024/01/31", 1, "B", 20, 4.0])],
    );
    let mapping = ColumnMapping {
        trade_date: Some("when".into()),
        stock_code: Some("ticker".into()),
        trade_type: Some("side".into()),
        quantity: Some("shares".into()),
        price: Some("px".into()),
        ..Default::default()
    };
    let report = tm.import(&t, Some(mapping)).unwrap();
    assert_eq!(report.inserted, 2);

    // Replay is by date, so the buy lands before the sell.
    let positions = tm.positions().unwrap();
    assert_eq!(positions[0].stock_code, "000001");
    assert_eq!(positions[0].quantity, 10);
    assert!((positions[0].avg_cost - 4.0).abs() < 1e-9);
}

#[test]
fn test_side_column_not_taken_as_trade_id() {
    let tm = setup();
    let t = table(
        &["Date", "Code", "Side Type", "Quantity", "Price", "Trade ID"],
        vec![
            json!(["2024-01-01", "600000", "BUY", 100, 8.0, "A1"]),
            json!(["2024-01-02", "600000", "BUY", 100, 9.0, "A2"]),
            json!(["2024-01-03", "600000", "BUY", 100, 10.0, "A3"]),
        ],
    );
    let report = tm.import(&t, None).unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.duplicates, 0);

    let trades = tm.trades(&TradeFilter::default()).unwrap();
    assert_eq!(trades[0].record.trade_id.as_deref(), Some("A1"));
    assert_eq!(tm.positions().unwrap()[0].quantity, 300);
}

#[test]
fn test_hk_code_keeps_five_digits() {
    let tm = setup();
    tm.import(&simple_table(&[("2024-01-01", "00700.HK", "BUY", 100, 300.0)]), None).unwrap();
    let trades = tm.trades(&TradeFilter::default()).unwrap();
    assert_eq!(trades[0].record.stock_code, "00700");
}

#[test]
fn test_import_writes_audit_log() {
    use std::sync::Arc;
    use trademind::application::import::ImportUseCase;
    use trademind::application::positions::PositionsUseCase;
    use trademind::infrastructure::sqlite::journal_repo::SqliteJournal;
    use trademind::infrastructure::sqlite::position_repo::SqlitePositionRepo;
    use trademind::infrastructure::sqlite::trade_repo::SqliteTradeRepo;
    use trademind::infrastructure::sqlite::{open, IN_MEMORY};

    let conn = open(IN_MEMORY).unwrap();
    let trades = Arc::new(SqliteTradeRepo::new(conn.clone()));
    let journal = Arc::new(SqliteJournal::new(conn.clone()));
    let positions = Arc::new(PositionsUseCase::new(trades.clone(), Arc::new(SqlitePositionRepo::new(conn))));
    let import = ImportUseCase::new(trades, journal.clone(), positions);

    import.execute(&chinese_export(), None).unwrap();

    let logs = journal.run_read_only("SELECT source, details FROM logs", 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["source"], "import");
    let details: serde_json::Value = serde_json::from_str(logs[0]["details"].as_str().unwrap()).unwrap();
    assert_eq!(details["inserted"], 3);
}
