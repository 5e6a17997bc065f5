mod common;

use common::{setup, simple_table};
use trademind::domain::error::DomainError;
use trademind::domain::values::cost_basis::OversellPolicy;
use trademind::{Providers, TradeMind};

#[test]
fn test_average_cost_after_partial_sell() {
    let tm = setup();
    tm.import(
        &simple_table(&[
            ("2024-01-01", "000001", "BUY", 100, 10.0),
            ("2024-01-02", "000001", "BUY", 100, 20.0),
            ("2024-01-03", "000001", "SELL", 50, 30.0),
        ]),
        None,
    )
    .unwrap();

    let p = &tm.positions().unwrap()[0];
    assert_eq!(p.quantity, 150);
    assert!((p.avg_cost - 15.0).abs() < 1e-9);
    assert!((p.total_cost - 2250.0).abs() < 1e-9);
    assert!((p.avg_cost - p.total_cost / p.quantity as f64).abs() < 1e-9);
    assert_eq!(p.current_price, p.avg_cost);
    assert_eq!(p.profit, 0.0);
}

#[test]
fn test_result_independent_of_import_order() {
    let rows = [
        ("2024-01-01", "000002", "BUY", 300, 5.0),
        ("2024-01-05", "000002", "SELL", 100, 9.0),
        ("2024-01-03", "000002", "BUY", 100, 7.0),
        ("2024-01-07", "000002", "SELL", 50, 6.0),
    ];
    let forward = setup();
    forward.import(&simple_table(&rows), None).unwrap();

    let mut reversed = rows;
    reversed.reverse();
    let backward = setup();
    backward.import(&simple_table(&reversed), None).unwrap();

    assert_eq!(forward.positions().unwrap(), backward.positions().unwrap());
    let p = &forward.positions().unwrap()[0];
    assert_eq!(p.quantity, 250);
    assert!((p.avg_cost - 5.5).abs() < 1e-9);
}

#[test]
fn test_recompute_is_idempotent() {
    let tm = setup();
    tm.import(
        &simple_table(&[("2024-01-01", "1", "BUY", 30, 3.3), ("2024-01-02", "1", "SELL", 10, 4.0)]),
        None,
    )
    .unwrap();
    let first = tm.recompute_positions().unwrap();
    let second = tm.recompute_positions().unwrap();
    assert_eq!(first, second);
    assert_eq!(tm.positions().unwrap(), second);
}

#[test]
fn test_oversell_is_a_no_op() {
    let tm = setup();
    tm.import(
        &simple_table(&[
            ("2024-01-01", "000001", "BUY", 10, 10.0),
            ("2024-01-02", "000001", "SELL", 20, 11.0),
        ]),
        None,
    )
    .unwrap();

    let positions = tm.positions().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].quantity, 10);
    assert!((positions[0].total_cost - 100.0).abs() < 1e-9);
    assert!(positions.iter().all(|p| p.quantity >= 0));
}

#[test]
fn test_oversell_rejected_under_strict_policy() {
    let tm = TradeMind::with_options(":memory:", Providers::default(), OversellPolicy::Reject).unwrap();
    let err = tm
        .import(&simple_table(&[("2024-01-01", "000001", "SELL", 5, 1.0)]), None)
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)), "{err}");
}

#[test]
fn test_closed_position_is_removed() {
    let tm = setup();
    tm.import(
        &simple_table(&[
            ("2024-01-01", "000001", "BUY", 100, 10.0),
            ("2024-01-01", "000002", "BUY", 100, 10.0),
        ]),
        None,
    )
    .unwrap();
    assert_eq!(tm.positions().unwrap().len(), 2);

    tm.import(&simple_table(&[("2024-02-01", "000001", "SELL", 100, 12.0)]), None).unwrap();
    let positions = tm.positions().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].stock_code, "000002");
}

#[test]
fn test_same_timestamp_replayed_in_insertion_order() {
    let tm = setup();
    tm.import(
        &simple_table(&[
            ("2024-01-01 09:30:00", "000001", "BUY", 100, 10.0),
            ("2024-01-01 09:30:00", "000001", "SELL", 100, 11.0),
            ("2024-01-01 09:30:00", "000001", "BUY", 50, 30.0),
        ]),
        None,
    )
    .unwrap();
    let p = &tm.positions().unwrap()[0];
    assert_eq!(p.quantity, 50);
    assert!((p.avg_cost - 30.0).abs() < 1e-9);
}
