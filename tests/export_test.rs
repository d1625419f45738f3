mod common;

use anyhow::Result;
use common::*;
use partio::io::Exporter;

#[tokio::test]
async fn test_settlement_text_format() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create_trio(&service).await?;
    StandardGroup::add_shared_dinner(&service).await?;

    let mut output = Vec::new();
    Exporter::new(&service)
        .export_settlement_text(&mut output)
        .await?;

    let text = String::from_utf8(output)?;
    let expected = "\
Balances:
Anna: 20.00
Ben: -10.00
Carl: -10.00

Settlement:
Ben pays Anna: 10.00
Carl pays Anna: 10.00
";
    assert_eq!(text, expected);

    Ok(())
}

#[tokio::test]
async fn test_settlement_text_when_settled() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create_trio(&service).await?;

    let mut output = Vec::new();
    Exporter::new(&service)
        .export_settlement_text(&mut output)
        .await?;

    let text = String::from_utf8(output)?;
    assert_eq!(text, "Balances:\nAnna: 0.00\nBen: 0.00\nCarl: 0.00\n");
    assert!(
        !text.contains("Settlement:"),
        "Settled ledgers get no settlement section"
    );

    Ok(())
}

#[tokio::test]
async fn test_expenses_csv_format() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create_trio(&service).await?;
    StandardGroup::add_shared_dinner(&service).await?;
    service
        .add_expense(12.5, "Ben", &names(&["Anna"]))
        .await?;

    let mut output = Vec::new();
    let count = Exporter::new(&service)
        .export_expenses_csv(&mut output)
        .await?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(output)?;
    let expected = "\
index,amount,paid_by,split_between
0,30.00,Anna,Anna;Ben;Carl
1,12.50,Ben,Anna
";
    assert_eq!(csv, expected);

    Ok(())
}

#[tokio::test]
async fn test_balances_csv_format() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create_trio(&service).await?;
    StandardGroup::add_shared_dinner(&service).await?;

    let mut output = Vec::new();
    let count = Exporter::new(&service)
        .export_balances_csv(&mut output)
        .await?;
    assert_eq!(count, 3);

    let csv = String::from_utf8(output)?;
    let expected = "\
person,balance
Anna,20.00
Ben,-10.00
Carl,-10.00
";
    assert_eq!(csv, expected);

    Ok(())
}

#[tokio::test]
async fn test_snapshot_json_export() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create_trio(&service).await?;
    StandardGroup::add_shared_dinner(&service).await?;

    let mut output = Vec::new();
    let file = Exporter::new(&service)
        .export_snapshot_json(&mut output)
        .await?;

    assert_eq!(file.version, env!("CARGO_PKG_VERSION"));
    assert!(file.exported_at.is_some());
    assert_eq!(file.people, names(&["Anna", "Ben", "Carl"]));
    assert_eq!(file.expenses.len(), 1);

    // Expenses serialize with camelCase keys
    let json: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(json["people"][1], "Ben");
    assert_eq!(json["expenses"][0]["paidBy"], "Anna");
    assert_eq!(json["expenses"][0]["splitBetween"][2], "Carl");
    assert_eq!(json["expenses"][0]["amount"], 30.0);

    Ok(())
}

#[tokio::test]
async fn test_empty_ledger_exports() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let exporter = Exporter::new(&service);

    let mut text = Vec::new();
    exporter.export_settlement_text(&mut text).await?;
    assert_eq!(String::from_utf8(text)?, "Balances:\n");

    let mut csv = Vec::new();
    let count = exporter.export_expenses_csv(&mut csv).await?;
    assert_eq!(count, 0);
    assert_eq!(String::from_utf8(csv)?, "index,amount,paid_by,split_between\n");

    Ok(())
}
