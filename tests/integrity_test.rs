mod common;

use anyhow::Result;
use common::*;
use partio::application::{AppError, LedgerService};
use partio::domain::Expense;
use partio::Repository;
use tempfile::TempDir;

#[tokio::test]
async fn test_healthy_ledger_passes_check() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create_trio(&service).await?;
    StandardGroup::add_shared_dinner(&service).await?;

    let report = service.check_integrity().await?;

    assert!(report.is_healthy());
    assert!(report.is_balanced);
    assert_eq!(report.person_count, 3);
    assert_eq!(report.expense_count, 1);
    assert!(report.total_balance.abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_empty_database_passes_check() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let report = service.check_integrity().await?;
    assert!(report.is_healthy());
    assert_eq!(report.person_count, 0);
    assert_eq!(report.expense_count, 0);

    Ok(())
}

#[tokio::test]
async fn test_corrupted_storage_is_refused_by_operations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let path = db_path.to_str().unwrap();

    let service = LedgerService::init(path).await?;
    service.add_person("Anna").await?;

    // Sneak an expense past validation, straight into storage
    let repo = Repository::connect(&format!("sqlite:{}", path)).await?;
    repo.append_expense(&Expense::new(10.0, "Ghost", names(&["Anna"])))
        .await?;

    let err = service.balances().await.unwrap_err();
    assert!(matches!(err, AppError::CorruptedState(_)));

    let err = service.add_person("Ben").await.unwrap_err();
    assert!(
        matches!(err, AppError::CorruptedState(_)),
        "Mutations must not build on corrupted state"
    );

    Ok(())
}

#[tokio::test]
async fn test_check_reports_corruption_instead_of_failing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let path = db_path.to_str().unwrap();

    let service = LedgerService::init(path).await?;
    service.add_person("Anna").await?;

    let repo = Repository::connect(&format!("sqlite:{}", path)).await?;
    repo.append_expense(&Expense::new(10.0, "Ghost", names(&["Anna", "Zoe"])))
        .await?;

    // The check itself succeeds and carries the findings
    let report = service.check_integrity().await?;

    assert!(!report.is_healthy());
    assert_eq!(report.issues.len(), 2, "Unknown payer and unknown split member");
    assert!(report.issues.iter().any(|i| i.contains("Ghost")));
    assert!(report.issues.iter().any(|i| i.contains("Zoe")));
    assert_eq!(report.person_count, 1);
    assert_eq!(report.expense_count, 1);

    Ok(())
}

#[tokio::test]
async fn test_restore_fixes_corrupted_storage() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let path = db_path.to_str().unwrap();

    let service = LedgerService::init(path).await?;
    service.add_person("Anna").await?;

    let repo = Repository::connect(&format!("sqlite:{}", path)).await?;
    repo.append_expense(&Expense::new(10.0, "Ghost", names(&["Anna"])))
        .await?;
    assert!(!service.check_integrity().await?.is_healthy());

    // Restoring a valid snapshot overwrites the bad rows
    let snapshot = partio::domain::LedgerSnapshot {
        people: names(&["Anna"]),
        expenses: vec![Expense::new(10.0, "Anna", names(&["Anna"]))],
    };
    service.restore(&snapshot).await?;

    assert!(service.check_integrity().await?.is_healthy());
    assert_eq!(service.list_expenses().await?.len(), 1);

    Ok(())
}
