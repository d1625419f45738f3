// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use partio::application::LedgerService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to turn string literals into owned names
pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

/// Test fixture: standard group setup
pub struct StandardGroup;

impl StandardGroup {
    /// Add the basic trio: Anna, Ben, Carl
    pub async fn create_trio(service: &LedgerService) -> Result<()> {
        service.add_person("Anna").await?;
        service.add_person("Ben").await?;
        service.add_person("Carl").await?;
        Ok(())
    }

    /// Anna pays 30.00 for a dinner split three ways.
    /// Leaves Anna at +20.00, Ben and Carl at -10.00 each.
    pub async fn add_shared_dinner(service: &LedgerService) -> Result<()> {
        service
            .add_expense(30.0, "Anna", &names(&["Anna", "Ben", "Carl"]))
            .await?;
        Ok(())
    }
}
