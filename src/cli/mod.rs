use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{format_amount, parse_amount};

/// Partio - Shared Expense Splitter
#[derive(Parser)]
#[command(name = "partio")]
#[command(about = "A local-first shared expense splitter with a settlement ledger")]
#[command(version)]
pub struct Cli {
    /// Path to the ledger database file
    #[arg(short, long, default_value = "partio.db")]
    pub database: String,

    /// Show more detail in command output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Person management commands
    #[command(subcommand)]
    Person(PersonCommands),

    /// Expense management commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Show net balances for everyone
    Balance,

    /// Show who pays whom to settle all debts
    Settle,

    /// Verify ledger integrity
    Check,

    /// Export data to text, CSV or JSON
    Export {
        /// What to export: settlement, expenses, balances, full
        export_type: String,

        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data from CSV or JSON
    Import {
        /// What to import: expenses, full
        import_type: String,

        /// Input file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Validate without importing
        #[arg(long)]
        validate: bool,

        /// Create people that don't exist yet (expenses import)
        #[arg(long)]
        create_people: bool,
    },
}

#[derive(Subcommand)]
pub enum PersonCommands {
    /// Add a person to the group
    Add {
        /// Person name (must be unique, case-sensitive)
        name: String,
    },

    /// Remove a person; expenses they paid are deleted and their name is
    /// stripped from every split
    Remove {
        /// Person name
        name: String,
    },

    /// List everyone in the group
    List,

    /// Show one person's balance and activity
    Show {
        /// Person name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a shared expense
    Add {
        /// Amount paid (e.g., "30" or "29.90")
        amount: String,

        /// Who paid
        #[arg(long)]
        paid_by: String,

        /// Comma-separated names sharing the cost (defaults to everyone)
        #[arg(long, value_delimiter = ',')]
        split: Option<Vec<String>>,
    },

    /// Remove an expense by its list index
    Remove {
        /// Expense index as shown by `expense list`
        index: usize,
    },

    /// List all expenses with their indices
    List,

    /// Show one expense in detail
    Show {
        /// Expense index as shown by `expense list`
        index: usize,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Person(person_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_person_command(&service, person_cmd).await?;
            }

            Commands::Expense(expense_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_expense_command(&service, expense_cmd).await?;
            }

            Commands::Balance => {
                let service = LedgerService::connect(&self.database).await?;
                run_balance_command(&service).await?;
            }

            Commands::Settle => {
                let service = LedgerService::connect(&self.database).await?;
                run_settle_command(&service).await?;
            }

            Commands::Check => {
                let service = LedgerService::connect(&self.database).await?;
                run_check_command(&service).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }

            Commands::Import {
                import_type,
                input,
                dry_run,
                validate,
                create_people,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_import_command(
                    &service,
                    &import_type,
                    input.as_deref(),
                    dry_run,
                    validate,
                    create_people,
                    self.verbose,
                )
                .await?;
            }
        }

        Ok(())
    }
}

async fn run_person_command(service: &LedgerService, cmd: PersonCommands) -> Result<()> {
    match cmd {
        PersonCommands::Add { name } => {
            let name = name.trim();
            service.add_person(name).await?;
            println!("Added person: {}", name);
        }

        PersonCommands::Remove { name } => {
            let name = name.trim();
            let summary = service.remove_person(name).await?;
            println!("Removed person: {}", name);
            if summary.paid_dropped > 0 {
                println!("  Removed {} expense(s) they paid", summary.paid_dropped);
            }
            if summary.trimmed > 0 {
                println!("  Updated {} split(s)", summary.trimmed);
            }
            if summary.emptied > 0 {
                println!(
                    "  Dropped {} expense(s) left with nobody to split",
                    summary.emptied
                );
            }
        }

        PersonCommands::List => {
            let people = service.list_people().await?;
            if people.is_empty() {
                println!("No people found.");
            } else {
                for name in people {
                    println!("{}", name);
                }
            }
        }

        PersonCommands::Show { name } => {
            let info = service.person_info(name.trim()).await?;

            println!("Person: {}", info.name);
            println!("  Balance:         {}", format_amount(info.balance));
            println!(
                "  Expenses paid:   {} ({} total)",
                info.expenses_paid,
                format_amount(info.total_paid)
            );
            println!(
                "  Expenses shared: {} ({} total share)",
                info.expenses_shared,
                format_amount(info.total_share)
            );
        }
    }
    Ok(())
}

async fn run_expense_command(service: &LedgerService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            amount,
            paid_by,
            split,
        } => {
            let amount =
                parse_amount(&amount).context("Invalid amount format. Use '30' or '29.90'")?;

            // No --split means everyone currently in the group shares it
            let split_between: Vec<String> = match split {
                Some(names) => names
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                None => service.list_people().await?,
            };

            let result = service
                .add_expense(amount, paid_by.trim(), &split_between)
                .await?;

            println!(
                "Added expense [{}]: {} paid {} for {}",
                result.index,
                result.expense.paid_by,
                format_amount(result.expense.amount),
                result.expense.split_between.join(", ")
            );
        }

        ExpenseCommands::Remove { index } => {
            let removed = service.remove_expense(index).await?;
            println!(
                "Removed expense [{}]: {} paid {} for {}",
                index,
                removed.paid_by,
                format_amount(removed.amount),
                removed.split_between.join(", ")
            );
        }

        ExpenseCommands::List => {
            let expenses = service.list_expenses().await?;
            if expenses.is_empty() {
                println!("No expenses found.");
            } else {
                for (index, expense) in expenses.iter().enumerate() {
                    println!(
                        "[{}] {} paid {} for {}",
                        index,
                        expense.paid_by,
                        format_amount(expense.amount),
                        expense.split_between.join(", ")
                    );
                }
            }
        }

        ExpenseCommands::Show { index } => {
            let expense = service.get_expense(index).await?;

            println!("Expense [{}]", index);
            println!("  Amount:    {}", format_amount(expense.amount));
            println!("  Paid by:   {}", expense.paid_by);
            println!("  Split:     {}", expense.split_between.join(", "));
            println!("  Per share: {}", format_amount(expense.share()));
        }
    }
    Ok(())
}

async fn run_balance_command(service: &LedgerService) -> Result<()> {
    let balances = service.balances().await?;

    if balances.is_empty() {
        println!("No people found.");
    } else {
        println!("{:<20} {:>12}", "PERSON", "BALANCE");
        println!("{}", "-".repeat(33));
        for entry in balances {
            println!(
                "{:<20} {:>12}",
                truncate(&entry.person, 20),
                format_amount(entry.balance)
            );
        }
    }
    Ok(())
}

async fn run_settle_command(service: &LedgerService) -> Result<()> {
    let payments = service.settlement().await?;

    if payments.is_empty() {
        println!("All settled up.");
    } else {
        for payment in payments {
            println!(
                "{} pays {}: {}",
                payment.from,
                payment.to,
                format_amount(payment.amount)
            );
        }
    }
    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("People:   {}", report.person_count);
    println!("Expenses: {}", report.expense_count);
    println!(
        "Balance total: {}  {}",
        format_amount(report.total_balance),
        if report.is_balanced {
            "OK"
        } else {
            "UNBALANCED!"
        }
    );
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found ({}):", report.issues.len());
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "settlement" => {
            exporter.export_settlement_text(writer).await?;
            if output.is_some() {
                eprintln!("Exported settlement summary");
            }
        }
        "expenses" => {
            let count = exporter.export_expenses_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} expenses", count);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} balances", count);
            }
        }
        "full" => {
            let file = exporter.export_snapshot_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} people, {} expenses",
                    file.people.len(),
                    file.expenses.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: settlement, expenses, balances, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    import_type: &str,
    input: Option<&str>,
    dry_run: bool,
    validate: bool,
    create_people: bool,
    verbose: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{stdin, Read};

    let importer = Importer::new(service);

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions {
        dry_run,
        validate_only: validate,
        create_missing_people: create_people,
    };

    let result = match import_type {
        "expenses" => importer.import_expenses_csv(reader, options).await?,
        "full" => importer.import_snapshot_json(reader, options).await?,
        _ => {
            anyhow::bail!(
                "Invalid import type '{}'. Valid types: expenses, full",
                import_type
            );
        }
    };

    // Display results
    if validate || dry_run {
        println!("Validation successful");
    } else {
        println!("Import complete");
    }
    println!("  People:   {}", result.people);
    println!("  Expenses: {}", result.expenses);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        let shown = if verbose { result.errors.len() } else { 10 };

        println!("\nErrors:");
        for error in result.errors.iter().take(shown) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > shown {
            println!(
                "  ... and {} more errors (use --verbose to see all)",
                result.errors.len() - shown
            );
        }
    }

    Ok(())
}

/// Shorten a name to at most `max_len` characters for table display.
/// Measured in characters, the same unit `format!` width padding uses.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn test_truncate_keeps_short_names() {
        assert_eq!(truncate("Anna", 20), "Anna");
        assert_eq!(truncate("exactly-twenty-chars", 20), "exactly-twenty-chars");
    }

    #[test]
    fn test_truncate_shortens_long_names() {
        assert_eq!(
            truncate("abcdefghijklmnopqrstuvwxyz", 20),
            "abcdefghijklmnopq..."
        );
    }

    #[test]
    fn test_truncate_cuts_accented_names_between_chars() {
        // 22 chars, 44 bytes; a byte-offset cut would land mid-character
        let name = "Áé".repeat(11);
        let cut = truncate(&name, 20);

        assert_eq!(cut.chars().count(), 20);
        assert!(cut.ends_with("..."));
        assert!(cut.starts_with("Áé"));
    }

    #[test]
    fn test_truncate_multibyte_name_within_limit_is_untouched() {
        // 18 chars but 36 bytes; character count is what matters
        let name = "Áé".repeat(9);
        assert_eq!(truncate(&name, 20), name);
    }
}
