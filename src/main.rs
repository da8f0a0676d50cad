use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use finpatch::excel;
use finpatch::patch::{self, FieldRules};
use finpatch::report::{self, UpdateReport};
use finpatch::secdata;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Excel file path
    #[arg(required = true)]
    file_path: PathBuf,

    /// Ticker whose built-in SEC figures to apply (e.g. AAPL)
    #[arg(long, short = 't')]
    ticker: Option<String>,

    /// JSON file mapping field names to figures, replacing the built-in SEC data
    #[arg(long)]
    values: Option<PathBuf>,

    /// JSON file mapping field names to phrase lists, replacing the built-in rule table
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output path for the patched workbook (default: <input>_updated_<timestamp>.xlsx)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print the change report as JSON to stdout (for piping)
    #[arg(long, short = 'j')]
    json: bool,

    /// Locate and report changes without writing the workbook
    #[arg(long, short = 'n')]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (field_values, fiscal_year) = match (&cli.values, &cli.ticker) {
        (Some(path), _) => (secdata::load_values_file(path)?, None),
        (None, Some(ticker)) => {
            let company = secdata::for_ticker(ticker).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown ticker: {} (built-in data covers {})",
                    ticker,
                    secdata::known_tickers().join(", ")
                )
            })?;
            (company.values, Some(company.fiscal_year))
        }
        (None, None) => {
            anyhow::bail!("Provide --ticker or --values to choose the figures to apply")
        }
    };

    let rules = match &cli.rules {
        Some(path) => FieldRules::from_json_file(path)?,
        None => FieldRules::default(),
    };

    let mut workbook = excel::open_workbook(&cli.file_path)?;
    let changes = patch::apply_field_values(workbook.first_sheet_mut(), &rules, &field_values);

    let output = if cli.dry_run {
        None
    } else {
        Some(workbook.save(cli.output.as_deref())?)
    };

    let report = UpdateReport::new(
        cli.ticker.as_deref().map(str::to_uppercase),
        fiscal_year,
        changes,
        field_values,
        output.as_deref(),
    );

    if cli.json {
        println!("{}", report::serialize_to_json(&report)?);
        return Ok(());
    }

    print_summary(&report, cli.dry_run);

    Ok(())
}

fn print_summary(report: &UpdateReport, dry_run: bool) {
    let company = match (&report.ticker, &report.fiscal_year) {
        (Some(ticker), Some(year)) => format!("{} FY{}: ", ticker, year),
        (Some(ticker), None) => format!("{}: ", ticker),
        _ => String::new(),
    };
    println!("{}{} field(s) updated", company, report.changes_count);

    if report.changes.is_empty() {
        println!("  No matching labels found in the scanned region.");
    }

    for change in &report.changes {
        println!(
            "  {} at {}: {} -> {}",
            change.field, change.location, change.old, change.new
        );
    }

    match &report.output {
        Some(path) => println!("Saved: {}", path),
        None if dry_run => println!("Dry run, workbook not written."),
        None => {}
    }
}
