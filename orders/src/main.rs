//! Sales Orders CLI - Split a sales CSV into one spreadsheet per order
//!
//! ```bash
//! sales-orders split sales.csv                   # ./Orders_<today>/Order<ID>_<Customer>.xlsx
//! sales-orders split sales.csv --date 2024-03-01 --output /tmp/orders
//! sales-orders split sales.csv --quiet --log-file run.json
//! sales-orders parse sales.csv                   # loaded table as JSON
//! sales-orders preview sales.csv                 # planned order sheets as JSON
//! ```

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use sales_orders::logs::{LogCapture, LogLevel, RUN_LOG};
use sales_orders::paths::orders_dir;
use sales_orders::{
    load_sales_table, parse_file, plan_sales_file, split_sales_file, AppConfig, SplitOptions,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sales-orders")]
#[command(about = "Split a sales CSV into one formatted spreadsheet per order", long_about = None)]
struct Cli {
    /// Do not echo pipeline progress
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one .xlsx per order
    Split {
        /// Input sales CSV file
        input: PathBuf,

        /// Output directory (default: Orders_<date> beside the CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run date used to name the output directory (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Also write the run log as JSON to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Parse and validate a CSV file and output JSON
    Parse {
        /// Input sales CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the order sheets that would be written, as JSON
    Preview {
        /// Input sales CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let config = AppConfig::from_env();
    let cli = Cli::parse();
    RUN_LOG.set_echo(!cli.quiet);

    let result = match cli.command {
        Commands::Split {
            input,
            output,
            date,
            delimiter,
            log_file,
        } => cmd_split(&config, &input, output, date, delimiter, log_file.as_deref()),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Preview {
            input,
            delimiter,
            output,
        } => cmd_preview(&input, delimiter, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_split(
    config: &AppConfig,
    input: &Path,
    output: Option<PathBuf>,
    date: Option<NaiveDate>,
    delimiter: Option<char>,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let destination = output.unwrap_or_else(|| {
        orders_dir(&input, config.output_root.as_deref(), &config.dir_prefix, date)
    });

    let options = SplitOptions {
        delimiter,
        ..SplitOptions::default()
    };

    // The output directory is created by the pipeline once the source validates
    let mut capture = LogCapture::start();
    let result = split_sales_file(&input, &destination, &options);
    let entries = capture.drain();

    if let Some(path) = log_file {
        write_output(&serde_json::to_string_pretty(&entries)?, Some(path))?;
    }
    if capture.missed() > 0 {
        eprintln!("⚠️  {} log entries were dropped", capture.missed());
    }

    let report = result?;
    let warnings = entries.iter().filter(|e| e.level == LogLevel::Warning).count();
    eprintln!(
        "\n✨ Done! {} order file(s) in {}, {} warning(s)",
        report.artifacts.len(),
        destination.display(),
        warnings
    );
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_file(input, delimiter)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));

    let table = load_sales_table(&result)?;
    eprintln!("✅ Loaded {} records", table.len());

    let records: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| {
            let obj: Map<String, Value> = table
                .columns()
                .iter()
                .zip(&row.cells)
                .map(|(col, cell)| Ok((col.clone(), serde_json::to_value(cell)?)))
                .collect::<Result<_, serde_json::Error>>()?;
            Ok(Value::Object(obj))
        })
        .collect::<Result<_, serde_json::Error>>()?;

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_preview(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📦 Previewing: {}", input.display());

    let options = SplitOptions {
        delimiter,
        ..SplitOptions::default()
    };
    let plan = plan_sales_file(input, &options)?;

    for sheet in &plan.sheets {
        eprintln!(
            "   {} ({} items, total {})",
            sheet.artifact_name(&options.extension),
            sheet.item_rows().len(),
            sheet.grand_total
        );
    }

    let json = serde_json::to_string_pretty(&plan)?;
    write_output(&json, output)?;

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
