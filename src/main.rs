use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

// Use library instead of local modules
use supplement_merge::{logging, merge_all_data, MergeInputs, MergeOptions};

/// Merge health, supplement usage, experiment and profile CSVs into one table
#[derive(Parser, Debug)]
#[command(name = "supplement-merge", version)]
struct Cli {
    /// User health records CSV
    #[arg(long, default_value = "user_health_data.csv")]
    health: PathBuf,

    /// Supplement usage CSV
    #[arg(long, default_value = "supplement_usage.csv")]
    usage: PathBuf,

    /// Experiments CSV
    #[arg(long, default_value = "experiments.csv")]
    experiments: PathBuf,

    /// User profiles CSV
    #[arg(long, default_value = "user_profiles.csv")]
    profiles: PathBuf,

    /// Merge options (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the merged CSV here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print rows as JSON lines instead of CSV
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let options = match &cli.config {
        Some(path) => MergeOptions::from_file(path)
            .with_context(|| format!("Failed to load merge options: {}", path.display()))?,
        None => MergeOptions::default(),
    };

    let inputs =
        MergeInputs::from_csv_files(&cli.health, &cli.usage, &cli.experiments, &cli.profiles)
            .context("Failed to read input tables")?;

    let merged = merge_all_data(&inputs, &options).context("Merge failed")?;

    // Column types first, then the data
    eprintln!("Column types:");
    for (column, dtype) in merged.column_types() {
        eprintln!("  {:<20} {}", column, dtype);
    }
    eprintln!("{} rows, fingerprint {}", merged.len(), merged.fingerprint()?);

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    if cli.json {
        let mut writer = writer;
        for row in &merged.rows {
            serde_json::to_writer(&mut writer, row)?;
            writeln!(writer)?;
        }
        writer.flush()?;
    } else {
        merged.write_csv(writer)?;
    }

    Ok(())
}
