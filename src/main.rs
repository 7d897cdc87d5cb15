use anyhow::Result;
use clap::{Parser, ValueEnum};
use outliner::{Outline, OutlineConfig, Outliner, ReportFormat, ReportMode};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "outliner",
    about = "Extract a declaration outline from C/C++ sources",
    version
)]
struct Cli {
    /// File or directory to outline
    input: PathBuf,

    /// Output file for the generated report (stdout if not provided)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// How much of each declaration to include
    #[clap(short, long, value_enum, default_value_t = OutputMode::Full)]
    mode: OutputMode,

    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Directory names to skip while walking
    #[clap(long = "ignore")]
    ignore_dirs: Vec<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputMode {
    /// Include complete source text
    Full,
    /// Include all declarations with bodies elided
    Signatures,
    /// Include the public interface only
    Public,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    /// Markdown report with per-file code blocks
    Markdown,
    /// Serialized declaration model
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mode = match cli.mode {
        OutputMode::Full => ReportMode::Full,
        OutputMode::Signatures => ReportMode::Signatures,
        OutputMode::Public => ReportMode::Public,
    };

    let mut config = OutlineConfig::new(cli.input, mode, cli.ignore_dirs);
    config.format = match cli.format {
        OutputFormat::Markdown => ReportFormat::Markdown,
        OutputFormat::Json => ReportFormat::Json,
    };

    let outliner = Outliner::new();
    let content = outliner.generate(&config)?;

    if let Some(output_file) = cli.output {
        fs::write(&output_file, content)?;
        println!("Outline written to {}", output_file.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
