use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use burplist::utils::file_loader::FileLoader;
use burplist::utils::wordlist_writer::write_wordlist;
use burplist::{parse_log, DecodeOptions, Pipeline, RunStats};
use clap::Parser;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Proxy history export (XML, "Save Items" from the proxy history view)
    input: PathBuf,

    /// Where to write the wordlist
    #[arg(default_value = "raw_wordlist.txt")]
    output: PathBuf,

    /// Replace undecodable bytes in bodies instead of aborting
    #[arg(long, default_value_t = false)]
    lossy: bool,

    /// Print a JSON summary of the run to stdout
    #[arg(long, default_value_t = false)]
    stats: bool,

    /// Verbose output (per-record and per-token decisions)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn run(args: &Args) -> anyhow::Result<RunStats> {
    let pipeline = Pipeline::with_default_rules().context("Failed to load filter rules")?;
    info!("Loaded {} filter rules", pipeline.filter().rules().len());

    let content = FileLoader::load(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let records = parse_log(&content, DecodeOptions { lossy: args.lossy })
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    info!("Parsed {} records", records.len());

    let wordlist = pipeline.run(&records);

    write_wordlist(&args.output, &wordlist.words)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(wordlist.stats)
}

fn main() {
    let args = Args::parse();
    let start = Instant::now();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stats = match run(&args) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Summary goes to stderr so it never mixes with --stats JSON
    eprintln!(
        "Processed {} records in {:.2}s. {} unique tokens, {} words written to {}.",
        stats.records,
        start.elapsed().as_secs_f64(),
        stats.raw_tokens,
        stats.accepted,
        args.output.display()
    );

    if args.stats {
        match serde_json::to_string_pretty(&stats) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("Failed to serialize stats: {}", e);
                std::process::exit(2);
            }
        }
    }
}
