//! Wordlist Gen - parallel combinatorial wordlist generation
//!
//! Main entry point for the command-line application.

use clap::Parser;
use std::process;

use wordlist_gen::cli::Args;
use wordlist_gen::pipeline::{Pipeline, PipelineConfig};
use wordlist_gen::progress::{print_banner, print_error, print_header, print_info};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging; RUST_LOG still takes precedence
    let default_level = if args.verbose {
        "debug"
    } else if args.is_quiet() {
        "off"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Run the application
    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        for cause in e.chain().skip(1) {
            print_error(&format!("  Caused by: {}", cause));
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // Print banner unless quiet mode
    if !args.is_quiet() {
        print_banner();
    }

    // Validate arguments
    validate_args(&args)?;

    // Create pipeline configuration
    let config = PipelineConfig::from_args(&args)?;

    // Show configuration
    if !config.quiet && args.verbose {
        print_config(&config);
    }

    // Create and run pipeline
    let pipeline = Pipeline::new(config);
    pipeline.process()?;

    Ok(())
}

/// Validate command-line arguments
fn validate_args(args: &Args) -> anyhow::Result<()> {
    // Check that the word source exists
    if !args.file.is_file() {
        anyhow::bail!("The file {:?} was not found", args.file);
    }

    if args.length == Some(0) {
        anyhow::bail!("--length must be at least 1");
    }

    if args.get_processes() == 0 {
        anyhow::bail!("--processes must be at least 1");
    }

    if args.chunk_size == 0 {
        anyhow::bail!("--chunk-size must be at least 1");
    }

    args.parse_buffer_size()?;

    Ok(())
}

/// Print configuration summary
fn print_config(config: &PipelineConfig) {
    print_header("Configuration");

    print_info(&format!("Word file:    {:?}", config.word_file));
    print_info(&format!("Output:       {:?}", config.output));

    if let Some(length) = config.target_length {
        print_info(&format!("Length:       {}", length));
    }

    print_info(&format!("Limit:        {}", config.limit));
    print_info(&format!("Chunk size:   {}", config.chunk_size));
    print_info(&format!("Channel:      {} batches", config.channel_capacity()));
    print_info(&format!("Buffer size:  {} MB", config.buffer_size / (1024 * 1024)));
    print_info(&format!("Processes:    {}", config.processes));
}
