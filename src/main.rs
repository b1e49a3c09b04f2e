//! Filterlist Dedup - exact-duplicate remover for adblock filter lists
//!
//! Main entry point for the command-line application.

use clap::Parser;
use std::process;

use filterlist_dedup::cli::Args;
use filterlist_dedup::processor::{Processor, ProcessorConfig};
use filterlist_dedup::progress::{print_banner, print_error, print_header, print_info, print_success, print_summary, print_warning};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging; RUST_LOG wins over the flags
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

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
    if !args.quiet {
        print_banner();
    }

    let config = ProcessorConfig::from_args(&args)?;

    if args.verbose && !args.quiet {
        print_config(&config);
    }

    let processor = Processor::new(config);
    let report = processor.process()?;

    if !args.quiet {
        if report.written {
            print_success(&format!("Output written to: {:?}", report.output_path));
        } else {
            print_warning("Dry run - no output written");
        }
        print_summary(&report, args.stats);
    }

    Ok(())
}

/// Print configuration summary
fn print_config(config: &ProcessorConfig) {
    print_header("Configuration");

    print_info(&format!("Input:        {:?}", config.input_path));
    print_info(&format!("Output:       {:?}", config.output_path));
    print_info(&format!("Encoding:     {}", config.encoding.name()));
    print_info(&format!("Buffer size:  {} KB", config.buffer_size / 1024));
    print_info(&format!("Dry run:      {}", config.dry_run));
    print_info(&format!("Duplicates:   {}", if config.report_duplicates { "listed" } else { "counted only" }));
}
