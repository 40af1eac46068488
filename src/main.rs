use anyhow::Result;
use batchscribe::cli::{Cli, Commands, Task};
use batchscribe::corpus::{AVAILABLE_SOURCES, GeneratedSamplesSkipper, Records, create_source};
use batchscribe::driver::{BatchOptions, run_batch};
use batchscribe::stt::{WhisperConfig, WhisperTranscriber};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            source,
            source_config,
            output,
            model,
            language,
            task,
            sampling_rate,
            batch_size,
            beam_size,
            threads,
            logging_freq,
        } => {
            run_command(RunArgs {
                source,
                source_config,
                output,
                model,
                language,
                task,
                sampling_rate,
                batch_size,
                beam_size,
                threads,
                logging_freq,
            })?;
        }
        Commands::Inspect {
            source,
            source_config,
            sampling_rate,
            skip_from,
        } => {
            inspect_command(&source, &source_config, sampling_rate, skip_from)?;
        }
        Commands::Sources => {
            for (name, _) in AVAILABLE_SOURCES {
                println!("{name}");
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "batchscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

struct RunArgs {
    source: String,
    source_config: PathBuf,
    output: PathBuf,
    model: PathBuf,
    language: Option<String>,
    task: Task,
    sampling_rate: u32,
    batch_size: usize,
    beam_size: usize,
    threads: Option<usize>,
    logging_freq: usize,
}

fn run_command(args: RunArgs) -> Result<()> {
    let transcriber = WhisperTranscriber::new(WhisperConfig {
        model_path: args.model,
        language: args.language,
        translate: args.task == Task::Translate,
        beam_size: args.beam_size,
        threads: args.threads,
    })?;

    let mut source = create_source(&args.source, &args.source_config, args.sampling_rate)?;
    let options = BatchOptions {
        batch_size: args.batch_size,
        logging_freq: args.logging_freq,
    };
    let processed = run_batch(source.as_mut(), &transcriber, &args.output, &options)?;
    println!(
        "Processed {processed} samples -> {}",
        args.output.display()
    );
    Ok(())
}

/// Iterate a source end to end without transcribing.
///
/// Useful to validate a corpus layout and config before committing to a
/// multi-day run: every record is decoded exactly as `run` would decode it,
/// so rate mismatches and layout errors surface here.
fn inspect_command(
    source_name: &str,
    source_config: &std::path::Path,
    sampling_rate: u32,
    skip_from: Option<PathBuf>,
) -> Result<()> {
    let mut source = create_source(source_name, source_config, sampling_rate)?;
    if let Some(path) = skip_from {
        source.attach_skipper(Box::new(GeneratedSamplesSkipper::from_file(&path)?));
    }

    let mut count: usize = 0;
    let mut total_secs = 0.0;
    for record in Records::new(source.as_mut()) {
        let record = record?;
        println!("{}\t{:.2}s", record.id, record.duration_secs());
        count += 1;
        total_secs += record.duration_secs();
    }
    println!("{count} records, {total_secs:.1}s of audio");
    Ok(())
}
