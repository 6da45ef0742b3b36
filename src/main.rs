use anyhow::Context;
use clap::{Parser, Subcommand};
use fathom::{Engine, EngineConfig, ErrorPolicy, FrameJournal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Identify files and walk into the containers they hold
#[derive(Parser, Debug)]
#[command(name = "fathom", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a file or directory and print its description tree
    Inspect {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,

        /// Deepest nesting to analyze
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Tokens an XML vocabulary may lag behind the shared reader
        #[arg(long, value_name = "N")]
        race_capacity: Option<usize>,

        /// Stop at the first analyzer failure instead of logging it
        #[arg(long)]
        propagate_errors: bool,

        /// Also print the container frames that were built
        #[arg(long)]
        frames: bool,
    },

    /// List registered formats, analyzers and container providers
    Formats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Inspect {
            path,
            json,
            max_depth,
            race_capacity,
            propagate_errors,
            frames,
        } => {
            let mut config = EngineConfig::builder();
            if let Some(depth) = max_depth {
                config = config.max_depth(depth);
            }
            if let Some(capacity) = race_capacity {
                config = config.race_capacity(capacity);
            }
            if propagate_errors {
                config = config.error_policy(ErrorPolicy::Propagate);
            }
            inspect(path, config.build(), json, frames)
        }
        Command::Formats => {
            list_formats();
            Ok(())
        }
    }
}

fn inspect(path: PathBuf, config: EngineConfig, json: bool, frames: bool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let journal = Arc::new(FrameJournal::new());
    let engine = Engine::builder()
        .config(config)
        .with_builtins()
        .journal(Arc::clone(&journal))
        .build();

    let analysis = engine
        .analyze_path(&path)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    let snapshot = analysis.root.snapshot();
    info!(
        nodes = snapshot.count(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "analysis finished"
    );

    if json {
        let mut output = serde_json::json!({ "tree": snapshot });
        if frames {
            output["frames"] = serde_json::to_value(journal.take())?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", snapshot.render_tree());
    if let Some(failure) = &analysis.result.failure {
        println!("\n⚠ {}", failure);
    }
    if frames {
        println!("\nFrames:");
        for record in journal.take() {
            println!(
                "  #{} {}{} [{}]{}",
                record.index,
                "  ".repeat(record.depth),
                record.entity,
                record.analyzers.join(", "),
                if record.blocking { " (blocking)" } else { "" }
            );
        }
    }
    println!(
        "\n✓ {} nodes [{:.2}s]",
        snapshot.count(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn list_formats() {
    let engine = Engine::with_defaults(EngineConfig::default());

    println!("Formats:");
    for format in engine.formats().formats() {
        println!(
            "  {} (.{})",
            format.media_type(),
            format.extension().unwrap_or("-")
        );
    }
    println!("\nXML vocabularies:");
    for vocabulary in engine.formats().vocabularies() {
        println!("  {}", vocabulary.name());
    }
    println!("\nAnalyzers (dispatch order):");
    for name in engine.analyzers().names() {
        println!("  {}", name);
    }
    println!("\nContainer providers:");
    for name in engine.provider_names() {
        println!("  {}", name);
    }
}
