use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splay::{DotNamer, GridMode, Session};

/// Route `tracing` output to stderr.  `RUST_LOG` wins when set; otherwise
/// warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Fail early with a readable message if the output directory is unusable.
fn require_dir(dir: &Path) {
    if !dir.is_dir() {
        eprintln!("Error: output directory {} does not exist", dir.display());
        process::exit(1);
    }
}

// ── CLI types ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(about = "Top-down splay tree (Sleator & Tarjan 1985)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read tree commands from stdin
    Repl {
        /// Directory for DOT files written by the `dot` command
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// DOT files are numbered starting one past this value
        #[arg(long, default_value_t = splay::DOT_FIRST_FILE_NUMBER)]
        first_file_number: u32,

        /// Skip the health check after each command
        #[arg(long)]
        no_health_check: bool,

        /// Print diagnostic messages to stderr
        #[arg(long)]
        verbose: bool,
    },

    /// Search a 15-node tree of even keys and snapshot each search
    Grid {
        /// Search only this key (default: every key 1..=31)
        key: Option<i64>,

        /// Start from a descending chain and keep each search's splaying
        #[arg(long)]
        cumulative: bool,

        /// Directory for DOT files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print diagnostic messages to stderr
        #[arg(long)]
        verbose: bool,
    },

    /// Insert 1..=COUNT, then look up a few small keys
    Sequential {
        /// Number of sequential keys; must cover every looked-up key
        #[arg(long, default_value_t = splay::SEQUENTIAL_COUNT)]
        count: i64,

        /// Directory for DOT files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print diagnostic messages to stderr
        #[arg(long)]
        verbose: bool,
    },
}

// ── main ─────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Repl {
            out_dir,
            first_file_number,
            no_health_check,
            verbose,
        } => {
            init_tracing(verbose);
            require_dir(&out_dir);

            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut session = Session::new(stdout.lock(), DotNamer::new(out_dir, first_file_number))
                .with_health_check(!no_health_check);
            session.run(stdin.lock()).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            });
        }

        Commands::Grid {
            key,
            cumulative,
            out_dir,
            verbose,
        } => {
            init_tracing(verbose);
            require_dir(&out_dir);

            let mode = if cumulative { GridMode::Cumulative } else { GridMode::Fresh };
            match key {
                Some(k) => {
                    let probe = splay::grid_single(&out_dir, mode, k).unwrap_or_else(|e| {
                        eprintln!("Error: {}", e);
                        process::exit(1);
                    });
                    if probe.found {
                        println!("found!");
                    } else {
                        println!("NOT FOUND");
                    }
                    println!("Root:         {}", probe.root);
                    println!("Output:       {}", probe.dot.display());
                }
                None => {
                    let probes = splay::grid_sweep(&out_dir, mode).unwrap_or_else(|e| {
                        eprintln!("Error: {}", e);
                        process::exit(1);
                    });
                    for p in &probes {
                        let tag = if p.found { "found" } else { "absent" };
                        println!("{:>3}  {:<6}  root {:>3}  {}", p.key, tag, p.root, p.dot.display());
                    }
                }
            }
        }

        Commands::Sequential {
            count,
            out_dir,
            verbose,
        } => {
            init_tracing(verbose);
            require_dir(&out_dir);

            let t0 = Instant::now();
            let steps = splay::sequential(&out_dir, count).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            });
            let elapsed = t0.elapsed();

            println!("Keys:         1..={}", count);
            for s in &steps {
                println!("Find {:>4}:    height {:>4}  {}", s.key, s.height, s.dot.display());
            }
            println!("Time:         {:.3}s", elapsed.as_secs_f64());
        }
    }
}
