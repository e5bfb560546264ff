use clap::{Args, Parser, Subcommand};
use bigextract::archive::BigArchive;
use bigextract::classify::known_type;
use bigextract::config::{ExtractConfig, DEFAULT_EXTENSION, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use bigextract::hash::name_hash;
use bigextract::{logging, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bigextract", version, about = "Unpack FGIB .big resource archives")]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Verbosity {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Less log output (-q warnings, -qq errors)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every archive found in a directory
    Extract {
        /// Directory containing the archives
        #[arg(default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,
        /// Output root; each archive gets its own sub-directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
        /// Archive file extension
        #[arg(short, long, default_value = DEFAULT_EXTENSION)]
        extension: String,
        /// Delete each archive's previous output before extracting it
        #[arg(long)]
        clean: bool,
        /// Skip writing <stem>_resources.csv
        #[arg(long)]
        no_manifest: bool,
        /// Do not write <output>/extractor.log
        #[arg(long)]
        no_log_file: bool,
    },
    /// Show header, footer and TOC of one archive
    Info {
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute legacy name hashes
    Hash {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
        /// Fold ASCII upper case before hashing
        #[arg(short = 'i', long)]
        ignore_case: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level = logging::level_from_flags(cli.verbosity.verbose, cli.verbosity.quiet);

    match cli.command {

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { input_dir, output, extension, clean, no_manifest, no_log_file } => {
            let config = ExtractConfig {
                input_dir,
                output_dir: output,
                extension,
                clean,
                write_manifest: !no_manifest,
            };
            let log_file = (!no_log_file).then(|| config.log_file());
            logging::init(level, log_file.as_deref())?;

            log::info!("=== Extraction task begins ===");
            let report = scan::run_batch(&config)?;
            log::info!(
                "=== All tasks completed: {}/{} archives, {} manifest rows ===",
                report.processed, report.found, report.rows
            );
            for (path, reason) in &report.failed {
                log::warn!("  failed: {} ({reason})", path.display());
            }
            if !report.failed.is_empty() {
                std::process::exit(1);
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, json } => {
            logging::init(level, None)?;
            let mut ar = BigArchive::open(&input)?;
            ar.parse()?;
            let s = ar.summary()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
                return Ok(());
            }

            println!("── .big Archive ─────────────────────────────────────────");
            println!("  Path            {}", input.display());
            println!("  Magic           {:?}{}", s.magic, if s.magic_valid { "" } else { "  (unexpected)" });
            println!("  Version         {}", s.version);
            println!("  Flags           {:#06x}", s.flags);
            println!("  Table1          {:#x} ({} entries)", s.table1_offset, s.table1_count);
            println!("  TOC             {:#x} ({} entries)", s.toc_offset, s.toc_count);
            println!("  Data section    {:#x} ({} B declared)", s.data_offset, s.data_size);
            println!("  File size       {} B declared, {} B on disk", s.declared_file_size, s.actual_file_size);
            println!();
            println!("{:>6}  {:<12} {:<12} {:>10}  Known type", "Index", "Group", "Offset", "Block");
            for e in &s.entries {
                let hash = ar.toc()[e.index].name_hash;
                println!("{:>6}  {:<12} {:<12} {:>10}  {}",
                    e.index, e.group_hash, e.offset, e.block_size,
                    known_type(hash).unwrap_or("-"));
            }
        }

        // ── Hash ─────────────────────────────────────────────────────────────
        Commands::Hash { names, ignore_case } => {
            for name in &names {
                let h = name_hash(name.as_bytes(), ignore_case);
                match known_type(h) {
                    Some(t) => println!("{h:#010x}  {name}  ({t})"),
                    None    => println!("{h:#010x}  {name}"),
                }
            }
        }
    }

    Ok(())
}
