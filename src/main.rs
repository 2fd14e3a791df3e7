use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

mod rom;

use rom::{ArchiveExtractor, DryRunFilesystem, LayoutScores, RomImage, SortEvent, Sorter, StdFilesystem};

#[derive(Parser, Debug)]
#[command(version, about = "Sort SNES ROMs into LoRom / HiRom / ExHiRom folders")]
struct Cli {
    /// Log header scores and every copy
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify ROMs and copy them into per-layout folders under DEST
    Sort(SortArgs),

    /// Print layout scores and the resulting label for each ROM file
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SortArgs {
    /// ROM files or .zip/.7z/.rar archives
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Destination root; LoRom/HiRom/ExHiRom/Unknown are created inside it
    #[arg(short, long)]
    dest: PathBuf,

    /// 7-Zip executable used for .7z/.rar (default: PATH, then the usual install dirs)
    #[arg(long)]
    seven_zip: Option<PathBuf>,

    /// Print where files would go without creating folders or copying
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Command::Sort(args) => sort(args),
        Command::Classify { files } => classify(&files),
    }
}

fn sort(args: SortArgs) -> Result<()> {
    let SortArgs {
        inputs,
        dest,
        seven_zip,
        dry_run,
    } = args;

    let extractor = match seven_zip {
        Some(path) => ArchiveExtractor::new(Some(path)),
        None => ArchiveExtractor::locate(),
    };
    match extractor.seven_zip() {
        Some(path) => log::debug!("using 7-Zip at {}", path.display()),
        None => log::debug!("7-Zip not found; .7z/.rar inputs will be skipped"),
    }

    // Sorting runs on a worker; this thread only prints progress.
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let notify = |event: SortEvent| {
            let _ = tx.send(event);
        };
        if dry_run {
            Sorter::new(extractor, DryRunFilesystem).run(&inputs, &dest, notify)
        } else {
            Sorter::new(extractor, StdFilesystem).run(&inputs, &dest, notify)
        }
    });

    for event in rx {
        print_event(event);
    }

    worker
        .join()
        .map_err(|_| anyhow!("sort worker panicked"))?
        .context("sort aborted")?;
    Ok(())
}

fn print_event(event: SortEvent) {
    match event {
        SortEvent::ToolMissing { message } => eprintln!("error: {message}"),
        SortEvent::InputSkipped { input, reason } => {
            eprintln!("skipped {}: {reason}", input.display())
        }
        SortEvent::Processed {
            name,
            label,
            done,
            total,
            copied,
        } => {
            let note = if copied { "" } else { " (not copied)" };
            println!("[{done:02}/{total}] {name} → {label}{note}")
        }
        SortEvent::CopyFailed { name, reason } => eprintln!("copy failed for {name}: {reason}"),
        SortEvent::Finished(summary) => {
            let counts: Vec<String> = summary
                .per_label
                .iter()
                .map(|(label, n)| format!("{label}: {n}"))
                .collect();
            println!("Done. {} file(s) sorted ({})", summary.placed, counts.join(", "));
            if summary.overwritten > 0 || summary.skipped_inputs > 0 || summary.failed_copies > 0 {
                println!(
                    "{} overwritten, {} input(s) skipped, {} copy failure(s)",
                    summary.overwritten, summary.skipped_inputs, summary.failed_copies
                );
            }
        }
    }
}

fn classify(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for path in files {
        let rom = match RomImage::load(path) {
            Ok(rom) => rom,
            Err(e) => {
                eprintln!("{e:#}");
                failed += 1;
                continue;
            }
        };
        let s = LayoutScores::of(&rom);
        println!(
            "{:<8} lo={} hi={} exhi={}{}  {}",
            rom::resolve(s),
            s.lorom,
            s.hirom,
            s.exhirom,
            if rom.has_copier_header() { " +hdr" } else { "" },
            path.display()
        );
    }
    if failed > 0 {
        bail!("{failed} file(s) could not be read");
    }
    Ok(())
}
