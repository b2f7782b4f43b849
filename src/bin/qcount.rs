//! qcount - count directional line crossings in tracker output
//!
//! Reads one JSON-lines file per feed (one frame per line), runs an
//! independent counter per feed on its own thread and writes crossing logs
//! and snapshots as configured. Ctrl-C stops all feeds after the current
//! frame; pending log rows are flushed before exit.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use qcount::boundary::distinct_directions;
use qcount::csv_log::CsvSink;
use qcount::snapshot::SnapshotWriter;
use qcount::source::JsonLinesSource;
use qcount::{AsyncSink, CounterConfig, EventSink, StreamDriver, Summary};

#[derive(Parser, Debug)]
#[command(name = "qcount", version, about = "Directional line-crossing counter")]
struct Args {
    /// Counter configuration (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Tracker output, one JSON frame per line. Repeat for several feeds.
    #[arg(short, long = "feed", required = true)]
    feeds: Vec<PathBuf>,

    /// Write logs on the counting thread instead of a background worker
    #[arg(long)]
    sync: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = CounterConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    log::info!(
        "{} lines, roi={}, history={}, idle timeout={:?}",
        config.lines.len(),
        config.roi.is_some(),
        config.history,
        config.idle_timeout
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })
        .context("error setting Ctrl-C handler")?;
    }

    let per_feed_dirs = args.feeds.len() > 1;
    let mut workers = Vec::with_capacity(args.feeds.len());

    for feed in &args.feeds {
        let feed = feed.clone();
        let config = config.clone();
        let stop = stop.clone();
        let sync = args.sync;

        let handle = std::thread::Builder::new()
            .name(format!("feed-{}", feed_name(&feed)))
            .spawn(move || run_feed(&feed, &config, per_feed_dirs, sync, &stop))
            .context("spawning feed thread")?;

        workers.push(handle);
    }

    let mut failed = 0;
    for (feed, handle) in args.feeds.iter().zip(workers) {
        match handle.join() {
            Ok(Ok(summary)) => print_summary(feed, &config, &summary),
            Ok(Err(err)) => {
                log::error!("feed {}: {:#}", feed.display(), err);
                failed += 1;
            }
            Err(_) => {
                log::error!("feed {} panicked", feed.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} feeds failed", failed, args.feeds.len()));
    }

    Ok(())
}

fn run_feed(
    feed: &Path,
    config: &CounterConfig,
    per_feed_dirs: bool,
    sync: bool,
    stop: &AtomicBool,
) -> Result<Summary> {
    let source =
        JsonLinesSource::open(feed).with_context(|| format!("opening {}", feed.display()))?;

    let mut log_dir = config.output.log_dir.clone();
    let mut snapshot_dir = config.output.snapshot_dir.clone();
    if per_feed_dirs {
        let name = feed_name(feed);
        log_dir.push(&name);
        snapshot_dir = snapshot_dir.map(|dir| dir.join(&name));
    }

    let mut csv = CsvSink::new(&log_dir, config.classes.clone()).with_retries(config.output.retries);
    if let Some(dir) = snapshot_dir {
        csv = csv.with_snapshots(SnapshotWriter::new(dir));
    }

    let sink: Box<dyn EventSink> = if sync {
        Box::new(csv)
    } else {
        Box::new(AsyncSink::spawn(csv, config.output.queue_capacity)?)
    };

    log::info!("feed {} -> {}", feed.display(), log_dir.display());

    let mut driver = StreamDriver::new(config, sink)?;
    let summary = driver.run(source, stop);

    // joins the sink worker
    drop(driver);

    Ok(summary)
}

fn feed_name(feed: &Path) -> String {
    feed.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed".to_string())
}

fn print_summary(feed: &Path, config: &CounterConfig, summary: &Summary) {
    println!(
        "{}: {} frames, {} crossings, {} skipped, {} evicted",
        feed.display(),
        summary.frames,
        summary.events,
        summary.skipped,
        summary.evicted
    );

    for direction in distinct_directions(&config.lines) {
        println!("  {}", direction);
        for (class_id, label) in config.classes.iter() {
            let n = summary
                .counts
                .get(&(class_id, direction.clone()))
                .copied()
                .unwrap_or(0);
            println!("    {:<12} {}", label, n);
        }
    }
}
