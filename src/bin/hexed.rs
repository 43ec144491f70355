//! hexed - Interactive hex editor
//!
//! Reads one command line at a time from stdin and edits the file in place.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use hexed::app::{run_session, Session};
use hexed::buffer::{ByteOrder, ByteStore, ByteTransform, FileStore, RedoPolicy};

/// Line-oriented hex editor with undo/redo
#[derive(Parser, Debug)]
#[command(name = "hexed")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Byte order to assume for the file (default: little)
    #[arg(long, value_enum)]
    endian: Option<Endian>,

    /// Drop undone changes when a new edit is made
    #[arg(long)]
    clear_redo: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Endian {
    Little,
    Big,
}

impl From<Endian> for ByteOrder {
    fn from(endian: Endian) -> Self {
        match endian {
            Endian::Little => ByteOrder::Little,
            Endian::Big => ByteOrder::Big,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let Some(path) = args.file.clone() else {
        println!("Hex editor");
        println!("Usage: hexed <file>");
        return Ok(());
    };

    let store = match FileStore::open(&path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(store, &args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(store: FileStore, args: &Args) -> Result<()> {
    let transform = match args.endian {
        Some(endian) => ByteTransform::for_file_order(endian.into()),
        None => ByteTransform::host_default(),
    };
    let policy = if args.clear_redo {
        RedoPolicy::ClearOnEdit
    } else {
        RedoPolicy::Keep
    };
    tracing::debug!(
        "editing {} ({} bytes), bit reversal {}",
        store.path().display(),
        store.len(),
        if transform.is_enabled() { "on" } else { "off" }
    );

    let mut session = Session::new(store)
        .with_transform(transform)
        .with_redo_policy(policy);

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let result = run_session(&mut session, stdin, &mut stdout);
    session.flush()?;
    result?;
    Ok(())
}

/// ログ出力を初期化（標準エラー、既定は warn）
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("HEXED_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
