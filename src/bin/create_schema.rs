use std::path::{Path, PathBuf};

use chargepoint_etl::adapters::db::{Store, count_rows};
use clap::Parser;

/// Create (or update) an empty ChargePoint database with the full schema.
#[derive(Debug, Parser)]
#[command(name = "create_schema", about)]
struct Args {
    /// Target sqlite file.
    #[arg(long, default_value = "./data/chargePoint.db")]
    path: PathBuf,
    /// Delete an existing file before creating.
    #[arg(long)]
    force: bool,
    /// Include the fifteen-minute sample table.
    #[arg(short = 'r', long = "record15min")]
    record_fifteen_min: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("failed to create schema: {error}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let path_ref = Path::new(&args.path);
    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|error| format!("failed to create parent directory: {error}"))?;
    }

    if args.force && path_ref.exists() {
        std::fs::remove_file(path_ref)
            .map_err(|error| format!("failed to remove existing db file: {error}"))?;
    }

    let mut store =
        Store::open(path_ref.to_string_lossy().as_ref()).map_err(|error| error.to_string())?;
    let tables = store
        .ensure_schema(args.record_fifteen_min)
        .map_err(|error| error.to_string())?;

    println!("created/updated db at: {}", args.path.display());
    for table in &tables {
        let rows = count_rows(store.connection(), table).map_err(|error| error.to_string())?;
        println!("  {table}: {rows} rows");
    }

    store.close().map_err(|error| error.to_string())
}
