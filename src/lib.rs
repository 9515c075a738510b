pub mod cli;
pub mod error;
pub mod grid;
pub mod io_utils;
pub mod key_spec;
pub mod preview;
pub mod records;
pub mod row_index;
pub mod schema_index;
pub mod store;
pub mod table;
pub mod upsert;
pub mod upsert_cmd;
mod yaml_provider;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    error::UpsertError,
    grid::Grid,
    key_spec::{ColumnGrowth, KeySpec, MissingKeyPolicy},
    records::Record,
    store::{CsvStore, GridStore},
    upsert::{UpsertEngine, UpsertSummary, upsert},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_upsert", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Upsert(args) => upsert_cmd::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
