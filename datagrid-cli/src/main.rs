mod render;

use std::fs;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use datagrid_lib::prelude::*;
use serde::Deserialize;
use simplelog::{Config, LevelFilter, WriteLogger};

#[derive(Parser, Debug)]
#[command(name = "datagrid", version, about = "Headless data table")]
struct Cli {
    /// Table configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Records: a JSON array, or `{ "records": [...], "total_count": N }`
    #[arg(long)]
    records: PathBuf,

    /// Free-text search
    #[arg(long)]
    search: Option<String>,

    /// Per-column filter, e.g. `status=active`
    #[arg(long = "filter", value_parser = render::parse_pair)]
    filters: Vec<(String, String)>,

    /// Quick (equality) filter, e.g. `team=Core` or `score=7`
    #[arg(long = "quick", value_parser = render::parse_pair)]
    quick: Vec<(String, String)>,

    /// Header click on a column; repeat to cycle the sort
    #[arg(long = "sort")]
    sort: Vec<String>,

    /// Page to show (1-based)
    #[arg(long)]
    page: Option<usize>,

    /// Records per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Scroll offset
    #[arg(long, default_value_t = 0)]
    scroll: u64,

    /// Viewport height; defaults to the whole page
    #[arg(long)]
    viewport: Option<u32>,

    /// Select a row by key
    #[arg(long = "select")]
    select: Vec<String>,

    /// Print an export instead of the grid
    #[arg(long)]
    export: Option<ExportFormat>,

    /// Write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Records file contents.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Page {
        records: Vec<Record>,
        total_count: Option<usize>,
    },
    List(Vec<Record>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        let log_file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
            .context("Failed to initialize logger")?;
    }

    let config_text = fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read {}", cli.config.display()))?;
    let config = TableConfig::from_json(&config_text)
        .with_context(|| format!("Invalid table configuration in {}", cli.config.display()))?;

    let records_text = fs::read_to_string(&cli.records)
        .with_context(|| format!("Failed to read {}", cli.records.display()))?;
    let (records, total_count) = match serde_json::from_str::<RecordsFile>(&records_text)
        .with_context(|| format!("Invalid records in {}", cli.records.display()))?
    {
        RecordsFile::Page { records, total_count } => (records, total_count),
        RecordsFile::List(records) => (records, None),
    };

    let mut table = DataTable::from_config(config).context("Failed to build table")?;
    table.set_records(records, total_count);
    apply(&mut table, &cli);

    match cli.export {
        Some(format) => {
            let text = table.export(format).context("Export failed")?;
            log::info!("Exported {}", table.export_file_name(format));
            println!("{}", text);
        }
        None => print!("{}", render::grid(&table)),
    }

    Ok(())
}

/// Replays the command line as user actions on the table.
fn apply(table: &mut DataTable, cli: &Cli) {
    if let Some(text) = &cli.search {
        table.set_free_text(text.as_str());
    }
    for (key, value) in &cli.filters {
        table.set_column_filter(key, value.as_str());
    }
    for (key, value) in &cli.quick {
        table.set_quick_filter(key, render::quick_value(value));
    }
    for key in &cli.sort {
        if !table.click_header(key) {
            log::warn!("Column '{}' is not sortable", key);
        }
    }
    if let Some(page_size) = cli.page_size {
        table.set_page_size(page_size);
    }
    if let Some(page) = cli.page {
        table.set_page(page);
    }
    for key in &cli.select {
        table.select(key, true);
    }

    let viewport = cli
        .viewport
        .unwrap_or_else(|| u32::try_from(table.windower().total_height()).unwrap_or(u32::MAX));
    table.set_viewport(viewport);
    table.scroll_to(cli.scroll);
}
