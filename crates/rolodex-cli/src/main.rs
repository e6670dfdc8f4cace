// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use rolodex_app::{AppCommand, AppState, Column, RecordTable};
use rolodex_source::Client;
use runtime::HttpRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `rolodex --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    logging::init(&config.log_path()?, config.log_level())?;

    let endpoint = options.endpoint.as_deref().unwrap_or(config.endpoint());
    let client = Client::new(endpoint, config.timeout()?).with_context(|| {
        format!(
            "invalid [source] config in {}; fix endpoint/timeout values or pass --endpoint",
            options.config_path.display()
        )
    })?;
    info!(endpoint = client.endpoint(), "starting rolodex");
    if options.check_only {
        return Ok(());
    }

    let mut table = RecordTable::new(config.column_visibility(), config.filter_fields());
    if let Some(filter) = &options.filter {
        table.set_filter_text(filter.as_str());
    }

    if options.list {
        table.load(client.fetch_records()?);
        print!("{}", render_list(&table));
        return Ok(());
    }

    let mut state = AppState::with_table(table);
    if options.filter.is_some() {
        state.dispatch(AppCommand::SetStatus("filter preset from --filter".to_owned()));
    }
    let mut runtime = HttpRuntime::new(client);
    rolodex_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    endpoint: Option<String>,
    filter: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    list: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        endpoint: None,
        filter: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        list: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--endpoint" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--endpoint requires a URL"))?;
                options.endpoint = Some(value.as_ref().to_owned());
            }
            "--filter" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--filter requires text to match"))?;
                options.filter = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                options.list = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rolodex");
    println!("  --config <path>          Use a specific config path");
    println!("  --endpoint <url>         Fetch users from this URL instead of [source].endpoint");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and endpoint, then exit");
    println!("  --list                   Fetch once, print the table, and exit");
    println!("  --filter <text>          Start with this filter text (works with --list)");
    println!("  --help                   Show this help");
}

/// Plain-text rendering of the filtered rows for `--list`. The actions
/// column only means something interactively, so it is left out.
fn render_list(table: &RecordTable) -> String {
    let columns: Vec<Column> = table
        .visible_columns()
        .into_iter()
        .filter(|column| *column != Column::Actions)
        .collect();
    if columns.is_empty() {
        return String::new();
    }

    let rows: Vec<Vec<String>> = table
        .filtered()
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| column.cell_text(record).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain([column.as_str().len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .map(|column| column.as_str().to_owned())
        .collect();
    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
