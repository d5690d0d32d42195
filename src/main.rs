// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

//! FlowSketch CLI entrypoint.
//!
//! By default this opens the interactive TUI with a built-in demo task list.
//! Pass a tasks file to start from your own list, or `--json` to print the
//! generated flow document to stdout without a terminal session.

use std::error::Error;
use std::fs;

use flowsketch::export::to_json;
use flowsketch::graph::build_flow;
use flowsketch::parse::parse_tasks;
use flowsketch::tui::{self, Theme, TuiConfig};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<tasks-file>] [--no-auto-connect] [--grid <px>] [--theme dark|light]\n  {program} --demo [--no-auto-connect] [--grid <px>] [--theme dark|light]\n  {program} [<tasks-file>] [--demo] --json\n\nOne task per line. `#tag` groups a task; `IF ... THEN ... [ELSE ...]` or a\nleading `?` makes a decision; `{{pill|process|wave|diamond}}` forces a shape.\n\nIf tasks-file is omitted, a built-in demo list is used. --demo cannot be\ncombined with a tasks file.\n\n--json prints the flow document to stdout and exits.\n--no-auto-connect generates nodes without sequential edges.\n--grid sets the snap grid in pixels (default 10).\n--theme overrides FLOWSKETCH_THEME for the UI and exports."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    json: bool,
    tasks_file: Option<String>,
    no_auto_connect: bool,
    grid: Option<i64>,
    theme: Option<Theme>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--json" => {
                if options.json {
                    return Err(());
                }
                options.json = true;
            }
            "--no-auto-connect" => {
                if options.no_auto_connect {
                    return Err(());
                }
                options.no_auto_connect = true;
            }
            "--grid" => {
                if options.grid.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let grid: i64 = raw.parse().map_err(|_| ())?;
                if grid < 1 {
                    return Err(());
                }
                options.grid = Some(grid);
            }
            "--theme" => {
                if options.theme.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let theme: Theme = raw.parse().map_err(|_| ())?;
                options.theme = Some(theme);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.tasks_file.is_some() {
                    return Err(());
                }
                options.tasks_file = Some(arg);
            }
        }
    }

    if options.demo && options.tasks_file.is_some() {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "flowsketch".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let text = match &options.tasks_file {
            Some(path) => fs::read_to_string(path)?,
            None => tui::DEMO_TEXT.to_owned(),
        };

        let theme = match options.theme {
            Some(theme) => theme,
            None => Theme::from_env()?,
        };
        let config = TuiConfig {
            auto_connect: !options.no_auto_connect,
            grid: options.grid.unwrap_or(10),
            snap_to_grid: true,
            theme,
        };

        if options.json {
            let state = build_flow(&parse_tasks(&text), config.auto_connect);
            println!("{}", to_json(&state)?);
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let handle = runtime.handle().clone();

        runtime.block_on(async move {
            let tui_join = tokio::task::spawn_blocking(move || {
                tui::run(config, text, handle).map_err(|err| err.to_string())
            })
            .await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
            })?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("flowsketch: {err}");
        std::process::exit(1);
    }
}
