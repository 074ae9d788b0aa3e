// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod catalog_file;
mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use logging::LogConfig;
use runtime::DemoRuntime;
use std::env;
use std::fmt::Write as _;
use std::path::PathBuf;
use testify_app::{Catalog, SessionState, builtin_catalog, catalog_tiles};
use testify_tui::{AppRuntime, UiOptions};
use tracing::{info, warn};

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
            "load config {}; run `testify --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let interactive = !options.check_only && options.search.is_none();
    let log_file = if interactive {
        Some(config.log_file()?)
    } else {
        None
    };
    logging::init_logging(
        &LogConfig::from_verbosity(config.log_level(), options.verbosity).with_log_file(log_file),
    )?;

    let catalog_path = options.catalog_path.clone().or_else(|| config.catalog_path());
    let catalog = match &catalog_path {
        Some(path) => catalog_file::load_catalog(path).with_context(|| {
            format!(
                "load catalog {} -- fix the file or drop [catalog].path to use the built-in labs",
                path.display()
            )
        })?,
        None => builtin_catalog().context("build built-in catalog")?,
    };

    if let Some(query) = &options.search {
        print!("{}", format_search_results(&catalog, query));
        return Ok(());
    }

    if options.check_only {
        let unoffered = catalog.unoffered_tests();
        if !unoffered.is_empty() {
            warn!(tests = ?unoffered, "tests without any offering lab");
        }
        println!(
            "ok: {} labs, {} categories",
            catalog.store.list_labs().len(),
            catalog.index.list_categories().len()
        );
        return Ok(());
    }

    let mut session = SessionState {
        screen: config.start_screen(),
        ..SessionState::default()
    };
    let mut runtime = DemoRuntime::new(
        catalog,
        config.researcher(),
        config.institution(),
        time::OffsetDateTime::now_utc(),
    );
    info!(
        labs = runtime.catalog().store.list_labs().len(),
        screen = session.screen.label(),
        "starting session"
    );
    testify_tui::run_app(
        &mut session,
        &mut runtime,
        UiOptions {
            status_clear: config.status_clear(),
        },
    )
}

/// Plain-text rendering of a catalog search, grouped by category.
fn format_search_results(catalog: &Catalog, query: &str) -> String {
    let categories = catalog.index.search(query);
    if categories.is_empty() {
        return format!("no tests match {:?}\n", query.trim());
    }

    let mut out = String::new();
    for category in &categories {
        let _ = writeln!(out, "{}", category.name);
        for tile in catalog_tiles(std::slice::from_ref(category), &catalog.store) {
            match tile.offering {
                Some(_) => {
                    let _ = writeln!(
                        out,
                        "  {:<34} {} · {} · {}",
                        tile.name,
                        tile.price(),
                        tile.quantity(),
                        tile.turnaround()
                    );
                }
                None => {
                    let _ = writeln!(out, "  {:<34} not offered", tile.name);
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    catalog_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    search: Option<String>,
    check_only: bool,
    verbosity: u8,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        catalog_path: None,
        print_config_path: false,
        print_example: false,
        search: None,
        check_only: false,
        verbosity: 0,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--catalog" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--catalog requires a file path"))?;
                options.catalog_path = Some(PathBuf::from(value.as_ref()));
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--search requires a query"))?;
                options.search = Some(value.as_ref().to_owned());
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
            "-v" | "--verbose" => {
                options.verbosity = options.verbosity.saturating_add(1);
            }
            "-vv" => {
                options.verbosity = options.verbosity.saturating_add(2);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("testify: book lab characterization tests");
    println!("  --config <path>          Use a specific config path");
    println!("  --catalog <path>         Load labs and categories from a TOML file");
    println!("  --search <query>         Print matching tests and exit");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config + catalog and exit");
    println!("  -v, --verbose            Raise log verbosity (repeatable)");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, format_search_results, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;
    use testify_app::builtin_catalog;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/testify-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                catalog_path: None,
                print_config_path: false,
                print_example: false,
                search: None,
                check_only: false,
                verbosity: 0,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_path_overrides() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--config",
                "/custom/config.toml",
                "--catalog",
                "/srv/labs.toml",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.catalog_path, Some(PathBuf::from("/srv/labs.toml")));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for (flag, message) in [
            ("--config", "--config requires a file path"),
            ("--catalog", "--catalog requires a file path"),
            ("--search", "--search requires a query"),
        ] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(message));
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_check_and_search() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--print-config-path",
                "--print-example-config",
                "--check",
                "--search",
                "xrd",
            ],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert_eq!(options.search.as_deref(), Some("xrd"));
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_counts_verbosity() -> Result<()> {
        let options = parse_cli_args(vec!["-v", "--verbose"], default_options_path())?;
        assert_eq!(options.verbosity, 2);
        let options = parse_cli_args(vec!["-vv"], default_options_path())?;
        assert_eq!(options.verbosity, 2);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn search_output_lists_first_lab_terms() -> Result<()> {
        let catalog = builtin_catalog()?;
        let output = format_search_results(&catalog, "ftir");
        let line = output
            .lines()
            .find(|line| line.trim_start().starts_with("FTIR"))
            .ok_or_else(|| anyhow::anyhow!("FTIR missing from {output}"))?;
        assert!(line.contains("₹1000/sample · 20 mg · 3 days"), "{line}");
        Ok(())
    }

    #[test]
    fn search_output_reports_no_match() -> Result<()> {
        let catalog = builtin_catalog()?;
        assert_eq!(
            format_search_results(&catalog, "  zzz  "),
            "no tests match \"zzz\"\n"
        );
        Ok(())
    }
}
