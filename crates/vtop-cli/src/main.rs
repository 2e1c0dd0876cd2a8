// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result};
use config::Config;
use std::env;
use std::path::PathBuf;
use vtop_app::DataSource;
use vtop_tui::{DashboardWindow, PollOrchestrator, Theme};

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
            "load config {}; run `vtop --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let target = if options.demo {
        vtop_source::DEMO_TARGET.to_owned()
    } else {
        options
            .target
            .clone()
            .unwrap_or_else(|| config.target().to_owned())
    };
    let log_path = match &options.log_path {
        Some(path) => path.clone(),
        None => config.log_path()?,
    };
    let _log_guard = logging::init(&log_path, config.log_level())
        .with_context(|| format!("open log file {}", log_path.display()))?;
    tracing::info!(target_name = %target, "starting vtop");

    let mut source = vtop_source::open(&target, config.source_timeout()?).with_context(|| {
        format!("no data source for {target:?}; use `demo` or an http(s):// agent URL")
    })?;
    source
        .connect(&target)
        .with_context(|| format!("connect to {target} -- check [source].target or --target"))?;
    if options.check_only {
        source.disconnect();
        return Ok(());
    }

    let version = source.version();
    let views = vtop_tui::tab_views();
    let mut poller = PollOrchestrator::new(source, views.clone(), config.poll_interval()?);
    poller.start();

    let theme = Theme::select(options.light || config.light_theme());
    let mut window = DashboardWindow::new(views, version, theme, config.notification_duration()?);
    let result = vtop_tui::run_dashboard(&mut window, &mut poller, config.render_interval()?);
    tracing::info!("vtop exited");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    target: Option<String>,
    log_path: Option<PathBuf>,
    print_config_path: bool,
    demo: bool,
    light: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        target: None,
        log_path: None,
        print_config_path: false,
        demo: false,
        light: false,
        print_example: false,
        check_only: false,
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
            "--target" | "-s" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--target requires an agent URL or `demo`")
                })?;
                options.target = Some(value.as_ref().to_owned());
            }
            "--log" | "-l" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--log requires a file path"))?;
                options.log_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--light" => {
                options.light = true;
            }
            "--check" => {
                options.check_only = true;
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
    println!("vtop: live counters dashboard");
    println!("  --config <path>          Use a specific config path");
    println!("  -s, --target <target>    Agent URL, or `demo` for the simulator");
    println!("  -l, --log <path>         Write logs to this file");
    println!("  --demo                   Run against the built-in simulator");
    println!("  --light                  Use the light color theme");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and connect, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/vtop-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                target: None,
                log_path: None,
                print_config_path: false,
                demo: false,
                light: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_target_and_log_in_both_spellings() -> Result<()> {
        let long = parse_cli_args(
            vec!["--target", "http://10.0.0.1:9191", "--log", "/tmp/a.log"],
            default_options_path(),
        )?;
        assert_eq!(long.target.as_deref(), Some("http://10.0.0.1:9191"));
        assert_eq!(long.log_path, Some(PathBuf::from("/tmp/a.log")));

        let short = parse_cli_args(vec!["-s", "demo", "-l", "b.log"], default_options_path())?;
        assert_eq!(short.target.as_deref(), Some("demo"));
        assert_eq!(short.log_path, Some(PathBuf::from("b.log")));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for flag in ["--config", "--target", "-s", "--log", "-l"] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains("requires"), "{flag}: {error}");
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
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_and_light_flags() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "--light"], default_options_path())?;
        assert!(options.demo);
        assert!(options.light);
        assert!(!options.print_config_path);
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
}
