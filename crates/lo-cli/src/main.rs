use std::path::Path;
use std::process::ExitCode;

use lo_core::models::{LaunchConfig, LaunchPlan, LaunchReport};
use lo_core::services::command::ProcessRunner;
use lo_core::services::config_loader;
use lo_core::services::endpoint_resolver::EndpointResolver;
use lo_core::services::launcher::Launcher;
use lo_core::services::network_scanner;
use lo_core::services::runtime::DockerCli;

use lo_cli::cli::{self, CliArgs, Command};
use lo_cli::render;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}\n\n{}", cli::USAGE);
            return Ok(ExitCode::from(2));
        }
    };
    if args.command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let _guard = setup_logging(args.log_file.as_deref(), args.debug);

    let mut config = LaunchConfig::from_env();
    if let Some(root) = &args.root {
        config = config.with_root(root);
    }
    tracing::debug!(config = ?config, "loaded configuration");

    run(&args, &config).await
}

async fn run(args: &CliArgs, config: &LaunchConfig) -> color_eyre::Result<ExitCode> {
    let runtime = DockerCli::new(ProcessRunner, config.docker_bin.clone());

    match &args.command {
        Command::Up => {
            let plan = load_plan(args, config)?;
            let report = Launcher::new(&runtime, config).run(&plan).await;
            print_report(args, &report)?;
            Ok(exit_code(report.is_success()))
        }
        Command::Networks => {
            let mut report = LaunchReport::new();
            Launcher::new(&runtime, config)
                .setup_networks(&mut report)
                .await;
            report.finished_at = Some(chrono::Utc::now());
            print_report(args, &report)?;
            Ok(exit_code(report.networks_complete()))
        }
        Command::Scan => {
            let scan = network_scanner::scan(&config.agents_root()).await;
            let names = scan.external_network_names();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in &names {
                    println!("{name}");
                }
                for skipped in &scan.skipped {
                    eprintln!("skipped {}: {}", skipped.agent, skipped.reason);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Plan => {
            let plan = load_plan(args, config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", render::render_plan(&plan));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Endpoint(agent_ids) => {
            let resolver = EndpointResolver::discover(config);
            let endpoints = resolver.resolve_all(agent_ids.iter().map(String::as_str));
            if args.json {
                println!("{}", serde_json::to_string_pretty(&endpoints)?);
            } else {
                for endpoint in &endpoints {
                    println!("{}", endpoint.url);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Help => Ok(ExitCode::SUCCESS),
    }
}

fn load_plan(args: &CliArgs, config: &LaunchConfig) -> lo_core::Result<LaunchPlan> {
    match &args.plan {
        Some(path) => config_loader::load_plan_file(path),
        None => config_loader::load_plan(config),
    }
}

fn print_report(args: &CliArgs, report: &LaunchReport) -> color_eyre::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render::render_report(report));
    }
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Log to stderr, or to `log_file` through a non-blocking writer.
/// The returned guard must be held for the life of the program.
fn setup_logging(
    log_file: Option<&Path>,
    debug: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "launch-orchestrator.log".into());
            let file_appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_env_filter(filter)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
            None
        }
    }
}
