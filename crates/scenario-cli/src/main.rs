//! `scenario`: serve processed scenario documents on the command line

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scenario_processor::{ProcessError, ProcessRequest, Role, ScenarioProcessor};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_SUCCESS: u8 = 0;
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_FAILURE: u8 = 2;

fn cli() -> Command {
    Command::new("scenario")
        .version(scenario_processor::VERSION)
        .about("Process scenario configuration documents for a caller")
        .subcommand_required(true)
        .arg(
            Arg::new("base")
                .long("base")
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Scenario root directory"),
        )
        .arg(
            Arg::new("app")
                .long("app")
                .global(true)
                .default_value("main")
                .help("Application document, read from json/<APP>.json"),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .global(true)
                .help("Caller role (omit for an unauthenticated caller)"),
        )
        .arg(
            Arg::new("maintenance")
                .long("maintenance")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Process as if the system were in maintenance mode"),
        )
        .arg(
            Arg::new("terms-pending")
                .long("terms-pending")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Caller has not accepted the service terms"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML processor configuration"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print JSON on a single line"),
        )
        .subcommand(Command::new("config").about("Print the full processed document"))
        .subcommand(Command::new("list").about("Print the scenarios map"))
        .subcommand(
            Command::new("show").about("Print one scenario").arg(
                Arg::new("key")
                    .required(true)
                    .value_name("KEY")
                    .help("Scenario key (case-sensitive)"),
            ),
        )
}

fn request_from(matches: &ArgMatches) -> ProcessRequest {
    let role = Role::from(matches.get_one::<String>("role").cloned());
    ProcessRequest::new(role)
        .with_terms_accepted(!matches.get_flag("terms-pending"))
        .with_maintenance(matches.get_flag("maintenance"))
}

fn document_path(matches: &ArgMatches) -> PathBuf {
    let app = matches
        .get_one::<String>("app")
        .map_or("main", String::as_str);
    PathBuf::from("json").join(format!("{app}.json"))
}

fn render(value: &Value, compact: bool) -> anyhow::Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

fn run(matches: &ArgMatches) -> anyhow::Result<u8> {
    let base = matches
        .get_one::<PathBuf>("base")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let config_path = matches.get_one::<PathBuf>("config");
    let processor = ScenarioProcessor::open(&base, config_path.map(PathBuf::as_path))
        .with_context(|| format!("failed to configure processor for {}", base.display()))?;
    let request = request_from(matches);
    let path = document_path(matches);

    let processed = processor
        .process(&path, &request)
        .with_context(|| format!("failed to process {}", base.join(&path).display()))?;

    let selected: Result<Value, ProcessError> = match matches.subcommand() {
        Some(("list", _)) => processed.scenarios().map(|s| Value::Object(s.clone())),
        Some(("show", args)) => {
            let key = args.get_one::<String>("key").map_or("", String::as_str);
            processed.scenario(key).cloned()
        }
        _ => Ok(processed.into_value()),
    };

    let compact = matches.get_flag("compact");
    match selected {
        Ok(value) => {
            println!("{}", render(&value, compact)?);
            Ok(EXIT_SUCCESS)
        }
        Err(err) if err.is_not_found() => {
            tracing::warn!("{}", err);
            eprintln!("{}", json!({"error": err.to_string()}));
            Ok(EXIT_NOT_FOUND)
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    match run(&matches) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
