//! `scov`: scenario coverage and duplicate analysis from the command line

mod report;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use report::DuplicateReport;
use scov_analysis::{AnalysisConfig, CoverageMatcher, DuplicateClusterer};
use scov_scenario::{DocumentParser, ParsedDocument, ScenarioParser};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn cli() -> Command {
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");
    let config = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("TOML file with matching/clustering thresholds");

    Command::new("scov")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scenario coverage and duplicate analysis for Gherkin-style documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (overridden by RUST_LOG)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("parse")
                .about("Extract scenarios from one document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document to parse"),
                )
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("coverage")
                .about("Match source scenarios against a QA suite")
                .arg(
                    Arg::new("source")
                        .long("source")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document with required behavior"),
                )
                .arg(
                    Arg::new("qa")
                        .long("qa")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document with existing test scenarios"),
                )
                .arg(config.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("duplicates")
                .about("Cluster near-identical scenarios in one document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Document to scan"),
                )
                .arg(config)
                .arg(json),
        )
        .subcommand(Command::new("config").about("Print the default configuration as TOML"))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    setup_logging(matches.get_flag("verbose"), matches.get_flag("log-json"));

    let output = match matches.subcommand() {
        Some(("parse", args)) => run_parse(args)?,
        Some(("coverage", args)) => run_coverage(args)?,
        Some(("duplicates", args)) => run_duplicates(args)?,
        Some(("config", _)) => AnalysisConfig::default().to_toml_string()?,
        _ => anyhow::bail!("no subcommand given"),
    };
    print!("{output}");
    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }
}

fn path_arg<'m>(args: &'m ArgMatches, name: &str) -> Result<&'m PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

fn load_config(args: &ArgMatches) -> Result<AnalysisConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => {
            let config = AnalysisConfig::from_file(path)?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_document(path: &Path) -> Result<ParsedDocument> {
    let parser = ScenarioParser::new();
    if !parser.can_parse(path) {
        warn!(path = %path.display(), "Unrecognized extension, parsing as plain text");
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = parser.parse_document(&path.display().to_string(), &text);
    if parsed.diagnostics.has_defects() {
        warn!(
            path = %path.display(),
            placeholders = parsed.diagnostics.placeholder_titles,
            "Scenario headers without titles"
        );
    }
    info!(
        path = %path.display(),
        scenarios = parsed.len(),
        unclassified = parsed.diagnostics.unclassified_lines,
        "Parsed document"
    );
    Ok(parsed)
}

fn run_parse(args: &ArgMatches) -> Result<String> {
    let parsed = load_document(path_arg(args, "file")?)?;
    if args.get_flag("json") {
        report::to_json(&parsed)
    } else {
        Ok(report::render_parse(&parsed))
    }
}

fn run_coverage(args: &ArgMatches) -> Result<String> {
    let config = load_config(args)?;
    let source = load_document(path_arg(args, "source")?)?;
    let qa = load_document(path_arg(args, "qa")?)?;

    let matcher = CoverageMatcher::new(config)?;
    let result = matcher.analyze(&source.scenarios, &qa.scenarios);

    if args.get_flag("json") {
        report::to_json(&result)
    } else {
        Ok(report::render_coverage(&result))
    }
}

fn run_duplicates(args: &ArgMatches) -> Result<String> {
    let config = load_config(args)?;
    let parsed = load_document(path_arg(args, "file")?)?;

    let groups = DuplicateClusterer::new(&config)?.cluster(&parsed.scenarios);
    let summary = DuplicateReport {
        document: &parsed.document,
        scenarios: parsed.len(),
        groups: &groups,
    };

    if args.get_flag("json") {
        report::to_json(&summary)
    } else {
        Ok(report::render_duplicates(&summary))
    }
}
