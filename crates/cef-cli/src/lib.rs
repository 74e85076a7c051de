//! `cef-explorer` command line
//!
//! Loads the record store once, opens a session and drives the boundary
//! operations. Results go to stdout as JSON; logs go to stderr.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use anyhow::{bail, Context};
use cef_core::{ApplyOutcome, ArtifactCache, ExplorerConfig, ExplorerSession, SessionRegistry};
use cef_filter::{Facet, FacetSelections};
use cef_record::JsonFileSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

const FILTER_FLAGS: [(&str, Facet, &str); 5] = [
    ("province", Facet::Province, "Province or territory (repeatable)"),
    ("project-type", Facet::ProjectType, "Project type (repeatable)"),
    ("stage", Facet::Stage, "Project stage (repeatable)"),
    ("indigenous", Facet::IndigenousOwnership, "Indigenous ownership category (repeatable)"),
    ("scale", Facet::ProjectScale, "Project scale (repeatable)"),
];

fn filter_args() -> Vec<Arg> {
    FILTER_FLAGS
        .iter()
        .map(|(name, _, help)| {
            Arg::new(*name)
                .long(*name)
                .action(ArgAction::Append)
                .value_name("VALUE")
                .help(*help)
        })
        .collect()
}

/// Command definition
#[must_use]
pub fn command() -> Command {
    Command::new("cef-explorer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Community energy financing explorer")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON array of project records (overrides data_path)"),
        )
        .subcommand(Command::new("summary").about("Print the landing overview"))
        .subcommand(
            Command::new("explore")
                .about("Apply filters, materialize cards and optionally select one")
                .args(filter_args())
                .arg(
                    Arg::new("batch")
                        .long("batch")
                        .value_parser(value_parser!(usize))
                        .help("Cards to materialize (defaults to batch_size)"),
                )
                .arg(
                    Arg::new("select")
                        .long("select")
                        .value_parser(value_parser!(usize))
                        .help("Global index of the card to highlight"),
                ),
        )
        .subcommand(
            Command::new("charts")
                .about("Print a dashboard bundle for the filters")
                .arg(
                    Arg::new("dashboard")
                        .required(true)
                        .value_parser(["capital", "ownership", "outcomes"]),
                )
                .args(filter_args()),
        )
}

/// Facet selections from the filter flags
#[must_use]
pub fn selections_from(args: &ArgMatches) -> FacetSelections {
    FILTER_FLAGS
        .iter()
        .fold(FacetSelections::new(), |selections, (name, facet, _)| {
            match args.get_many::<String>(name) {
                Some(values) => selections.with(*facet, values.cloned()),
                None => selections,
            }
        })
}

/// Config from `--config`, with `--data` applied on top
///
/// # Errors
/// Fails when the config file cannot be loaded
pub fn resolve_config(matches: &ArgMatches) -> anyhow::Result<ExplorerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ExplorerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExplorerConfig::default(),
    };
    if let Some(data) = matches.get_one::<PathBuf>("data") {
        config = config.with_data_path(data);
    }
    Ok(config)
}

/// Run a parsed command and return its JSON output
///
/// # Errors
/// Fails when the config or the record store cannot be loaded
pub async fn run(matches: &ArgMatches) -> anyhow::Result<Value> {
    let config = resolve_config(matches)?;
    let Some(data_path) = config.data_path.clone() else {
        bail!("no record source: pass --data or set data_path in the config");
    };

    let source = JsonFileSource::new(&data_path);
    let registry = SessionRegistry::load(&source, config)
        .await
        .with_context(|| format!("loading project records from {}", data_path.display()))?;
    let session = registry.open();

    match matches.subcommand() {
        Some(("summary", _)) => Ok(serde_json::to_value(session.overview())?),
        Some(("explore", args)) => explore(&session, registry.cache(), args).await,
        Some(("charts", args)) => charts(&session, args).await,
        Some((other, _)) => bail!("unknown command {other}"),
        None => bail!("no command given"),
    }
}

async fn explore(
    session: &Arc<ExplorerSession>,
    cache: &ArtifactCache,
    args: &ArgMatches,
) -> anyhow::Result<Value> {
    let filters = match session.apply_filters(&selections_from(args)).await? {
        ApplyOutcome::Applied(applied) => applied,
        ApplyOutcome::Stale { current, .. } => bail!("filters superseded by {current}"),
    };

    let batch = match args.get_one::<usize>("batch") {
        Some(n) => session.materialize_next(*n).await?,
        None => session.materialize_batch().await?,
    };
    let selection = match args.get_one::<usize>("select") {
        Some(index) => Some(session.select_index(*index).await?),
        None => None,
    };

    let snapshot = session.snapshot();
    cache.sync().await;
    Ok(json!({
        "filters": filters,
        "batch": batch,
        "selection": selection,
        "selected_points": session.selected_points(),
        "cards": session.cards(0..snapshot.materialized),
        "session": snapshot,
        "cache": cache.stats(),
    }))
}

async fn charts(session: &Arc<ExplorerSession>, args: &ArgMatches) -> anyhow::Result<Value> {
    if let ApplyOutcome::Stale { current, .. } = session.apply_filters(&selections_from(args)).await? {
        bail!("filters superseded by {current}");
    }

    let bundle = match args.get_one::<String>("dashboard").map(String::as_str) {
        Some("capital") => serde_json::to_value(session.capital_charts())?,
        Some("ownership") => serde_json::to_value(session.ownership_charts())?,
        Some("outcomes") => serde_json::to_value(session.outcome_charts())?,
        other => bail!("unknown dashboard {other:?}"),
    };
    Ok(bundle)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
