//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use tracing::debug;

use crate::commands::{Commands, RunArgs};
use crate::common::config::{Config, Overrides};
use crate::common::Result;
use crate::harness::Harness;
use crate::http::ReqwestTransport;
use crate::scenario::{canonical, Scenario};

/// Dispatch a CLI command
///
/// Returns whether the command succeeded; a run with failing steps is not
/// an error but does not succeed either.
pub async fn dispatch(command: Commands, verbose: bool) -> Result<bool> {
    match command {
        Commands::Run(args) => run(args, verbose).await,

        Commands::Validate { path } => {
            let scenario = Scenario::from_file(&path)?;
            scenario.validate()?;
            println!(
                "{} {} ({} steps)",
                "✓".green(),
                scenario.name.white().bold(),
                scenario.steps.len()
            );
            Ok(true)
        }

        Commands::Steps { scenario } => {
            let scenario = load_scenario(scenario.as_deref())?;
            print_steps(&scenario);
            Ok(true)
        }
    }
}

async fn run(args: RunArgs, verbose: bool) -> Result<bool> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply(Overrides {
        base_url: args.base_url,
        username: args.username,
        password: args.password,
        require_token: args.require_token,
        scenario: args.scenario,
    });
    config.validate()?;
    debug!(?config, "Loaded configuration");

    let scenario = load_scenario(config.scenario.path.as_deref())?;
    let transport = Arc::new(ReqwestTransport::new(config.target.base_url.as_str())?);

    let report = Harness::new(transport)
        .require_token(config.auth.require_token)
        .run(&config.auth.username, &config.auth.password, &scenario)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print(verbose);
    }

    Ok(report.passed())
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let scenario = match path {
        Some(path) => Scenario::from_file(path)?,
        None => canonical::story_lifecycle(),
    };
    scenario.validate()?;
    Ok(scenario)
}

fn print_steps(scenario: &Scenario) {
    println!("{}", scenario.name.white().bold());
    if let Some(description) = &scenario.description {
        println!("  {}", description.dimmed());
    }
    for step in scenario.ordered_steps() {
        println!(
            "  {:>3}. {} {} {} -> {}",
            step.order,
            step.name,
            step.request.method,
            step.request.path.dimmed(),
            step.expect.status
        );
        let requires = step.requires();
        if !requires.is_empty() {
            println!("       needs: {}", join(&requires).cyan());
        }
        let provides = step.provides();
        if !provides.is_empty() {
            println!("       provides: {}", join(&provides).cyan());
        }
    }
}

fn join(keys: &std::collections::BTreeSet<String>) -> String {
    keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
