use anyhow::{bail, Context};
use clap::Parser;
use provider_drift::utils::init_from_config;
use provider_drift::{
    list_providers, load_claims, Brief, BriefService, Config, DriftEngine, DriftResult,
    GeminiClient, PeriodMode,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Score provider behavioral drift from CMS provider/service claims
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to CONFIG_FILE or config/default.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Claims CSV, overrides [data].path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Split each provider's rows into two pseudo-periods
    #[arg(long, num_args = 2, value_names = ["EARLY", "LATE"])]
    pseudo_periods: Option<Vec<i32>>,

    /// List provider identifiers
    #[arg(long, conflicts_with_all = ["provider", "all"])]
    list: bool,

    /// Provider to score
    #[arg(short, long)]
    provider: Option<String>,

    /// Score every provider
    #[arg(long, conflicts_with = "provider")]
    all: bool,

    /// Attach an executive brief to each result
    #[arg(long)]
    brief: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    result: DriftResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    brief: Option<Brief>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(path) = &args.data {
        config.data.path = path.clone();
    }
    if let Some(periods) = &args.pseudo_periods {
        config.data.periods = PeriodMode::PseudoSplit {
            early: periods[0],
            late: periods[1],
        };
    }

    init_from_config(&config.logging)?;

    let rows = load_claims(&config.data.path, config.data.periods)
        .with_context(|| format!("loading claims from {}", config.data.path.display()))?;

    if args.list {
        return emit(&list_providers(&rows), args.output.as_ref());
    }

    let engine = DriftEngine::try_new(config.drift.clone())?;

    let results = if args.all {
        engine.compute_all(&rows)
    } else if let Some(provider) = &args.provider {
        let result = engine.compute_drift(&rows, provider);
        if !result.has_data() {
            warn!(provider = %provider, "Provider not found in dataset");
            bail!("provider {} has no claims in {}", provider, config.data.path.display());
        }
        vec![result]
    } else {
        bail!("nothing to do: pass --list, --provider <ID>, or --all");
    };

    info!(providers = results.len(), "Drift computed");

    let with_brief = args.brief || config.brief.enabled;
    let mut reports = Vec::with_capacity(results.len());

    if with_brief {
        match GeminiClient::from_env(&config.brief) {
            Ok(client) => {
                let service = BriefService::new(client);
                for result in results {
                    let brief = service.generate(&result).await;
                    reports.push(Report { result, brief: Some(brief) });
                }
            }
            Err(e) => {
                warn!("Enrichment unavailable, using fallback briefs: {}", e);
                for result in results {
                    let brief = Brief::fallback(&result, Some(e.to_string()));
                    reports.push(Report { result, brief: Some(brief) });
                }
            }
        }
    } else {
        reports.extend(results.into_iter().map(|result| Report { result, brief: None }));
    }

    if args.provider.is_some() {
        emit(&reports[0], args.output.as_ref())
    } else {
        emit(&reports, args.output.as_ref())
    }
}

fn emit<T: Serialize>(value: &T, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", json),
    }

    Ok(())
}
