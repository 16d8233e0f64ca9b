//! BCCh CLI - Retrieve Banco Central de Chile time series
//!
//! A command-line client for the BCCh statistics API with an in-memory
//! response cache and bounded-concurrency batch fetching.

use std::collections::BTreeMap;
use std::error::Error;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bcch::cache::TtlCache;
use bcch::cli::{parse_frequency_arg, validate_date_arg, BatchRequest, Cli, Command};
use bcch::config::Settings;
use bcch::credentials::Credentials;
use bcch::data::{all_sets, BcchClient};
use bcch::output::{
    render_catalogue, render_series, save_json, summarize_series, validate_output_path, SetExport,
};

/// Sets up `tracing` output on stderr; `RUST_LOG` overrides `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,bcch={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns a token cancelled on Ctrl-C or once `deadline` elapses
fn cancel_on_interrupt(deadline: Option<Duration>) -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let deadline = async {
            match deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("interrupted, cancelling in-flight requests"),
            _ = deadline => warn!("deadline reached, cancelling in-flight requests"),
        }
        trigger.cancel();
    });

    token
}

/// Loads credentials and builds a client with a fresh cache
fn build_client(settings: &Settings) -> Result<BcchClient, Box<dyn Error>> {
    let credentials = Credentials::load(&settings.credentials_path)?;
    let cache = TtlCache::new(settings.cache_ttl());
    Ok(BcchClient::new(settings, cache, credentials)?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Sets => {
            let mut sets: Vec<_> = all_sets().iter().collect();
            sets.sort_by_key(|set| set.name);
            println!("Available predefined sets:");
            for set in sets {
                println!("- {}: {}", set.name, set.description);
            }
        }

        Command::SetCredentials { user, password } => {
            Credentials::new(user, password).save(&settings.credentials_path)?;
            println!("saved credentials to {}", settings.credentials_path.display());
        }

        Command::Get {
            series,
            firstdate,
            lastdate,
        } => {
            validate_date_arg("firstdate", firstdate.as_deref())?;
            validate_date_arg("lastdate", lastdate.as_deref())?;

            let client = build_client(&settings)?;
            let cancel = cancel_on_interrupt(None);
            let data = client
                .get_series_data(&series, firstdate.as_deref(), lastdate.as_deref(), &cancel)
                .await?;

            println!("{}", render_series(&data));
        }

        Command::Search { frequency, keyword } => {
            let frequency = parse_frequency_arg(&frequency)?;

            let client = build_client(&settings)?;
            let cancel = cancel_on_interrupt(None);
            let available = client.get_available_series(frequency, &cancel).await?;

            if !available.descripcion.is_empty() && available.codigo != 0 {
                println!("{}", available.descripcion);
            }
            println!("{}", render_catalogue(available.infos(), keyword.as_deref()));
        }

        Command::Fetch {
            set,
            series,
            firstdate,
            lastdate,
            concurrency,
            deadline_secs,
            output,
        } => {
            validate_date_arg("firstdate", firstdate.as_deref())?;
            validate_date_arg("lastdate", lastdate.as_deref())?;
            let batch = BatchRequest::from_args(set.as_deref(), &series)?;
            if let Some(output) = &output {
                validate_output_path(output)?;
            }

            let client = build_client(&settings)?;
            let concurrency = concurrency.unwrap_or(settings.max_concurrency);
            let cancel = cancel_on_interrupt(deadline_secs.map(Duration::from_secs));

            info!(
                set = %batch.name,
                series = batch.series_ids.len(),
                concurrency,
                "fetching batch"
            );
            let outcome = client
                .get_multiple_series_data(
                    &batch.series_ids,
                    firstdate.as_deref(),
                    lastdate.as_deref(),
                    concurrency,
                    &cancel,
                )
                .await;

            for series_id in &batch.series_ids {
                if let Some(data) = outcome.successes.get(series_id) {
                    println!("{}", summarize_series(series_id, data));
                } else if let Some(err) = outcome.failures.get(series_id) {
                    eprintln!("Error: {}: {}", series_id, err);
                }
            }
            println!(
                "fetched {} of {} series from {}",
                outcome.successes.len(),
                batch.series_ids.len(),
                batch.name
            );

            if let Some(output) = output {
                let mut payload = BTreeMap::new();
                payload.insert(
                    batch.name.as_str(),
                    SetExport::new(&batch.description, &outcome.successes),
                );
                save_json(&payload, &output)?;
                println!("wrote {}", output.display());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
