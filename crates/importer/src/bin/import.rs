use clap::{Parser, Subcommand};
use importer::{
    ClubFilter, ImportRequest, PostgresSink, ResultImporter, TimingApiClient, TimingApiSource,
    TimingApiTransformer, sources::timing_api::ApiResponse,
};
use ranking::{BatchOutcome, MixedGroupPolicy, PipelineOptions, RawResult, process_batch};
use std::path::PathBuf;
use storage::{Database, TimingResultRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "timing-import")]
#[command(about = "Timing result importer and standings builder", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "TIMING_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "TIMING_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a game, rank it and upsert the standings into the database
    Import {
        #[arg(short, long)]
        game: String,

        #[command(flatten)]
        event: EventArgs,

        /// Only persist results from these clubs (repeatable)
        #[arg(long = "club")]
        clubs: Vec<String>,

        #[arg(long)]
        separate_individuals: bool,

        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Rank a game without touching the database
    Preview {
        #[command(flatten)]
        source: PreviewSource,

        #[arg(long)]
        separate_individuals: bool,

        /// Directory to write the preview JSON into; prints to stdout otherwise
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print stored standings for an event
    Standings {
        #[arg(short, long)]
        event: String,

        #[arg(long, default_value = "individual")]
        game_type: String,

        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[derive(clap::Args)]
struct EventArgs {
    #[arg(short, long)]
    event: String,

    #[arg(long, default_value = "race")]
    event_type: String,

    #[arg(long, default_value = "individual")]
    game_type: String,
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct PreviewSource {
    #[arg(short, long)]
    game: Option<String>,

    /// A saved provider response
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "import={0},importer={0},ranking={0},storage={0}",
                    log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Import {
            game,
            event,
            clubs,
            separate_individuals,
            database_url,
        } => {
            let client = api_client(cli.api_url, cli.api_token)?;
            let request = ImportRequest {
                game_id: game,
                event_name: event.event,
                event_type: event.event_type,
                game_type: event.game_type,
                club_filter: ClubFilter::whitelist(clubs),
                mixed_group_policy: policy(separate_individuals),
            };
            handle_import(client, request, &database_url).await?;
        }
        Commands::Preview {
            source,
            separate_individuals,
            output,
        } => {
            let records = load_preview_records(source, cli.api_url, cli.api_token).await?;
            handle_preview(records, policy(separate_individuals), output).await?;
        }
        Commands::Standings {
            event,
            game_type,
            database_url,
        } => {
            handle_standings(&event, &game_type, &database_url).await?;
        }
    }

    Ok(())
}

fn api_client(
    api_url: Option<String>,
    api_token: Option<String>,
) -> Result<TimingApiClient, Box<dyn std::error::Error>> {
    let api_url = api_url.ok_or("Timing API URL is required (--api-url or TIMING_API_URL)")?;
    Ok(TimingApiClient::new(api_url, api_token)?)
}

fn policy(separate_individuals: bool) -> MixedGroupPolicy {
    if separate_individuals {
        MixedGroupPolicy::SeparatePools
    } else {
        MixedGroupPolicy::SharedPool
    }
}

async fn handle_import(
    client: TimingApiClient,
    request: ImportRequest,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let db = Database::new(database_url).await?;
    db.run_migrations().await?;

    let importer = ResultImporter::new(TimingApiSource::new(client), PostgresSink::new(db));
    let summary = importer.run(&request).await?;

    tracing::info!(
        "Saved {} result(s) for '{}'",
        summary.persisted(),
        request.event_name
    );

    if summary.failed > 0 {
        return Err(format!("{} result(s) failed to save", summary.failed).into());
    }

    Ok(())
}

async fn load_preview_records(
    source: PreviewSource,
    api_url: Option<String>,
    api_token: Option<String>,
) -> Result<Vec<RawResult>, Box<dyn std::error::Error>> {
    let api_response = match (source.file, source.game) {
        (Some(file), _) => {
            tracing::info!("Loading provider response from: {}", file.display());
            let json_content = tokio::fs::read_to_string(&file).await?;
            serde_json::from_str::<ApiResponse>(&json_content)?
        }
        (None, Some(game)) => {
            let client = api_client(api_url, api_token)?;
            client.fetch_game_results(game.trim()).await?
        }
        (None, None) => return Err("Either --game or --file is required".into()),
    };

    Ok(TimingApiTransformer.to_raw_results(api_response))
}

async fn handle_preview(
    records: Vec<RawResult>,
    mixed_group_policy: MixedGroupPolicy,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let BatchOutcome { results, skipped } =
        process_batch(records, &PipelineOptions { mixed_group_policy });

    let report = serde_json::json!({
        "mixedGroupPolicy": mixed_group_policy,
        "skipped": skipped,
        "results": results,
    });
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(output_dir) => {
            tokio::fs::create_dir_all(&output_dir).await?;

            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S");
            let filepath = output_dir.join(format!("{}_preview.json", timestamp));
            tokio::fs::write(&filepath, json).await?;

            tracing::info!("Preview written to: {}", filepath.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn handle_standings(
    event_name: &str,
    game_type: &str,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::new(database_url).await?;
    let repo = TimingResultRepository::new(db.pool());
    let standings = repo.list_for_event(event_name, game_type).await?;

    if standings.is_empty() {
        tracing::warn!("No stored results for '{}' ({})", event_name, game_type);
        return Ok(());
    }

    let mut current_group: Option<&str> = None;
    for row in &standings {
        if current_group != Some(row.scoring_group.as_str()) {
            tracing::info!("{}:", row.scoring_group);
            current_group = Some(row.scoring_group.as_str());
        }

        let position = row
            .position
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        tracing::info!(
            "  {:>3}  {:<30} {:<20} {}",
            position,
            row.runner_name,
            row.club_name,
            row.display_result
        );
    }

    Ok(())
}
