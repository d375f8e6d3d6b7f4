//! SurveyDash - Terminal Dashboard for the Survey Service
//!
//! A CLI client that fetches surveys and response analytics from a
//! remote survey service and renders a consistent dashboard view even
//! when parts of the data are unavailable.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, failed fetch cycle, etc.)

mod auth;
mod cli;
mod config;
mod dashboard;
mod gateway;
mod models;
mod report;

use anyhow::{Context, Result};
use auth::{EnvToken, StaticToken, TokenProvider, TOKEN_ENV_VAR};
use chrono::Utc;
use cli::{Args, Command, CreateArgs, DashboardArgs, OutputFormat, RespondArgs, UpdateArgs};
use config::Config;
use dashboard::{DashboardController, FetchState};
use gateway::{GatewayConfig, SurveyApi, SurveyGateway};
use indicatif::ProgressBar;
use models::{DashboardSnapshot, NewResponse, NewSurvey};
use report::{generate_json_report, generate_markdown_report, DashboardReport, ReportMetadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SurveyDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .surveydash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".surveydash.toml");

    if path.exists() {
        eprintln!("⚠️  .surveydash.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .surveydash.toml")?;

    println!("✅ Created .surveydash.toml with default settings.");
    println!("   Edit it to customize the service URL, timeout, and token.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch the selected command. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // The session boundary: explicit token if given, else the environment
    let tokens: Arc<dyn TokenProvider> = match config.api.token.clone() {
        Some(token) => Arc::new(StaticToken::new(Some(token))),
        None => Arc::new(EnvToken::new(TOKEN_ENV_VAR)),
    };

    let gateway_config = GatewayConfig {
        base_url: config.api.base_url.clone(),
        timeout_seconds: config.api.timeout_seconds,
    };
    let gateway = SurveyGateway::new(&gateway_config, tokens);
    info!("Survey service: {}", gateway_config.base_url);

    let command = args
        .command
        .clone()
        .unwrap_or_else(|| Command::Dashboard(args.dashboard_args()));

    match command {
        Command::Dashboard(dashboard_args) => {
            run_dashboard(gateway, &config, &dashboard_args, args.quiet).await
        }
        Command::List => run_list(&gateway).await,
        Command::Show { id } => run_show(&gateway, id).await,
        Command::Create(create_args) => run_create(&gateway, create_args).await,
        Command::Update(update_args) => run_update(&gateway, update_args).await,
        Command::Delete { id } => run_delete(&gateway, id).await,
        Command::Respond(respond_args) => run_respond(&gateway, respond_args).await,
        Command::Responses { id } => run_responses(&gateway, id).await,
    }
}

/// Run the dashboard, once or on a watch interval.
async fn run_dashboard(
    gateway: SurveyGateway,
    config: &Config,
    dashboard_args: &DashboardArgs,
    quiet: bool,
) -> Result<i32> {
    let output = dashboard_args
        .output
        .clone()
        .or_else(|| config.general.output.as_ref().map(PathBuf::from));

    let controller = DashboardController::new(gateway);

    if let Some(interval) = dashboard_args.watch {
        println!(
            "👀 Watching {} every {}s (Ctrl-C to stop)",
            config.api.base_url, interval
        );
        loop {
            println!("\n⏱  {} UTC", Utc::now().format("%H:%M:%S"));
            run_cycle(&controller, config, dashboard_args, output.as_deref(), quiet).await?;
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    run_cycle(&controller, config, dashboard_args, output.as_deref(), quiet).await
}

/// One fetch cycle: refresh, then render the resulting state.
async fn run_cycle(
    controller: &DashboardController<SurveyGateway>,
    config: &Config,
    dashboard_args: &DashboardArgs,
    output: Option<&Path>,
    quiet: bool,
) -> Result<i32> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Fetching surveys...");
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    };

    let start_time = Instant::now();
    let state = controller.refresh().await;
    let duration = start_time.elapsed().as_secs_f64();
    spinner.finish_and_clear();

    match state {
        FetchState::Ready(snapshot) => {
            let report = DashboardReport {
                metadata: ReportMetadata {
                    api_url: config.api.base_url.clone(),
                    generated_at: Utc::now(),
                    duration_seconds: duration,
                },
                snapshot,
            };

            let rendered = match dashboard_args.format {
                OutputFormat::Markdown => generate_markdown_report(&report),
                OutputFormat::Json => generate_json_report(&report)?,
            };

            match output {
                Some(path) => {
                    std::fs::write(path, &rendered).with_context(|| {
                        format!("Failed to write report to {}", path.display())
                    })?;
                    print_summary(&report.snapshot);
                    println!("\n✅ Dashboard saved to: {}", path.display());
                }
                None => println!("{rendered}"),
            }
            Ok(0)
        }
        FetchState::Failed(message) => {
            warn!("dashboard fetch failed: {message}");
            eprintln!("\n❌ Could not load the dashboard: {}", message);
            eprintln!("   The fetch can be retried; check the service and token, then rerun.");
            Ok(1)
        }
        // refresh always resolves to a terminal state
        FetchState::Idle | FetchState::Loading => Ok(1),
    }
}

/// Print the short stats summary used when the report goes to a file.
fn print_summary(snapshot: &DashboardSnapshot) {
    let stats = &snapshot.stats;

    println!("\n📊 Dashboard Summary:");
    println!(
        "   Surveys: {} | Questions: {} | Responses: {}",
        stats.total_surveys, stats.total_questions, stats.total_responses
    );
    println!(
        "   Avg. engagement: {:.1} responses per survey",
        stats.avg_engagement
    );

    if !snapshot.recent.is_empty() {
        println!("   Recent:");
        for survey in &snapshot.recent {
            println!(
                "     📋 {} ({} questions, {})",
                survey.title,
                survey.question_count(),
                survey.display_status()
            );
        }
    }
}

/// List every survey with its headline details.
async fn run_list(gateway: &SurveyGateway) -> Result<i32> {
    let surveys = gateway.list_surveys().await?;

    if surveys.is_empty() {
        println!("No surveys yet.");
        return Ok(0);
    }

    println!("📋 Surveys ({}):", surveys.len());
    for survey in &surveys {
        println!(
            "   #{:<5} {} | {} questions | {} | {} (created {})",
            survey.id,
            survey.title,
            survey.question_count(),
            survey.display_status(),
            survey.display_creator(),
            survey.created_at_display()
        );
    }
    Ok(0)
}

/// Show one survey in detail, including its response count.
async fn run_show(gateway: &SurveyGateway, id: i64) -> Result<i32> {
    let survey = gateway.survey(id).await?;
    let responses = gateway.response_count(id).await;

    println!("📋 Survey #{}: {}", survey.id, survey.title);
    if let Some(ref description) = survey.description {
        if !description.is_empty() {
            println!("   {}", description);
        }
    }
    println!("   Status: {}", survey.display_status());
    println!("   Questions: {}", survey.question_count());
    println!("   Responses: {}", responses);
    println!("   Creator: {}", survey.display_creator());
    println!("   Created: {}", survey.created_at_display());
    Ok(0)
}

/// Build the survey payload shared by create and update.
fn survey_payload(create_args: CreateArgs) -> Result<NewSurvey> {
    NewSurvey::from_questions(
        create_args.title,
        create_args.description,
        &create_args.questions,
        create_args.creator,
        create_args.status,
    )
    .context("Failed to encode questions")
}

/// Create a survey from CLI arguments.
async fn run_create(gateway: &SurveyGateway, create_args: CreateArgs) -> Result<i32> {
    let payload = survey_payload(create_args)?;

    let survey = gateway.create_survey(&payload).await?;
    println!("✅ Created survey #{}: {}", survey.id, survey.title);
    Ok(0)
}

/// Update an existing survey from CLI arguments.
async fn run_update(gateway: &SurveyGateway, update_args: UpdateArgs) -> Result<i32> {
    let payload = survey_payload(update_args.survey)?;

    let survey = gateway.update_survey(update_args.id, &payload).await?;
    println!("✅ Updated survey #{}: {}", survey.id, survey.title);
    Ok(0)
}

/// Delete a survey by id.
async fn run_delete(gateway: &SurveyGateway, id: i64) -> Result<i32> {
    gateway.delete_survey(id).await?;
    println!("✅ Deleted survey #{}", id);
    Ok(0)
}

/// Submit a response to a survey.
async fn run_respond(gateway: &SurveyGateway, respond_args: RespondArgs) -> Result<i32> {
    let payload = NewResponse::from_answers(&respond_args.answers, respond_args.email)
        .context("Failed to encode answers")?;

    let response = gateway.submit_response(respond_args.id, &payload).await?;
    println!(
        "✅ Recorded response #{} for survey #{}",
        response.id,
        response.survey_id.unwrap_or(respond_args.id)
    );
    Ok(0)
}

/// List the responses submitted to a survey.
async fn run_responses(gateway: &SurveyGateway, id: i64) -> Result<i32> {
    let responses = gateway.responses(id).await?;

    if responses.is_empty() {
        println!("No responses yet for survey #{}.", id);
        return Ok(0);
    }

    println!("📝 Responses for survey #{} ({}):", id, responses.len());
    for response in &responses {
        println!(
            "   #{:<5} {} | {} answers | {} | {}",
            response.id,
            response.respondent_email.as_deref().unwrap_or("Anonymous"),
            response.answer_count(),
            response.status.as_deref().unwrap_or("COMPLETED"),
            response.submitted_at.as_deref().unwrap_or("N/A")
        );
    }
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .surveydash.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
