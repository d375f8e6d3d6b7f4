//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SurveyDash - terminal dashboard for the survey service
///
/// Fetch surveys and response analytics from a remote survey service and
/// render them as a dashboard, markdown report, or JSON.
///
/// Examples:
///   surveydash
///   surveydash --api-url https://surveys.example.com --token $TOKEN
///   surveydash dashboard --format json --output dashboard.json
///   surveydash dashboard --watch 30
///   surveydash list
///   surveydash create --title "Team pulse" --question "How was your week?"
///   surveydash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the survey service
    ///
    /// Can also be set via SURVEYDASH_API_URL or .surveydash.toml.
    #[arg(long, value_name = "URL", env = "SURVEYDASH_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for authenticated requests
    ///
    /// When omitted, the SURVEYDASH_TOKEN environment variable is
    /// consulted at request time; without either, requests are sent
    /// unauthenticated.
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .surveydash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .surveydash.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to do; defaults to `dashboard` when omitted.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch surveys and render the dashboard (default)
    Dashboard(DashboardArgs),
    /// List all surveys
    List,
    /// Show one survey in detail
    Show {
        /// Survey id
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Create a new survey
    Create(CreateArgs),
    /// Update an existing survey
    Update(UpdateArgs),
    /// Delete a survey
    Delete {
        /// Survey id
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Submit a response to a survey
    Respond(RespondArgs),
    /// List the responses submitted to a survey
    Responses {
        /// Survey id
        #[arg(value_name = "ID")]
        id: i64,
    },
}

/// Options for the dashboard view.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DashboardArgs {
    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Refresh the dashboard every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

/// Options for creating a survey.
#[derive(clap::Args, Debug, Clone)]
pub struct CreateArgs {
    /// Survey title
    #[arg(long)]
    pub title: String,

    /// Survey description
    #[arg(long)]
    pub description: Option<String>,

    /// A question; repeat for multiple questions
    #[arg(long = "question", value_name = "TEXT")]
    pub questions: Vec<String>,

    /// Creator email recorded on the survey
    #[arg(long, value_name = "EMAIL")]
    pub creator: Option<String>,

    /// Initial status (ACTIVE, DRAFT, ARCHIVED)
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,
}

/// Options for updating a survey.
#[derive(clap::Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Survey id
    #[arg(value_name = "ID")]
    pub id: i64,

    #[command(flatten)]
    pub survey: CreateArgs,
}

/// Options for submitting a response.
#[derive(clap::Args, Debug, Clone)]
pub struct RespondArgs {
    /// Survey id
    #[arg(value_name = "ID")]
    pub id: i64,

    /// An answer; repeat for multiple answers
    #[arg(long = "answer", value_name = "TEXT")]
    pub answers: Vec<String>,

    /// Respondent email
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,
}

/// Output format for the dashboard report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The effective dashboard options (explicit subcommand or defaults).
    pub fn dashboard_args(&self) -> DashboardArgs {
        match &self.command {
            Some(Command::Dashboard(args)) => args.clone(),
            _ => DashboardArgs::default(),
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(Command::Dashboard(ref dashboard)) = self.command {
            if let Some(watch) = dashboard.watch {
                if watch == 0 {
                    return Err("Watch interval must be at least 1 second".to_string());
                }
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            api_url: Some("http://localhost:8080".to_string()),
            token: None,
            config: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
            command: None,
        }
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.api_url = Some("localhost:8080".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        args.timeout = Some(5);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_watch_interval() {
        let mut args = make_args();
        args.command = Some(Command::Dashboard(DashboardArgs {
            watch: Some(0),
            ..DashboardArgs::default()
        }));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_dashboard_args_default_when_no_subcommand() {
        let args = make_args();
        let dashboard = args.dashboard_args();
        assert_eq!(dashboard.format, OutputFormat::Markdown);
        assert!(dashboard.output.is_none());
        assert!(dashboard.watch.is_none());
    }

    #[test]
    fn test_parse_create_subcommand() {
        let args = Args::try_parse_from([
            "surveydash",
            "create",
            "--title",
            "Team pulse",
            "--question",
            "Q1",
            "--question",
            "Q2",
        ])
        .unwrap();

        match args.command {
            Some(Command::Create(create)) => {
                assert_eq!(create.title, "Team pulse");
                assert_eq!(create.questions, vec!["Q1", "Q2"]);
            }
            other => panic!("expected create subcommand, got {other:?}"),
        }
    }
}
