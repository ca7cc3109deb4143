//! quill - CLI entry point.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quill::ai::OpenAiProvider;
use quill::config::{self, ConfigLayer};
use quill::error::AppError;
use quill::flow::Flow;
use quill::init::{init_target, run_init};
use quill::output::{ConsoleSink, OutputSink};
use quill::process::SystemRunner;
use quill::prompt::TerminalPrompter;
use quill::workflow::{CommitOptions, PrOptions, Workflow};

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "QUILL_LOG";

/// Write pull request descriptions and commit messages with AI.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Write pull request descriptions and commit messages with AI")]
#[command(version)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an artifact from the current git state
    Generate {
        #[command(subcommand)]
        target: GenerateTarget,
    },
    /// Create or update a configuration file
    Init {
        /// Write the global config instead of the project one
        #[arg(long)]
        global: bool,
    },
}

#[derive(Subcommand, Debug)]
enum GenerateTarget {
    /// Generate a pull request for the current branch
    Pr {
        /// Branch to compare against and open the PR into
        #[arg(long)]
        base: Option<String>,

        #[command(flatten)]
        common: CommonArgs,

        /// Generate and review without pushing or creating the PR
        #[arg(long)]
        dry_run: bool,

        /// Create the pull request as a draft
        #[arg(long)]
        draft: bool,
    },
    /// Generate a commit message for the staged changes
    Commit {
        /// Stage all changes before generating
        #[arg(short, long)]
        all: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// AI model to use
    #[arg(long)]
    model: Option<String>,

    /// Language to write in
    #[arg(long)]
    language: Option<String>,

    /// Skip every confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl CommonArgs {
    fn overrides(&self, base_branch: Option<String>) -> ConfigLayer {
        ConfigLayer {
            base_branch,
            model: self.model.clone(),
            language: self.language.clone(),
            skip_confirmations: self.yes.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let sink = ConsoleSink;
    match run(cli.command, &sink).await {
        Ok(Flow::Proceed(())) => ExitCode::SUCCESS,
        Ok(Flow::Abort(reason)) => {
            sink.info(&reason);
            ExitCode::SUCCESS
        }
        Err(e) => {
            sink.error(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(format!("quill={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(command: Command, sink: &dyn OutputSink) -> Result<Flow<()>, AppError> {
    let cwd = std::env::current_dir()
        .map_err(|e| AppError::unknown_with("Failed to read the current directory", e))?;
    let mut prompter = TerminalPrompter;

    let target = match command {
        Command::Init { global } => {
            let path = init_target(&cwd, global)?;
            return Ok(run_init(&mut prompter, sink, &path)?.map(|_| ()));
        }
        Command::Generate { target } => target,
    };

    let runner = SystemRunner::new();
    let provider = OpenAiProvider::from_env()?;
    let mut workflow = Workflow {
        runner: &runner,
        provider: &provider,
        prompter: &mut prompter,
        sink,
    };

    match target {
        GenerateTarget::Pr {
            base,
            common,
            dry_run,
            draft,
        } => {
            let config = config::load(&cwd, common.overrides(base))?;
            let flow = workflow
                .run_pr(&config, PrOptions { dry_run, draft })
                .await?;
            Ok(flow.map(|_| ()))
        }
        GenerateTarget::Commit { all, common } => {
            let config = config::load(&cwd, common.overrides(None))?;
            let flow = workflow
                .run_commit(&config, CommitOptions { stage_all: all })
                .await?;
            Ok(flow.map(|_| ()))
        }
    }
}

