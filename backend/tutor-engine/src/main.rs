use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studybuddy_engine::{config::Config, metrics::render_metrics, Engine, StudyContext, Subject};

#[derive(Debug, Parser)]
#[command(name = "studybuddy-engine", version, about = "Study tutor inference engine")]
struct Cli {
    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List models installed on the backend
    Models,
    /// Generate one practice problem and print it as JSON
    Problem {
        #[arg(long, default_value = "Mathematics")]
        subject: String,
        #[arg(long, default_value_t = 1)]
        grade: u8,
        #[arg(long, default_value_t = 3)]
        difficulty: u8,
        #[arg(long, default_value = "cli")]
        user: String,
    },
    /// Generate one study tip
    Tip {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        weakness: String,
    },
    /// Switch the active model and probe the backend with it
    SwitchModel { model: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studybuddy_engine=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded: model={}, backend={}",
        config.ai.model,
        config.ai.base_url()
    );

    let engine = Engine::new(config.ai.clone()).context("Failed to initialize engine")?;

    match cli.command {
        Command::Models => {
            for model in engine.list_models().await? {
                println!("{}", model);
            }
        }
        Command::Problem {
            subject,
            grade,
            difficulty,
            user,
        } => {
            let context = StudyContext::new(user, subject, grade).with_difficulty(difficulty);
            let problem = engine.generate_problem(&context).await?;
            println!("{}", serde_json::to_string_pretty(&problem)?);
        }
        Command::Tip { subject, weakness } => {
            let tip = engine
                .generate_study_tip(&Subject::from(subject), &weakness)
                .await;
            println!("{}", tip);
        }
        Command::SwitchModel { model } => {
            let mut ai = config.ai.clone();
            ai.model = model;
            engine.update_config(ai).await?;
            println!("Active model: {}", engine.current_model());
        }
    }

    let status = engine.connection_status();
    tracing::info!(
        "Backend status: healthy={}, failure_count={}",
        status.healthy,
        status.failure_count
    );

    if cli.metrics {
        print!("{}", render_metrics()?);
    }

    Ok(())
}
