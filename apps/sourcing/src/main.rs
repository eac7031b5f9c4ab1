use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sourcing::cli::{self, Cli, Commands};
use sourcing::config::Config;
use sourcing::models::{CandidateProfile, Job};
use sourcing::scoring;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting sourcing v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run(command) => {
            let jobs = cli::load_jobs(&command.jobs)?;
            let pipeline_config = cli::pipeline_config(&config, &command);
            let pipeline =
                cli::build_pipeline(&config, pipeline_config, command.candidates.as_deref())?;

            let results = pipeline.run_batch(jobs).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Score(command) => {
            let job: Job = cli::read_json(&command.job)?;
            job.validate()?;
            let candidate: CandidateProfile = cli::read_json(&command.candidate)?;

            let weights = config.pipeline_config().weights;
            let assessment = scoring::assess(&candidate, &job, &weights);
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
    }

    Ok(())
}
