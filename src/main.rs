use clap::{Parser, Subcommand};
use quake_prep::config::Config;
use quake_prep::logging;
use quake_prep::lookup::LookupSession;
use quake_prep::pipeline::{Pipeline, PipelineOutput};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "quake_prep")]
#[command(about = "Earthquake preparedness report for one county: insurance cost and shelter capacity by zip code")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline, write every document, then start the interactive lookup
    Run {
        /// Path to the TOML config file
        #[arg(long, env = "QUAKE_PREP_CONFIG")]
        config: Option<PathBuf>,
        /// Skip the interactive session after writing the documents
        #[arg(long)]
        no_prompt: bool,
    },
    /// Run the full pipeline and write every document
    Report {
        /// Path to the TOML config file
        #[arg(long, env = "QUAKE_PREP_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Run the pipeline without writing documents and go straight to the zip code lookup
    Lookup {
        /// Path to the TOML config file
        #[arg(long, env = "QUAKE_PREP_CONFIG")]
        config: Option<PathBuf>,
    },
}

async fn run_pipeline(config: Option<PathBuf>) -> anyhow::Result<(Pipeline, PipelineOutput)> {
    let config = Config::load(config.as_deref())?;
    let pipeline = Pipeline::new(config);
    let output = pipeline.run().await.map_err(|e| {
        error!("Pipeline failed: {}", e);
        e
    })?;
    Ok((pipeline, output))
}

fn write_documents(pipeline: &Pipeline, output: &PipelineOutput) -> anyhow::Result<Vec<PathBuf>> {
    let documents = pipeline.write_outputs(output).map_err(|e| {
        error!("Writing documents failed: {}", e);
        e
    })?;
    println!("\n📊 Run summary:");
    for line in output.summary().to_string().lines() {
        println!("   {}", line);
    }
    println!("\n📄 Documents written:");
    for doc in &documents {
        println!("   {}", doc.display());
    }
    Ok(documents)
}

fn session<'a>(pipeline: &Pipeline, output: &'a PipelineOutput) -> LookupSession<'a, io::StdinLock<'static>, io::Stdout> {
    LookupSession::new(
        &output.final_table,
        &output.cities,
        pipeline.config().sources.county.clone(),
        io::stdin().lock(),
        io::stdout(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, no_prompt } => {
            println!("🚀 Running full pipeline...");
            let (pipeline, output) = run_pipeline(config).await?;
            let documents = write_documents(&pipeline, &output)?;
            if no_prompt {
                info!("Interactive session skipped");
            } else {
                println!();
                session(&pipeline, &output).run(&documents)?;
            }
        }
        Commands::Report { config } => {
            println!("🔨 Building reports...");
            let (pipeline, output) = run_pipeline(config).await?;
            write_documents(&pipeline, &output)?;
            println!("✅ Reports completed successfully");
        }
        Commands::Lookup { config } => {
            let (pipeline, output) = run_pipeline(config).await?;
            session(&pipeline, &output).lookup_loop()?;
        }
    }
    Ok(())
}
