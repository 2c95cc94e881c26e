use clap::Parser;
use tracing_subscriber::EnvFilter;

mod check;
mod pipeline;
mod results;

use pipeline::{RunContext, Stage};

#[derive(Debug, Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "waitwatch")]
#[command(about = "Collect barbershop wait counts and weather, then process and report on them")]
struct Cli {
    /// Only run the collection stage.
    #[arg(long)]
    collect_only: bool,
    /// Only run the preprocessing stage.
    #[arg(long)]
    process_only: bool,
    /// Only run the report stage.
    #[arg(long)]
    visualize_only: bool,
    /// Check configuration, output directories and sink settings, then exit.
    #[arg(long)]
    check_deps: bool,
    /// Skip the results listing at the end of the run.
    #[arg(long)]
    no_results: bool,
}

impl Cli {
    /// Stages to run, in pipeline order. Without any `--*-only` flag every
    /// stage runs; `--*-only` flags combine.
    fn stages(&self) -> Vec<Stage> {
        let any_only = self.collect_only || self.process_only || self.visualize_only;
        let mut stages = Vec::with_capacity(3);
        if self.collect_only || !any_only {
            stages.push(Stage::Collect);
        }
        if self.process_only || !any_only {
            stages.push(Stage::Process);
        }
        if self.visualize_only || !any_only {
            stages.push(Stage::Report);
        }
        stages
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = waitwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let checks = check::run_checks(&config);
    check::print_checks(&checks);
    if cli.check_deps {
        return Ok(());
    }
    if !check::all_passed(&checks) {
        anyhow::bail!("environment checks failed; run with --check-deps for details");
    }

    let ctx = RunContext::load(config)?;
    let failed = pipeline::run_stages(&ctx, &cli.stages()).await;

    if !cli.no_results {
        results::show_results(&ctx.settings.paths);
    }

    match failed {
        Some(stage) => anyhow::bail!("{} stage failed", stage.label()),
        None => {
            println!("\nAll stages completed.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
