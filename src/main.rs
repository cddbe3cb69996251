use clap::Parser;
use form_interceptor::cli::commands::{cmd_inspect, cmd_submit};
use form_interceptor::cli::config::{Cli, Commands, load_config, verbosity_filter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Submit {
            page,
            url,
            fields,
            form_id,
            trace,
        } => {
            let rendered = cmd_submit(
                &page,
                url.as_deref(),
                &fields,
                form_id.as_deref(),
                trace.as_deref(),
                &config,
            )
            .await?;
            if !rendered {
                std::process::exit(1);
            }
        }
        Commands::Inspect { page, url } => {
            cmd_inspect(&page, url.as_deref()).await?;
        }
    }

    Ok(())
}
