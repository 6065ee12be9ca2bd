use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use essaygen::book::EssayBook;
use essaygen::completion::create_provider;
use essaygen::config::Config;
use essaygen::generator::Generator;
use essaygen::matrix::Matrix;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a dual-genre exam essay collection via a completion API", long_about = None)]
struct Args {
    /// Config file path (default: essaygen.toml, env: ESSAY_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Theme matrix TOML file (default: built-in matrix)
    #[arg(long)]
    matrix: Option<PathBuf>,

    /// Output Markdown path (overrides config)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Use the deterministic offline provider (no API calls)
    #[arg(long)]
    offline: bool,

    /// Restrict the sweep to one category by name
    #[arg(long)]
    category: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("essaygen=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load_from(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.output.path = output;
    }
    if args.offline {
        config.api.provider = "fake".to_string();
    }

    let mut matrix = match &args.matrix {
        Some(path) => Matrix::from_path(path)?,
        None => Matrix::builtin(),
    };
    if let Some(name) = &args.category {
        matrix.retain_category(name)?;
    }

    let provider = create_provider(&config)?;
    info!(
        "Generating {} theme/genre pairs with model {} into {}",
        matrix.pair_count(),
        provider.model(),
        config.output.path.display()
    );

    let generator = Generator::new(provider, config, matrix);
    let mut book = EssayBook::new();
    let summary = generator.run(&mut book).await?;
    info!(
        "Done: {} essays generated, {} skipped",
        summary.generated, summary.skipped
    );

    Ok(())
}
