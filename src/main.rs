use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jsx_script_bundler::{
  BundlerConfig, ScriptBundleBuilder, ScriptBundlerPlugin, ScriptRewriter,
};

#[derive(Parser)]
#[command(name = "jsx-script-bundle")]
#[command(about = "Bundle remote and npm: script tags referenced from JSX/TSX sources")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Rewrite every matching source file into the output directory
  Build(BuildArgs),
}

#[derive(Args)]
struct BuildArgs {
  /// Project root holding the configuration file and node_modules
  #[arg(long, default_value = ".")]
  project: PathBuf,

  /// Explicit configuration file instead of script-bundle.config.json
  #[arg(long)]
  config: Option<PathBuf>,

  /// Source directory, relative to the project root
  #[arg(long)]
  src: Option<String>,

  /// Output directory, relative to the project root
  #[arg(long)]
  outdir: Option<String>,

  /// Prefix for emitted asset paths
  #[arg(long)]
  public_path: Option<String>,

  /// Asset naming template, e.g. "[dir]/[name]-[hash].[ext]"
  #[arg(long)]
  asset_names: Option<String>,

  /// Embed scripts in the tags instead of emitting assets
  #[arg(long)]
  inline: bool,

  /// Log every download, resolution and write
  #[arg(short, long)]
  verbose: bool,
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = tracing_subscriber::EnvFilter::new(
    std::env::var("RUST_LOG").unwrap_or_else(|_| format!("jsx_script_bundler={default_level}")),
  );

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

fn resolve_config(args: &BuildArgs) -> anyhow::Result<BundlerConfig> {
  let mut config = match &args.config {
    Some(path) => BundlerConfig::from_path(path)
      .with_context(|| format!("failed to load configuration {}", path.display()))?,
    None => BundlerConfig::discover(&args.project),
  };

  if let Some(src) = &args.src {
    config.src_dir = src.clone();
  }
  if let Some(outdir) = &args.outdir {
    config.outdir = Some(outdir.clone());
  }
  if let Some(public_path) = &args.public_path {
    config.public_path = Some(public_path.clone());
  }
  if let Some(asset_names) = &args.asset_names {
    config.asset_names = asset_names.clone();
  }
  config.inline |= args.inline;
  config.verbose |= args.verbose;
  Ok(config)
}

async fn build(args: BuildArgs) -> anyhow::Result<()> {
  let config = resolve_config(&args)?;
  let build_config = config.to_build_config(&args.project);
  let Some(outdir) = build_config.outdir.clone() else {
    bail!("an output directory is required, pass --outdir or set `outdir` in the configuration");
  };
  let src_dir = config.src_dir_path(&args.project);

  let rewriter = ScriptRewriter::new(config.to_options(), build_config);
  let plugin = ScriptBundlerPlugin::for_extensions(rewriter, &config.extensions)?;
  tracing::info!(
    plugin = plugin.name(),
    src = %src_dir.display(),
    outdir = %outdir.display(),
    "starting build"
  );

  let report = ScriptBundleBuilder::new(plugin, src_dir, outdir)
    .build()
    .await?;

  tracing::info!(
    documents = report.documents.len(),
    assets = report.assets.len(),
    unchanged = report.unchanged_references(),
    "build finished"
  );
  Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Build(args) => {
      init_tracing(args.verbose);
      build(args).await
    }
  }
}
