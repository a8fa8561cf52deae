use crate::{
    client::Client,
    config::Config,
    engine::Engine,
    installer::{Installer, Platform, Variant},
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ocr-sidecar")]
#[command(about = "Talk to an external OCR server and install its executable")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./ocr-sidecar.toml if present, else defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether the server answers its health check.
    Health {},
    /// Print the server's version, engines and formats.
    Info {},
    /// Recognize text in one file.
    Extract {
        #[arg(long)]
        input: PathBuf,
        /// default, ocrs or leptess. Overrides server.engine.
        #[arg(long)]
        engine: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Run every named engine on one file.
    Compare {
        #[arg(long)]
        input: PathBuf,
    },
    /// Download and stage the server executable.
    Install {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        version: Option<String>,
        /// Reinstall even if an executable is already present.
        #[arg(long)]
        force: bool,
    },
    /// Print the platform identifier used to pick release artifacts.
    Platform {},
    /// List the published executable variants.
    Variants {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Health {} => health(&cfg),
        Command::Info {} => server_info(&cfg),
        Command::Extract {
            input,
            engine,
            content_type,
        } => extract(&cfg, input, engine.as_deref(), content_type.as_deref()),
        Command::Compare { input } => compare(&cfg, input),
        Command::Install {
            dir,
            variant,
            version,
            force,
        } => install(&cfg, dir.as_deref(), variant.as_deref(), version.as_deref(), *force),
        Command::Platform {} => {
            println!("{}", Platform::detect()?);
            Ok(())
        }
        Command::Variants {} => variants(),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("ocr-sidecar.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("ocr-sidecar.log"))
}

fn health(cfg: &Config) -> Result<()> {
    let client = Client::new(&cfg.server)?;
    let healthy = client.healthy();
    if !healthy {
        warn!("server at {} is not healthy", cfg.server.url);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "url": cfg.server.url,
            "healthy": healthy,
        }))?
    );
    Ok(())
}

fn server_info(cfg: &Config) -> Result<()> {
    let client = Client::new(&cfg.server)?;
    let info = client.server_info()?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn extract(
    cfg: &Config,
    input: &Path,
    engine: Option<&str>,
    content_type: Option<&str>,
) -> Result<()> {
    let engine = engine.map(str::parse::<Engine>).transpose()?;
    let client = Client::new(&cfg.server)?;
    let result = client
        .extract_from_path(input, content_type, None, engine)
        .with_context(|| format!("extracting text from {}", input.display()))?;
    if !result.is_success() {
        warn!("no text recognized in {}", input.display());
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn compare(cfg: &Config, input: &Path) -> Result<()> {
    let client = Client::new(&cfg.server)?;
    let results = client
        .compare_path(input)
        .with_context(|| format!("comparing engines on {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn install(
    cfg: &Config,
    dir: Option<&Path>,
    variant: Option<&str>,
    version: Option<&str>,
    force: bool,
) -> Result<()> {
    let variant = match variant {
        Some(v) => v.parse::<Variant>()?,
        None => cfg.install.variant,
    };
    let dir = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.install.dir));
    let version = version.unwrap_or(cfg.install.version.as_str());

    let installer = Installer::new(&cfg.install)?;
    let path = installer.install_version(&dir, version, variant, force)?;
    info!("server executable ready at {}", path.display());
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "path": path,
            "variant": variant,
            "version": version,
            "status": "ok"
        }))?
    );
    Ok(())
}

fn variants() -> Result<()> {
    let list: Vec<_> = Variant::ALL
        .iter()
        .map(|v| {
            serde_json::json!({
                "name": v.as_str(),
                "suffix": v.suffix(),
                "description": v.description(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
