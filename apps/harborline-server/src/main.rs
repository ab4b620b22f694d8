use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{ModuleBinding, ModuleRegistry, RegistryBuilder, RunOptions, ShutdownOptions};
use runtime::{AppConfig, AppConfigProvider, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// Exposes the per-module bag of AppConfig to modkit.
struct ModkitConfigAdapter(Arc<AppConfigProvider>);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// Harborline Server - back office for the maritime training site
#[derive(Parser)]
#[command(name = "harborline-server")]
#[command(about = "Harborline Server - back office for the maritime training site")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // home_dir is normalized and created inside the loader
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!(bind = %config.bind_addr(), "Harborline Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// Every module the server runs, in no particular order; the registry sorts
/// them by `depends_on`.
fn build_registry(config: &AppConfig) -> Result<ModuleRegistry> {
    let ingress = Arc::new(api_ingress::ApiIngress::new(config.bind_addr()));
    let auth = Arc::new(auth::AuthModule::default());
    let events = Arc::new(events::EventsModule::default());
    let news = Arc::new(news::NewsModule::default());
    let users = Arc::new(users::UsersModule::default());
    let proxy = Arc::new(backend_proxy::BackendProxy::default());

    let mut b = RegistryBuilder::default();
    b.add(
        ModuleBinding::new(api_ingress::MODULE_NAME, ingress.clone())
            .rest_host(ingress.clone())
            .stateful(ingress),
    );
    b.add(
        ModuleBinding::new(auth::MODULE_NAME, auth.clone())
            .depends_on(&[api_ingress::MODULE_NAME])
            .rest(auth),
    );
    b.add(
        ModuleBinding::new(events::MODULE_NAME, events.clone())
            .depends_on(&[auth::MODULE_NAME])
            .rest(events),
    );
    b.add(
        ModuleBinding::new(news::MODULE_NAME, news.clone())
            .depends_on(&[auth::MODULE_NAME])
            .rest(news),
    );
    b.add(
        ModuleBinding::new(users::MODULE_NAME, users.clone())
            .depends_on(&[auth::MODULE_NAME])
            .rest(users),
    );
    b.add(
        ModuleBinding::new(backend_proxy::MODULE_NAME, proxy.clone())
            .depends_on(&[auth::MODULE_NAME])
            .rest(proxy),
    );
    Ok(b.build()?)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let registry = build_registry(&config)?;
    let modules_cfg = Arc::new(ModkitConfigAdapter(Arc::new(AppConfigProvider::new(
        config.clone(),
    ))));

    modkit::run(RunOptions {
        modules_cfg,
        home_dir: config.home_dir(),
        registry,
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    // Catches dependency typos without starting anything.
    build_registry(&config)?;
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}
