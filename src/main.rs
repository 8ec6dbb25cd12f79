mod config;
mod confirm;
mod platform;
mod plugin;
mod reconcile;
mod server;
mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use confirm::{AutoConfirm, Confirmation, StdinConfirm};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::Method;
use platform::ConsolePlatform;
use reconcile::{build_deployment_plan, execute_plan, ActionOutcome, DeploymentReport};
use server::proto::deployd_server::DeploydServer;
use server::DeploydService;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tonic::transport::Server;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDR: &str = "127.0.0.1:50061";
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost,https://localhost,http://127.0.0.1,https://127.0.0.1";

/// Deployd - deployment reconciler for composer-managed shop plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile every managed plugin: install new ones, update outdated ones
    Deploy {
        /// Ask before each install or update instead of applying directly
        #[arg(short, long)]
        interactive: bool,

        /// Project directory holding deployd.json and the platform console
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Console binary to drive (overrides deployd.json)
        #[arg(long)]
        console: Option<String>,
    },
    /// Serve the lifecycle endpoints over gRPC and gRPC-Web
    Serve {
        /// Address to bind the server to
        #[arg(short, long, env = "DEPLOYD_ADDR", default_value = DEFAULT_ADDR)]
        addr: String,

        /// Comma-separated list of allowed CORS origins.
        /// Use "*" to allow all origins (not recommended for production).
        #[arg(
            long,
            env = "DEPLOYD_CORS_ORIGINS",
            default_value = DEFAULT_CORS_ORIGINS,
            value_delimiter = ','
        )]
        cors_origins: Vec<String>,

        /// Project directory holding deployd.json and the platform console
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Console binary to drive (overrides deployd.json)
        #[arg(long)]
        console: Option<String>,
    },
}

// Include the file descriptor set for gRPC reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("deployd_descriptor");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    match args.command {
        Command::Deploy {
            interactive,
            project,
            console,
        } => deploy(interactive, &project, console).await,
        Command::Serve {
            addr,
            cors_origins,
            project,
            console,
        } => serve(addr, cors_origins, &project, console).await,
    }
}

/// Build the console binding from deployd.json plus CLI overrides.
async fn build_platform(
    project: &Path,
    console_override: Option<String>,
) -> anyhow::Result<ConsolePlatform> {
    let config = config::read_config(project)
        .await
        .with_context(|| format!("reading {}", utils::get_config_path(project).display()))?
        .unwrap_or_default();

    let console = console_override.unwrap_or(config.console);
    // join() keeps an absolute console path as-is
    Ok(ConsolePlatform::new(project.join(console), project))
}

async fn deploy(
    interactive: bool,
    project: &Path,
    console: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let platform = build_platform(project, console).await?;

    // Ctrl-C stops the run before the next plugin; completed actions stand.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut confirm: Box<dyn Confirmation> = if interactive {
        Box::new(StdinConfirm)
    } else {
        Box::new(AutoConfirm)
    };

    // A refresh failure is the one fatal error: without a valid registry
    // there is nothing to reconcile. Per-plugin failures land in the report.
    let plan = build_deployment_plan(&platform).await?;
    if !plan.needs_confirmation() {
        println!("All {} managed plugins are up to date", plan.actions.len());
    }

    let report = execute_plan(&platform, plan, confirm.as_mut(), &cancel).await?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &DeploymentReport) {
    println!();
    println!("Deployment run {} ({})", report.run_id, report.started_at);

    for result in &report.results {
        let line = match &result.outcome {
            ActionOutcome::Success => format!("{}: {} ok", result.name, result.decision.as_str()),
            ActionOutcome::Skipped => format!("{}: up to date", result.name),
            ActionOutcome::Declined => {
                format!("{}: {} declined", result.name, result.decision.as_str())
            }
            ActionOutcome::Failed(reason) => {
                format!("{}: {} FAILED - {}", result.name, result.decision.as_str(), reason)
            }
        };
        println!("  {line}");
    }

    let failures = report.failure_count();
    if failures > 0 {
        println!("{failures} plugin(s) failed, see above");
    }
}

async fn serve(
    addr: String,
    cors_origins: Vec<String>,
    project: &Path,
    console: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = addr.parse()?;

    let cors_origins: Vec<String> = cors_origins
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let allow_all_origins = cors_origins.iter().any(|o| o == "*");

    info!(
        "CORS origins: {}",
        if allow_all_origins {
            "*".to_string()
        } else {
            cors_origins.join(", ")
        }
    );

    let platform = build_platform(project, console).await?;
    let service = DeploydService::new(Arc::new(platform));

    // Create reflection service
    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    // Configure CORS for gRPC-Web
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            if allow_all_origins {
                return true;
            }

            if let Ok(origin_str) = origin.to_str() {
                cors_origins
                    .iter()
                    .any(|allowed| origin_str.starts_with(allowed))
            } else {
                false
            }
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            "x-grpc-web".parse().unwrap(),
            "x-user-agent".parse().unwrap(),
            "grpc-timeout".parse().unwrap(),
        ])
        .expose_headers([
            "grpc-status".parse().unwrap(),
            "grpc-message".parse().unwrap(),
            "grpc-status-details-bin".parse().unwrap(),
        ]);

    info!("Starting deployd on {} (gRPC + gRPC-Web)", addr);

    Server::builder()
        .accept_http1(true) // Required for gRPC-Web
        .layer(cors)
        .layer(tonic_web::GrpcWebLayer::new())
        .add_service(reflection_service)
        .add_service(DeploydServer::new(service))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal, stopping server...");
        })
        .await?;

    info!("deployd stopped");
    Ok(())
}
