use appmcp::inspect::{self, InspectFormat, InspectKind};
use appmcp::mcp::BridgeService;
use appmcp::{apps, db, mcp, McpConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "appmcp-cli")]
#[command(about = "Inspect and run the appmcp MCP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every registered tool, resource, and prompt
    Inspect {
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,

        /// Component table to show
        #[arg(long, value_enum, default_value_t = KindArg::All)]
        kind: KindArg,
    },

    /// Run the MCP server standalone
    Run {
        /// Transport to serve on
        #[arg(long, value_enum, default_value_t = TransportArg::Sse)]
        transport: TransportArg,

        /// Bind address (SSE only)
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Bind port (SSE only)
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for InspectFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => InspectFormat::Text,
            FormatArg::Json => InspectFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    All,
    Tools,
    Resources,
    Prompts,
}

impl From<KindArg> for InspectKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::All => InspectKind::All,
            KindArg::Tools => InspectKind::Tools,
            KindArg::Resources => InspectKind::Resources,
            KindArg::Prompts => InspectKind::Prompts,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TransportArg {
    Stdio,
    Sse,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Log to stderr: in stdio transport mode stdout carries the protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appmcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Connect to database
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    let config = McpConfig::from_env();
    let manifest = apps::manifest(pool.clone());
    let (registry, report) = appmcp::build_registry(&manifest, &config);
    for (app, error) in &report.failed {
        eprintln!("❌ App '{}' failed to register: {}", app, error);
    }
    let registry = Arc::new(registry);

    match cli.command {
        Commands::Inspect { format, kind } => {
            println!("{}", inspect::render(&registry, format.into(), kind.into()));
        }

        Commands::Run {
            transport,
            host,
            port,
        } => match transport {
            TransportArg::Stdio => {
                use rmcp::ServiceExt;

                let service = BridgeService::new(registry);
                let running = service.serve(rmcp::transport::stdio()).await?;
                running.waiting().await?;
            }

            TransportArg::Sse => {
                let (app, _sse_ct) = mcp::mount(axum::Router::new(), registry, &config);

                let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
                let prefix = config.url_prefix.trim_matches('/');
                tracing::info!("MCP server running on http://{}/{}/", addr, prefix);

                let listener = tokio::net::TcpListener::bind(addr).await?;
                axum::serve(listener, app).await?;
            }
        },
    }

    Ok(())
}
