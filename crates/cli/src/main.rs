use clap::Parser;
use split_dns_application::{HandleQueryUseCase, RandomSelector};
use split_dns_domain::{CliOverrides, Config, RouteTable, TransferAcl};
use split_dns_infrastructure::dns::forwarding::ProxyForwarder;
use split_dns_infrastructure::dns::query_logger::PassiveLogWriter;
use std::sync::Arc;
use tracing::info;

mod server;

#[derive(Parser)]
#[command(name = "split-dns")]
#[command(version)]
#[command(about = "DNS reverse proxy routing queries to upstreams by domain suffix")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Address to listen on, shared by UDP and TCP (host:port)
    #[arg(short = 'a', long)]
    address: Option<String>,

    /// Default DNS server for queries no route matches (IP:PORT)
    #[arg(short = 'd', long = "default")]
    default_server: Option<String>,

    /// Routing rule `domain=endpoint[,endpoint...]`; repeatable
    #[arg(short = 'r', long = "route")]
    routes: Vec<String>,

    /// Comma-separated client addresses allowed to transfer (AXFR/IXFR)
    #[arg(long = "allow-transfer", value_delimiter = ',')]
    allow_transfer: Option<Vec<String>>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        listen: cli.address,
        default_server: cli.default_server,
        routes: cli.routes,
        allow_transfer: cli.allow_transfer,
        log_level: cli.log_level,
    };
    let config = Config::load(cli.config.as_deref(), overrides)?;

    init_logging(&config);
    config.validate()?;

    info!("Starting split-dns v{}", env!("CARGO_PKG_VERSION"));

    let routes = Arc::new(RouteTable::build(&config.forwarding.routes)?);
    let transfer_acl = Arc::new(TransferAcl::new(&config.forwarding.allow_transfer));
    let default_backend = config.default_backend()?;

    // Passive log goes to stdout; diagnostics stay on stderr.
    let answer_log = PassiveLogWriter::start();

    let handler = Arc::new(HandleQueryUseCase::new(
        routes.clone(),
        transfer_acl.clone(),
        default_backend,
        Arc::new(RandomSelector),
        Arc::new(ProxyForwarder::default()),
        Arc::new(answer_log),
    ));

    info!(
        listen = %config.server.listen,
        routes = routes.len(),
        allow_transfer = transfer_acl.len(),
        "Configuration loaded"
    );

    let listen = config.server.listen.parse()?;
    server::serve(listen, handler).await
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
