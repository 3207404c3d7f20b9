use std::sync::Arc;

use clap::Parser;
use sdm_validator::configuration::ServerConfig;
use sdm_validator::metric::Metrics;
use sdm_validator::server::Server;

#[derive(Parser, Debug)]
#[command(version, about = "Validate SDM MACs from NFC tag URLs")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "conf.yaml")]
    conf: String,

    /// Override the listen address from the config
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() {
    // Set RUST_LOG=info for visibility.
    env_logger::init();

    let args = Args::parse();

    let mut server_conf = ServerConfig::load(&args.conf).expect("Failed to load config");
    if let Some(listen) = args.listen {
        server_conf.listen = listen;
    }

    let server = Server::bootstrap(&server_conf, Arc::new(Metrics::default()))
        .await
        .expect("Failed to bootstrap server");

    server.run_forever().await.expect("Server failed");
}
