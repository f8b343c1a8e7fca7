use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            let data_file = raw_args
                .get(3)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/scenarios.json"));
            if let Err(e) = rentroi::api::run_http_server(port, data_file).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("calc") => {
            let args = std::iter::once(raw_args[0].clone()).chain(raw_args.iter().skip(2).cloned());
            match rentroi::api::run_cli_calculation(args) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(2);
                }
            }
        }
        _ => {
            eprintln!("Usage: cargo run -- serve [port] [data-file]");
            eprintln!("       cargo run -- calc --rent-per-month 20000 --monthly-expenses 5000 \\");
            eprintln!("                         --own-money 300000 --extra-costs 50000 --years 5");
            std::process::exit(1);
        }
    }
}
