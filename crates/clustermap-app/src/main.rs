//! Main application entry point.

use clap::Parser;
use clustermap_app::{App, Args};

fn main() {
    env_logger::init();
    log::info!("Starting ClusterMap");

    let app = App::new(Args::parse());
    match app.run().and_then(|report| report.to_json()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
