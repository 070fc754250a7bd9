use festival_scheduler::catalog::Catalog;
use festival_scheduler::config::{FestivalConfig, FestivalRules};
use festival_scheduler::generator::check_catalog;
use festival_scheduler::server::{self, AppState};
use log::{error, info};
use std::process::ExitCode;

// FESTIVAL_CONFIG points at a JSON file; missing keys keep their defaults
fn load_config() -> Result<FestivalConfig, String> {
    let Ok(path) = std::env::var("FESTIVAL_CONFIG") else {
        return Ok(FestivalConfig::default());
    };
    info!("Loading festival configuration from {}", path);
    let text = std::fs::read_to_string(&path).map_err(|e| format!("{}: {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rules = match load_config().and_then(|config| FestivalRules::new(config).map_err(|e| e.to_string())) {
        Ok(rules) => rules,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let catalog = Catalog::lollapalooza();
    if let Err(e) = check_catalog(&catalog, &rules) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let addr = std::env::var("FESTIVAL_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    if let Err(e) = server::run_server(&addr, AppState { rules, catalog }).await {
        error!("Server stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
