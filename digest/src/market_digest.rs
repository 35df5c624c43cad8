use anyhow::Result;

mod digest_logic;
use digest_logic::{config, logger, pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let loaded = config::load_config();
    let settings = loaded.config.clone().resolve();
    let log_path = logger::setup_logging(&settings.log_dir, &settings.log_level)?;
    log::info!("Logging to {}", log_path.display());
    loaded.log_notes();
    log::debug!("Settings: {:?}", settings);

    match pipeline::run(&settings).await {
        Ok(path) => {
            log::info!("OK: {} generated", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Digest run failed: {:#}", e);
            Err(e)
        }
    }
}
