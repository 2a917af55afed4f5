#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use study_schedule::{AppConfig, ScheduleRepository, http_api, logging};

    let config = AppConfig::from_env()?;
    logging::init_tracing(&config.log_filter);

    let repository = ScheduleRepository::open(&config.database_path)?;
    tracing::info!(db = %config.database_path.display(), "opened schedule database");
    http_api::serve(config.http_addr, repository).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
