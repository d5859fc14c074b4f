use dadjokes_app::application::dtos::{AchievementDto, StatusDto};
use dadjokes_app::presentation::bootstrap::init_logging;
use dadjokes_app::presentation::state::AppState;
use dadjokes_domain::calendar::Calendar;
use dadjokes_infrastructure::config::AppConfig;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config);
    tracing::info!("🚀 dadjokes starting...");

    let app = AppState::new(config).await?;
    let state = app.services.store.hydrate().await;
    let now = app.runtime.calendar.now();

    let output = json!({
        "status": StatusDto::from_state(&state, now),
        "achievements": AchievementDto::list(&state),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
