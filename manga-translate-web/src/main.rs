use manga_translate_web::{AppState, router};
use std::time::Duration;
use tracing::info;

const ADDR_ENV: &str = "MANGA_TRANSLATE_WEB_ADDR";
const FAIL_ENV: &str = "MANGA_TRANSLATE_WEB_FAIL";
const DELAY_ENV: &str = "MANGA_TRANSLATE_WEB_DELAY_MS";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let mut state = match std::env::var(FAIL_ENV) {
        Ok(message) if !message.trim().is_empty() => AppState::failing(&message),
        _ => AppState::default(),
    };
    if let Ok(delay) = std::env::var(DELAY_ENV) {
        let millis: u64 = delay
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a whole number of milliseconds", DELAY_ENV))?;
        state = state.with_delay(Duration::from_millis(millis));
    }

    let app = router(state);

    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| "127.0.0.1:30180".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Translation stand-in listening at http://{}/api/translate", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
