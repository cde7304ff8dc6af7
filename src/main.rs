use clap::{Arg, ArgAction, Command};
use manga_translate::{
    Config, ConfigOption, Controller, FontStyle, HttpTranslationService, LifecycleState,
    MockMode, MockTranslationService, Snapshot, Surface, TranslationMethod, TranslationService,
    UploadCandidate,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("manga-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate a manga page through the translation service")
        .arg(
            Arg::new("image")
                .help("PNG or JPEG page to translate")
                .required_unless_present_any(["sample", "list-options"])
                .index(1),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .short('m')
                .help("Translation method: google, hf, baidu, bing"),
        )
        .arg(
            Arg::new("font")
                .long("font")
                .short('f')
                .help("Font: animeace_i, mangati, ariali"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Where to write the translated page (default: translated_<name>)"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .short('e')
                .help("Translate endpoint URL (overrides config and MANGA_TRANSLATE_ENDPOINT)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .help("Translate a bundled sample page instead of a file (0-2)")
                .value_parser(clap::value_parser!(usize))
                .conflicts_with("image"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use the offline mock service, which echoes the page back")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-options")
                .long("list-options")
                .help("Print the methods and fonts the service accepts, then exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let default_filter = if matches.get_flag("verbose") {
        "manga_translate=debug"
    } else {
        "manga_translate=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(matches.get_one::<String>("config").map(Path::new))?;
    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        config.endpoint = endpoint.clone();
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.request_timeout_secs = *timeout;
    }

    if matches.get_flag("list-options") {
        let catalog = HttpTranslationService::from_config(&config)?.catalog().await?;
        println!("Translation methods: {}", catalog.translation_methods.join(", "));
        println!("Fonts: {}", catalog.fonts.join(", "));
        return Ok(());
    }

    let service: Arc<dyn TranslationService> = if matches.get_flag("mock") {
        Arc::new(MockTranslationService::with_delay(MockMode::Echo, 3_000))
    } else {
        Arc::new(HttpTranslationService::from_config(&config)?)
    };
    let surface = Surface::new(Controller::new(service, &config));

    if let Some(method) = matches.get_one::<String>("method") {
        surface.on_option_changed(ConfigOption::Method(method.parse::<TranslationMethod>()?));
    }
    if let Some(font) = matches.get_one::<String>("font") {
        surface.on_option_changed(ConfigOption::Font(font.parse::<FontStyle>()?));
    }

    let source_name = if let Some(index) = matches.get_one::<usize>("sample") {
        surface.on_example_selected(*index)?;
        surface
            .gallery()
            .get(*index)
            .map(|s| s.name.to_string())
            .unwrap_or_default()
    } else {
        let path = matches
            .get_one::<String>("image")
            .map(PathBuf::from)
            .ok_or("No image given")?;
        let candidate = UploadCandidate::from_path(&path).await?;
        let name = candidate.file_name.clone();
        if let Err(e) = surface.on_file_picked(candidate) {
            let message = surface
                .controller()
                .snapshot()
                .error
                .map(|record| record.message)
                .unwrap_or_else(|| e.to_string());
            eprintln!("❌ {}", message);
            return Err(e.into());
        }
        name
    };

    let renderer = spawn_status_renderer(surface.subscribe(), |status| eprintln!("⏳ {}", status));

    let configuration = surface.controller().configuration();
    eprintln!(
        "🖼  {} → {} ({})",
        source_name,
        configuration.method.label(),
        configuration.font.label()
    );

    let outcome = surface.on_submit_clicked().await;
    join_status_renderer(renderer).await;

    let snapshot = surface.controller().snapshot();
    match (outcome, snapshot.result) {
        (Ok(()), Some(result)) => {
            let output = matches
                .get_one::<String>("output")
                .map(PathBuf::from)
                .unwrap_or_else(|| default_output(&source_name, result.media_type().extension()));
            tokio::fs::write(&output, result.data()).await?;
            println!("{}", output.display());
            Ok(())
        }
        (Ok(()), None) => Err("Translation finished without a result".into()),
        (Err(e), _) => {
            let message = snapshot
                .error
                .map(|record| record.message)
                .unwrap_or_else(|| e.to_string());
            eprintln!("❌ {}", message);
            Err(e.into())
        }
    }
}

/// Report each new loading phrase while a request is in flight
fn spawn_status_renderer<F>(mut updates: watch::Receiver<Snapshot>, mut show: F) -> JoinHandle<()>
where
    F: FnMut(&str) + Send + 'static,
{
    tokio::spawn(async move {
        let mut last_status: Option<String> = None;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.is_busy() {
                if let Some(status) = snapshot.status.as_deref()
                    && snapshot.status != last_status
                {
                    show(status);
                }
            } else if matches!(snapshot.state, LifecycleState::Succeeded | LifecycleState::Failed) {
                break;
            }
            last_status = snapshot.status;
        }
    })
}

/// Wait for the renderer; returns false if it panicked or was cancelled
async fn join_status_renderer(renderer: JoinHandle<()>) -> bool {
    match renderer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Status renderer stopped unexpectedly: {}", e);
            false
        }
    }
}

fn default_output(source_name: &str, extension: &str) -> PathBuf {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manga".to_string());
    PathBuf::from(format!("translated_{}.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use manga_translate::config::DEFAULT_PHRASES;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_renderer_shows_phrases_until_settled() {
        let mock = Arc::new(MockTranslationService::with_delay(MockMode::Echo, 4_500));
        let surface = Surface::new(Controller::new(mock, &Config::default()));
        surface.on_example_selected(0).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let renderer = spawn_status_renderer(surface.subscribe(), move |status| {
            sink.lock().push(status.to_string())
        });

        surface.on_submit_clicked().await.unwrap();
        assert!(join_status_renderer(renderer).await);
        assert_eq!(*seen.lock(), DEFAULT_PHRASES[..3].to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_renderer_panic_is_reported() {
        let mock = Arc::new(MockTranslationService::with_delay(MockMode::Echo, 1_000));
        let surface = Surface::new(Controller::new(mock, &Config::default()));
        surface.on_example_selected(0).unwrap();

        let renderer = spawn_status_renderer(surface.subscribe(), |_| panic!("terminal gone"));
        surface.on_submit_clicked().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!join_status_renderer(renderer).await);
    }
}
