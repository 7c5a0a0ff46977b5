mod bootstrap;

use anyhow::Result;
use replay_core::settings::Settings;
use replay_core::time_utils::TimezoneHandler;
use replay_data::ingest::{self, InputFormat};
use replay_ui::app::App;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Replay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Timezone: {}, Theme: {}, Top-N: {}",
        settings.timezone,
        settings.theme,
        settings.top_n
    );

    let data_path = match settings.data_path.clone().or_else(bootstrap::discover_data_path) {
        Some(path) => path,
        None => {
            eprintln!("No streaming-history export found.");
            eprintln!(
                "Place your export in ./Spotify Extended Streaming History/ \
                 or pass --data-path <dir-or-file>."
            );
            std::process::exit(1);
        }
    };

    let tz = TimezoneHandler::new(&settings.timezone);
    let format = InputFormat::from_arg(&settings.format);

    let ingested = ingest::ingest_history(&data_path, format, &tz)?;
    if ingested.metadata.records_dropped > 0 {
        tracing::warn!(
            "{} records dropped during ingestion",
            ingested.metadata.records_dropped
        );
    }

    let app = App::new(&settings.theme, ingested, settings.top_n as usize);
    app.run()?;

    Ok(())
}
