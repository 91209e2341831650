use std::env;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::audio::RodioOutput;
use crate::config::LogSettings;
use crate::controls::ControlCmd;
use crate::library::{LibraryStore, scan};
use crate::playback::PlaybackSession;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, problem) = settings::load_settings();
    init_logging(&settings.log);
    if let Some(problem) = problem {
        warn!("{problem}");
    }

    let dir = env::args().nth(1).unwrap_or_else(|| {
        env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(dir, tracks = tracks.len(), "library scanned");
    let store = Arc::new(LibraryStore::new(tracks));

    let persistence = startup::open_persistence().await;
    let output = RodioOutput::open(&settings.audio)?;
    let mut session = PlaybackSession::restore(
        output,
        store.clone(),
        persistence,
        startup::session_options(&settings),
    )
    .await;
    startup::load_library(&mut session, &store);

    let (control_tx, control_rx) = mpsc::unbounded_channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    event_loop::spawn_stdin_reader(control_tx);

    event_loop::run(&mut session, &mpris, control_rx).await;

    session.shutdown().await;
    info!("bye");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the `[log] filter` setting applies.
fn init_logging(log: &LogSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
