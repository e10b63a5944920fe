//! Demo driver for the standups app.
//!
//! Runs a full record-meeting flow in a live store: open the first standup,
//! start a meeting, let the scripted speech client and the timer run, and wait
//! until the meeting is saved.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use statecraft::config::{ConfigStore, RuntimeConfig};
use statecraft::dependencies::{ClockKey, ImmediateClock};
use statecraft::logging::init_tracing;
use statecraft::navigation::{StackAction, StackElementId};
use statecraft::standups::clients::{
    DataManager, DataManagerKey, SpeechClient, SpeechClientKey, SpeechRecognitionResult,
};
use statecraft::standups::detail::DetailAction;
use statecraft::standups::list::{ListAction, StandupsListState};
use statecraft::standups::record::RecordAction;
use statecraft::standups::{self, AppAction, AppState, PathAction, PathState, Standup};
use statecraft::{StackStore, Store};

#[derive(Parser)]
#[command(
    name = "statecraft",
    version,
    about = "Unidirectional state runtime demo"
)]
struct Cli {
    /// Config file (default: the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a meeting for the first standup and save it.
    Standups {
        /// Meeting length in timer ticks (seconds).
        #[arg(long, default_value_t = 6)]
        ticks: u64,
        /// Text the scripted speech recognizer produces.
        #[arg(long, default_value = "We shipped the navigation stack")]
        transcript: String,
        /// Let timer ticks fire immediately instead of once per second.
        #[arg(long)]
        fast: bool,
        /// JSON file the standups are loaded from and saved to.
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigStore::open(path.clone())
            .with_context(|| format!("loading {}", path.display()))?
            .get(),
        None => RuntimeConfig::load().context("loading default config")?,
    };
    config.apply();

    match cli.command {
        Command::Standups {
            ticks,
            transcript,
            fast,
            data_file,
        } => run_standups(ticks, transcript, fast, data_file).await,
    }
}

async fn run_standups(
    ticks: u64,
    transcript: String,
    fast: bool,
    data_file: Option<PathBuf>,
) -> Result<()> {
    let data = match data_file {
        Some(path) => DataManager::file(path),
        None => DataManager::mock_standups(&[Standup::mock()]),
    };
    let mut standups = match data.load_standups() {
        Ok(standups) => standups,
        Err(error) => {
            tracing::info!(%error, "no saved standups, starting from the sample");
            vec![Standup::mock()]
        }
    };
    let Some(first) = standups.first_mut() else {
        bail!("no standups to record a meeting for");
    };
    first.duration_secs = ticks.max(1);
    let standup_id = first.id;

    let state = AppState {
        standups_list: StandupsListState::new(standups),
        ..AppState::default()
    };
    let speech = SpeechClient::scripted(vec![SpeechRecognitionResult::final_result(transcript)]);
    let store = Store::builder(state, standups::app::reducer())
        .dependencies(|values| {
            values.set::<SpeechClientKey>(speech);
            values.set::<DataManagerKey>(data.clone());
            if fast {
                values.set::<ClockKey>(Arc::new(ImmediateClock::new()));
            }
        })
        .build();
    let screens = StackStore::new(&store, |state| &state.path, AppAction::Path);

    store.send(AppAction::StandupsList(ListAction::StandupTapped(standup_id)));
    let detail = StackElementId::new(0);
    store.send(element(detail, PathAction::Detail(DetailAction::StartMeetingButtonTapped)));
    let Some(record) = store.with_state(|state| state.path.ids().last().copied()) else {
        bail!("record screen was not pushed");
    };
    store.send(element(record, PathAction::Record(RecordAction::Task)));

    let limit = Duration::from_secs(ticks.max(1) + 10);
    tokio::time::timeout(limit, store.wait_for(|state| state.path.len() == 1))
        .await
        .context("meeting did not finish in time")?;
    store.settle().await;

    let meetings = store.with_state(|state| match state.path.first() {
        Some(PathState::Detail(detail)) => detail.standup.meetings.clone(),
        _ => Vec::new(),
    });
    let Some(meeting) = meetings.first() else {
        bail!("meeting was not saved");
    };
    tracing::info!(events = ?screens.events(), "screen lifecycle");
    println!(
        "Saved meeting {} ({} on record): {}",
        meeting.id,
        meetings.len(),
        meeting.transcript
    );
    if let Ok(saved) = data.load_standups() {
        println!("{} standup(s) persisted", saved.len());
    }
    Ok(())
}

fn element(id: StackElementId, action: PathAction) -> AppAction {
    AppAction::Path(StackAction::Element { id, action })
}
