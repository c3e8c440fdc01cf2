use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use thiserror::Error;

pub mod buffer;
pub mod history;
pub mod integer;
pub mod learner;
pub mod masked;
pub mod patcher;
pub mod payload;
pub mod registry;
pub mod scanner;
pub mod segment;
pub mod session;
pub mod transform;
pub mod zones;

pub use buffer::{FixedBuffer, MessageBuffer};
pub use history::{HistoryCache, HistoryEntry};
pub use learner::{GenuineLink, LinkLearner, ObservedLink, ReceivedPayload};
pub use patcher::{BufferPatcher, PatchOutcome};
pub use registry::MapRegistry;
pub use scanner::LiteralScanner;
pub use segment::SegmentError;
pub use zones::{MapGeometry, StaticZoneDirectory, ZoneDirectory, ZoneInfo};

use segment::hex_dump;
use session::{Session, SessionStep};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no map is registered for place name '{name}'")]
    UnresolvedPlaceName { name: String },

    #[error("rebuilt message needs {needed} bytes but the buffer holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("malformed message: {0}")]
    MalformedMessage(#[from] SegmentError),

    #[error("no usable geometry for map {map_id}")]
    MissingMapGeometry { map_id: u32 },

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error("invalid message buffer: {0}")]
    InvalidBuffer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Everything learned or generated while the host runs. Shared by the
/// patching path and the learning path, which the host never runs at the
/// same time.
#[derive(Debug, Default, Clone)]
pub struct LinkState {
    pub registry: MapRegistry,
    pub history: HistoryCache,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkerSettings {
    /// Fixed seed for coordinate jitter. Unset draws one from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Log every message passing through the patcher as hex.
    #[serde(default)]
    pub debug: bool,
}

/// Owns the shared state and wires the patcher and learner to it.
///
/// A host with more than one thread must put the whole `Linker` behind a
/// single lock.
pub struct Linker<Z: ZoneDirectory> {
    state: LinkState,
    zones: Z,
    rng: StdRng,
    scanner: LiteralScanner,
    settings: LinkerSettings,
}

impl<Z: ZoneDirectory> Linker<Z> {
    pub fn new(zones: Z, settings: LinkerSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut state = LinkState::new();
        let seeded = state.registry.seed(&zones);
        log::info!("registered {} place names", seeded);

        Self {
            state,
            zones,
            rng,
            scanner: LiteralScanner::new(),
            settings,
        }
    }

    pub fn state(&self) -> &LinkState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LinkState {
        &mut self.state
    }

    /// Rebuild the first literal link in `buffer`.
    pub fn patch<B: MessageBuffer + ?Sized>(&mut self, buffer: &mut B) -> Result<PatchOutcome> {
        BufferPatcher::new(&mut self.state, &self.zones, &mut self.rng, &self.scanner)
            .with_debug(self.settings.debug)
            .patch(buffer)
    }

    /// Entry point for the intercepted message-parsing call. Nothing escapes:
    /// errors and panics are logged and the buffer keeps its previous
    /// content.
    pub fn on_parse_message<B: MessageBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
    ) -> Option<PatchOutcome> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.patch(buffer))) {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(err)) => {
                log::error!("Exception on parse message: {}", err);
                None
            }
            Err(_) => {
                log::error!("Exception on parse message: patcher panicked");
                None
            }
        }
    }

    /// Learn from one genuine link shown as `display_text`.
    pub fn observe<L: GenuineLink + ?Sized>(
        &mut self,
        display_text: &str,
        link: &L,
    ) -> Option<(String, HistoryEntry)> {
        LinkLearner::new(&mut self.state).observe(display_text, link)
    }

    /// Entry point for received chat messages. Never fails outward.
    pub fn observe_message<L: GenuineLink>(&mut self, payloads: &[ReceivedPayload<L>]) -> usize {
        let state = &mut self.state;
        match panic::catch_unwind(AssertUnwindSafe(|| {
            LinkLearner::new(state).observe_message(payloads)
        })) {
            Ok(learned) => learned,
            Err(_) => {
                log::debug!("Exception on chat message: learner panicked");
                0
            }
        }
    }
}

/// Settings for replaying a recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    pub zones_path: PathBuf,
    pub session_path: PathBuf,
    pub seed: Option<u64>,
    pub debug: bool,
}

fn describe_entry(entry: &HistoryEntry) -> String {
    let instance = entry
        .instance()
        .map(|n| format!(" instance {}", n))
        .unwrap_or_default();
    format!(
        "zone {} map {:#X}{} raw ({}, {})",
        entry.zone_id,
        entry.bare_map_id(),
        instance,
        entry.raw_x,
        entry.raw_y
    )
}

/// Replay a recorded session through one [`Linker`] and return a report
/// with one line per step.
pub fn run(settings: RunSettings) -> Result<String> {
    if !settings.zones_path.exists() {
        return Err(LinkError::Config(format!(
            "Zone directory does not exist: {}",
            settings.zones_path.display()
        )));
    }
    if !settings.session_path.exists() {
        return Err(LinkError::Config(format!(
            "Session file does not exist: {}",
            settings.session_path.display()
        )));
    }

    let zones = StaticZoneDirectory::load(&settings.zones_path)?;
    let session = Session::load(&settings.session_path)?;
    let mut linker = Linker::new(
        zones,
        LinkerSettings {
            seed: settings.seed,
            debug: settings.debug,
        },
    );

    let mut log = format!("registry: {} place names\n", linker.state().registry.len());
    for (n, step) in session.steps.iter().enumerate() {
        match step {
            SessionStep::Observe { text, link } => match linker.observe(text, link) {
                Some((key, entry)) => {
                    log.push_str(&format!(
                        "[{}] memorize {} => {}\n",
                        n,
                        key,
                        describe_entry(&entry)
                    ));
                }
                None => log.push_str(&format!("[{}] observe skipped: {:?}\n", n, text)),
            },
            SessionStep::Paste { text, capacity } => {
                let message = text.as_bytes();
                let mut storage = vec![0u8; *capacity];
                if message.len() >= storage.len() {
                    log.push_str(&format!(
                        "[{}] paste skipped: {} bytes do not fit capacity {}\n",
                        n,
                        message.len(),
                        capacity
                    ));
                    continue;
                }
                storage[..message.len()].copy_from_slice(message);
                let mut buffer = FixedBuffer::new(&mut storage, message.len(), *capacity)?;

                let line = match linker.patch(&mut buffer) {
                    Ok(PatchOutcome::Patched {
                        key,
                        entry,
                        recalled,
                        ..
                    }) => format!(
                        "{} {} => {}",
                        if recalled { "recall" } else { "generate" },
                        key,
                        describe_entry(&entry)
                    ),
                    Ok(PatchOutcome::AlreadyLinked) => "already linked".to_string(),
                    Ok(PatchOutcome::NoLiteralLink) => "no literal link".to_string(),
                    Ok(PatchOutcome::Unresolved(names)) => {
                        format!("unresolved: {}", names.join(", "))
                    }
                    Err(err) => format!("failed: {}", err),
                };
                log.push_str(&format!("[{}] {}\n", n, line));
                log.push_str(&format!("    {}\n", hex_dump(buffer.message())));
            }
        }
    }

    log.push_str(&format!("history: {} entries\n", linker.state().history.len()));
    Ok(log)
}
