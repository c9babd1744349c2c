use anyhow::{anyhow, Result};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use lumiishift_core::{
    classify, CompletionOutcome, Config, Credential, Effect, InteractionState, KeySource,
    MoodEntry, MoodError, ResponseOrchestrator,
};

/// Moods per grid row.
pub const GRID_COLUMNS: usize = 5;

/// How many ticks a celebratory effect stays on screen.
pub const EFFECT_TICKS: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Asking for the API key before anything else can happen
    ApiKey,
}

/// A running balloon or snow animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub kind: Effect,
    pub frame: u16,
}

type PendingReply = JoinHandle<(String, Result<CompletionOutcome, MoodError>)>;

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub orchestrator: ResponseOrchestrator,
    pub credential: Option<Credential>,
    pub key_source: Option<KeySource>,

    // Session state
    pub interaction: InteractionState,
    pub grid_cursor: usize,
    pub pending: Option<PendingReply>,
    pub pending_mood: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
    pub effect: Option<ActiveEffect>,

    // API key input state
    pub api_key_input: String,
    pub api_key_input_cursor: usize,
    pub api_key_error: Option<String>,

    // Grid area for mouse hit-testing (updated during render)
    pub grid_area: Option<Rect>,
}

impl App {
    pub fn new(orchestrator: ResponseOrchestrator, credential: Option<(Credential, KeySource)>) -> Self {
        let (credential, key_source) = match credential {
            Some((credential, source)) => (Some(credential), Some(source)),
            None => (None, None),
        };
        let input_mode = if credential.is_some() {
            InputMode::Normal
        } else {
            InputMode::ApiKey
        };

        Self {
            should_quit: false,
            input_mode,

            orchestrator,
            credential,
            key_source,

            interaction: InteractionState::new(),
            grid_cursor: 0,
            pending: None,
            pending_mood: None,

            animation_frame: 0,
            effect: None,

            api_key_input: String::new(),
            api_key_input_cursor: 0,
            api_key_error: None,

            grid_area: None,
        }
    }

    pub fn mood_count(&self) -> usize {
        self.orchestrator.catalog().len()
    }

    pub fn grid_rows(&self) -> usize {
        self.mood_count().div_ceil(GRID_COLUMNS)
    }

    /// Entry for the currently selected mood, if any.
    pub fn selected_entry(&self) -> Option<&MoodEntry> {
        self.interaction
            .selected_mood()
            .and_then(|id| self.orchestrator.catalog().lookup(id).ok())
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    // Grid navigation
    pub fn grid_left(&mut self) {
        if self.grid_cursor % GRID_COLUMNS > 0 {
            self.grid_cursor -= 1;
        }
    }

    pub fn grid_right(&mut self) {
        if self.grid_cursor % GRID_COLUMNS < GRID_COLUMNS - 1 && self.grid_cursor + 1 < self.mood_count() {
            self.grid_cursor += 1;
        }
    }

    pub fn grid_up(&mut self) {
        if self.grid_cursor >= GRID_COLUMNS {
            self.grid_cursor -= GRID_COLUMNS;
        }
    }

    pub fn grid_down(&mut self) {
        if self.grid_cursor + GRID_COLUMNS < self.mood_count() {
            self.grid_cursor += GRID_COLUMNS;
        }
    }

    /// Ask for a reply for the mood at `index`. Ignored while a reply is
    /// still on its way, so only one call is ever in flight.
    pub fn select_mood(&mut self, index: usize) {
        if self.pending.is_some() {
            return;
        }
        let Some(credential) = self.credential.clone() else {
            self.input_mode = InputMode::ApiKey;
            return;
        };
        let Some(entry) = self.orchestrator.catalog().get(index) else {
            return;
        };

        let mood_id = entry.id.to_string();
        info!(mood = %mood_id, "Mood selected");

        self.grid_cursor = index;
        self.effect = None;
        self.pending_mood = Some(mood_id.clone());

        let orchestrator = self.orchestrator.clone();
        self.pending = Some(tokio::spawn(async move {
            let outcome = orchestrator.complete(&mood_id, &credential).await;
            (mood_id, outcome)
        }));
    }

    /// Pick up a finished reply, if there is one, and record it.
    pub async fn poll_pending(&mut self) -> Result<()> {
        let finished = self.pending.as_ref().is_some_and(|task| task.is_finished());
        if !finished {
            return Ok(());
        }
        let Some(task) = self.pending.take() else {
            return Ok(());
        };
        self.pending_mood = None;

        let (mood_id, outcome) = task.await?;
        // The grid is built from the catalog, so an unknown mood here means
        // the two are out of sync. Stop rather than show a wrong screen.
        let outcome = outcome.map_err(|err| anyhow!(err))?;
        self.apply_outcome(&mood_id, &outcome);
        Ok(())
    }

    pub fn apply_outcome(&mut self, mood_id: &str, outcome: &CompletionOutcome) {
        self.interaction.record(mood_id, outcome);
        let kind = classify(mood_id);
        info!(mood = %mood_id, effect = kind.as_str(), success = outcome.is_success(), "Reply recorded");
        self.effect = match kind {
            Effect::Neutral => None,
            kind => Some(ActiveEffect { kind, frame: 0 }),
        };
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending.is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some(effect) = self.effect.as_mut() {
            effect.frame += 1;
            if effect.frame >= EFFECT_TICKS {
                self.effect = None;
            }
        }
    }

    /// Validate the typed key, save it to the config file, and unlock the grid.
    pub fn submit_api_key(&mut self) {
        match Credential::new(self.api_key_input.as_str()) {
            Ok(credential) => {
                if let Err(err) = Config::save_api_key(credential.expose()) {
                    // Still usable for this session
                    warn!(error = %err, "Could not save API key to config");
                }
                self.credential = Some(credential);
                self.key_source = Some(KeySource::Prompt);
                self.api_key_input.clear();
                self.api_key_input_cursor = 0;
                self.api_key_error = None;
                self.input_mode = InputMode::Normal;
            }
            Err(err) => {
                self.api_key_error = Some(err.to_string());
            }
        }
    }

    /// Map a terminal cell to a mood index using the last rendered grid.
    pub fn grid_index_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.grid_area?;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        let rows = self.grid_rows().max(1) as u16;
        let cell_width = (area.width / GRID_COLUMNS as u16).max(1);
        let cell_height = (area.height / rows).max(1);

        let col = ((column - area.x) / cell_width) as usize;
        let row = ((row - area.y) / cell_height) as usize;
        if col >= GRID_COLUMNS {
            return None;
        }
        let index = row * GRID_COLUMNS + col;
        (index < self.mood_count()).then_some(index)
    }
}
