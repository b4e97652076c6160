//! Pomodoro state machine.
//!
//! The timer never schedules itself. Whoever owns it calls [`Timer::tick`]
//! once per elapsed second and drains [`TimerEvent`]s with
//! [`Timer::poll_event`] after each command.

use std::collections::VecDeque;

use crate::{alarm::Alarm, error::ConfigError};

const SECS_PER_MINUTE: u64 = 60;

// ============================================================================
// Configuration
// ============================================================================

/// Interval lengths in minutes. All fields are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    work_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
    cycles_before_long: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long: 4,
        }
    }
}

impl SessionConfig {
    pub const FIELD_NAMES: [&'static str; 4] =
        ["Work", "Short break", "Long break", "Cycles before long break"];

    pub fn new(
        work: i64,
        short_break: i64,
        long_break: i64,
        cycles: i64,
    ) -> Result<Self, ConfigError> {
        let [work_field, short_field, long_field, cycles_field] = Self::FIELD_NAMES;
        Ok(Self {
            work_minutes: positive(work_field, work)?,
            short_break_minutes: positive(short_field, short_break)?,
            long_break_minutes: positive(long_field, long_break)?,
            cycles_before_long: positive(cycles_field, cycles)?,
        })
    }

    /// Parses raw text fields in the order of [`Self::FIELD_NAMES`].
    pub fn parse(fields: [&str; 4]) -> Result<Self, ConfigError> {
        let mut values = [0i64; 4];
        for ((value, raw), field) in values.iter_mut().zip(fields).zip(Self::FIELD_NAMES) {
            *value = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::NotNumeric { field })?;
        }
        let [work, short_break, long_break, cycles] = values;
        Self::new(work, short_break, long_break, cycles)
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn short_break_minutes(&self) -> u32 {
        self.short_break_minutes
    }

    pub fn long_break_minutes(&self) -> u32 {
        self.long_break_minutes
    }

    pub fn cycles_before_long(&self) -> u32 {
        self.cycles_before_long
    }

    fn work_secs(&self) -> u64 {
        u64::from(self.work_minutes) * SECS_PER_MINUTE
    }

    fn break_secs(&self, long: bool) -> u64 {
        let minutes = if long { self.long_break_minutes } else { self.short_break_minutes };
        u64::from(minutes) * SECS_PER_MINUTE
    }
}

fn positive(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NotPositive { field });
    }
    u32::try_from(value).map_err(|_| ConfigError::TooLarge { field })
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Work,
    Break,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Break => "BREAK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    WorkComplete,
    BreakComplete,
    ValidationError(String),
}

pub struct Timer {
    config: SessionConfig,
    remaining_secs: u64,
    mode: Mode,
    running: bool,
    completed_sessions: u32,
    events: VecDeque<TimerEvent>,
    alarm: Box<dyn Alarm>,
}

impl Timer {
    pub fn new(config: SessionConfig, alarm: Box<dyn Alarm>) -> Self {
        Self {
            config,
            remaining_secs: config.work_secs(),
            mode: Mode::Work,
            running: false,
            completed_sessions: 0,
            events: VecDeque::new(),
            alarm,
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            log::debug!("{} countdown started at {}", self.mode.label(), self.format_remaining());
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.mode = Mode::Work;
        self.completed_sessions = 0;
        self.remaining_secs = self.config.work_secs();
    }

    /// Advances the countdown by one second. Returns the completion event
    /// when this tick finished an interval; the event is also queued.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        let event = self.complete_interval();
        self.running = false;
        self.events.push_back(event.clone());
        Some(event)
    }

    /// Shifts the remaining time while paused. A decrease is refused unless
    /// more than `|delta_secs|` remains.
    pub fn adjust_minutes(&mut self, delta_secs: i64) -> bool {
        if self.running {
            return false;
        }
        let magnitude = delta_secs.unsigned_abs();
        if delta_secs < 0 {
            if self.remaining_secs <= magnitude {
                return false;
            }
            self.remaining_secs -= magnitude;
        } else {
            self.remaining_secs = self.remaining_secs.saturating_add(magnitude);
        }
        true
    }

    pub fn update_config(
        &mut self,
        work: i64,
        short_break: i64,
        long_break: i64,
        cycles: i64,
    ) -> Result<(), ConfigError> {
        let validated = SessionConfig::new(work, short_break, long_break, cycles);
        self.apply_config(validated)
    }

    /// Same as [`Self::update_config`] for raw text fields; non-numeric input
    /// is a validation error like any other.
    pub fn update_config_from_input(&mut self, fields: [&str; 4]) -> Result<(), ConfigError> {
        self.apply_config(SessionConfig::parse(fields))
    }

    fn apply_config(&mut self, validated: Result<SessionConfig, ConfigError>) -> Result<(), ConfigError> {
        match validated {
            Ok(config) => {
                self.config = config;
                self.reset();
                log::info!(
                    "config updated: work {}m, short break {}m, long break {}m, long break every {} sessions",
                    config.work_minutes,
                    config.short_break_minutes,
                    config.long_break_minutes,
                    config.cycles_before_long
                );
                Ok(())
            }
            Err(err) => {
                log::warn!("invalid configuration rejected: {err}");
                self.events.push_back(TimerEvent::ValidationError(err.to_string()));
                Err(err)
            }
        }
    }

    fn complete_interval(&mut self) -> TimerEvent {
        let event = match self.mode {
            Mode::Work => {
                self.completed_sessions += 1;
                let long = self.break_is_long();
                self.mode = Mode::Break;
                self.remaining_secs = self.config.break_secs(long);
                log::info!(
                    "work session {} complete, {} break next",
                    self.completed_sessions,
                    if long { "long" } else { "short" }
                );
                TimerEvent::WorkComplete
            }
            Mode::Break => {
                self.mode = Mode::Work;
                self.remaining_secs = self.config.work_secs();
                log::info!("break complete");
                TimerEvent::BreakComplete
            }
        };

        // Sound is best-effort; a silent host must not stall the timer.
        if let Err(err) = self.alarm.ring() {
            log::debug!("alarm failed: {err}");
        }
        event
    }

    pub fn poll_event(&mut self) -> Option<TimerEvent> {
        self.events.pop_front()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    fn break_is_long(&self) -> bool {
        self.completed_sessions % self.config.cycles_before_long == 0
    }

    /// Whether the break following (or currently in) this cycle is long.
    pub fn next_break_is_long(&self) -> bool {
        match self.mode {
            Mode::Work => (self.completed_sessions + 1) % self.config.cycles_before_long == 0,
            Mode::Break => self.break_is_long(),
        }
    }

    /// Configured length of the current interval.
    pub fn interval_total_secs(&self) -> u64 {
        match self.mode {
            Mode::Work => self.config.work_secs(),
            Mode::Break => self.config.break_secs(self.break_is_long()),
        }
    }

    pub fn format_remaining(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn progress(&self) -> f64 {
        let total = self.interval_total_secs() as f64;
        let elapsed = total - self.remaining_secs as f64;
        (elapsed / total).clamp(0.0, 1.0)
    }
}
