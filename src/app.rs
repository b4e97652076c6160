use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::timer::{SessionConfig, Timer, TimerEvent};

pub const TICK_RATE: Duration = Duration::from_secs(1);
pub const POLL_RATE: Duration = Duration::from_millis(50);

const ONE_MINUTE: i64 = 60;
const FIVE_MINUTES: i64 = 300;

// ============================================================================
// Ticker
// ============================================================================

/// Fixed-rate schedule for `Timer::tick`. Each due tick advances the
/// deadline by exactly one period, so poll latency never accumulates.
pub struct Ticker {
    period: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, next_due: now + period }
    }

    /// Restarts the schedule from `now`; used when the countdown resumes.
    pub fn rearm(&mut self, now: Instant) {
        self.next_due = now + self.period;
    }

    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while now >= self.next_due {
            self.next_due += self.period;
            ticks += 1;
        }
        ticks
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

// ============================================================================
// Presentation State
// ============================================================================

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum View {
    Timer,
    Settings,
    Help,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SettingsField {
    Work,
    ShortBreak,
    LongBreak,
    Cycles,
}

impl SettingsField {
    pub const ALL: [Self; 4] = [Self::Work, Self::ShortBreak, Self::LongBreak, Self::Cycles];

    fn index(self) -> usize {
        match self {
            Self::Work => 0,
            Self::ShortBreak => 1,
            Self::LongBreak => 2,
            Self::Cycles => 3,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        SessionConfig::FIELD_NAMES[self.index()]
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Cycles => "sessions",
            _ => "min",
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum PopupKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Popup {
    pub kind: PopupKind,
    pub title: &'static str,
    pub body: String,
}

pub struct AppState {
    pub timer: Timer,
    pub ticker: Ticker,
    pub current_view: View,
    pub settings_field: SettingsField,
    pub settings_editing: bool,
    pub settings_input: String,
    pub settings_drafts: [String; 4],
    pub popup: Option<Popup>,
}

impl AppState {
    pub fn new(timer: Timer, now: Instant) -> Self {
        let settings_drafts = drafts_from(timer.config());
        Self {
            timer,
            ticker: Ticker::new(TICK_RATE, now),
            current_view: View::Timer,
            settings_field: SettingsField::Work,
            settings_editing: false,
            settings_input: String::new(),
            settings_drafts,
            popup: None,
        }
    }

    /// Issues every tick that fell due and turns core events into popups.
    pub fn update(&mut self, now: Instant) {
        let due = self.ticker.due_ticks(now);
        if self.timer.is_running() {
            for _ in 0..due {
                if self.timer.tick().is_some() {
                    break;
                }
            }
        }
        self.collect_events();
    }

    fn start(&mut self, now: Instant) {
        if !self.timer.is_running() {
            self.ticker.rearm(now);
            self.timer.start();
        }
    }

    fn collect_events(&mut self) {
        while let Some(event) = self.timer.poll_event() {
            self.popup = Some(match event {
                TimerEvent::WorkComplete => Popup {
                    kind: PopupKind::Info,
                    title: "Time!",
                    body: "Work session complete! Time for a break.".into(),
                },
                TimerEvent::BreakComplete => Popup {
                    kind: PopupKind::Info,
                    title: "Time!",
                    body: "Break complete! Back to work.".into(),
                },
                TimerEvent::ValidationError(message) => Popup {
                    kind: PopupKind::Error,
                    title: "Error",
                    body: message,
                },
            });
        }
    }

    fn save_settings(&mut self) {
        let [work, short_break, long_break, cycles] = &self.settings_drafts;
        let fields = [work.as_str(), short_break.as_str(), long_break.as_str(), cycles.as_str()];
        if self.timer.update_config_from_input(fields).is_ok() {
            self.settings_drafts = drafts_from(self.timer.config());
            self.popup = Some(Popup {
                kind: PopupKind::Info,
                title: "Saved",
                body: "Configuration updated".into(),
            });
        } else {
            self.collect_events();
        }
    }
}

fn drafts_from(config: &SessionConfig) -> [String; 4] {
    [
        config.work_minutes().to_string(),
        config.short_break_minutes().to_string(),
        config.long_break_minutes().to_string(),
        config.cycles_before_long().to_string(),
    ]
}

// ============================================================================
// Event Handlers
// ============================================================================

/// Returns `true` when the user asked to quit.
pub fn handle_input(key: KeyEvent, app: &mut AppState, now: Instant) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.popup.is_some() {
        app.popup = None;
        return false;
    }

    if app.settings_editing {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if control => {
                commit_edit(app);
                app.save_settings();
            }
            KeyCode::Char(c) if !control => app.settings_input.push(c),
            KeyCode::Backspace => {
                app.settings_input.pop();
            }
            KeyCode::Enter => commit_edit(app),
            KeyCode::Esc => {
                app.settings_editing = false;
                app.settings_input.clear();
            }
            _ => {}
        }
        return false;
    }

    match app.current_view {
        View::Settings => handle_settings_view(key, app),
        View::Help => {
            app.current_view = View::Timer;
            false
        }
        View::Timer => handle_timer_view(key, app, now),
    }
}

fn handle_settings_view(key: KeyEvent, app: &mut AppState) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('c') => {
            app.settings_drafts = drafts_from(app.timer.config());
            app.current_view = View::Timer;
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => app.save_settings(),
        KeyCode::Char('w') => app.save_settings(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
            app.settings_field = app.settings_field.next();
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
            app.settings_field = app.settings_field.prev();
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            app.settings_input = app.settings_drafts[app.settings_field.index()].clone();
            app.settings_editing = true;
        }
        _ => {}
    }
    false
}

fn handle_timer_view(key: KeyEvent, app: &mut AppState, now: Instant) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Enter | KeyCode::Char('s') => app.start(now),
        KeyCode::Char('p') => app.timer.pause(),
        KeyCode::Char(' ') => {
            if app.timer.is_running() {
                app.timer.pause();
            } else {
                app.start(now);
            }
        }
        KeyCode::Char('r') => app.timer.reset(),
        KeyCode::Char('-') => {
            app.timer.adjust_minutes(-ONE_MINUTE);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.timer.adjust_minutes(ONE_MINUTE);
        }
        KeyCode::Char('[') => {
            app.timer.adjust_minutes(-FIVE_MINUTES);
        }
        KeyCode::Char(']') => {
            app.timer.adjust_minutes(FIVE_MINUTES);
        }
        KeyCode::Char('c') => {
            app.settings_drafts = drafts_from(app.timer.config());
            app.current_view = View::Settings;
        }
        KeyCode::Char('h') | KeyCode::Char('?') => app.current_view = View::Help,
        _ => {}
    }
    false
}

fn commit_edit(app: &mut AppState) {
    app.settings_drafts[app.settings_field.index()] = app.settings_input.trim().to_string();
    app.settings_editing = false;
    app.settings_input.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::SilentAlarm;
    use crate::timer::Mode;

    fn app() -> (AppState, Instant) {
        let now = Instant::now();
        let timer = Timer::new(SessionConfig::default(), Box::new(SilentAlarm));
        (AppState::new(timer, now), now)
    }

    fn press(app: &mut AppState, code: KeyCode, now: Instant) -> bool {
        handle_input(KeyEvent::new(code, KeyModifiers::NONE), app, now)
    }

    fn type_text(app: &mut AppState, text: &str, now: Instant) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    fn replace_field(app: &mut AppState, text: &str, now: Instant) {
        press(app, KeyCode::Enter, now);
        for _ in 0..app.settings_input.len() {
            press(app, KeyCode::Backspace, now);
        }
        type_text(app, text, now);
        press(app, KeyCode::Enter, now);
    }

    #[test]
    fn test_ticker_carries_fractional_time() {
        let start = Instant::now();
        let mut ticker = Ticker::new(TICK_RATE, start);
        assert_eq!(ticker.due_ticks(start + Duration::from_millis(999)), 0);
        assert_eq!(ticker.due_ticks(start + Duration::from_millis(1500)), 1);
        assert_eq!(ticker.due_ticks(start + Duration::from_millis(2000)), 1);
        assert_eq!(ticker.due_ticks(start + Duration::from_millis(5200)), 3);
        assert_eq!(
            ticker.until_next(start + Duration::from_millis(5200)),
            Duration::from_millis(800)
        );
    }

    #[test]
    fn test_update_ticks_once_per_elapsed_second() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('s'), now);
        app.update(now + Duration::from_millis(3100));
        assert_eq!(app.timer.remaining_secs(), 1497);
    }

    #[test]
    fn test_paused_timer_ignores_elapsed_time() {
        let (mut app, now) = app();
        app.update(now + Duration::from_secs(10));
        assert_eq!(app.timer.remaining_secs(), 1500);

        let later = now + Duration::from_secs(10);
        press(&mut app, KeyCode::Char(' '), later);
        app.update(later + Duration::from_millis(1000));
        assert_eq!(app.timer.remaining_secs(), 1499);
    }

    #[test]
    fn test_completion_shows_popup_and_stops() {
        let now = Instant::now();
        let config = SessionConfig::new(1, 1, 1, 4).unwrap();
        let mut app = AppState::new(Timer::new(config, Box::new(SilentAlarm)), now);
        press(&mut app, KeyCode::Enter, now);
        app.update(now + Duration::from_secs(75));

        assert_eq!(app.timer.mode(), Mode::Break);
        assert_eq!(app.timer.remaining_secs(), 60);
        assert!(!app.timer.is_running());
        let popup = app.popup.clone().unwrap();
        assert_eq!(popup.kind, PopupKind::Info);
        assert!(popup.body.contains("Work session complete"));

        press(&mut app, KeyCode::Char('x'), now);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_adjust_keys() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('+'), now);
        assert_eq!(app.timer.remaining_secs(), 1560);
        press(&mut app, KeyCode::Char('['), now);
        assert_eq!(app.timer.remaining_secs(), 1260);
        press(&mut app, KeyCode::Char(']'), now);
        press(&mut app, KeyCode::Char('-'), now);
        assert_eq!(app.timer.remaining_secs(), 1500);

        press(&mut app, KeyCode::Char('s'), now);
        press(&mut app, KeyCode::Char('+'), now);
        assert_eq!(app.timer.remaining_secs(), 1500);
    }

    #[test]
    fn test_reset_and_pause_keys() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('s'), now);
        app.update(now + Duration::from_secs(5));
        press(&mut app, KeyCode::Char('p'), now);
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 1495);
        press(&mut app, KeyCode::Char('r'), now);
        assert_eq!(app.timer.remaining_secs(), 1500);
    }

    #[test]
    fn test_settings_save_updates_and_resets() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('+'), now);
        press(&mut app, KeyCode::Char('c'), now);
        assert_eq!(app.current_view, View::Settings);

        replace_field(&mut app, "50", now);
        press(&mut app, KeyCode::Down, now);
        press(&mut app, KeyCode::Down, now);
        press(&mut app, KeyCode::Down, now);
        assert_eq!(app.settings_field, SettingsField::Cycles);
        replace_field(&mut app, "2", now);
        press(&mut app, KeyCode::Char('w'), now);

        assert_eq!(app.timer.config().work_minutes(), 50);
        assert_eq!(app.timer.config().cycles_before_long(), 2);
        assert_eq!(app.timer.remaining_secs(), 3000);
        assert_eq!(app.popup.as_ref().map(|p| p.kind), Some(PopupKind::Info));
    }

    #[test]
    fn test_settings_save_rejects_invalid_input() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('c'), now);
        press(&mut app, KeyCode::Down, now);
        replace_field(&mut app, "0", now);
        handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut app, now);

        assert_eq!(*app.timer.config(), SessionConfig::default());
        let popup = app.popup.clone().unwrap();
        assert_eq!(popup.kind, PopupKind::Error);
        assert!(popup.body.contains("Short break"));

        press(&mut app, KeyCode::Enter, now);
        replace_field(&mut app, "abc", now);
        press(&mut app, KeyCode::Char('w'), now);
        assert!(app.popup.as_ref().unwrap().body.contains("whole number"));
    }

    #[test]
    fn test_ctrl_s_while_editing_commits_and_saves() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('c'), now);
        press(&mut app, KeyCode::Enter, now);
        press(&mut app, KeyCode::Backspace, now);
        press(&mut app, KeyCode::Backspace, now);
        press(&mut app, KeyCode::Char('3'), now);
        handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut app, now);

        assert!(!app.settings_editing);
        assert_eq!(app.settings_drafts[0], "3");
        assert_eq!(app.timer.config().work_minutes(), 3);
        assert_eq!(app.timer.remaining_secs(), 180);
        assert_eq!(app.popup.as_ref().map(|p| p.kind), Some(PopupKind::Info));
    }

    #[test]
    fn test_control_chars_do_not_reach_draft() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('c'), now);
        press(&mut app, KeyCode::Enter, now);
        handle_input(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), &mut app, now);
        assert_eq!(app.settings_input, "25");
        assert!(app.settings_editing);
    }

    #[test]
    fn test_leaving_settings_discards_drafts() {
        let (mut app, now) = app();
        press(&mut app, KeyCode::Char('c'), now);
        replace_field(&mut app, "99", now);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.current_view, View::Timer);
        assert_eq!(app.settings_drafts[0], "25");
        assert_eq!(app.timer.config().work_minutes(), 25);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, now) = app();
        assert!(press(&mut app, KeyCode::Char('q'), now));
        assert!(handle_input(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
            now
        ));
        press(&mut app, KeyCode::Char('h'), now);
        assert_eq!(app.current_view, View::Help);
        assert!(!press(&mut app, KeyCode::Char('q'), now));
        assert_eq!(app.current_view, View::Timer);
    }
}
