//! Screen flow for a hot-seat duel: menus around one [`MatchState`].
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::error::DuelError;
use super::history::HistoryLog;
use super::input::{InputAction, NumberInput};
use super::level::Mode;
use super::renderer;
use super::state::{DuelEvent, MatchState, Phase};
use crate::core::game::{Context, Flow, Game};

/// How long a rejected-input notice stays up.
const RETRY_NOTICE_MS: u32 = 1500;
const LEVEL_CLEARED_NOTICE_MS: u32 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Instructions,
    ModeSelect,
    ChooseSecret,
    Guess,
    Result,
    GameOver,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Instructions,
    History,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [MenuItem::Play, MenuItem::Instructions, MenuItem::History, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Play => "Play",
            MenuItem::Instructions => "How to Play",
            MenuItem::History => "History",
            MenuItem::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverChoice {
    Restart,
    MainMenu,
}

impl GameOverChoice {
    pub const ALL: [GameOverChoice; 2] = [GameOverChoice::Restart, GameOverChoice::MainMenu];

    pub fn label(self) -> &'static str {
        match self {
            GameOverChoice::Restart => "Play Again",
            GameOverChoice::MainMenu => "Main Menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

/// Short-lived message under the input box.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    remaining_ms: u32,
}

impl Notice {
    fn new(text: impl Into<String>, kind: NoticeKind, remaining_ms: u32) -> Self {
        Self { text: text.into(), kind, remaining_ms }
    }
}

pub struct DuelGame {
    screen: Screen,
    match_state: Option<MatchState>,
    rng: StdRng,
    input: NumberInput,
    show_secret: bool,
    notice: Option<Notice>,
    /// Cursor on whichever menu the screen shows.
    selected: usize,
    history: HistoryLog,
    history_limit: usize,
    history_lines: Vec<String>,
    history_scroll: usize,
    tick_rate: Duration,
}

impl DuelGame {
    pub fn new(history: HistoryLog, history_limit: usize, tick_rate: Duration, rng: StdRng) -> Self {
        Self {
            screen: Screen::MainMenu,
            match_state: None,
            rng,
            input: NumberInput::new(),
            show_secret: false,
            notice: None,
            selected: 0,
            history,
            history_limit,
            history_lines: Vec::new(),
            history_scroll: 0,
            tick_rate,
        }
    }

    /// Skips the menus and opens a match in `mode`.
    pub fn with_match(mut self, mode: Mode) -> Self {
        self.start_match(mode);
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn match_state(&self) -> Option<&MatchState> {
        self.match_state.as_ref()
    }

    pub fn input(&self) -> &NumberInput {
        &self.input
    }

    pub fn show_secret(&self) -> bool {
        self.show_secret
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn history_lines(&self) -> &[String] {
        &self.history_lines
    }

    pub fn history_scroll(&self) -> usize {
        self.history_scroll
    }

    fn go_to(&mut self, screen: Screen) {
        debug!(from = ?self.screen, to = ?screen, "screen change");
        self.screen = screen;
        self.selected = 0;
        self.notice = None;
    }

    fn start_match(&mut self, mode: Mode) {
        self.match_state = Some(MatchState::new(mode));
        self.input.clear();
        self.show_secret = false;
        self.go_to(Screen::ChooseSecret);
    }

    fn leave_match(&mut self) {
        if let Some(state) = self.match_state.take() {
            if !state.is_over() {
                info!(mode = %state.mode(), level = state.level(), "match abandoned");
            }
        }
        self.input.clear();
        self.go_to(Screen::MainMenu);
    }

    fn open_history(&mut self) {
        self.history_lines = match self.history.recent(self.history_limit) {
            Ok(lines) => lines,
            Err(error) => {
                warn!(path = %self.history.path().display(), %error, "could not read match history");
                Vec::new()
            }
        };
        self.history_scroll = 0;
        self.go_to(Screen::History);
    }

    /// Points the screen at whatever the match phase calls for.
    fn sync_screen(&mut self) {
        let Some(state) = &self.match_state else {
            return;
        };
        let screen = match state.phase() {
            Phase::ChoosingSecret => Screen::ChooseSecret,
            Phase::AwaitingGuess => Screen::Guess,
            Phase::RoundResolved => Screen::Result,
            Phase::MatchOver(_) => Screen::GameOver,
        };
        if screen != self.screen {
            debug!(from = ?self.screen, to = ?screen, "screen change");
            self.screen = screen;
            self.selected = 0;
        }
    }

    fn apply(&mut self, result: Result<DuelEvent, DuelError>, ctx: &Context<DuelEvent>) {
        match result {
            Ok(event) => {
                match &event {
                    DuelEvent::SecretLocked { .. } => {
                        self.notice = None;
                        self.show_secret = false;
                    }
                    DuelEvent::CorrectGuess { cleared_level, next_level } => {
                        self.notice = Some(Notice::new(
                            format!("Level {cleared_level} cleared! Attacker, pick a secret for level {next_level}."),
                            NoticeKind::Success,
                            LEVEL_CLEARED_NOTICE_MS,
                        ));
                    }
                    DuelEvent::WrongGuess { .. } | DuelEvent::MatchOver { .. } => self.notice = None,
                }
                ctx.send_event(event);
            }
            Err(error) if error.is_input_error() => {
                debug!(%error, "input rejected");
                if let Some(state) = &self.match_state {
                    self.notice = Some(Notice::new(
                        format!("Please enter a number between {} and {}", state.range_min(), state.range_max()),
                        NoticeKind::Error,
                        RETRY_NOTICE_MS,
                    ));
                }
            }
            Err(error) => warn!(%error, "transition refused"),
        }
        self.sync_screen();
    }

    fn on_main_menu(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(MenuItem::ALL.len() - 1)
            }
            KeyCode::Enter => match MenuItem::ALL[self.selected] {
                MenuItem::Play => self.go_to(Screen::ModeSelect),
                MenuItem::Instructions => self.go_to(Screen::Instructions),
                MenuItem::History => self.open_history(),
                MenuItem::Quit => return Flow::Quit,
            },
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            _ => {}
        }
        Flow::Continue
    }

    fn on_mode_select(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(Mode::ALL.len() - 1),
            KeyCode::Enter => self.start_match(Mode::ALL[self.selected]),
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.start_match(Mode::ALL[index]);
            }
            KeyCode::Esc | KeyCode::Backspace => self.go_to(Screen::MainMenu),
            _ => {}
        }
    }

    fn on_secret_input(&mut self, key: KeyEvent, ctx: &Context<DuelEvent>) {
        match key.code {
            KeyCode::Esc => return self.leave_match(),
            KeyCode::Tab => {
                self.show_secret = !self.show_secret;
                return;
            }
            _ => {}
        }
        if self.input.handle_key(key) != InputAction::Submit {
            return;
        }
        let Some(state) = self.match_state.as_mut() else {
            return self.leave_match();
        };
        let result = self.input.take().and_then(|n| state.submit_secret(n));
        self.apply(result, ctx);
    }

    fn on_guess_input(&mut self, key: KeyEvent, ctx: &Context<DuelEvent>) {
        if key.code == KeyCode::Esc {
            return self.leave_match();
        }
        if self.input.handle_key(key) != InputAction::Submit {
            return;
        }
        let Some(state) = self.match_state.as_mut() else {
            return self.leave_match();
        };
        let rng = &mut self.rng;
        let result = self.input.take().and_then(|n| state.submit_guess(n, rng));
        self.apply(result, ctx);
    }

    fn on_result(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(state) = self.match_state.as_mut() {
                    if let Err(error) = state.acknowledge_result() {
                        warn!(%error, "transition refused");
                    }
                }
                self.sync_screen();
            }
            KeyCode::Esc => self.leave_match(),
            _ => {}
        }
    }

    fn on_game_over(&mut self, key: KeyEvent) {
        let choice = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(GameOverChoice::ALL.len() - 1);
                None
            }
            KeyCode::Enter => Some(GameOverChoice::ALL[self.selected]),
            KeyCode::Char('r') => Some(GameOverChoice::Restart),
            KeyCode::Char('m') | KeyCode::Esc => Some(GameOverChoice::MainMenu),
            _ => None,
        };

        match choice {
            Some(GameOverChoice::Restart) => {
                if let Some(state) = self.match_state.as_mut() {
                    match state.restart() {
                        Ok(()) => info!(mode = %state.mode(), "match restarted"),
                        Err(error) => warn!(%error, "transition refused"),
                    }
                }
                self.input.clear();
                self.show_secret = false;
                self.notice = None;
                self.sync_screen();
            }
            Some(GameOverChoice::MainMenu) => self.leave_match(),
            None => {}
        }
    }

    fn on_history(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.history_scroll = self.history_scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.history_scroll = (self.history_scroll + 1).min(self.history_lines.len().saturating_sub(1))
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => self.go_to(Screen::MainMenu),
            _ => {}
        }
    }
}

impl Game for DuelGame {
    type Event = DuelEvent;

    fn tick_rate(&self) -> Option<Duration> {
        Some(self.tick_rate)
    }

    fn on_tick(&mut self, dt: u32, _ctx: &Context<Self::Event>) {
        let expired = match &mut self.notice {
            Some(notice) => {
                notice.remaining_ms = notice.remaining_ms.saturating_sub(dt);
                notice.remaining_ms == 0
            }
            None => false,
        };
        if expired {
            self.notice = None;
        }
    }

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context<Self::Event>) -> Flow {
        if event.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        match self.screen {
            Screen::MainMenu => return self.on_main_menu(event),
            Screen::Instructions => {
                if matches!(event.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q')) {
                    self.go_to(Screen::MainMenu);
                }
            }
            Screen::ModeSelect => self.on_mode_select(event),
            Screen::ChooseSecret => self.on_secret_input(event, ctx),
            Screen::Guess => self.on_guess_input(event, ctx),
            Screen::Result => self.on_result(event),
            Screen::GameOver => self.on_game_over(event),
            Screen::History => self.on_history(event),
        }
        Flow::Continue
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        renderer::render(frame, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::duel::Outcome;
    use crossterm::event::KeyModifiers;
    use rand::SeedableRng;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    struct Harness {
        game: DuelGame,
        ctx: Context<DuelEvent>,
        events: UnboundedReceiver<DuelEvent>,
        _dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let history = HistoryLog::new(dir.path().join("scores.txt"));
            let game = DuelGame::new(history, 10, Duration::from_millis(33), StdRng::seed_from_u64(9));
            let (tx, events) = unbounded_channel();
            Self { game, ctx: Context::new(tx), events, _dir: dir }
        }

        fn press(&mut self, code: KeyCode) -> Flow {
            self.game.handle_input(KeyEvent::new(code, KeyModifiers::NONE), &self.ctx)
        }

        fn type_number(&mut self, n: u32) {
            for c in n.to_string().chars() {
                self.press(KeyCode::Char(c));
            }
            self.press(KeyCode::Enter);
        }

        fn drain(&mut self) -> Vec<DuelEvent> {
            let mut out = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                out.push(event);
            }
            out
        }
    }

    #[test]
    fn menu_to_first_guess() {
        let mut h = Harness::new();
        assert_eq!(h.game.screen(), Screen::MainMenu);

        h.press(KeyCode::Enter);
        assert_eq!(h.game.screen(), Screen::ModeSelect);
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        assert_eq!(h.game.screen(), Screen::ChooseSecret);
        assert_eq!(h.game.match_state().unwrap().mode(), Mode::Medium);

        h.type_number(42);
        assert_eq!(h.game.screen(), Screen::Guess);
        assert_eq!(h.drain(), vec![DuelEvent::SecretLocked { level: 1 }]);
    }

    #[test]
    fn bad_input_shows_a_notice_that_expires() {
        let mut h = Harness::new();
        h.game.start_match(Mode::Easy);

        h.type_number(12);
        assert_eq!(h.game.screen(), Screen::ChooseSecret);
        assert!(h.game.input().is_empty());
        let notice = h.game.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Please enter a number between 1 and 9");

        h.press(KeyCode::Enter);
        assert!(h.game.notice().is_some());
        assert!(h.drain().is_empty());

        h.game.on_tick(RETRY_NOTICE_MS, &h.ctx);
        assert!(h.game.notice().is_none());
    }

    #[test]
    fn wrong_guess_shows_result_then_returns_to_guessing() {
        let mut h = Harness::new();
        h.game.start_match(Mode::Easy);
        h.type_number(5);
        h.type_number(3);
        assert_eq!(h.game.screen(), Screen::Result);

        h.press(KeyCode::Char(' '));
        assert_eq!(h.game.screen(), Screen::Guess);
        h.type_number(5);
        assert_eq!(h.game.screen(), Screen::ChooseSecret);
        assert_eq!(h.game.notice().unwrap().kind, NoticeKind::Success);

        let events = h.drain();
        assert!(matches!(events[1], DuelEvent::WrongGuess { guess: 3, hp_left: 2, .. }));
        assert_eq!(events[2], DuelEvent::CorrectGuess { cleared_level: 1, next_level: 2 });
    }

    #[test]
    fn tab_toggles_secret_visibility() {
        let mut h = Harness::new();
        h.game.start_match(Mode::Hard);
        assert!(!h.game.show_secret());
        h.press(KeyCode::Tab);
        assert!(h.game.show_secret());
        h.type_number(123);
        assert!(!h.game.show_secret());
    }

    #[test]
    fn losing_all_hp_ends_on_game_over_and_restart_keeps_mode() {
        let mut h = Harness::new();
        h.game.start_match(Mode::Hard);
        h.type_number(500);
        h.type_number(100);
        h.press(KeyCode::Enter);
        h.type_number(101);
        assert_eq!(h.game.screen(), Screen::GameOver);

        let over = h.drain().pop().unwrap();
        assert_eq!(
            over,
            DuelEvent::MatchOver {
                outcome: Outcome::AttackerWinsHpExhausted,
                summary: "Attacker wins - Level 1".into(),
            }
        );

        h.press(KeyCode::Enter);
        assert_eq!(h.game.screen(), Screen::ChooseSecret);
        let state = h.game.match_state().unwrap();
        assert_eq!(state.mode(), Mode::Hard);
        assert_eq!(state.defender_hp(), 2);
    }

    #[test]
    fn escape_abandons_the_match() {
        let mut h = Harness::new();
        h.game.start_match(Mode::Easy);
        h.type_number(4);
        h.press(KeyCode::Esc);
        assert_eq!(h.game.screen(), Screen::MainMenu);
        assert!(h.game.match_state().is_none());
    }

    #[test]
    fn history_screen_reads_the_log() {
        let mut h = Harness::new();
        h.game.history.append("Defender wins - Level 2").unwrap();
        h.game.history.append("Attacker wins - Level 1").unwrap();

        h.press(KeyCode::Down);
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        assert_eq!(h.game.screen(), Screen::History);
        assert_eq!(h.game.history_lines().len(), 2);

        h.press(KeyCode::Down);
        h.press(KeyCode::Down);
        assert_eq!(h.game.history_scroll(), 1);
        h.press(KeyCode::Esc);
        assert_eq!(h.game.screen(), Screen::MainMenu);
    }

    #[test]
    fn quit_from_main_menu() {
        let mut h = Harness::new();
        assert_eq!(h.press(KeyCode::Char('q')), Flow::Quit);
    }
}
