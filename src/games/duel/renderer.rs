/// Duel screens drawn with ratatui - reads the game, never mutates it
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::game::{DuelGame, GameOverChoice, MenuItem, NoticeKind, Screen};
use super::level::{Mode, MAX_LEVELS};
use super::state::MatchState;

const ACCENT: Color = Color::Rgb(255, 149, 0);

pub fn render(f: &mut Frame, game: &DuelGame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    f.render_widget(
        Paragraph::new(title(game))
            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let body = chunks[1];
    match (game.screen(), game.match_state()) {
        (Screen::MainMenu, _) => menu(f, body, " MAIN MENU ", &MenuItem::ALL.map(MenuItem::label), game.selected()),
        (Screen::Instructions, _) => instructions(f, body),
        (Screen::ModeSelect, _) => mode_select(f, body, game.selected()),
        (Screen::History, _) => history(f, body, game.history_lines(), game.history_scroll()),
        (Screen::ChooseSecret, Some(state)) => choose_secret(f, body, game, state),
        (Screen::Guess, Some(state)) => guess(f, body, game, state),
        (Screen::Result, Some(state)) => round_result(f, body, state),
        (Screen::GameOver, Some(state)) => game_over(f, body, state, game.selected()),
        _ => {}
    }

    f.render_widget(
        Paragraph::new(key_help(game.screen())).alignment(Alignment::Center),
        chunks[2],
    );
}

fn title(game: &DuelGame) -> String {
    match game.match_state() {
        Some(state) if !state.is_over() => format!(
            " GUESS DUEL - {} - Level {} of {} ",
            state.mode().as_str().to_uppercase(),
            state.level(),
            MAX_LEVELS
        ),
        _ => " GUESS DUEL ".to_string(),
    }
}

fn key_help(screen: Screen) -> &'static str {
    match screen {
        Screen::MainMenu => "[↑/↓] Navigate  [Enter] Select  [Q] Quit",
        Screen::Instructions => "[Esc] Back",
        Screen::ModeSelect => "[↑/↓] Navigate  [Enter/1-3] Start  [Esc] Back",
        Screen::ChooseSecret => "[0-9] Type  [Backspace] Erase  [Tab] Show/Hide  [Enter] Lock in  [Esc] Menu",
        Screen::Guess => "[0-9] Type  [Backspace] Erase  [Enter] Guess  [Esc] Menu",
        Screen::Result => "[Enter/Space] Continue  [Esc] Menu",
        Screen::GameOver => "[↑/↓] Navigate  [Enter] Select  [R] Restart  [M] Menu",
        Screen::History => "[↑/↓] Scroll  [Esc] Back",
    }
}

fn highlighted(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn menu(f: &mut Frame, area: Rect, heading: &str, labels: &[&str], selected: usize) {
    let items: Vec<ListItem> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| ListItem::new(format!(" » {label}")).style(highlighted(i == selected)))
        .collect();

    f.render_widget(
        List::new(items).block(Block::default().title(heading).borders(Borders::ALL)),
        area,
    );
}

fn instructions(f: &mut Frame, area: Rect) {
    let rules = [
        "1. The Attacker secretly chooses a number within the level's range.",
        "2. The Defender has a limited number of attempts to guess it (one fewer on levels 3 and 5).",
        "3. Each wrong guess costs the Defender 1 HP. HP is not restored between levels.",
        "4. From level 3 on, a hint appears after the second attempt of a level.",
        "5. The match ends when the Defender runs out of HP or attempts.",
        "6. Clear all 5 levels to become a Category Champion!",
    ];
    let mut lines = vec![Line::from(""), Line::styled("How to Play", Style::default().fg(ACCENT)), Line::from("")];
    lines.extend(rules.iter().map(|rule| Line::from(*rule)));

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(" INSTRUCTIONS ").borders(Borders::ALL)),
        area,
    );
}

fn mode_select(f: &mut Frame, area: Rect, selected: usize) {
    let items: Vec<ListItem> = Mode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let level_one = mode.first_level();
            ListItem::new(vec![
                Line::from(format!(" {}. {}", i + 1, mode.as_str().to_uppercase())),
                Line::from(format!(
                    "    {} (starts {}-{}, {} HP)",
                    mode.description(),
                    level_one.range_min,
                    level_one.range_max,
                    mode.defender_hp()
                )),
            ])
            .style(highlighted(i == selected))
        })
        .collect();

    f.render_widget(
        List::new(items).block(Block::default().title(" SELECT MODE ").borders(Borders::ALL)),
        area,
    );
}

fn hp_bar(state: &MatchState) -> Span<'static> {
    let full = state.mode().defender_hp();
    let hp = state.defender_hp().min(full);
    let bar = format!("{}{}", "♥ ".repeat(hp as usize), "· ".repeat((full - hp) as usize));
    Span::styled(bar, Style::default().fg(Color::Red))
}

fn input_box(f: &mut Frame, area: Rect, heading: &str, shown: String) {
    f.render_widget(
        Paragraph::new(format!(" > {shown}_"))
            .block(Block::default().title(heading).borders(Borders::ALL)),
        area,
    );
}

fn notice_line(game: &DuelGame) -> Line<'static> {
    match game.notice() {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Error => Color::Red,
                NoticeKind::Success => Color::Green,
            };
            Line::styled(notice.text.clone(), Style::default().fg(color))
        }
        None => Line::from(""),
    }
}

fn split_match_body(area: Rect) -> [Rect; 3] {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3), Constraint::Length(1)])
        .split(area);
    [rows[0], rows[1], rows[2]]
}

fn choose_secret(f: &mut Frame, area: Rect, game: &DuelGame, state: &MatchState) {
    let [info, input, notice] = split_match_body(area);

    let lines = vec![
        Line::from(""),
        Line::from(format!(
            "Attacker, choose a secret number between {} and {}.",
            state.range_min(),
            state.range_max()
        )),
        Line::from("Defender, look away!"),
        Line::from(""),
        Line::from(vec![Span::raw("Defender HP: "), hp_bar(state)]),
        Line::from(format!("Attempts this level: {}", state.max_attempts())),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title(" ATTACKER ").borders(Borders::ALL)),
        info,
    );

    let typed = game.input().as_str();
    let shown = if game.show_secret() { typed.to_string() } else { "*".repeat(typed.len()) };
    input_box(f, input, " SECRET ", shown);
    f.render_widget(Paragraph::new(notice_line(game)).alignment(Alignment::Center), notice);
}

fn guess(f: &mut Frame, area: Rect, game: &DuelGame, state: &MatchState) {
    let [info, input, notice] = split_match_body(area);

    let mut lines = vec![
        Line::from(""),
        Line::from(format!(
            "Defender, guess the number between {} and {}.",
            state.range_min(),
            state.range_max()
        )),
        Line::from(""),
        Line::from(vec![Span::raw("HP: "), hp_bar(state)]),
        Line::from(format!(
            "Attempt {} of {}",
            state.current_attempt() + 1,
            state.max_attempts()
        )),
    ];
    if let Some(last) = state.last_guess().filter(|_| state.current_attempt() > 0) {
        lines.push(Line::from(format!("Last guess: {last} (wrong)")));
    }
    if let Some(hint) = state.hint() {
        lines.push(Line::from(""));
        lines.push(Line::styled(format!("Hint: {hint}"), Style::default().fg(Color::Yellow)));
    }

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title(" DEFENDER ").borders(Borders::ALL)),
        info,
    );
    input_box(f, input, " GUESS ", game.input().as_str().to_string());
    f.render_widget(Paragraph::new(notice_line(game)).alignment(Alignment::Center), notice);
}

fn round_result(f: &mut Frame, area: Rect, state: &MatchState) {
    let mut lines = vec![
        Line::from(""),
        Line::styled("Wrong!", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Line::from(""),
    ];
    if let Some(last) = state.last_guess() {
        lines.push(Line::from(format!("{last} is not the number.")));
    }
    lines.push(Line::from("Try again! Defender loses 1 HP!"));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::raw("HP: "), hp_bar(state)]));
    lines.push(Line::from(format!("Attempts left: {}", state.attempts_left())));
    if let Some(hint) = state.hint() {
        lines.push(Line::from(""));
        lines.push(Line::styled(format!("Hint: {hint}"), Style::default().fg(Color::Yellow)));
    }

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title(" RESULT ").borders(Borders::ALL)),
        area,
    );
}

fn game_over(f: &mut Frame, area: Rect, state: &MatchState, selected: usize) {
    let Some(outcome) = state.outcome() else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(4)])
        .split(area);

    let color = if outcome.defender_won() { Color::Blue } else { Color::Red };
    let mut lines = vec![
        Line::from(""),
        Line::styled("Game Over", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::styled(outcome.headline(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Line::from(outcome.reason()),
    ];
    if let Some(secret) = state.secret() {
        lines.push(Line::from(format!("The number was {secret}.")));
    }
    if let Some(summary) = state.summary() {
        lines.push(Line::from(""));
        lines.push(Line::styled(summary, Style::default().fg(Color::DarkGray)));
    }

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        rows[0],
    );
    menu(f, rows[1], " NEXT ", &GameOverChoice::ALL.map(GameOverChoice::label), selected);
}

fn history(f: &mut Frame, area: Rect, entries: &[String], scroll: usize) {
    let block = Block::default().title(" HISTORY ").borders(Borders::ALL);
    if entries.is_empty() {
        f.render_widget(
            Paragraph::new("No game history found").alignment(Alignment::Center).block(block),
            area,
        );
        return;
    }

    let lines: Vec<Line> = entries.iter().map(|entry| Line::from(entry.as_str())).collect();
    f.render_widget(
        Paragraph::new(lines)
            .scroll((scroll.min(u16::MAX as usize) as u16, 0))
            .block(block),
        area,
    );
}
