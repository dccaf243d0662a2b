use crate::core::game::{Context, Feedback, Flow, Game};
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Redraw cadence for games that do not ask for ticks.
const IDLE_REDRAW: Duration = Duration::from_millis(250);

pub struct Engine<G: Game, F: Feedback<G::Event>> {
    game: G,
    feedback: F,
}

impl<G: Game, F: Feedback<G::Event>> Engine<G, F> {
    pub fn new(game: G, feedback: F) -> Self {
        Self { game, feedback }
    }

    /// Runs until the game asks to quit, the input stream ends, or Ctrl+C.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> Result<G> {
        let (outbox_tx, mut outbox_rx) = tokio::sync::mpsc::unbounded_channel::<G::Event>();
        let ctx = Context::new(outbox_tx);

        let tick_rate = self.game.tick_rate();
        let mut ticker = tokio::time::interval(tick_rate.unwrap_or(IDLE_REDRAW));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last_tick = Instant::now();
        let mut events = EventStream::new();

        info!(?tick_rate, "engine started");

        let mut outcome: Result<()> = Ok(());
        loop {
            terminal.draw(|f| self.game.render(f))?;

            tokio::select! {
                // 1. EVENTS: whatever the game announced during the last input or tick
                Some(event) = outbox_rx.recv() => {
                    self.feedback.notify(&event);
                }

                // 2. INPUT: key presses from the terminal
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press
                                && key.modifiers.contains(KeyModifiers::CONTROL)
                                && key.code == KeyCode::Char('c')
                            {
                                debug!("ctrl+c pressed");
                                break;
                            }
                            if self.game.handle_input(key, &ctx) == Flow::Quit {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(error = %e, "terminal input failed");
                            outcome = Err(e.into());
                            break;
                        }
                        None => break,
                    }
                }

                // 3. TICK: game heartbeat
                _ = ticker.tick() => {
                    if tick_rate.is_some() {
                        let dt = last_tick.elapsed().as_millis() as u32;
                        last_tick = Instant::now();
                        self.game.on_tick(dt, &ctx);
                    }
                }
            }
        }

        // Deliver whatever was sent right before quitting, even on error.
        drain_outbox(&mut outbox_rx, &mut self.feedback);

        info!("engine stopped");
        outcome.map(|()| self.game)
    }
}

fn drain_outbox<E, F: Feedback<E>>(outbox_rx: &mut UnboundedReceiver<E>, feedback: &mut F) {
    while let Ok(event) = outbox_rx.try_recv() {
        feedback.notify(&event);
    }
}
