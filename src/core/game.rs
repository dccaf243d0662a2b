/// Core game interface driven by the terminal engine
use crossterm::event::KeyEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Whether the engine keeps running after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Handed to the game on every call so it can announce what happened
/// without knowing who listens.
pub struct Context<E> {
    pub(crate) tx: UnboundedSender<E>,
}

impl<E> Context<E> {
    pub fn new(tx: UnboundedSender<E>) -> Self {
        Self { tx }
    }

    pub fn send_event(&self, event: E) {
        // The engine owns the receiver for as long as the game runs.
        let _ = self.tx.send(event);
    }
}

/// Main game trait: input in, frames out
pub trait Game {
    /// Notifications the game emits (sounds, history, ...)
    type Event;

    /// How often `on_tick` runs. `None` still redraws on input.
    fn tick_rate(&self) -> Option<std::time::Duration>;

    /// `dt` is the time since the previous tick, in milliseconds.
    fn on_tick(&mut self, dt: u32, ctx: &Context<Self::Event>);

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context<Self::Event>) -> Flow;

    fn render(&self, frame: &mut ratatui::Frame);
}

/// Receives the events a game sends through its [`Context`].
pub trait Feedback<E> {
    fn notify(&mut self, event: &E);
}
