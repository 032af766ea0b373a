//! Line-oriented render surface for the conversation store
//!
//! Reads commands from stdin, relays them to the store as intents and
//! redraws the visible window of the log whenever the store publishes.

mod command;
mod render;

use command::{parse, Command, HELP};
use render::{render_view, Viewport};

use crate::runtime::{StoreError, StoreEvent, StoreHandle};
use crate::state_machine::{ChatState, MessageId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// What an input line asks the console to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Send(String),
    Edit(MessageId, String),
    Delete(MessageId),
    Notice(String),
    Redraw,
    Quit,
    Nothing,
}

/// Last published view plus the scroll position over it
#[derive(Debug)]
pub struct Screen {
    view: ChatState,
    viewport: Viewport,
    /// A send was relayed but the store has not yet published it as pending
    awaiting_send: bool,
}

impl Screen {
    pub fn new(rows: usize) -> Self {
        Self {
            view: ChatState::new(),
            viewport: Viewport::new(rows),
            awaiting_send: false,
        }
    }

    /// Apply a store event to the local copy of the view
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Updated(state) => {
                // From here on the published pending flag locks input
                if state.pending {
                    self.awaiting_send = false;
                }
                self.viewport.clamp(state.log.len());
                self.view = state;
            }
            StoreEvent::ScrollToBottom => self.viewport.scroll_to_bottom(self.view.log.len()),
        }
    }

    /// Updates were skipped; the next one is the only reliable source
    pub fn resync(&mut self) {
        self.awaiting_send = false;
    }

    fn input_locked(&self) -> bool {
        self.view.pending || self.awaiting_send
    }

    /// Decide what an input line means given what is on screen
    pub fn interpret(&mut self, line: &str) -> Outcome {
        let command = match parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Outcome::Nothing,
            Err(e) => return Outcome::Notice(e.to_string()),
        };

        match command {
            Command::Send(_) if self.input_locked() => {
                Outcome::Notice("Still waiting for a reply; try again in a moment".to_string())
            }
            Command::Send(text) => {
                self.awaiting_send = true;
                Outcome::Send(text)
            }
            Command::Edit { id, text } => match self.check_mutable(id) {
                Some(notice) => notice,
                None => Outcome::Edit(id, text),
            },
            Command::Delete(id) => match self.check_mutable(id) {
                Some(notice) => notice,
                None => Outcome::Delete(id),
            },
            Command::Up => {
                self.viewport.page_up();
                Outcome::Redraw
            }
            Command::Down => {
                self.viewport.page_down(self.view.log.len());
                Outcome::Redraw
            }
            Command::Help => Outcome::Notice(HELP.to_string()),
            Command::Quit => Outcome::Quit,
        }
    }

    // Only resolved user messages offer edit and delete
    fn check_mutable(&self, id: MessageId) -> Option<Outcome> {
        match self.view.find(id) {
            Some(message) if message.is_mutable() => None,
            Some(_) => Some(Outcome::Notice(format!("Message {id} cannot be changed"))),
            None => Some(Outcome::Notice(format!("No message with id {id}"))),
        }
    }

    pub fn render(&self) -> String {
        render_view(&self.view, &self.viewport)
    }
}

/// Drive the console until stdin closes, the user quits or the store goes away
pub async fn run(
    handle: StoreHandle,
    mut events: broadcast::Receiver<StoreEvent>,
    rows: usize,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut screen = Screen::new(rows);

    stdout.write_all(HELP.as_bytes()).await?;
    stdout.write_all(b"\n").await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let dispatched = match screen.interpret(&line) {
                    Outcome::Send(text) => handle.on_send(text).await,
                    Outcome::Edit(id, text) => handle.on_edit(id, text).await,
                    Outcome::Delete(id) => handle.on_delete(id).await,
                    Outcome::Notice(notice) => {
                        stdout.write_all(format!("{notice}\n").as_bytes()).await?;
                        Ok(())
                    }
                    Outcome::Redraw => {
                        stdout.write_all(screen.render().as_bytes()).await?;
                        Ok(())
                    }
                    Outcome::Quit => break,
                    Outcome::Nothing => Ok(()),
                };
                if let Err(StoreError::Closed) = dispatched {
                    break;
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => screen.apply(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Console fell behind the store");
                        screen.resync();
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                }
                // Coalesce a burst (an update and its scroll signal) into one redraw
                loop {
                    match events.try_recv() {
                        Ok(event) => screen.apply(event),
                        Err(TryRecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Console fell behind the store");
                            screen.resync();
                        }
                        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                    }
                }
                stdout.write_all(screen.render().as_bytes()).await?;
            }
        }
        stdout.flush().await?;
    }

    handle.unmount();
    Ok(())
}
