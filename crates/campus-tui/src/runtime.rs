use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

use campus_core::events::CoreEvent;

use crate::input::handle_key;
use crate::render::render;
use crate::ui::{App, Tui};

pub(crate) async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events_rx: &mut UnboundedReceiver<CoreEvent>,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    // Drives toast expiry and the post-RSVP auto-close
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    app.reload();

    while app.running {
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                            if app.pending_quit {
                                app.quit();
                            } else {
                                app.pending_quit = true;
                            }
                        } else {
                            app.pending_quit = false;
                            handle_key(app, key);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => app.quit(),
                }
            }

            Some(event) = events_rx.recv() => {
                app.handle_core_event(event);
            }

            _ = tick_interval.tick() => {
                app.tick(Instant::now());
            }
        }
    }
    Ok(())
}
