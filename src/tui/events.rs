use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,

    /// Custom application events
    Custom(String, serde_json::Value),
}

/// Event handler for managing input events
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    sender: mpsc::UnboundedSender<Event>,
    /// Poll window before falling back to a tick
    tick_interval: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            receiver,
            sender,
            tick_interval: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<Event> {
        // Internal events first
        if let Ok(event) = self.receiver.try_recv() {
            return Some(event);
        }

        // Then terminal input, bounded by the tick window
        if let Ok(Ok(crossterm_event)) = timeout(
            self.tick_interval,
            tokio::task::spawn_blocking(crossterm::event::read),
        )
        .await
        {
            if let Ok(event) = crossterm_event {
                return Some(Self::convert_crossterm_event(event));
            }
        }

        Some(Event::Tick)
    }

    fn convert_crossterm_event(event: CrosstermEvent) -> Event {
        match event {
            CrosstermEvent::Key(key_event) => Event::Key(key_event),
            CrosstermEvent::Mouse(mouse_event) => Event::Mouse(mouse_event),
            CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
            CrosstermEvent::FocusGained => {
                Event::Custom("focus_gained".to_string(), serde_json::Value::Null)
            }
            CrosstermEvent::FocusLost => {
                Event::Custom("focus_lost".to_string(), serde_json::Value::Null)
            }
            CrosstermEvent::Paste(text) => {
                Event::Custom("paste".to_string(), serde_json::Value::String(text))
            }
        }
    }

    /// Send an internal event
    pub fn send(&self, event: Event) -> Result<()> {
        self.sender.send(event)?;
        Ok(())
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_internal_events_are_delivered_in_order() {
        let mut handler = EventHandler::new(10);
        handler
            .send(Event::Custom("a".into(), serde_json::Value::Null))
            .unwrap();
        handler
            .send(Event::Custom("b".into(), serde_json::Value::Null))
            .unwrap();

        match handler.next().await {
            Some(Event::Custom(name, _)) => assert_eq!(name, "a"),
            other => panic!("unexpected event: {other:?}"),
        }
        match handler.next().await {
            Some(Event::Custom(name, _)) => assert_eq!(name, "b"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
