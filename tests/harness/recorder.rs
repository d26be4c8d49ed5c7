//! Handler that records every callback it receives.

use std::sync::{Arc, Mutex};

use microws::{CallbackResult, WebSocket, WebSocketHandler, async_trait};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open,
    Text(String),
    Binary(Vec<u8>),
    Close,
}

/// Records callbacks. Clones share the same event log.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    echo: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that also echoes every message back.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl WebSocketHandler for Recorder {
    async fn on_open(&mut self, _ws: &mut WebSocket) -> CallbackResult {
        self.push(Event::Open);
        Ok(())
    }

    async fn on_text(&mut self, ws: &mut WebSocket, text: String) -> CallbackResult {
        self.push(Event::Text(text.clone()));
        if self.echo {
            ws.send_text(&text).await?;
        }
        Ok(())
    }

    async fn on_binary(&mut self, ws: &mut WebSocket, data: Vec<u8>) -> CallbackResult {
        self.push(Event::Binary(data.clone()));
        if self.echo {
            ws.send_binary(&data).await?;
        }
        Ok(())
    }

    async fn on_close(&mut self) -> CallbackResult {
        self.push(Event::Close);
        Ok(())
    }
}
