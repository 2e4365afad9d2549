use super::message::Event;
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Sending half of the dashboard event queue.
///
/// Cheap to clone: spawned fetches and the live forwarder each hold one and
/// re-inject their completions through it. Events are delivered in the
/// order they are published.
#[derive(Debug, Clone)]
pub struct EventBus {
    pub name: String,
    sender: UnboundedSender<Event>,
}

impl EventBus {
    /// Creates a bus and the receiver the event loop drains.
    pub fn init(name: String) -> (Self, UnboundedReceiver<Event>) {
        let (sender, receiver) = unbounded_channel();
        (Self { name, sender }, receiver)
    }

    pub fn publish(&self, event: Event) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|e| anyhow::anyhow!("Event bus {} is closed: {:?}", self.name, e.0))?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
