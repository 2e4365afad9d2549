pub mod event_bus;
pub mod message;

pub use event_bus::EventBus;
pub use message::Event;
