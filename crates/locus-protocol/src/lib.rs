pub mod ack;
pub mod events;
pub mod frames;
pub mod payload;

pub use ack::IngressAck;
pub use frames::EventFrame;
