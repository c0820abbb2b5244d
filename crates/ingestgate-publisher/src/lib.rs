//! §4.3 Fan-Out Publisher: dual-write an `EnvelopeV1` to an ordered,
//! partitioned stream (Kinesis-shaped) and a routed event bus
//! (EventBridge-shaped). Never throws to the caller — see [`fanout`].

pub mod eventbridge;
pub mod fanout;
pub mod kinesis;

pub use eventbridge::EventBridgeBusPublisher;
pub use fanout::FanOutPublisherImpl;
pub use kinesis::KinesisStreamPublisher;
