//! Trigger-changed notifications.
//!
//! When a property value changes, or a dynamic trigger flips, subscribers are
//! told which key changed so a redisplay scheduler can re-check messages that
//! depend on it. Delivery is synchronous on the publishing thread, in
//! subscription order, with no ordering guarantee across keys.

/// Subscriber registry and publication.
pub mod bus;
/// Channel-backed subscriber handle.
pub mod stream;
/// Event and handler type definitions.
pub mod types;

pub use bus::TriggerEventBus;
pub use stream::TriggerStream;
pub use types::{ChangeCause, SubscriptionId, TriggerChangedEvent, TriggerHandler};
