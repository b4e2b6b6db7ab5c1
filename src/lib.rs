//! # trigger-engine
//!
//! Decides whether an in-app message's display condition currently holds.
//!
//! ## Core Concepts
//!
//! - **Trigger**: a single leaf condition (kind, property/id, operator, operand)
//! - **TriggerTree**: OR of AND-groups of triggers; an empty tree always holds
//! - **Custom trigger**: resolved from the locally cached property values
//! - **Dynamic trigger**: time/session based, decided by an external evaluator
//! - **Trigger-changed event**: published when a property changes, so a
//!   redisplay scheduler can re-check messages that depend on it
//!
//! ## Usage
//!
//! ```rust
//! use trigger_engine::{
//!     EngineConfig, InAppMessage, Trigger, TriggerEngine, TriggerOperator, TriggerTree,
//! };
//!
//! let (engine, _dynamic) = TriggerEngine::in_process(EngineConfig::default());
//!
//! let message = InAppMessage::new(
//!     "welcome-back",
//!     TriggerTree::all_of(vec![Trigger::custom(
//!         "level",
//!         TriggerOperator::GreaterThanOrEqualTo,
//!         Some(5.into()),
//!     )]),
//! );
//!
//! assert!(!engine.evaluate_message_triggers(&message));
//! engine.add_triggers("level", "7".into());
//! assert!(engine.evaluate_message_triggers(&message));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Definitions
pub mod error;
pub mod message;
pub mod trigger;
pub mod value;

// Evaluation
pub mod evaluator;
pub mod matcher;
pub mod redisplay;
pub mod store;

// Collaborators and wiring
pub mod config;
pub mod dynamic;
pub mod engine;
pub mod events;
pub mod model;

// Re-export primary types at crate root for convenience
pub use config::EngineConfig;
pub use dynamic::{DynamicTriggerEvaluator, StaticDynamicTriggers};
pub use engine::TriggerEngine;
pub use error::{EngineError, EngineResult, MatchError, ParseError};
pub use evaluator::TriggerEvaluator;
pub use events::{
    ChangeCause, SubscriptionId, TriggerChangedEvent, TriggerEventBus, TriggerHandler, TriggerStream,
};
pub use matcher::{operator_matches, try_match};
pub use message::{InAppMessage, TriggerTree};
pub use model::{ModelChange, ModelChangeObserver};
pub use redisplay::{is_trigger_on_message, message_has_only_dynamic_triggers};
pub use store::TriggerValueStore;
pub use trigger::{Trigger, TriggerKind, TriggerOperator};
pub use value::TriggerValue;
