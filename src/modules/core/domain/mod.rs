//! Domain models for the plugin registry snapshot

mod command;
mod flag;
mod registry;
mod topic;

pub use command::Command;
pub use flag::{Flag, FlagCompletion, ValueCompletion, DEFAULT_CACHE_DURATION};
pub use registry::{Plugin, Registry, DEFAULT_TOPIC_SEPARATOR};
pub use topic::{default_topic_description, Topic};
