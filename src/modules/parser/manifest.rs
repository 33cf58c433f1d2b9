//! Manifest parser
//!
//! Accepts the registry snapshot as JSON or YAML. Commands and topics may
//! be written as maps keyed by id (the shape CLI frameworks emit in their
//! own manifests) or as plain lists.

use autocomplete_core::{
    AutocompleteError, Command, Plugin, Registry, Topic, DEFAULT_TOPIC_SEPARATOR,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;

use crate::env::EnvSubstitutor;

/// Plugin name given to commands declared at the top level of a manifest
pub const ROOT_PLUGIN: &str = "root";

/// Parser for registry manifests
pub struct ManifestParser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    version: Option<String>,

    bin: String,

    #[serde(default)]
    bin_aliases: Vec<String>,

    #[serde(default)]
    topic_separator: Option<String>,

    #[serde(default)]
    cache_dir: Option<PathBuf>,

    #[serde(default)]
    options_command: Option<String>,

    #[serde(default)]
    topics: RawTopics,

    #[serde(default)]
    plugins: Vec<RawPlugin>,

    /// Shorthand for a single anonymous plugin
    #[serde(default)]
    commands: RawCommands,
}

#[derive(Debug, Deserialize)]
struct RawPlugin {
    name: String,

    #[serde(default)]
    commands: RawCommands,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTopics {
    Map(IndexMap<String, Topic>),
    List(Vec<Topic>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommands {
    Map(IndexMap<String, Command>),
    List(Vec<Command>),
}

impl Default for RawTopics {
    fn default() -> Self {
        RawTopics::List(Vec::new())
    }
}

impl Default for RawCommands {
    fn default() -> Self {
        RawCommands::List(Vec::new())
    }
}

impl RawTopics {
    fn into_topics(self) -> Vec<Topic> {
        match self {
            RawTopics::List(topics) => topics,
            RawTopics::Map(map) => map
                .into_iter()
                .map(|(name, mut topic)| {
                    if topic.name.is_empty() {
                        topic.name = name;
                    }
                    topic
                })
                .collect(),
        }
    }
}

impl RawCommands {
    fn into_commands(self) -> Vec<Command> {
        let commands = match self {
            RawCommands::List(commands) => commands,
            RawCommands::Map(map) => map
                .into_iter()
                .map(|(id, mut command)| {
                    if command.id.is_empty() {
                        command.id = id;
                    }
                    command
                })
                .collect(),
        };
        commands.into_iter().map(normalize_command).collect()
    }

    fn is_empty(&self) -> bool {
        match self {
            RawCommands::List(commands) => commands.is_empty(),
            RawCommands::Map(map) => map.is_empty(),
        }
    }
}

/// Fill flag names from their keys
pub(crate) fn normalize_command(mut command: Command) -> Command {
    for (key, flag) in command.flags.iter_mut() {
        if flag.name.is_empty() {
            flag.name = key.clone();
        }
    }
    command
}

impl ManifestParser {
    /// Parse a manifest string into a registry
    pub fn parse(content: &str) -> Result<Registry, AutocompleteError> {
        // Unset variables are left as-is: summaries may legitimately contain braces
        let substitutor = EnvSubstitutor::lenient();
        let substituted = substitutor.substitute(content)?;

        Self::parse_raw(&substituted)
    }

    /// Parse a manifest string without environment substitution
    pub fn parse_raw(content: &str) -> Result<Registry, AutocompleteError> {
        let raw: RawManifest = serde_yaml::from_str(content)
            .map_err(|e| AutocompleteError::Manifest(format!("Failed to parse manifest: {}", e)))?;

        Ok(Self::into_registry(raw))
    }

    fn into_registry(raw: RawManifest) -> Registry {
        let mut plugins: Vec<Plugin> = Vec::new();
        if !raw.commands.is_empty() {
            plugins.push(Plugin {
                name: raw.name.clone().unwrap_or_else(|| ROOT_PLUGIN.to_string()),
                commands: raw.commands.into_commands(),
            });
        }
        for plugin in raw.plugins {
            plugins.push(Plugin {
                name: plugin.name,
                commands: plugin.commands.into_commands(),
            });
        }

        Registry {
            name: raw.name.unwrap_or_else(|| raw.bin.clone()),
            version: raw.version.unwrap_or_default(),
            bin: raw.bin,
            bin_aliases: raw.bin_aliases,
            topic_separator: raw
                .topic_separator
                .unwrap_or_else(|| DEFAULT_TOPIC_SEPARATOR.to_string()),
            cache_dir: raw.cache_dir,
            options_command: raw.options_command,
            plugins,
            topics: raw.topics.into_topics(),
        }
    }
}
