//! Registry snapshot: the CLI's plugins, commands and topics

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::{Command, Topic};

/// Separator used between topic segments when the CLI does not declare one
pub const DEFAULT_TOPIC_SEPARATOR: &str = ":";

/// Read-only snapshot of a CLI's command registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    /// Package name of the CLI
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Executable name completions are registered for
    pub bin: String,

    /// Additional executable names sharing the same completions
    #[serde(default)]
    pub bin_aliases: Vec<String>,

    /// `:` or ` ` between topic segments on the command line
    #[serde(default = "default_topic_separator")]
    pub topic_separator: String,

    /// CLI cache directory; scripts live under `<cache_dir>/autocomplete`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Shell command printing a flag's dynamic values; `<bin> autocomplete:options` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_command: Option<String>,

    #[serde(default)]
    pub plugins: Vec<Plugin>,

    /// Explicitly declared topics
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Plugin contributing commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,

    #[serde(default)]
    pub commands: Vec<Command>,
}

fn default_topic_separator() -> String {
    DEFAULT_TOPIC_SEPARATOR.to_string()
}

impl Registry {
    /// Create an empty registry for the given executable
    pub fn new(bin: impl Into<String>) -> Self {
        let bin = bin.into();
        Self {
            name: bin.clone(),
            version: String::new(),
            bin,
            bin_aliases: Vec::new(),
            topic_separator: default_topic_separator(),
            cache_dir: None,
            options_command: None,
            plugins: Vec::new(),
            topics: Vec::new(),
        }
    }

    /// Add a plugin
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Declare a topic
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }

    /// Add an executable alias
    pub fn with_bin_alias(mut self, alias: impl Into<String>) -> Self {
        self.bin_aliases.push(alias.into());
        self
    }

    /// All commands in registry iteration order (plugin order, then command order)
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.plugins.iter().flat_map(|p| p.commands.iter())
    }

    /// Find a command by id or alias
    pub fn find_command(&self, id: &str) -> Option<&Command> {
        self.commands()
            .find(|c| c.id == id)
            .or_else(|| self.commands().find(|c| c.aliases.iter().any(|a| a == id)))
    }

    /// Bin name usable as an environment variable prefix (`my-cli` → `MY_CLI`)
    pub fn env_prefix(&self) -> String {
        self.bin.to_uppercase().replace('-', "_")
    }

    /// Returns true if topics are typed as separate words
    pub fn uses_space_separator(&self) -> bool {
        self.topic_separator == " "
    }

    /// Full topic list: declared topics plus every visible command id and its prefixes.
    ///
    /// A command id's own entry borrows the command summary when no topic
    /// declares a description. Hidden topics suppress the name entirely.
    pub fn all_topics(&self) -> Vec<Topic> {
        let hidden: HashSet<&str> = self
            .topics
            .iter()
            .filter(|t| t.hidden)
            .map(|t| t.name.as_str())
            .collect();

        let mut topics: IndexMap<String, Topic> = IndexMap::new();
        for topic in self.topics.iter().filter(|t| !t.hidden) {
            topics
                .entry(topic.name.clone())
                .or_insert_with(|| topic.clone());
        }

        for command in self.commands().filter(|c| !c.hidden) {
            let parts: Vec<&str> = command.id.split(':').collect();
            for depth in 1..=parts.len() {
                let name = parts[..depth].join(":");
                if hidden.contains(name.as_str()) {
                    continue;
                }
                let description = if depth == parts.len() {
                    command.summary_text().map(str::to_string)
                } else {
                    None
                };
                match topics.entry(name) {
                    Entry::Vacant(entry) => {
                        let topic = Topic {
                            name: entry.key().clone(),
                            description,
                            hidden: false,
                        };
                        entry.insert(topic);
                    }
                    Entry::Occupied(mut entry) => {
                        if entry.get().description.is_none() {
                            entry.get_mut().description = description;
                        }
                    }
                }
            }
        }

        topics.into_values().collect()
    }
}

impl Plugin {
    /// Create an empty plugin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    /// Add a command
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}
