//! Command-tree extraction shared by every shell generator
//!
//! Flattens the registry into completion entries: one per visible command,
//! one more per advertised alias, plus the sorted list of topics that have
//! children. Alias paths that introduce new intermediate segments are
//! backfilled as synthetic topics so tree building never meets an orphan.

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::domain::{default_topic_description, Flag, Registry};
use crate::loader::CommandLoader;

/// Completable command (or alias) entry
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCommand {
    /// Id this entry is completed as; an alias id for alias entries
    pub id: String,

    /// Raw summary, sanitized by each generator for its dialect
    pub summary: Option<String>,

    pub flags: IndexMap<String, Flag>,

    /// Id of the registered command (differs from `id` for aliases)
    pub origin: String,
}

/// Topic that has at least one child
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionTopic {
    pub name: String,

    /// Raw description; generated when the registry has none
    pub description: String,
}

impl CompletionCommand {
    /// Flags that are not hidden, in declaration order
    pub fn visible_flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values().filter(|f| !f.hidden)
    }

    /// Returns true if the command declares its own `help` flag
    pub fn declares_help(&self) -> bool {
        self.flags.contains_key("help")
    }
}

/// Topics and commands of one registry snapshot
#[derive(Debug)]
pub struct CommandSet {
    topics: Vec<CompletionTopic>,
    commands: Vec<CompletionCommand>,
    co_topics: OnceCell<Vec<String>>,
}

impl CommandSet {
    /// Extract completion entries using the manifest-cached flags
    pub fn from_registry(registry: &Registry) -> Self {
        Self::build(registry, &HashMap::new())
    }

    /// Extract completion entries, loading every command through `loader` first.
    ///
    /// Loads run one after another. A failed load only affects its own
    /// command, which keeps the flags cached in the manifest.
    pub async fn load(registry: &Registry, loader: &dyn CommandLoader) -> Self {
        let mut loaded = HashMap::new();
        for command in registry.commands().filter(|c| !c.hidden) {
            match loader.load(command).await {
                Ok(full) => {
                    loaded.insert(command.id.clone(), full.flags);
                }
                Err(e) => {
                    debug!(command = %command.id, error = %e, "using cached flags");
                }
            }
        }
        Self::build(registry, &loaded)
    }

    fn build(registry: &Registry, loaded: &HashMap<String, IndexMap<String, Flag>>) -> Self {
        let declared = registry.all_topics();

        // First pass: declared topics that have at least one child.
        let mut topics: BTreeMap<String, CompletionTopic> = BTreeMap::new();
        for topic in &declared {
            let prefix = format!("{}:", topic.name);
            let has_child = declared.iter().any(|t| t.name.starts_with(&prefix));
            if !has_child {
                continue;
            }
            topics
                .entry(topic.name.clone())
                .or_insert_with(|| CompletionTopic {
                    name: topic.name.clone(),
                    description: topic
                        .description
                        .clone()
                        .unwrap_or_else(|| default_topic_description(&topic.name)),
                });
        }

        let mut commands = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut alias_paths: Vec<String> = Vec::new();

        for command in registry.commands().filter(|c| !c.hidden) {
            let flags = loaded
                .get(&command.id)
                .cloned()
                .unwrap_or_else(|| command.flags.clone());
            let summary = command.summary_text().map(str::to_string);

            if seen.insert(command.id.clone()) {
                commands.push(CompletionCommand {
                    id: command.id.clone(),
                    summary: summary.clone(),
                    flags: flags.clone(),
                    origin: command.id.clone(),
                });
            } else {
                debug!(command = %command.id, "duplicate command id skipped");
            }

            if command.deprecate_aliases {
                continue;
            }
            for alias in &command.aliases {
                if !seen.insert(alias.clone()) {
                    debug!(alias = %alias, command = %command.id, "alias shadows an existing id");
                    continue;
                }
                commands.push(CompletionCommand {
                    id: alias.clone(),
                    summary: summary.clone(),
                    flags: flags.clone(),
                    origin: command.id.clone(),
                });
                alias_paths.push(alias.clone());
            }
        }

        // Second pass: aliases are flattened outside the declared tree, so
        // every intermediate segment of an alias path becomes a topic.
        for alias in &alias_paths {
            let parts: Vec<&str> = alias.split(':').collect();
            for depth in 1..parts.len() {
                let name = parts[..depth].join(":");
                topics.entry(name.clone()).or_insert_with(|| CompletionTopic {
                    description: default_topic_description(&name),
                    name,
                });
            }
        }

        Self {
            topics: topics.into_values().collect(),
            commands,
            co_topics: OnceCell::new(),
        }
    }

    /// Topics sorted by name
    pub fn topics(&self) -> &[CompletionTopic] {
        &self.topics
    }

    /// Commands in registry order, aliases following their command
    pub fn commands(&self) -> &[CompletionCommand] {
        &self.commands
    }

    /// Find a completion entry by id
    pub fn find_command(&self, id: &str) -> Option<&CompletionCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Find a topic by name
    pub fn find_topic(&self, name: &str) -> Option<&CompletionTopic> {
        self.topics.iter().find(|t| t.name == name)
    }

    /// Names that are both a topic and a command, computed on first use
    pub fn co_topics(&self) -> &[String] {
        self.co_topics.get_or_init(|| {
            self.topics
                .iter()
                .filter(|t| self.commands.iter().any(|c| c.id == t.name))
                .map(|t| t.name.clone())
                .collect()
        })
    }

    /// Returns true if `name` is both a topic and a command
    pub fn is_co_topic(&self, name: &str) -> bool {
        self.co_topics().iter().any(|t| t == name)
    }
}
