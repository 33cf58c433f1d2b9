//! Hierarchical command tree keyed by path segment

use std::collections::BTreeMap;

use crate::domain::default_topic_description;
use crate::extract::CommandSet;

/// Node of the command tree
///
/// A node is a pure topic (description, children), a command leaf
/// (command id) or a co-topic (both).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    /// Full colon-delimited path of this node
    pub path: String,

    /// Topic description, present when the node is a topic
    pub description: Option<String>,

    /// Command id, present when the node is invocable
    pub command: Option<String>,

    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn new(path: String) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// Last path segment
    pub fn segment(&self) -> &str {
        self.path.rsplit(':').next().unwrap_or(&self.path)
    }

    /// Number of segments in the path
    pub fn depth(&self) -> usize {
        self.path.split(':').count()
    }

    /// Returns true if the node can be invoked as a command
    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }

    /// Returns true if the node has children
    pub fn is_topic(&self) -> bool {
        !self.children.is_empty() || self.description.is_some()
    }

    /// Topic that is also a command
    pub fn is_co_topic(&self) -> bool {
        self.is_command() && self.is_topic()
    }

    /// Command without children
    pub fn is_leaf_command(&self) -> bool {
        self.is_command() && self.children.is_empty()
    }

    /// Topic description, generated if the node was only created as an intermediate segment
    pub fn topic_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| default_topic_description(&self.path))
    }
}

/// Tree of topics and commands, ordered by segment name at every level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandTree {
    roots: BTreeMap<String, TreeNode>,
}

impl CommandTree {
    /// Build the tree from an extracted command set
    pub fn build(set: &CommandSet) -> Self {
        let mut tree = Self::default();
        for topic in set.topics() {
            tree.node_mut(&topic.name).description = Some(topic.description.clone());
        }
        for command in set.commands() {
            tree.node_mut(&command.id).command = Some(command.id.clone());
        }
        tree
    }

    fn node_mut(&mut self, path: &str) -> &mut TreeNode {
        let mut segments = path.split(':');
        let first = segments.next().unwrap_or_default();
        let mut current = first.to_string();
        let mut node = self
            .roots
            .entry(first.to_string())
            .or_insert_with(|| TreeNode::new(first.to_string()));
        for segment in segments {
            current = format!("{}:{}", current, segment);
            let child_path = current.clone();
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::new(child_path));
        }
        node
    }

    /// Top-level nodes
    pub fn roots(&self) -> &BTreeMap<String, TreeNode> {
        &self.roots
    }

    /// Look up a node by colon-delimited path
    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        let mut segments = path.split(':');
        let mut node = self.roots.get(segments.next()?)?;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// Every topic node (pure and co-topic), depth-first in segment order
    pub fn topic_nodes(&self) -> Vec<&TreeNode> {
        fn walk<'a>(node: &'a TreeNode, out: &mut Vec<&'a TreeNode>) {
            if node.is_topic() {
                out.push(node);
            }
            for child in node.children.values() {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for root in self.roots.values() {
            walk(root, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Command, Plugin, Registry};

    fn tree() -> CommandTree {
        let registry = Registry::new("mycli").with_plugin(
            Plugin::new("core")
                .with_command(Command::new("deploy").with_summary("Deploy a project"))
                .with_command(Command::new("deploy:functions"))
                .with_command(Command::new("config:get"))
                .with_command(Command::new("config:set"))
                .with_command(Command::new("status")),
        );
        CommandTree::build(&CommandSet::from_registry(&registry))
    }

    #[test]
    fn test_roots_sorted() {
        let tree = tree();
        let roots: Vec<&String> = tree.roots().keys().collect();
        assert_eq!(roots, vec!["config", "deploy", "status"]);
    }

    #[test]
    fn test_node_kinds() {
        let tree = tree();
        let deploy = tree.get("deploy").unwrap();
        assert!(deploy.is_co_topic());
        assert_eq!(deploy.topic_description(), "Deploy a project");

        let config = tree.get("config").unwrap();
        assert!(config.is_topic());
        assert!(!config.is_command());
        assert_eq!(config.topic_description(), "config commands");

        let status = tree.get("status").unwrap();
        assert!(status.is_leaf_command());
        assert!(!status.is_topic());

        let functions = tree.get("deploy:functions").unwrap();
        assert_eq!(functions.command.as_deref(), Some("deploy:functions"));
        assert_eq!(functions.segment(), "functions");
        assert_eq!(functions.depth(), 2);
    }

    #[test]
    fn test_topic_nodes() {
        let tree = tree();
        let paths: Vec<&str> = tree.topic_nodes().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["config", "deploy"]);
    }

    #[test]
    fn test_get_missing() {
        assert!(tree().get("deploy:missing").is_none());
        assert!(tree().get("").is_none());
    }
}
