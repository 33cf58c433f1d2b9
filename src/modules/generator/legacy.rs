//! Legacy static generator
//!
//! Flattens the commands into a generic completion spec and hands it to
//! `clap_complete`. There is no topic hierarchy: every command id is a
//! direct subcommand of the executable.

use autocomplete_core::{AutocompleteError, CommandSet, Flag, Registry, Result, ValueCompletion};
use autocomplete_types::{FlagKind, Shell};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction};
use serde::{Deserialize, Serialize};

use crate::template::TemplateContext;

/// Generic completion spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSpec {
    pub command: String,
    pub subcommands: Vec<SubcommandSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcommandSpec {
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub flags: Vec<FlagSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char: Option<char>,

    #[serde(rename = "type")]
    pub kind: FlagType,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<ValueSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Boolean,
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueSpec {
    OneOf { values: Vec<String> },
}

impl From<&Flag> for FlagSpec {
    fn from(flag: &Flag) -> Self {
        let completion = match flag.value_completion() {
            ValueCompletion::Static(values) => Some(ValueSpec::OneOf {
                values: values.to_vec(),
            }),
            ValueCompletion::None | ValueCompletion::Dynamic { .. } | ValueCompletion::Files => None,
        };
        Self {
            name: flag.name.clone(),
            char: flag.char,
            kind: match flag.kind {
                FlagKind::Boolean => FlagType::Boolean,
                FlagKind::Option => FlagType::String,
            },
            multiple: flag.multiple,
            completion,
        }
    }
}

impl CompletionSpec {
    /// Equivalent `clap` command tree
    pub fn to_command(&self) -> clap::Command {
        let mut root = clap::Command::new(self.command.clone())
            .disable_help_subcommand(true)
            .disable_version_flag(true);
        for sub in &self.subcommands {
            root = root.subcommand(sub.to_command());
        }
        root
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl SubcommandSpec {
    fn to_command(&self) -> clap::Command {
        // Commands may declare their own `help` or `-h`
        let mut command = clap::Command::new(self.command.clone())
            .disable_help_flag(true)
            .disable_version_flag(true);
        if let Some(description) = &self.description {
            command = command.about(description.clone());
        }
        for flag in &self.flags {
            command = command.arg(flag.to_arg());
        }
        if !self.flags.iter().any(|f| f.name == "help") {
            command = command.arg(
                Arg::new("help")
                    .long("help")
                    .help("Show help for command")
                    .action(ArgAction::Help),
            );
        }
        command
    }
}

impl FlagSpec {
    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).long(self.name.clone());
        if let Some(c) = self.char {
            arg = arg.short(c);
        }
        arg = match (self.kind, self.multiple) {
            (FlagType::Boolean, _) => arg.action(ArgAction::SetTrue),
            (FlagType::String, true) => arg.action(ArgAction::Append),
            (FlagType::String, false) => arg.action(ArgAction::Set),
        };
        if let Some(ValueSpec::OneOf { values }) = &self.completion {
            arg = arg.value_parser(PossibleValuesParser::new(values.clone()));
        }
        arg
    }
}

/// Generates flat bash/zsh scripts through `clap_complete`
pub struct LegacyGenerator<'a> {
    registry: &'a Registry,
    commands: CommandSet,
    context: TemplateContext,
}

impl<'a> LegacyGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            commands: CommandSet::from_registry(registry),
            context: TemplateContext::from_registry(registry),
        }
    }

    /// Map the command list to the generic spec
    pub fn spec(&self) -> CompletionSpec {
        let subcommands = self
            .commands
            .commands()
            .iter()
            .map(|command| SubcommandSpec {
                command: command.id.clone(),
                description: command.summary.as_deref().and_then(|s| {
                    let rendered = self.context.for_command(&command.origin).render(s);
                    rendered.lines().next().map(str::to_string)
                }),
                flags: command.visible_flags().map(FlagSpec::from).collect(),
            })
            .collect();

        CompletionSpec {
            command: self.registry.bin.clone(),
            subcommands,
        }
    }

    /// Render the script for `shell`
    pub fn generate(&self, shell: Shell) -> Result<String> {
        let target = match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Powershell => {
                return Err(AutocompleteError::UnsupportedShell(format!(
                    "{} has no legacy generator",
                    shell
                )))
            }
        };

        let mut command = self.spec().to_command();
        let mut buf = Vec::new();
        clap_complete::generate(target, &mut command, self.registry.bin.clone(), &mut buf);

        String::from_utf8(buf).map_err(|e| AutocompleteError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocomplete_core::{Command, FlagCompletion, Plugin};
    use serde_json::json;

    fn registry() -> Registry {
        Registry::new("mycli").with_plugin(
            Plugin::new("core")
                .with_command(
                    Command::new("deploy")
                        .with_summary("Deploy <%= config.bin %> projects\nMore text")
                        .with_alias("ship")
                        .with_flag(Flag::option("metadata").with_char('m').repeatable())
                        .with_flag(Flag::boolean("json"))
                        .with_flag(Flag::boolean("secret").hide()),
                )
                .with_command(
                    Command::new("config:set").with_flag(
                        Flag::option("target")
                            .with_char('t')
                            .with_completion(FlagCompletion::fixed(["dev", "prod"])),
                    ),
                )
                .with_command(Command::new("hidden").hide()),
        )
    }

    #[test]
    fn test_spec_schema() {
        let registry = registry();
        let spec = LegacyGenerator::new(&registry).spec();
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "mycli",
                "subcommands": [
                    {
                        "command": "deploy",
                        "description": "Deploy mycli projects",
                        "flags": [
                            { "name": "metadata", "char": "m", "type": "string", "multiple": true },
                            { "name": "json", "type": "boolean" }
                        ]
                    },
                    {
                        "command": "ship",
                        "description": "Deploy mycli projects",
                        "flags": [
                            { "name": "metadata", "char": "m", "type": "string", "multiple": true },
                            { "name": "json", "type": "boolean" }
                        ]
                    },
                    {
                        "command": "config:set",
                        "flags": [
                            {
                                "name": "target",
                                "char": "t",
                                "type": "string",
                                "completion": { "type": "oneOf", "values": ["dev", "prod"] }
                            }
                        ]
                    }
                ]
            })
        );
    }

    #[test]
    fn test_clap_command_tree() {
        let registry = registry();
        let command = LegacyGenerator::new(&registry).spec().to_command();
        let names: Vec<&str> = command.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(names, vec!["deploy", "ship", "config:set"]);

        let deploy = command.find_subcommand("deploy").unwrap();
        let metadata = deploy.get_arguments().find(|a| a.get_id() == "metadata").unwrap();
        assert_eq!(metadata.get_short(), Some('m'));
        assert!(matches!(metadata.get_action(), ArgAction::Append));
    }

    #[test]
    fn test_generate_bash_and_zsh() {
        let registry = registry();
        let generator = LegacyGenerator::new(&registry);

        let bash = generator.generate(Shell::Bash).unwrap();
        assert!(bash.contains("mycli"));
        assert!(bash.contains("--metadata"));
        assert!(!bash.contains("--secret"));

        let zsh = generator.generate(Shell::Zsh).unwrap();
        assert!(zsh.starts_with("#compdef mycli"));
        assert!(zsh.contains("dev"));
        assert!(zsh.contains("prod"));
    }

    #[test]
    fn test_help_flag_declared_by_command() {
        let registry = Registry::new("mycli").with_plugin(Plugin::new("core").with_command(
            Command::new("run").with_flag(Flag::boolean("help").with_char('h')),
        ));
        let bash = LegacyGenerator::new(&registry).generate(Shell::Bash).unwrap();
        assert!(bash.contains("--help"));
    }

    #[test]
    fn test_powershell_unsupported() {
        let registry = registry();
        let err = LegacyGenerator::new(&registry)
            .generate(Shell::Powershell)
            .unwrap_err();
        assert!(matches!(err, AutocompleteError::UnsupportedShell(_)));
    }
}
