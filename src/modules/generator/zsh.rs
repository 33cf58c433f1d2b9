//! Zsh completion generator
//!
//! Emits one completion function per topic plus the root `_<bin>` function,
//! all built on `_arguments`/`_values`. Commands are loaded before rendering
//! so completion metadata missing from the manifest is picked up.

use autocomplete_core::{
    AutocompleteError, CommandLoader, CommandSet, CommandTree, CompletionCommand, Flag, Registry,
    Result, TreeNode, ValueCompletion,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::layout::{AUTOCOMPLETE_DIR, FLAG_CACHE_DIR};
use crate::options::OPTIONS_COMMAND;
use crate::sanitize::{Dialect, Sanitizer};
use crate::template::TemplateContext;

const HELP_SPEC: &str = r#"--help"[Show help for command]""#;
const FILES_SPEC: &str = r#""*: :_files""#;

/// Generates the zsh completion script
pub struct ZshGenerator<'a> {
    registry: &'a Registry,
    sanitizer: Sanitizer,
    cache_dir: Option<PathBuf>,
}

impl<'a> ZshGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            sanitizer: Sanitizer::new(Dialect::Zsh, TemplateContext::from_registry(registry)),
            cache_dir: registry.cache_dir.clone(),
        }
    }

    /// Cache dir used by the dynamic completion helper
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Load every command through `loader`, then render the script
    pub async fn generate(&self, loader: &dyn CommandLoader) -> Result<String> {
        let commands = CommandSet::load(self.registry, loader).await;
        self.render(&commands)
    }

    /// Render the script for an already extracted command set
    pub fn render(&self, commands: &CommandSet) -> Result<String> {
        let tree = CommandTree::build(commands);
        let bin = &self.registry.bin;

        let mut out = format!("#compdef {}\n", bin);
        for alias in &self.registry.bin_aliases {
            out.push_str(&format!("compdef {}={}\n", alias, bin));
        }
        out.push('\n');

        let has_dynamic = commands.commands().iter().any(|c| {
            c.visible_flags()
                .any(|f| matches!(f.value_completion(), ValueCompletion::Dynamic { .. }))
        });
        if has_dynamic {
            out.push_str(&self.dynamic_helper());
            out.push('\n');
        }

        for node in tree.topic_nodes() {
            out.push_str(&self.topic_function(node, commands)?);
            out.push('\n');
        }

        out.push_str(&self.root_function(&tree, commands)?);
        Ok(out)
    }

    fn function_name(&self, path: &str) -> String {
        format!("_{}_{}", self.registry.bin, path.replace(':', "_"))
    }

    fn root_function(&self, tree: &CommandTree, commands: &CommandSet) -> Result<String> {
        Ok(format!(
            r#"_{bin}() {{
  local context state state_descr line
  typeset -A opt_args

  _arguments -C "1: :->cmds" "*::arg:->args"

  case "$state" in
    cmds)
      {values}
      ;;
    args)
      case $line[1] in
{cases}      esac
      ;;
  esac
}}

_{bin}
"#,
            bin = self.registry.bin,
            values = self.values_block(tree.roots(), commands, "      ")?,
            cases = self.case_arms(tree.roots(), commands)?,
        ))
    }

    fn topic_function(&self, node: &TreeNode, commands: &CommandSet) -> Result<String> {
        let name = self.function_name(&node.path);

        let Some(id) = node.command.as_deref() else {
            return Ok(format!(
                r#"{name}() {{
  local context state state_descr line
  typeset -A opt_args

  _arguments -C "1: :->cmds" "*::arg:->args"

  case "$state" in
    cmds)
      {values}
      ;;
    args)
      case $line[1] in
{cases}      esac
      ;;
  esac
}}
"#,
                name = name,
                values = self.values_block(&node.children, commands, "      ")?,
                cases = self.case_arms(&node.children, commands)?,
            ));
        };

        // Co-topic: the node's own flags are offered when no subcommand follows
        let command = find_command(commands, id)?;
        Ok(format!(
            r#"{name}() {{
  {name}_flags() {{
    local context state state_descr line
    typeset -A opt_args

    {flags}
  }}

  local context state state_descr line
  typeset -A opt_args

  _arguments -C "1: :->cmds" "*::arg:->args"

  case "$state" in
    cmds)
      if [[ "${{words[CURRENT]}}" == -* ]]; then
        {name}_flags
      else
        {values}
      fi
      ;;
    args)
      case $line[1] in
{cases}        *)
          {name}_flags
          ;;
      esac
      ;;
  esac
}}
"#,
            name = name,
            flags = self.arguments_block(command, "    "),
            values = self.values_block(&node.children, commands, "        ")?,
            cases = self.case_arms(&node.children, commands)?,
        ))
    }

    /// `_values` listing child segments with their descriptions
    fn values_block(
        &self,
        children: &BTreeMap<String, TreeNode>,
        commands: &CommandSet,
        indent: &str,
    ) -> Result<String> {
        let mut lines = vec![r#"_values "completions""#.to_string()];
        for (segment, child) in children {
            let description = if child.is_topic() {
                self.sanitizer.sanitize(Some(&child.topic_description()))
            } else {
                let id = child.command.as_deref().unwrap_or(&child.path);
                let command = find_command(commands, id)?;
                self.sanitizer
                    .sanitize_command(command.summary.as_deref(), &command.origin)
            };
            lines.push(format!("\"{}[{}]\"", segment, description));
        }
        Ok(join_continued(&lines, indent))
    }

    /// `case` arms dispatching each child to its function or inline flags
    fn case_arms(&self, children: &BTreeMap<String, TreeNode>, commands: &CommandSet) -> Result<String> {
        let mut out = String::new();
        for (segment, child) in children {
            let body = if child.is_topic() {
                self.function_name(&child.path)
            } else {
                let id = child.command.as_deref().unwrap_or(&child.path);
                self.arguments_block(find_command(commands, id)?, "          ")
            };
            out.push_str(&format!(
                "        \"{}\")\n          {}\n          ;;\n",
                segment, body
            ));
        }
        Ok(out)
    }

    /// `_arguments -S` block with one spec per visible flag
    pub fn arguments_block(&self, command: &CompletionCommand, indent: &str) -> String {
        let mut lines = vec!["_arguments -S".to_string()];
        for flag in command.visible_flags() {
            lines.push(self.flag_spec(command, flag));
        }
        if !command.declares_help() {
            lines.push(HELP_SPEC.to_string());
        }
        lines.push(FILES_SPEC.to_string());
        join_continued(&lines, indent)
    }

    /// `_arguments` spec of one of `command`'s flags
    pub fn flag_spec(&self, command: &CompletionCommand, flag: &Flag) -> String {
        let summary = self
            .sanitizer
            .sanitize_command(flag.summary_text(), &command.origin);

        let mut spec = match (flag.char, flag.multiple) {
            (Some(c), false) => format!(
                "\"(-{c} --{name})\"{{-{c},--{name}}}\"[{summary}]",
                c = c,
                name = flag.name,
                summary = summary
            ),
            (Some(c), true) => format!(
                "\"*\"{{-{c},--{name}}}\"[{summary}]",
                c = c,
                name = flag.name,
                summary = summary
            ),
            (None, false) => format!("--{}\"[{}]", flag.name, summary),
            (None, true) => format!("\"*\"--{}\"[{}]", flag.name, summary),
        };

        match flag.value_completion() {
            ValueCompletion::None => {}
            ValueCompletion::Static(values) => {
                let dialect = self.sanitizer.dialect();
                let values: Vec<String> = values.iter().map(|v| dialect.escape(v)).collect();
                spec.push_str(&format!(":{} options:({})", flag.name, values.join(" ")));
            }
            ValueCompletion::Dynamic { cache_duration } => {
                spec.push_str(&format!(
                    ":{name} options:{{_{bin}_autocomplete_dynamic {id} {name} {duration}}}",
                    name = flag.name,
                    bin = self.registry.bin,
                    id = command.id.replace(':', "\\\\:"),
                    duration = cache_duration
                ));
            }
            ValueCompletion::Files => spec.push_str(":file:_files"),
        }

        spec.push('"');
        spec
    }

    fn flag_cache_dir(&self) -> String {
        match &self.cache_dir {
            Some(dir) => shell_quote(
                &dir.join(AUTOCOMPLETE_DIR)
                    .join(FLAG_CACHE_DIR)
                    .display()
                    .to_string(),
            ),
            None => format!(
                "\"${{XDG_CACHE_HOME:-$HOME/.cache}}/{}/{}/{}\"",
                self.registry.bin, AUTOCOMPLETE_DIR, FLAG_CACHE_DIR
            ),
        }
    }

    /// Command printing dynamic flag values, one per line
    pub fn options_invocation(&self) -> String {
        match &self.registry.options_command {
            Some(command) => command.clone(),
            None => format!("{} {}", self.registry.bin, OPTIONS_COMMAND),
        }
    }

    /// Helper running the options command, caching results on disk
    fn dynamic_helper(&self) -> String {
        format!(
            r#"_{bin}_autocomplete_dynamic() {{
  local command_id="$1" flag="$2" duration="$3"
  local cache_dir={cache_dir}
  local cache_file="$cache_dir/${{command_id//:/_}}_$flag"
  local -a values

  zmodload -i zsh/datetime 2>/dev/null

  if [[ -f "$cache_file" ]]; then
    local stamp
    stamp="$(head -n 1 "$cache_file")"
    if [[ "$stamp" == <-> ]] && (( EPOCHSECONDS - stamp < duration )); then
      values=("${{(@f)$(tail -n +2 "$cache_file")}}")
      values=(${{values:#}})
    fi
  fi

  if (( ! ${{#values[@]}} )); then
    values=("${{(@f)$({options} --command "$command_id" --flag "$flag" --current-line "$words" 2>/dev/null)}}")
    values=(${{values:#}})
    if (( ${{#values[@]}} )); then
      mkdir -p "$cache_dir"
      {{ print -r -- "$EPOCHSECONDS"; print -rl -- "${{values[@]}}"; }} > "$cache_file"
    fi
  fi

  compadd -- "${{values[@]}}"
}}
"#,
            bin = self.registry.bin,
            cache_dir = self.flag_cache_dir(),
            options = self.options_invocation(),
        )
    }
}

fn find_command<'c>(commands: &'c CommandSet, id: &str) -> Result<&'c CompletionCommand> {
    commands
        .find_command(id)
        .ok_or_else(|| AutocompleteError::Internal(format!("command tree references unknown command '{}'", id)))
}

/// Join lines with shell line continuations, indenting every line after the first
fn join_continued(lines: &[String], indent: &str) -> String {
    let separator = format!(" \\\n{}  ", indent);
    lines.join(&separator)
}

/// Double-quote a path for zsh
fn shell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '$' | '`' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
