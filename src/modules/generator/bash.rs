//! Bash completion generator
//!
//! The generated script keeps the command list as plain-text blocks local
//! to the completion function. Helper functions match the typed words
//! against those blocks at completion time.

use autocomplete_core::{CommandSet, CompletionCommand, Flag, Registry, ValueCompletion};
use autocomplete_types::FlagKind;

use crate::sanitize::{Dialect, Sanitizer};
use crate::template::TemplateContext;

/// Generates the bash completion script
pub struct BashGenerator<'a> {
    registry: &'a Registry,
    commands: CommandSet,
    sanitizer: Sanitizer,
}

impl<'a> BashGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            commands: CommandSet::from_registry(registry),
            sanitizer: Sanitizer::new(Dialect::Bash, TemplateContext::from_registry(registry)),
        }
    }

    /// Render the full script
    pub fn generate(&self) -> String {
        format!(
            r#"#!/usr/bin/env bash

# Completion for {bin}, generated from the command manifest

_{bin}_autocomplete_join()
{{
  local IFS="$1"
  shift
  echo "$*"
}}

# Metadata line of flag $2 on command $1
_{bin}_autocomplete_flag_meta()
{{
  local var="__flags_${{1//[^a-zA-Z0-9]/_}}"
  local flag="${{2%%=*}}"
  local entry
  while IFS= read -r entry; do
    if [[ -n "$entry" && "${{entry%% *}}" == "$flag" ]]; then
      echo "${{entry#* }}"
      return 0
    fi
  done <<< "${{!var}}"
  return 1
}}

_{bin}_autocomplete_is_command()
{{
  local entry
  while IFS= read -r entry; do
    if [[ -n "$entry" && "${{entry%% *}}" == "$1" ]]; then
      return 0
    fi
  done <<< "$commands"
  return 1
}}

# Fill COMPREPLY from "value<TAB>description" candidates
_{bin}_autocomplete_reply()
{{
  local width=0 cols="${{COLUMNS:-80}}" candidate value desc line
  if (( $# == 1 )) || [[ "$COMP_TYPE" == 37 || "$COMP_TYPE" == 42 ]]; then
    for candidate in "$@"; do
      COMPREPLY+=("${{candidate%%$'\t'*}}")
    done
    return 0
  fi
  for candidate in "$@"; do
    value="${{candidate%%$'\t'*}}"
    if (( ${{#value}} > width )); then
      width=${{#value}}
    fi
  done
  for candidate in "$@"; do
    value="${{candidate%%$'\t'*}}"
    desc="${{candidate#*$'\t'}}"
    if [[ -n "$desc" && "$desc" != "$candidate" ]]; then
      printf -v line '%-*s  (%s)' "$width" "$value" "$desc"
    else
      line="$value"
    fi
    if (( ${{#line}} >= cols )); then
      line="${{line:0:cols-4}}..."
    fi
    COMPREPLY+=("$line")
  done
}}

_{bin}_autocomplete()
{{
  local separator="{separator}"
  local commands="
{commands}
"
  local topics="
{topics}
"
  local command_summaries="
{summaries}
"
{flags}
  COMPREPLY=()

  local line="${{COMP_LINE:0:COMP_POINT}}"
  local -a words=()
  read -r -a words <<< "$line"
  if [[ "$line" =~ [[:space:]]$ ]]; then
    words+=("")
  fi
  if (( ${{#words[@]}} < 2 )); then
    return 0
  fi
  local cur="${{words[${{#words[@]}}-1]}}"

  # Walk typed words: flags and their values are recorded, the rest is the command path
  local -a path=() used=()
  local cmd_id="" pending="" word word_meta joined i
  for (( i = 1; i < ${{#words[@]}} - 1; i++ )); do
    word="${{words[i]}}"
    if [[ -n "$pending" ]]; then
      pending=""
      continue
    fi
    if [[ "$word" == -* ]]; then
      # Short and long forms resolve to the same long name
      if word_meta="$(_{bin}_autocomplete_flag_meta "$cmd_id" "$word")"; then
        used+=("${{word_meta##*|}}")
        if [[ "$word" != *=* && "$word_meta" == *"|@option"* ]]; then
          pending="$word"
        fi
      fi
      continue
    fi
    if [[ "$separator" == ":" ]]; then
      if (( ${{#path[@]}} )); then
        continue
      fi
      IFS=':' read -r -a path <<< "$word"
    else
      path+=("$word")
    fi
    joined="$(_{bin}_autocomplete_join : "${{path[@]}}")"
    if _{bin}_autocomplete_is_command "$joined"; then
      cmd_id="$joined"
    fi
  done

  local -a candidates=()

  # Flag value
  local flag="" value="$cur" value_prefix=""
  if [[ -n "$pending" ]]; then
    flag="$pending"
  elif [[ "$cur" == -*=* ]]; then
    flag="${{cur%%=*}}"
    value="${{cur#*=}}"
    if [[ "$COMP_WORDBREAKS" != *=* ]]; then
      value_prefix="$flag="
    fi
  fi
  if [[ -n "$flag" ]]; then
    local meta option
    local -a fields=() options=()
    meta="$(_{bin}_autocomplete_flag_meta "$cmd_id" "$flag")"
    IFS='|' read -r -a fields <<< "$meta"
    if (( ${{#fields[@]}} == 4 )); then
      IFS=',' read -r -a options <<< "${{fields[1]}}"
      for option in "${{options[@]}}"; do
        if [[ "$option" == "$value"* ]]; then
          COMPREPLY+=("$value_prefix$option")
        fi
      done
    fi
    return 0
  fi

  # Flag names
  if [[ "$cur" == -* ]]; then
    if [[ -z "$cmd_id" ]]; then
      return 0
    fi
    local var="__flags_${{cmd_id//[^a-zA-Z0-9]/_}}"
    local entry token meta used_flag skip
    while IFS= read -r entry; do
      if [[ -z "$entry" ]]; then
        continue
      fi
      token="${{entry%% *}}"
      meta="${{entry#* }}"
      if [[ "$token" != "$cur"* ]]; then
        continue
      fi
      if [[ "$meta" != *"|@option-multiple|"* ]]; then
        skip=""
        for used_flag in "${{used[@]}}"; do
          if [[ "$used_flag" == "${{meta##*|}}" ]]; then
            skip=1
            break
          fi
        done
        if [[ -n "$skip" ]]; then
          continue
        fi
      fi
      candidates+=("$token"$'\t'"${{meta%%|*}}")
    done <<< "${{!var}}"
    _{bin}_autocomplete_reply "${{candidates[@]}}"
    return 0
  fi

  # Next path segment
  if [[ "$separator" == ":" ]] && (( ${{#path[@]}} )); then
    return 0
  fi
  local cur_head="" segment="$cur" reply_prefix=""
  if [[ "$cur" == *:* ]]; then
    cur_head="${{cur%:*}}"
    segment="${{cur##*:}}"
    if [[ "$COMP_WORDBREAKS" != *:* ]]; then
      reply_prefix="$cur_head:"
    fi
  fi
  local base prefix
  base="$(_{bin}_autocomplete_join : "${{path[@]}}" ${{cur_head:+"$cur_head"}})"
  prefix="${{base:+$base:}}"

  local seen=" " entry id desc rest next
  while IFS= read -r entry; do
    if [[ -z "$entry" ]]; then
      continue
    fi
    id="${{entry%% *}}"
    desc=""
    if [[ "$entry" == *" "* ]]; then
      desc="${{entry#* }}"
    fi
    if [[ "$id" != "$prefix"* ]]; then
      continue
    fi
    rest="${{id#"$prefix"}}"
    next="${{rest%%:*}}"
    if [[ -z "$next" || "$next" != "$segment"* || "$seen" == *" $next "* ]]; then
      continue
    fi
    seen+="$next "
    # Topics come first, so a deeper entry never overrides a topic description
    if [[ "$rest" == *:* ]]; then
      desc=""
    fi
    candidates+=("$reply_prefix$next"$'\t'"$desc")
  done <<< "$topics"$'\n'"$command_summaries"
  _{bin}_autocomplete_reply "${{candidates[@]}}"
}}

{registrations}
"#,
            bin = self.registry.bin,
            separator = self.registry.topic_separator,
            commands = self.commands_block(),
            topics = self.topics_block(),
            summaries = self.summaries_block(),
            flags = self.flag_blocks(),
            registrations = self.registrations(),
        )
    }

    /// One line per command: the id followed by its flag tokens
    pub fn commands_block(&self) -> String {
        self.commands
            .commands()
            .iter()
            .map(|command| {
                let mut line = command.id.clone();
                for flag in command.visible_flags() {
                    if let Some(short) = flag.short_token() {
                        line.push(' ');
                        line.push_str(&short);
                    }
                    line.push(' ');
                    line.push_str(&flag.long_token());
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per topic: the name followed by its description
    pub fn topics_block(&self) -> String {
        self.commands
            .topics()
            .iter()
            .map(|topic| entry_line(&topic.name, &self.sanitizer.sanitize(Some(&topic.description))))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per command: the id followed by its summary
    pub fn summaries_block(&self) -> String {
        self.commands
            .commands()
            .iter()
            .map(|command| {
                let summary = self
                    .sanitizer
                    .sanitize_command(command.summary.as_deref(), &command.origin);
                entry_line(&command.id, &summary)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn flag_blocks(&self) -> String {
        let mut out = String::new();
        for command in self.commands.commands() {
            let lines = self.flag_lines(command);
            if lines.is_empty() {
                continue;
            }
            out.push_str(&format!(
                "  local {}=\"\n{}\n\"\n",
                flag_variable(&command.id),
                lines.join("\n")
            ));
        }
        out
    }

    /// Metadata lines of a command's visible flags, short form first
    pub fn flag_lines(&self, command: &CompletionCommand) -> Vec<String> {
        let mut lines = Vec::new();
        for flag in command.visible_flags() {
            let meta = self.flag_meta(command, flag);
            if let Some(short) = flag.short_token() {
                lines.push(format!("{} {}", short, meta));
            }
            lines.push(format!("{} {}", flag.long_token(), meta));
        }
        lines
    }

    /// `<description>[|<options>]|@<kind>|<long token>`
    ///
    /// The trailing long token identifies the flag whichever form was typed.
    fn flag_meta(&self, command: &CompletionCommand, flag: &Flag) -> String {
        let description = self
            .sanitizer
            .sanitize_command(flag.summary_text(), &command.origin)
            .replace('|', "/");

        let kind = match (flag.kind, flag.multiple) {
            (FlagKind::Boolean, _) => "@boolean",
            (FlagKind::Option, true) => "@option-multiple",
            (FlagKind::Option, false) => "@option",
        };

        match flag.value_completion() {
            ValueCompletion::Static(values) => {
                let dialect = self.sanitizer.dialect();
                let options: Vec<String> = values.iter().map(|v| dialect.escape(v)).collect();
                format!(
                    "{}|{}|{}|{}",
                    description,
                    options.join(","),
                    kind,
                    flag.long_token()
                )
            }
            ValueCompletion::None | ValueCompletion::Dynamic { .. } | ValueCompletion::Files => {
                format!("{}|{}|{}", description, kind, flag.long_token())
            }
        }
    }

    fn registrations(&self) -> String {
        std::iter::once(&self.registry.bin)
            .chain(self.registry.bin_aliases.iter())
            .map(|name| {
                format!(
                    "complete -o default -F _{}_autocomplete {}",
                    self.registry.bin, name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn entry_line(id: &str, text: &str) -> String {
    if text.is_empty() {
        id.to_string()
    } else {
        format!("{} {}", id, text)
    }
}

/// Name of the variable holding a command's flag metadata
pub fn flag_variable(id: &str) -> String {
    let suffix: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("__flags_{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocomplete_core::{Command, FlagCompletion, Plugin};

    fn deploy_registry() -> Registry {
        Registry::new("mycli").with_plugin(
            Plugin::new("deploy")
                .with_command(
                    Command::new("deploy")
                        .with_summary("Deploy a project")
                        .with_flag(
                            Flag::option("metadata")
                                .with_char('m')
                                .with_summary("Metadata to deploy")
                                .repeatable(),
                        )
                        .with_flag(
                            Flag::option("api-version")
                                .with_char('a')
                                .with_summary("API version"),
                        )
                        .with_flag(Flag::boolean("json").with_summary("Format output as json"))
                        .with_flag(
                            Flag::boolean("ignore-errors")
                                .with_char('i')
                                .with_summary("Ignore errors"),
                        ),
                )
                .with_command(
                    Command::new("deploy:functions")
                        .with_summary("Deploy functions")
                        .with_flag(Flag::option("branch").with_char('b')),
                ),
        )
    }

    #[test]
    fn test_commands_block() {
        let registry = deploy_registry();
        let generator = BashGenerator::new(&registry);
        assert_eq!(
            generator.commands_block(),
            "deploy -m --metadata -a --api-version --json -i --ignore-errors\ndeploy:functions -b --branch"
        );
        assert!(generator.generate().contains(
            "  local commands=\"\ndeploy -m --metadata -a --api-version --json -i --ignore-errors\ndeploy:functions -b --branch\n\"\n"
        ));
    }

    #[test]
    fn test_alias_registrations() {
        let registry = deploy_registry().with_bin_alias("x").with_bin_alias("y");
        let script = BashGenerator::new(&registry).generate();
        let lines: Vec<&str> = script.lines().collect();
        let primary = lines
            .iter()
            .position(|l| *l == "complete -o default -F _mycli_autocomplete mycli")
            .unwrap();
        assert_eq!(
            &lines[primary + 1..],
            &[
                "complete -o default -F _mycli_autocomplete x",
                "complete -o default -F _mycli_autocomplete y",
            ]
        );
    }

    #[test]
    fn test_no_alias_registrations() {
        let registry = deploy_registry();
        let script = BashGenerator::new(&registry).generate();
        assert_eq!(script.matches("complete -o default -F").count(), 1);
        assert!(script.ends_with("complete -o default -F _mycli_autocomplete mycli\n"));
    }

    #[test]
    fn test_flag_metadata_lines() {
        let registry = deploy_registry();
        let generator = BashGenerator::new(&registry);
        let script = generator.generate();
        assert!(script.contains(
            "  local __flags_deploy=\"\n-m Metadata to deploy|@option-multiple|--metadata\n--metadata Metadata to deploy|@option-multiple|--metadata\n"
        ));
        assert!(script.contains(
            "-i Ignore errors|@boolean|--ignore-errors\n--ignore-errors Ignore errors|@boolean|--ignore-errors\n"
        ));
        assert!(script.contains("--json Format output as json|@boolean|--json\n"));
        assert!(script.contains(
            "  local __flags_deploy_functions=\"\n-b |@option|--branch\n--branch |@option|--branch\n\"\n"
        ));
    }

    #[test]
    fn test_static_options_in_metadata() {
        let registry = Registry::new("mycli").with_plugin(
            Plugin::new("core").with_command(
                Command::new("config:set")
                    .with_flag(
                        Flag::option("target")
                            .with_summary("Target | environment")
                            .with_options(["dev", "prod"]),
                    )
                    .with_flag(
                        Flag::option("branch")
                            .with_completion(FlagCompletion::dynamic("git branch")),
                    ),
            ),
        );
        let script = BashGenerator::new(&registry).generate();
        assert!(script.contains("--target Target / environment|dev,prod|@option|--target\n"));
        assert!(script.contains("--branch |@option|--branch\n"));
    }

    #[test]
    fn test_topics_and_summaries() {
        let registry = deploy_registry();
        let generator = BashGenerator::new(&registry);
        assert_eq!(generator.topics_block(), "deploy Deploy a project");
        assert_eq!(
            generator.summaries_block(),
            "deploy Deploy a project\ndeploy:functions Deploy functions"
        );
    }

    #[test]
    fn test_hidden_items_excluded() {
        let registry = deploy_registry().with_plugin(
            Plugin::new("internal")
                .with_command(Command::new("secret").hide())
                .with_command(
                    Command::new("status").with_flag(Flag::boolean("debug-internals").hide()),
                ),
        );
        let script = BashGenerator::new(&registry).generate();
        assert!(!script.contains("secret"));
        assert!(!script.contains("debug-internals"));
        assert!(script.contains("\nstatus\n"));
    }

    #[test]
    fn test_summaries_are_sanitized() {
        let registry = Registry::new("mycli").with_plugin(Plugin::new("core").with_command(
            Command::new("run").with_summary("Run \"it\" `now` [fast]\nsecond line"),
        ));
        let summaries = BashGenerator::new(&registry).summaries_block();
        assert_eq!(summaries, r#"run Run \\\"it\\\" \\\`now\\\` \\[fast\\]"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_shown_once() {
        let registry = Registry::new("mycli").with_plugin(
            Plugin::new("core").with_command(Command::new("copy").with_summary(r"Copy to C:\dir")),
        );
        let summaries = BashGenerator::new(&registry).summaries_block();
        assert_eq!(summaries, r"copy Copy to C:\\dir");

        let output = std::process::Command::new("bash")
            .arg("-c")
            .arg(format!("printf '%s' \"{}\"", summaries))
            .output()
            .unwrap();
        assert_eq!(String::from_utf8(output.stdout).unwrap(), r"copy Copy to C:\dir");
    }

    #[test]
    fn test_separator_and_idempotence() {
        let mut registry = deploy_registry();
        registry.topic_separator = " ".to_string();
        let generator = BashGenerator::new(&registry);
        let first = generator.generate();
        assert!(first.contains("  local separator=\" \"\n"));
        assert_eq!(first, BashGenerator::new(&registry).generate());
        assert_eq!(first, generator.generate());
    }

    #[test]
    fn test_flag_summary_templates() {
        let registry = Registry::new("mycli").with_plugin(Plugin::new("core").with_command(
            Command::new("deploy")
                .with_alias("ship")
                .with_flag(Flag::boolean("json").with_summary("Print <%= command.id %> as json")),
        ));
        let script = BashGenerator::new(&registry).generate();
        assert!(script.contains("  local __flags_deploy=\"\n--json Print deploy as json|@boolean|--json\n\"\n"));
        assert!(script.contains("  local __flags_ship=\"\n--json Print deploy as json|@boolean|--json\n\"\n"));
    }

    /// Source the script in bash and complete `line`, returning the bare candidates
    #[cfg(unix)]
    fn complete(script: &str, line: &str) -> Vec<String> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mycli.bash");
        std::fs::write(&path, script).unwrap();

        let output = std::process::Command::new("bash")
            .arg("-c")
            .arg(
                r#"source "$1"; COMP_LINE="$2"; COMP_POINT=${#COMP_LINE}; COMP_TYPE=37; _mycli_autocomplete; printf '%s\n' "${COMPREPLY[@]}""#,
            )
            .arg("bash")
            .arg(&path)
            .arg(line)
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        String::from_utf8(output.stdout)
            .unwrap()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_used_flags_in_bash() {
        let registry = Registry::new("mycli").with_plugin(
            Plugin::new("core").with_command(
                Command::new("deploy")
                    .with_flag(
                        Flag::option("metadata")
                            .with_char('m')
                            .with_summary("Metadata to deploy")
                            .repeatable(),
                    )
                    .with_flag(Flag::boolean("json"))
                    .with_flag(Flag::boolean("verbose").with_char('v'))
                    .with_flag(Flag::option("target").with_options(["dev", "prod"])),
            ),
        );
        let script = BashGenerator::new(&registry).generate();

        assert_eq!(
            complete(&script, "mycli deploy --"),
            vec!["--metadata", "--json", "--verbose", "--target"]
        );

        // Repeatable flags stay available after a value was given
        assert_eq!(
            complete(&script, "mycli deploy -m x --"),
            vec!["--metadata", "--json", "--verbose", "--target"]
        );

        // Flags with identical metadata are still told apart
        assert_eq!(
            complete(&script, "mycli deploy --json --"),
            vec!["--metadata", "--verbose", "--target"]
        );

        // The short form marks the long form used and vice versa
        assert_eq!(
            complete(&script, "mycli deploy -v -"),
            vec!["-m", "--metadata", "--json", "--target"]
        );
        assert_eq!(
            complete(&script, "mycli deploy --verbose --target=dev -"),
            vec!["-m", "--metadata", "--json"]
        );

        assert_eq!(complete(&script, "mycli deploy --target "), vec!["dev", "prod"]);
    }

    #[test]
    fn test_flag_variable() {
        assert_eq!(flag_variable("deploy"), "__flags_deploy");
        assert_eq!(flag_variable("deploy:functions"), "__flags_deploy_functions");
        assert_eq!(flag_variable("org:api-version"), "__flags_org_api_version");
    }
}
