//! PowerShell completion generator
//!
//! The command tree is embedded as nested hashtables. The registered script
//! block walks them with the words typed so far.

use autocomplete_core::{
    AutocompleteError, CommandSet, CommandTree, CompletionCommand, Flag, Registry, Result,
    TreeNode, ValueCompletion,
};
use std::collections::BTreeMap;

use crate::sanitize::{Dialect, Sanitizer};
use crate::template::TemplateContext;

const HELP_SUMMARY: &str = "Show help for command";

/// Generates the PowerShell completion script
pub struct PowerShellGenerator<'a> {
    registry: &'a Registry,
    commands: CommandSet,
    sanitizer: Sanitizer,
}

impl<'a> PowerShellGenerator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            commands: CommandSet::from_registry(registry),
            sanitizer: Sanitizer::new(
                Dialect::PowerShell,
                TemplateContext::from_registry(registry),
            ),
        }
    }

    /// Render the full script
    pub fn generate(&self) -> Result<String> {
        let tree = CommandTree::build(&self.commands);
        Ok(format!(
            r#"using namespace System.Management.Automation
using namespace System.Management.Automation.Language

$scriptblock = {{
    param($WordToComplete, $CommandAst, $CursorPosition)

    $Commands =
{hashtable}

    # Get the current mode
    $Mode = (Get-PSReadLineKeyHandler | Where-Object {{ $_.Key -eq "Tab" }}).Function

    function New-Completion($Text, $Tooltip) {{
        New-Object -Type CompletionResult -ArgumentList `
            $($Mode -eq "MenuComplete" ? "$Text " : "$Text"),
            $Text,
            "ParameterValue",
            $($Tooltip ? $Tooltip : " ")
    }}

    # Everything after the executable name, without the word being completed
    $Elements = @($CommandAst.CommandElements | Select-Object -Skip 1 | ForEach-Object {{ $_.Extent.Text }})
    if ($WordToComplete -ne "" -and $Elements.Count -gt 0) {{
        $Elements = @($Elements | Select-Object -SkipLast 1)
    }}

    $CurrentLine = @()
    foreach ($Element in $Elements) {{
        if ($Element.StartsWith("-")) {{
            $CurrentLine += $Element
        }} else {{
            $CurrentLine += $Element -split ":"
        }}
    }}

    # A partially typed colon-separated id completes its last segment
    $WordPrefix = ""
    $Partial = $WordToComplete
    if (-not $WordToComplete.StartsWith("-") -and $WordToComplete.Contains(":")) {{
        $Index = $WordToComplete.LastIndexOf(":")
        $WordPrefix = $WordToComplete.Substring(0, $Index + 1)
        $Partial = $WordToComplete.Substring($Index + 1)
        $CurrentLine += $WordPrefix.TrimEnd(":") -split ":"
    }}

    # Walk the command tree; flags and positional values do not move the cursor
    $Node = $null
    $Flags = @()
    foreach ($Token in $CurrentLine) {{
        if ($Token.StartsWith("-")) {{
            $Flags += $Token
        }} elseif ($null -eq $Node) {{
            $Node = $Commands[$Token]
            if ($null -eq $Node) {{
                return
            }}
        }} elseif ($null -ne $Node[$Token]) {{
            $Node = $Node[$Token]
        }}
    }}

    # No command yet, suggest top-level topics and commands
    if ($null -eq $Node) {{
        $Commands.GetEnumerator() | Where-Object {{
            $_.Key.StartsWith($Partial)
        }} | Sort-Object -Property Key | ForEach-Object {{
            New-Completion "$WordPrefix$($_.Key)" ($_.Value._summary ?? $_.Value._command.summary)
        }}
        return
    }}

    $Command = $Node._command
    if ($null -ne $Command) {{
        # Used flags by long name
        $Used = @($Flags | ForEach-Object {{
            $Name = ($_ -split "=")[0].TrimStart("-")
            if ($_ -notlike "--*") {{
                foreach ($Entry in $Command.flags.GetEnumerator()) {{
                    if ($Entry.Value.char -eq $Name) {{
                        $Name = $Entry.Key
                    }}
                }}
            }}
            $Name
        }})

        # Value of the previous flag
        $Previous = $CurrentLine.Count -gt 0 ? $CurrentLine[-1] : $null
        if ($null -ne $Previous -and $Previous.StartsWith("-") -and -not $Previous.Contains("=") -and -not $WordToComplete.StartsWith("-")) {{
            $Flag = $Command.flags[$Used[-1]]
            if ($null -ne $Flag -and $null -ne $Flag.options) {{
                $Flag.options | Where-Object {{ $_.StartsWith($WordToComplete) }} | Sort-Object | ForEach-Object {{
                    New-Completion $_ $_
                }}
                return
            }}
        }}

        if ($WordToComplete -like "-*") {{
            # Flags not used yet, unless they can be repeated
            $Command.flags.GetEnumerator() | Sort-Object -Property Key | Where-Object {{
                $_.Value.multiple -eq $true -or $Used -notcontains $_.Key
            }} | ForEach-Object {{
                $Long = "--$($_.Key)"
                if ($Long.StartsWith($WordToComplete)) {{
                    New-Completion $Long $_.Value.summary
                }}
                if ($null -ne $_.Value.char) {{
                    $Short = "-$($_.Value.char)"
                    if ($Short.StartsWith($WordToComplete)) {{
                        New-Completion $Short $_.Value.summary
                    }}
                }}
            }}
            return
        }}

        # Co-topic: what remains without "_command" are its subcommands
        $Node.Remove("_command")
    }} else {{
        $Node.Remove("_summary")
    }}

    $Node.GetEnumerator() | Where-Object {{
        $_.Key.StartsWith($Partial)
    }} | Sort-Object -Property Key | ForEach-Object {{
        New-Completion "$WordPrefix$($_.Key)" ($_.Value._summary ?? $_.Value._command.summary)
    }}
}}

Register-ArgumentCompleter -Native -CommandName {bins} -ScriptBlock $scriptblock
"#,
            hashtable = self.hashtable(&tree)?,
            bins = self.command_names(),
        ))
    }

    fn command_names(&self) -> String {
        if self.registry.bin_aliases.is_empty() {
            return self.registry.bin.clone();
        }
        let names: Vec<String> = std::iter::once(&self.registry.bin)
            .chain(self.registry.bin_aliases.iter())
            .map(|name| format!("\"{}\"", name))
            .collect();
        format!("@({})", names.join(", "))
    }

    /// Nested hashtable literal for the whole tree
    pub fn hashtable(&self, tree: &CommandTree) -> Result<String> {
        let mut out = String::from("@{\n");
        self.render_children(tree.roots(), 1, &mut out)?;
        out.push('}');
        Ok(out)
    }

    fn render_children(
        &self,
        children: &BTreeMap<String, TreeNode>,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        let pad = "  ".repeat(depth);
        for (segment, node) in children {
            out.push_str(&format!("{}\"{}\" = @{{\n", pad, segment));
            match node.command.as_deref() {
                Some(id) => {
                    let command = self.commands.find_command(id).ok_or_else(|| {
                        AutocompleteError::Internal(format!(
                            "command tree references unknown command '{}'",
                            id
                        ))
                    })?;
                    self.render_command(command, depth + 1, out);
                }
                None => {
                    let summary = self.sanitizer.sanitize(Some(&node.topic_description()));
                    out.push_str(&format!("{}  \"_summary\" = \"{}\"\n", pad, summary));
                }
            }
            self.render_children(&node.children, depth + 1, out)?;
            out.push_str(&format!("{}}}\n", pad));
        }
        Ok(())
    }

    fn render_command(&self, command: &CompletionCommand, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        let summary = self
            .sanitizer
            .sanitize_command(command.summary.as_deref(), &command.origin);

        out.push_str(&format!("{}\"_command\" = @{{\n", pad));
        out.push_str(&format!("{}  \"summary\" = \"{}\"\n", pad, summary));
        out.push_str(&format!("{}  \"flags\" = @{{\n", pad));
        for flag in command.visible_flags() {
            out.push_str(&format!("{}    {}\n", pad, self.flag_entry(command, flag)));
        }
        if !command.declares_help() {
            out.push_str(&format!(
                "{}    \"help\" = @{{ \"summary\" = \"{}\" }}\n",
                pad, HELP_SUMMARY
            ));
        }
        out.push_str(&format!("{}  }}\n", pad));
        out.push_str(&format!("{}}}\n", pad));
    }

    /// `"<name>" = @{ "summary" = ...[; "char" = ...][; "multiple" = $true][; "options" = @(...)] }`
    pub fn flag_entry(&self, command: &CompletionCommand, flag: &Flag) -> String {
        let mut fields = vec![format!(
            "\"summary\" = \"{}\"",
            self.sanitizer
                .sanitize_command(flag.summary_text(), &command.origin)
        )];
        if let Some(c) = flag.char {
            fields.push(format!("\"char\" = \"{}\"", c));
        }
        if flag.multiple {
            fields.push("\"multiple\" = $true".to_string());
        }
        if let ValueCompletion::Static(values) = flag.value_completion() {
            let dialect = self.sanitizer.dialect();
            let values: Vec<String> = values
                .iter()
                .map(|v| format!("\"{}\"", dialect.escape(v)))
                .collect();
            fields.push(format!("\"options\" = @({})", values.join(", ")));
        }
        format!("\"{}\" = @{{ {} }}", flag.name, fields.join("; "))
    }
}
