//! Summary sanitizer
//!
//! Summaries end up inside quoted shell strings, so every dialect gets its
//! own escaping. Only the first line survives.

use autocomplete_types::Shell;

use crate::template::TemplateContext;

/// Quoting rules a summary is escaped for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Bash,
    /// `_arguments`/`_values` specs, which unescape once more
    Zsh,
    PowerShell,
}

impl From<Shell> for Dialect {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => Dialect::Bash,
            Shell::Zsh => Dialect::Zsh,
            Shell::Powershell => Dialect::PowerShell,
        }
    }
}

impl Dialect {
    /// Representation of a missing summary
    ///
    /// PowerShell's `CompletionResult` rejects empty tooltips.
    pub fn empty(&self) -> &'static str {
        match self {
            Dialect::Bash | Dialect::Zsh => "",
            Dialect::PowerShell => " ",
        }
    }

    /// Escape reserved characters without templating or truncation
    pub fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match (self, c) {
                (Dialect::Bash, '\\') => out.push_str("\\\\"),
                (Dialect::Zsh, '\\') => out.push_str("\\\\\\\\"),
                (Dialect::Bash | Dialect::Zsh, '"' | '`' | '$') => {
                    out.push_str("\\\\\\");
                    out.push(c);
                }
                (Dialect::Bash | Dialect::Zsh, '[' | ']') => {
                    out.push_str("\\\\");
                    out.push(c);
                }
                (Dialect::PowerShell, '"') => out.push_str("\"\""),
                (Dialect::PowerShell, '`') => out.push_str("``"),
                (Dialect::PowerShell, '$') => out.push_str("`$"),
                _ => out.push(c),
            }
        }
        out
    }
}

/// Expands templates and escapes summaries for one dialect
#[derive(Debug, Clone)]
pub struct Sanitizer {
    dialect: Dialect,
    context: TemplateContext,
}

impl Sanitizer {
    pub fn new(dialect: Dialect, context: TemplateContext) -> Self {
        Self { dialect, context }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Sanitize a summary; never fails
    pub fn sanitize(&self, raw: Option<&str>) -> String {
        self.sanitize_with(raw, &self.context)
    }

    /// Sanitize a summary belonging to command `id`
    pub fn sanitize_command(&self, raw: Option<&str>, id: &str) -> String {
        self.sanitize_with(raw, &self.context.for_command(id))
    }

    fn sanitize_with(&self, raw: Option<&str>, context: &TemplateContext) -> String {
        let Some(raw) = raw.filter(|s| !s.is_empty()) else {
            return self.dialect.empty().to_string();
        };

        let rendered = context.render(raw);
        let first_line = rendered.lines().next().unwrap_or_default();
        let escaped = self.dialect.escape(first_line.trim_end_matches('\r'));

        if escaped.is_empty() {
            self.dialect.empty().to_string()
        } else {
            escaped
        }
    }
}
