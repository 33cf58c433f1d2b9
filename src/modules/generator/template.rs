//! Template expansion for command summaries

use autocomplete_core::Registry;
use once_cell::sync::Lazy;
use regex::Regex;

/// Template expression: <%= config.bin %>
static TEMPLATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<%=\s*([A-Za-z_][A-Za-z0-9_.]*)\s*%>").unwrap());

/// Values a summary template may reference
///
/// Only the keys below are expanded; anything else is left verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    pub bin: String,
    pub name: String,
    pub version: String,
    pub command_id: Option<String>,
}

impl TemplateContext {
    /// Context exposing the CLI's own configuration
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            bin: registry.bin.clone(),
            name: registry.name.clone(),
            version: registry.version.clone(),
            command_id: None,
        }
    }

    /// Same context, scoped to one command
    pub fn for_command(&self, id: &str) -> Self {
        Self {
            command_id: Some(id.to_string()),
            ..self.clone()
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "config.bin" => Some(&self.bin),
            "config.name" => Some(&self.name),
            "config.version" => Some(&self.version),
            "command.id" => self.command_id.as_deref(),
            _ => None,
        }
    }

    /// Expand every known template expression in `text`
    pub fn render(&self, text: &str) -> String {
        TEMPLATE_PATTERN
            .replace_all(text, |cap: &regex::Captures| match self.lookup(&cap[1]) {
                Some(value) => value.to_string(),
                None => cap[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        TemplateContext {
            bin: "mycli".to_string(),
            name: "@acme/mycli".to_string(),
            version: "1.2.3".to_string(),
            command_id: None,
        }
    }

    #[test]
    fn test_render_config_keys() {
        let ctx = context();
        assert_eq!(
            ctx.render("Run <%= config.bin %> v<%=config.version%>"),
            "Run mycli v1.2.3"
        );
        assert_eq!(ctx.render("<%= config.name %>"), "@acme/mycli");
    }

    #[test]
    fn test_render_command_id() {
        let ctx = context();
        assert_eq!(ctx.render("<%= command.id %>"), "<%= command.id %>");
        assert_eq!(
            ctx.for_command("deploy").render("<%= config.bin %> <%= command.id %>"),
            "mycli deploy"
        );
    }

    #[test]
    fn test_unknown_keys_untouched() {
        let ctx = context();
        assert_eq!(ctx.render("<%= process.exit %>"), "<%= process.exit %>");
        assert_eq!(ctx.render("<% code %>"), "<% code %>");
    }
}
