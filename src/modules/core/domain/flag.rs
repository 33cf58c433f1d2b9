//! Flag definitions

use autocomplete_types::{CompletionKind, FlagKind};
use serde::{Deserialize, Serialize};

/// Default lifetime of cached dynamic completion results (24h)
pub const DEFAULT_CACHE_DURATION: u64 = 60 * 60 * 24;

/// Flag declared on a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    /// Long name without the leading `--` (defaults to the manifest key)
    #[serde(default)]
    pub name: String,

    /// Single-letter short form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char: Option<char>,

    /// Boolean switch or value-taking option
    #[serde(rename = "type")]
    pub kind: FlagKind,

    /// Allowed values (legacy static completion source)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Whether the flag may be repeated on the command line
    #[serde(default)]
    pub multiple: bool,

    /// Hidden flags are never completed
    #[serde(default)]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Completion metadata, usually only present on loaded commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<FlagCompletion>,
}

/// Completion definition attached to an option flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagCompletion {
    #[serde(rename = "type")]
    pub kind: CompletionKind,

    /// Values for static completions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Seconds a dynamic result stays cached by the generated script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_duration: Option<u64>,

    /// Shell command printing one value per line (dynamic completions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// What a generator should offer for a flag's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCompletion<'a> {
    /// The flag takes no value
    None,
    /// Fixed set of values
    Static(&'a [String]),
    /// Values computed by `autocomplete:options` at completion time
    Dynamic { cache_duration: u64 },
    /// Free text, completed as file names
    Files,
}

impl Flag {
    /// Create a boolean flag
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Boolean)
    }

    /// Create an option flag
    pub fn option(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Option)
    }

    fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            char: None,
            kind,
            options: Vec::new(),
            multiple: false,
            hidden: false,
            summary: None,
            description: None,
            completion: None,
        }
    }

    /// Set the short form
    pub fn with_char(mut self, c: char) -> Self {
        self.char = Some(c);
        self
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the allowed values
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Attach completion metadata
    pub fn with_completion(mut self, completion: FlagCompletion) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Allow the flag to be repeated
    pub fn repeatable(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Hide the flag from completions
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Summary, falling back to the description
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref().or(self.description.as_deref())
    }

    /// `--name`
    pub fn long_token(&self) -> String {
        format!("--{}", self.name)
    }

    /// `-c`, if the flag has a short form
    pub fn short_token(&self) -> Option<String> {
        self.char.map(|c| format!("-{}", c))
    }

    /// Returns true if `token` (with or without dashes) names this flag
    pub fn matches(&self, token: &str) -> bool {
        let bare = token.trim_start_matches('-');
        bare == self.name || self.char.map(|c| bare == c.to_string()).unwrap_or(false)
    }

    /// Resolve how the flag's value is completed
    pub fn value_completion(&self) -> ValueCompletion<'_> {
        match self.kind {
            FlagKind::Boolean => ValueCompletion::None,
            FlagKind::Option => match &self.completion {
                Some(c) if c.kind == CompletionKind::Dynamic => ValueCompletion::Dynamic {
                    cache_duration: c.cache_duration.unwrap_or(DEFAULT_CACHE_DURATION),
                },
                Some(c) if !c.options.is_empty() => ValueCompletion::Static(&c.options),
                _ if !self.options.is_empty() => ValueCompletion::Static(&self.options),
                _ => ValueCompletion::Files,
            },
        }
    }
}

impl FlagCompletion {
    /// Static completion with a fixed value set
    pub fn fixed<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: CompletionKind::Static,
            options: options.into_iter().map(Into::into).collect(),
            cache_duration: None,
            command: None,
        }
    }

    /// Dynamic completion computed by running `command`
    pub fn dynamic(command: impl Into<String>) -> Self {
        Self {
            kind: CompletionKind::Dynamic,
            options: Vec::new(),
            cache_duration: None,
            command: Some(command.into()),
        }
    }

    /// Override the cache lifetime of a dynamic completion
    pub fn with_cache_duration(mut self, seconds: u64) -> Self {
        self.cache_duration = Some(seconds);
        self
    }
}
