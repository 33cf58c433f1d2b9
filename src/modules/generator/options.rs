//! Flag value lookup behind `autocomplete:options`
//!
//! Generated zsh scripts call back into the CLI to list values for flags
//! with dynamic completions. Lookups never fail from the shell's point of
//! view: any problem yields an empty list.

use async_trait::async_trait;
use autocomplete_core::{
    AutocompleteError, CommandLoader, FlagCompletion, Registry, Result, ValueCompletion,
};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Command name the generated scripts invoke for dynamic values
pub const OPTIONS_COMMAND: &str = "autocomplete:options";

/// Default time a dynamic completion command may run
pub const DEFAULT_OPTIONS_TIMEOUT: Duration = Duration::from_secs(10);

/// One dynamic lookup as requested by a completion script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsRequest {
    /// Command id (or alias) being completed
    pub command_id: String,

    /// Flag name, with or without dashes
    pub flag: String,

    /// Words typed so far
    pub current_line: String,
}

impl OptionsRequest {
    pub fn new(command_id: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            flag: flag.into(),
            current_line: String::new(),
        }
    }

    pub fn with_current_line(mut self, line: impl Into<String>) -> Self {
        self.current_line = line.into();
        self
    }
}

/// Computes values for dynamic completions
#[async_trait]
pub trait DynamicOptions: Send + Sync {
    async fn options(
        &self,
        completion: &FlagCompletion,
        request: &OptionsRequest,
    ) -> Result<Vec<String>>;
}

/// Runs the completion's `command` through the platform shell
#[derive(Debug, Clone)]
pub struct ShellOptions {
    timeout: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_OPTIONS_TIMEOUT,
        }
    }
}

impl ShellOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(script: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(script);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(script);
            cmd
        }
    }
}

#[async_trait]
impl DynamicOptions for ShellOptions {
    async fn options(
        &self,
        completion: &FlagCompletion,
        request: &OptionsRequest,
    ) -> Result<Vec<String>> {
        let script = completion.command.as_deref().ok_or_else(|| {
            AutocompleteError::DynamicOptions(format!(
                "flag '{}' of '{}' has no completion command",
                request.flag, request.command_id
            ))
        })?;

        let mut cmd = Self::command(script);
        cmd.env("AUTOCOMPLETE_COMMAND_ID", &request.command_id)
            .env("AUTOCOMPLETE_FLAG", &request.flag)
            .env("AUTOCOMPLETE_CURRENT_LINE", &request.current_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AutocompleteError::DynamicOptions(format!(
                    "'{}' timed out after {}s",
                    script,
                    self.timeout.as_secs()
                )))
            }
        };

        if !output.status.success() {
            return Err(AutocompleteError::DynamicOptions(format!(
                "'{}' exited with {}",
                script, output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Values to offer for `request`; empty on any failure
pub async fn resolve_flag_options(
    registry: &Registry,
    loader: &dyn CommandLoader,
    provider: &dyn DynamicOptions,
    request: &OptionsRequest,
) -> Vec<String> {
    match lookup(registry, loader, provider, request).await {
        Ok(values) => values,
        Err(e) => {
            debug!(command = %request.command_id, flag = %request.flag, error = %e, "no flag options");
            Vec::new()
        }
    }
}

async fn lookup(
    registry: &Registry,
    loader: &dyn CommandLoader,
    provider: &dyn DynamicOptions,
    request: &OptionsRequest,
) -> Result<Vec<String>> {
    let cached = registry
        .find_command(&request.command_id)
        .ok_or_else(|| AutocompleteError::UnknownCommand(request.command_id.clone()))?;
    let command = loader.load(cached).await?;
    let flag = command.find_flag(&request.flag).ok_or_else(|| {
        AutocompleteError::UnknownFlag(command.id.clone(), request.flag.clone())
    })?;

    match flag.value_completion() {
        ValueCompletion::Static(values) => Ok(values.to_vec()),
        ValueCompletion::Dynamic { .. } => match &flag.completion {
            Some(completion) => provider.options(completion, request).await,
            None => Ok(Vec::new()),
        },
        ValueCompletion::None | ValueCompletion::Files => Ok(Vec::new()),
    }
}
