use crate::balance::check_balance;
use crate::config::Config;
use crate::error::ValidationOutcome;
use crate::version::check_version;

/// Runs the version check, then the brace check, stopping at the first failure.
///
/// A pipeline holds only its [`Config`]; each call to [`Pipeline::validate`]
/// keeps its scan state local, so one pipeline can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validate(&self, source: &str) -> ValidationOutcome {
        let outcome = check_version(source, &self.config).and_then(|()| check_balance(source));
        match &outcome {
            Ok(()) => tracing::debug!("source passed validation"),
            Err(e) => tracing::debug!(kind = %e.kind(), line = e.line(), "source failed validation"),
        }
        outcome
    }
}

/// Validate `source` with the default configuration.
pub fn validate(source: &str) -> ValidationOutcome {
    Pipeline::default().validate(source)
}
