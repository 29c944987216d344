use crate::version::{SUPPORTED_VERSION, Version};

/// Where a `#vhot` directive may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectivePolicy {
    /// The first directive anywhere in the file is used.
    #[default]
    FirstMatch,
    /// Only line 1 may hold the directive.
    FirstLine,
}

/// Settings for a validation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Highest language version accepted.
    pub supported_version: Version,
    pub directive_policy: DirectivePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supported_version: SUPPORTED_VERSION,
            directive_policy: DirectivePolicy::default(),
        }
    }
}

impl Config {
    pub fn with_supported_version(mut self, version: Version) -> Self {
        self.supported_version = version;
        self
    }

    pub fn with_directive_policy(mut self, policy: DirectivePolicy) -> Self {
        self.directive_policy = policy;
        self
    }
}
