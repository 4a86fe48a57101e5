/// What the engine does when a command fails to parse or decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing command and return its error.
    #[default]
    Abort,
    /// Log the error, leave the buffer untouched and continue.
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub error_policy: ErrorPolicy,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }
}
