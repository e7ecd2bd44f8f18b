//! Common error types.
//!
//! See [`InstallError`] and [`InstallErrorKind`] for details.
use std::fmt::Display;

/// Main error type for this crate.
#[derive(Debug, thiserror::Error)]
pub struct InstallError {
    kind: InstallErrorKind,
    context: String,
    source: Option<Box<dyn std::error::Error + 'static + Send + Sync>>,
}

impl InstallError {
    /// Creates a new error with the given error kind.
    pub fn new(kind: InstallErrorKind) -> Self {
        Self {
            kind,
            context: String::new(),
            source: None,
        }
    }

    /// Adds a source error.
    pub fn with_source<S>(mut self, source: S) -> Self
    where
        S: std::error::Error + 'static + Send + Sync,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Adds a string with a contextual description of the error.
    pub fn with_context<C>(mut self, value: C) -> Self
    where
        C: AsRef<str>,
    {
        if !self.context.is_empty() {
            self.context.push_str(": ");
        }
        self.context.push_str(value.as_ref());
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &InstallErrorKind {
        &self.kind
    }

    /// Returns the contextual description.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns whether the error kind is [`InstallErrorKind::Io`].
    pub fn is_io(&self) -> bool {
        self.as_io().is_some()
    }

    /// Returns a reference to the IO error when the kind is [`InstallErrorKind::Io`].
    pub fn as_io(&self) -> Option<&std::io::Error> {
        if matches!(self.kind, InstallErrorKind::Io) {
            if let Some(source) = &self.source {
                if let Some(error) = source.downcast_ref() {
                    return Some(error);
                }
            }
        }
        None
    }

    /// Returns the process exit code appropriate for the error kind.
    ///
    /// Domain status-check failures exit with 2; everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self.kind {
            InstallErrorKind::DomainUnavailable => 2,
            _ => 1,
        }
    }
}

impl Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.context.is_empty() {
            f.write_str(&self.context)?;
            f.write_str(": ")?;
        }

        self.kind.fmt(f)?;

        Ok(())
    }
}

impl From<InstallErrorKind> for InstallError {
    fn from(value: InstallErrorKind) -> Self {
        Self::new(value)
    }
}

impl From<std::io::Error> for InstallError {
    fn from(value: std::io::Error) -> Self {
        Self::new(InstallErrorKind::Io).with_source(value)
    }
}

impl From<AdditionalContext> for InstallError {
    fn from(value: AdditionalContext) -> Self {
        Self::new(InstallErrorKind::Other).with_source(value)
    }
}

/// Error category for [`InstallError`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InstallErrorKind {
    /// Input/Output error usually from [`std::io::Error`].
    #[error("input/output error")]
    Io,

    /// Invalid input or argument type to a function.
    #[error("invalid input or argument")]
    InvalidInput,

    /// Environment variable was missing or malformed.
    #[error("invalid environment variable")]
    InvalidEnvironmentVariable,

    /// The `package-info` descriptor could not be parsed or is incomplete.
    #[error("invalid package descriptor")]
    InvalidPackageInfo,

    /// A file declared by the package descriptor does not exist or is unreadable.
    #[error("missing package file")]
    MissingPackageFile,

    /// No `<domain>.xml` or `default.xml` exists in the package's
    /// configuration directory.
    #[error("no deployment configuration for domain")]
    MissingEnvConfig,

    /// The domain profile document could not be located.
    #[error("domain profile not found")]
    DomainProfileNotFound,

    /// The domain profile document could not be parsed.
    #[error("malformed domain profile")]
    MalformedDomainProfile,

    /// The domain did not pass the vendor status check.
    #[error("domain status check failed")]
    DomainUnavailable,

    /// A vendor tool invocation returned a non-zero exit status.
    #[error("vendor tool failed")]
    ToolFailure,

    /// A hook script is missing or returned a non-zero exit status.
    #[error("hook script failed")]
    HookFailure,

    /// The scaffold target already contains a package descriptor.
    #[error("package already exists")]
    PackageExists,

    /// Console/terminal prompt error.
    #[error("console/terminal error")]
    Terminal,

    /// Indicates a guided interactive session was aborted by the user.
    #[error("interrupted by user")]
    InterruptedByUser,

    /// Any other error.
    #[error("other")]
    Other,
}

/// Modify `Result<T, InstallError>` with context.
pub trait AddInstallContext<T> {
    /// Add context using the given string when Err.
    fn inst_context<C>(self, context: C) -> Result<T, InstallError>
    where
        C: AsRef<str>;

    /// Add context using the evaluated function when Err.
    fn inst_contextc<C, CT>(self, context: C) -> Result<T, InstallError>
    where
        C: FnOnce() -> CT,
        CT: AsRef<str>;
}

impl<T> AddInstallContext<T> for Result<T, InstallError> {
    fn inst_context<C>(self, context: C) -> Result<T, InstallError>
    where
        C: AsRef<str>,
    {
        self.map_err(|error| error.with_context(context.as_ref()))
    }

    fn inst_contextc<C, CT>(self, context: C) -> Result<T, InstallError>
    where
        C: FnOnce() -> CT,
        CT: AsRef<str>,
    {
        self.map_err(|error| error.with_context(context().as_ref()))
    }
}

/// Contains a contextual description of an error.
///
/// This isn't a real error, but allows injecting context in the error stack.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AdditionalContext {
    message: String,
    #[source]
    source: Box<dyn std::error::Error + Sync + Send + 'static>,
}

impl AdditionalContext {
    /// Creates a new context error with the given message and source error.
    pub fn new<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Sync + Send + 'static,
    {
        Self {
            message,
            source: Box::new(source),
        }
    }
}

/// Trait for wrapping errors in Result with descriptive context strings.
pub trait AddContext<T, E, A> {
    /// Map the error with an error containing the context string.
    fn with_context<C>(self, context: C) -> Result<T, A>
    where
        C: Into<String>;

    /// Map the error with an error containing the context string evaluated from a function.
    fn with_contextc<C, CT>(self, context: C) -> Result<T, A>
    where
        C: FnOnce(&E) -> CT,
        CT: Into<String>;
}

impl<T, E> AddContext<T, E, AdditionalContext> for Result<T, E>
where
    E: std::error::Error + Sync + Send + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T, AdditionalContext>
    where
        C: Into<String>,
    {
        self.map_err(|error| AdditionalContext::new(context.into(), error))
    }

    fn with_contextc<C, CT>(self, context: C) -> Result<T, AdditionalContext>
    where
        C: FnOnce(&E) -> CT,
        CT: Into<String>,
    {
        self.map_err(|error| AdditionalContext::new(context(&error).into(), error))
    }
}

/// Renders an error with its source chain, one line per cause.
pub fn format_error<E>(error: E) -> String
where
    E: std::error::Error,
{
    let mut buf = error.to_string();

    let mut error: Box<&dyn std::error::Error> = Box::new(&error);

    while let Some(source) = error.source() {
        error = Box::new(source);
        buf.push_str("\n↳");
        buf.push_str(&error.to_string());
    }

    buf
}
