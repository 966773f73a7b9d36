use std::fmt;
use thiserror::Error;

/// A boxed error returned by notification handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for mediator
#[derive(Debug, Error)]
pub enum Error {
    /// No handler is registered for the request type.
    #[error("handler not found: `{0}`")]
    NotFound(&'static str),

    /// More than one handler is registered for the request type.
    #[error("ambiguous handler: {count} handlers registered for `{message}`")]
    Ambiguous { message: &'static str, count: usize },

    /// A notification handler failed, `source` is the error it returned.
    #[error("handler `{handler}` failed: {source}")]
    Execution {
        handler: &'static str,
        #[source]
        source: BoxError,
    },

    /// One or more notification handlers failed while publishing fail-soft.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// A configuration value could not be understood.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Handler not found.
    NotFound,
    /// Multiple handlers for a single request.
    Ambiguous,
    /// A handler returned an error.
    Execution,
    /// Several handler errors collected from one publish.
    Aggregate,
    /// Invalid configuration.
    Config,
}

impl ErrorKind {
    /// Returns the description of the error kind.
    pub fn as_str(&self) -> &str {
        match *self {
            ErrorKind::NotFound => "handler not found",
            ErrorKind::Ambiguous => "ambiguous handler",
            ErrorKind::Execution => "handler failed",
            ErrorKind::Aggregate => "multiple handlers failed",
            ErrorKind::Config => "invalid configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub(crate) fn execution(handler: &'static str, source: BoxError) -> Self {
        Error::Execution { handler, source }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Ambiguous { .. } => ErrorKind::Ambiguous,
            Error::Execution { .. } => ErrorKind::Execution,
            Error::Aggregate(_) => ErrorKind::Aggregate,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Consumes the error and returns the handler error it carries, if any.
    ///
    /// The returned error is exactly what the handler produced and can be
    /// downcast back to its concrete type.
    pub fn into_handler_error(self) -> Option<BoxError> {
        match self {
            Error::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Every handler failure from a single fail-soft publish, in registration order.
#[derive(Debug)]
pub struct AggregateError {
    notification: &'static str,
    errors: Vec<Error>,
}

impl AggregateError {
    pub(crate) fn new(notification: &'static str, errors: Vec<Error>) -> Self {
        AggregateError {
            notification,
            errors,
        }
    }

    /// Name of the notification type that was published.
    pub fn notification(&self) -> &'static str {
        self.notification
    }

    /// The collected handler errors.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Number of handlers that failed.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false` for errors produced by the mediator.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the aggregate and returns the collected errors.
    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} handler(s) failed for `{}`",
            self.errors.len(),
            self.notification
        )?;

        for error in &self.errors {
            write!(f, "; {}", error)?;
        }

        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("out of milk")]
    struct OutOfMilk;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Error::NotFound("Ping").kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::Ambiguous {
                message: "Ping",
                count: 2
            }
            .kind(),
            ErrorKind::Ambiguous
        );
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Config);
        assert_eq!(ErrorKind::NotFound.as_str(), "handler not found");
    }

    #[test]
    fn display_includes_message_type() {
        let err = Error::NotFound("app::AskFavorite");
        assert_eq!(err.to_string(), "handler not found: `app::AskFavorite`");

        let err = Error::Ambiguous {
            message: "app::AskFavorite",
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "ambiguous handler: 3 handlers registered for `app::AskFavorite`"
        );
    }

    #[test]
    fn execution_keeps_original_source() {
        let err = Error::execution("Barista", Box::new(OutOfMilk));
        assert_eq!(err.to_string(), "handler `Barista` failed: out of milk");

        let source = err.into_handler_error().unwrap();
        assert_eq!(source.downcast_ref::<OutOfMilk>(), Some(&OutOfMilk));
    }

    #[test]
    fn aggregate_lists_every_failure() {
        let aggregate = AggregateError::new(
            "BreakStarted",
            vec![
                Error::execution("A", Box::new(OutOfMilk)),
                Error::execution("B", "grinder jammed".into()),
            ],
        );

        assert_eq!(aggregate.len(), 2);
        assert_eq!(
            aggregate.to_string(),
            "2 handler(s) failed for `BreakStarted`; handler `A` failed: out of milk; handler `B` failed: grinder jammed"
        );

        let err = Error::from(aggregate);
        assert_eq!(err.kind(), ErrorKind::Aggregate);
    }
}
