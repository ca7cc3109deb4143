//! Early-exit signalling for operator-driven aborts.

/// Result of a step that the operator may decline.
///
/// Declining is not an error: the run ends with exit code 0 and the carried
/// message is shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Proceed(T),
    Abort(String),
}

impl<T> Flow<T> {
    pub fn is_abort(&self) -> bool {
        matches!(self, Flow::Abort(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Flow::Proceed(value) => Flow::Proceed(f(value)),
            Flow::Abort(reason) => Flow::Abort(reason),
        }
    }
}

/// Unwrap a [`Flow::Proceed`] or return the abort from the enclosing function.
#[macro_export]
macro_rules! proceed {
    ($flow:expr) => {
        match $flow {
            $crate::flow::Flow::Proceed(value) => value,
            $crate::flow::Flow::Abort(reason) => return Ok($crate::flow::Flow::Abort(reason)),
        }
    };
}
