use crate::domain::operation::OperationLogEntry;

/// What the bot says back: a message, the options the user may pick from
/// (in display order) and, for the admin export, the report to attach.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    pub text: String,
    pub options: Vec<String>,
    pub report: Option<Vec<OperationLogEntry>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_report(mut self, entries: Vec<OperationLogEntry>) -> Self {
        self.report = Some(entries);
        self
    }
}

/// Result of feeding one input into a conversational flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<S> {
    /// The flow waits for more input in `state`.
    Continue { state: S, reply: Reply },
    /// The flow reached a terminal state; its session must be dropped.
    Finished { reply: Reply },
}

impl<S> Step<S> {
    pub fn stay(state: S, reply: Reply) -> Self {
        Step::Continue { state, reply }
    }

    pub fn finish(reply: Reply) -> Self {
        Step::Finished { reply }
    }

    pub fn reply(&self) -> &Reply {
        match self {
            Step::Continue { reply, .. } | Step::Finished { reply } => reply,
        }
    }

    pub fn state(&self) -> Option<&S> {
        match self {
            Step::Continue { state, .. } => Some(state),
            Step::Finished { .. } => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Step::Finished { .. })
    }
}
