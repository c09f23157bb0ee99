/// A parsed command line: a chain of stages connected by pipes, plus
/// optional redirection of the whole pipeline's input and output.
///
/// Produced by the parser, consumed by one loop iteration, then dropped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pipeline {
    /// One argv per stage; every stage is non-empty when `error` is None.
    pub stages: Vec<Vec<String>>,
    /// `< file` for the first stage.
    pub input: Option<String>,
    /// `> file` for the last stage.
    pub output: Option<String>,
    /// Trailing `&`.
    pub background: bool,
    /// Set instead of the other fields when the line did not parse.
    pub error: Option<String>,
}

impl Pipeline {
    pub fn parse_error(message: impl Into<String>) -> Self {
        Pipeline {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// True for a blank line: nothing to run, nothing wrong either.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty() && self.error.is_none()
    }
}
