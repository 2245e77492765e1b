//! Resolving which expression the "plot variable" command should plot.

/// Where the command was invoked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionSource {
    /// A node of the debugger's variables view.
    Variable {
        /// Expression the adapter suggests for re-evaluating the variable.
        evaluate_name: Option<String>,
        /// Display name of the variable.
        name: Option<String>,
    },
    /// The editor selection.
    Selection(String),
}

impl ExpressionSource {
    /// The expression to plot, or `None` when nothing usable was given.
    ///
    /// Variables prefer `evaluate_name` over `name`; selections are trimmed.
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        let candidate = match self {
            Self::Variable {
                evaluate_name,
                name,
            } => non_empty(evaluate_name.as_deref()).or_else(|| non_empty(name.as_deref())),
            Self::Selection(text) => non_empty(Some(text.as_str())),
        };
        candidate.map(str::trim)
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn variable(evaluate_name: Option<&str>, name: Option<&str>) -> ExpressionSource {
        ExpressionSource::Variable {
            evaluate_name: evaluate_name.map(str::to_owned),
            name: name.map(str::to_owned),
        }
    }

    #[rstest]
    #[case(variable(Some("self.frames[0]"), Some("[0]")), Some("self.frames[0]"))]
    #[case(variable(None, Some("img")), Some("img"))]
    #[case(variable(Some(""), Some("img")), Some("img"))]
    #[case(variable(None, None), None)]
    #[case(ExpressionSource::Selection(String::from("  points  ")), Some("points"))]
    #[case(ExpressionSource::Selection(String::from("   ")), None)]
    fn resolves_in_priority_order(#[case] source: ExpressionSource, #[case] expected: Option<&str>) {
        assert_eq!(source.resolve(), expected);
    }
}
