use std::fmt;

/// A rendered (subject, predicate, object) statement.
///
/// Each position holds wire text: a locator (`<…>` or `:name`), a
/// variable (`?name`) or a literal.
///
/// INVARIANT: no position is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    /// Create a new triple.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Replace every position equal to `from` with `to`.
    pub fn substitute(&mut self, from: &str, to: &str) {
        for position in [&mut self.subject, &mut self.predicate, &mut self.object] {
            if position == from {
                to.clone_into(position);
            }
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
