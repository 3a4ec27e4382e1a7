//! Ordered activity labels of a single session.

use serde::{Deserialize, Serialize};

/// Activity labels of one session in timestamp order.
///
/// May contain repeated labels: a user can revisit the same activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivitySequence(Vec<String>);

impl ActivitySequence {
    pub fn new(activities: Vec<String>) -> Self {
        Self(activities)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn activities(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Collapse runs of the same label into a single step.
    pub fn collapse_repeats(&mut self) {
        self.0.dedup();
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for ActivitySequence {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
