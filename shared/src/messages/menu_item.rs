use serde::{Deserialize, Serialize};

/// Display state of one menu row, replicated from master to slaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: usize,
    pub text: String,
}

impl MenuItem {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
