use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified phase of a repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Up,
    Down,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Up.to_string(), "up");
        assert_eq!(Stage::Down.to_string(), "down");
        assert_eq!(serde_json::to_string(&Stage::Down).unwrap(), "\"down\"");
    }
}
