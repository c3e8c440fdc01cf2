use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::learner::ObservedLink;
use crate::Result;

fn default_capacity() -> usize {
    512
}

/// One recorded event replayed against a [`crate::Linker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    /// A genuine link arrived with the given display text.
    Observe {
        text: String,
        #[serde(flatten)]
        link: ObservedLink,
    },
    /// Text was composed into a message buffer of `capacity` bytes.
    Paste {
        text: String,
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub steps: Vec<SessionStep>,
}

impl Session {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_step_kinds() {
        let json = r#"{
            "steps": [
                { "observe": { "text": "Eastern Fields ( 10.0  , 10.0 )",
                               "zone_id": 7, "map_id": 3, "raw_x": 100, "raw_y": 200 } },
                { "paste": { "text": "\ue0bbEastern Fields ( 10.0  , 10.0 )", "capacity": 64 } },
                { "paste": { "text": "hello" } }
            ]
        }"#;
        let session = Session::from_json(json).unwrap();
        assert_eq!(session.steps.len(), 3);
        assert_eq!(
            session.steps[0],
            SessionStep::Observe {
                text: "Eastern Fields ( 10.0  , 10.0 )".into(),
                link: ObservedLink {
                    zone_id: 7,
                    map_id: 3,
                    raw_x: 100,
                    raw_y: 200
                },
            }
        );
        assert_eq!(
            session.steps[1],
            SessionStep::Paste {
                text: "\u{E0BB}Eastern Fields ( 10.0  , 10.0 )".into(),
                capacity: 64
            }
        );
        assert_eq!(
            session.steps[2],
            SessionStep::Paste {
                text: "hello".into(),
                capacity: 512
            }
        );
    }

    #[test]
    fn rejects_unknown_step() {
        assert!(Session::from_json(r#"{ "steps": [ { "teleport": {} } ] }"#).is_err());
    }
}
