//! Priority scoring from business, technical and client criteria

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Three-level rating used for business value and technical complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

/// How strongly the client asked for the work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientPriority {
    Urgent,
    High,
    Normal,
    Low,
}

/// Resulting priority of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(Error::Other(format!("Unknown priority: {}", other))),
        }
    }
}

/// Inputs to the priority rubric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCriteria {
    pub business_value: Level,
    pub technical_complexity: Level,
    pub client_priority: ClientPriority,
}

impl PriorityCriteria {
    /// Rubric points, between 3 and 10
    ///
    /// Complexity is inverted: harder work scores fewer points.
    pub fn score(&self) -> u8 {
        let business = match self.business_value {
            Level::High => 3,
            Level::Medium => 2,
            Level::Low => 1,
        };
        let complexity = match self.technical_complexity {
            Level::High => 1,
            Level::Medium => 2,
            Level::Low => 3,
        };
        let client = match self.client_priority {
            ClientPriority::Urgent => 4,
            ClientPriority::High => 3,
            ClientPriority::Normal => 2,
            ClientPriority::Low => 1,
        };
        business + complexity + client
    }

    /// Map the score onto a priority: 8+ is high, 5+ is medium
    pub fn priority(&self) -> Priority {
        match self.score() {
            s if s >= 8 => Priority::High,
            s if s >= 5 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(b: Level, t: Level, c: ClientPriority) -> PriorityCriteria {
        PriorityCriteria {
            business_value: b,
            technical_complexity: t,
            client_priority: c,
        }
    }

    #[test]
    fn test_boundary_high() {
        let c = criteria(Level::High, Level::Low, ClientPriority::Urgent);
        assert_eq!(c.score(), 10);
        assert_eq!(c.priority(), Priority::High);
    }

    #[test]
    fn test_boundary_low() {
        let c = criteria(Level::Low, Level::High, ClientPriority::Low);
        assert_eq!(c.score(), 3);
        assert_eq!(c.priority(), Priority::Low);
    }

    #[test]
    fn test_thresholds() {
        // 2 + 2 + 4 = 8
        assert_eq!(
            criteria(Level::Medium, Level::Medium, ClientPriority::Urgent).priority(),
            Priority::High
        );
        // 2 + 2 + 3 = 7
        assert_eq!(
            criteria(Level::Medium, Level::Medium, ClientPriority::High).priority(),
            Priority::Medium
        );
        // 1 + 2 + 2 = 5
        assert_eq!(
            criteria(Level::Low, Level::Medium, ClientPriority::Normal).priority(),
            Priority::Medium
        );
        // 1 + 1 + 2 = 4
        assert_eq!(
            criteria(Level::Low, Level::High, ClientPriority::Normal).priority(),
            Priority::Low
        );
    }

    #[test]
    fn test_total_and_deterministic() {
        let levels = [Level::High, Level::Medium, Level::Low];
        let clients = [
            ClientPriority::Urgent,
            ClientPriority::High,
            ClientPriority::Normal,
            ClientPriority::Low,
        ];
        for b in levels {
            for t in levels {
                for c in clients {
                    let first = criteria(b, t, c);
                    let score = first.score();
                    assert!((3..=10).contains(&score));
                    assert_eq!(first.priority(), criteria(b, t, c).priority());
                }
            }
        }
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_criteria_deserialize() {
        let c: PriorityCriteria = serde_json::from_str(
            r#"{"business_value":"high","technical_complexity":"low","client_priority":"urgent"}"#,
        )
        .unwrap();
        assert_eq!(c.priority(), Priority::High);
    }
}
