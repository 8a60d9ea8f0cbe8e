//! Escalation priority classification.

use serde::Serialize;

const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "cancelled",
    "stranded",
    "medical",
    "missed flight",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPriority {
    High,
    Normal,
}

impl EscalationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationPriority::High => "high",
            EscalationPriority::Normal => "normal",
        }
    }
}

/// Priority plus the wait estimate quoted to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EscalationAssessment {
    pub priority: EscalationPriority,
    pub estimated_wait: &'static str,
}

/// Classifies an escalation reason by keyword match.
pub fn assess(reason: &str) -> EscalationAssessment {
    let lowered = reason.to_lowercase();
    let high = HIGH_PRIORITY_KEYWORDS.iter().any(|k| lowered.contains(k));
    if high {
        EscalationAssessment {
            priority: EscalationPriority::High,
            estimated_wait: "5-10 minutes",
        }
    } else {
        EscalationAssessment {
            priority: EscalationPriority::Normal,
            estimated_wait: "15-20 minutes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medical_reasons_are_high_priority() {
        let a = assess("Passenger has a MEDICAL issue at the gate");
        assert_eq!(a.priority, EscalationPriority::High);
        assert_eq!(a.estimated_wait, "5-10 minutes");
    }

    #[test]
    fn missed_flight_phrase_matches_as_a_whole() {
        assert_eq!(assess("I missed flight UA100").priority, EscalationPriority::High);
    }

    #[test]
    fn ordinary_questions_are_normal_priority() {
        let a = assess("Question about my meal preference");
        assert_eq!(a.priority, EscalationPriority::Normal);
        assert_eq!(a.estimated_wait, "15-20 minutes");
    }
}
