use serde::{Deserialize, Serialize};

/// ABO/Rh blood group, serialized as the backend's short form ("A+", "O-", ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    /// All groups in the order the backend lists them.
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
        }
    }

    /// Parse the backend's short form. Case-insensitive on the letters.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A+" => Some(BloodGroup::APositive),
            "A-" => Some(BloodGroup::ANegative),
            "B+" => Some(BloodGroup::BPositive),
            "B-" => Some(BloodGroup::BNegative),
            "O+" => Some(BloodGroup::OPositive),
            "O-" => Some(BloodGroup::ONegative),
            "AB+" => Some(BloodGroup::AbPositive),
            "AB-" => Some(BloodGroup::AbNegative),
            _ => None,
        }
    }

    /// The next group in display order, wrapping around. Used by the
    /// donor-search filter cycle.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|g| g == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_short_form() {
        let g: BloodGroup = serde_json::from_str("\"AB-\"").unwrap();
        assert_eq!(g, BloodGroup::AbNegative);
        assert_eq!(serde_json::to_string(&BloodGroup::OPositive).unwrap(), "\"O+\"");
    }

    #[test]
    fn test_parse() {
        assert_eq!(BloodGroup::parse("o-"), Some(BloodGroup::ONegative));
        assert_eq!(BloodGroup::parse(" ab+ "), Some(BloodGroup::AbPositive));
        assert_eq!(BloodGroup::parse("C+"), None);
        assert_eq!(BloodGroup::parse(""), None);
    }

    #[test]
    fn test_next_wraps() {
        let mut g = BloodGroup::APositive;
        for _ in 0..BloodGroup::ALL.len() {
            g = g.next();
        }
        assert_eq!(g, BloodGroup::APositive);
    }
}
