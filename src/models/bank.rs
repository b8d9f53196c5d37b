use serde::{Deserialize, Serialize};

use super::BloodGroup;

/// A blood bank and its per-group unit inventory.
/// The backend tracks each group as a separate counter column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodBank {
    pub id: i64,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub units_a_plus: u32,
    #[serde(default)]
    pub units_a_minus: u32,
    #[serde(default)]
    pub units_b_plus: u32,
    #[serde(default)]
    pub units_b_minus: u32,
    #[serde(default)]
    pub units_o_plus: u32,
    #[serde(default)]
    pub units_o_minus: u32,
    #[serde(default)]
    pub units_ab_plus: u32,
    #[serde(default)]
    pub units_ab_minus: u32,
}

impl BloodBank {
    pub fn units_for(&self, group: BloodGroup) -> u32 {
        match group {
            BloodGroup::APositive => self.units_a_plus,
            BloodGroup::ANegative => self.units_a_minus,
            BloodGroup::BPositive => self.units_b_plus,
            BloodGroup::BNegative => self.units_b_minus,
            BloodGroup::OPositive => self.units_o_plus,
            BloodGroup::ONegative => self.units_o_minus,
            BloodGroup::AbPositive => self.units_ab_plus,
            BloodGroup::AbNegative => self.units_ab_minus,
        }
    }

    pub fn total_units(&self) -> u32 {
        BloodGroup::ALL.iter().map(|g| self.units_for(*g)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bank() {
        let json = r#"{
            "id": 1,
            "name": "Central Blood Bank",
            "city": "Springfield",
            "address": "12 Main St",
            "units_a_plus": 5,
            "units_a_minus": 0,
            "units_b_plus": 3,
            "units_b_minus": 1,
            "units_o_plus": 10,
            "units_o_minus": 2,
            "units_ab_plus": 0,
            "units_ab_minus": 0
        }"#;
        let bank: BloodBank = serde_json::from_str(json).unwrap();
        assert_eq!(bank.units_for(BloodGroup::OPositive), 10);
        assert_eq!(bank.units_for(BloodGroup::AbNegative), 0);
        assert_eq!(bank.total_units(), 21);
    }

    #[test]
    fn test_missing_unit_fields_default_to_zero() {
        let json = r#"{"id": 2, "name": "North Clinic", "city": "Shelbyville"}"#;
        let bank: BloodBank = serde_json::from_str(json).unwrap();
        assert_eq!(bank.total_units(), 0);
    }
}
