use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BloodGroup, User};

/// A donor's profile record. The nested user is read-only on the wire;
/// the backend fills it from the authenticated account on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorProfile {
    pub id: i64,
    pub user: User,
    #[serde(default)]
    pub phone: Option<String>,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub last_donated: Option<NaiveDate>,
    pub available: bool,
}

impl DonorProfile {
    pub fn display_name(&self) -> String {
        self.user.display_name()
    }

    pub fn city_or_dash(&self) -> &str {
        self.city.as_deref().filter(|c| !c.is_empty()).unwrap_or("-")
    }
}

/// Create/update payload for `donor-profiles/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDonorProfile {
    pub blood_group: BloodGroup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_donated: Option<NaiveDate>,
    pub available: bool,
}

/// Sort column for the donor-search list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorSortColumn {
    Name,
    Group,
    City,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_donor_profile() {
        let json = r#"{
            "id": 7,
            "user": {"id": 3, "username": "donor1", "email": null,
                     "first_name": "", "last_name": "", "role": "donor"},
            "phone": "555-0101",
            "blood_group": "O-",
            "city": "Springfield",
            "last_donated": "2026-06-01",
            "available": true
        }"#;
        let profile: DonorProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.blood_group, BloodGroup::ONegative);
        assert_eq!(profile.city_or_dash(), "Springfield");
        assert_eq!(
            profile.last_donated,
            Some(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
        );
    }

    #[test]
    fn test_parse_profile_with_missing_optionals() {
        let json = r#"{
            "id": 8,
            "user": {"id": 4, "username": "donor2", "role": "donor"},
            "blood_group": "AB+",
            "available": false
        }"#;
        let profile: DonorProfile = serde_json::from_str(json).unwrap();
        assert!(profile.last_donated.is_none());
        assert_eq!(profile.city_or_dash(), "-");
    }
}
