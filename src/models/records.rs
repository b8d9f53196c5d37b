use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BloodGroup, User};

/// Review status of a blood request. The backend owns transitions;
/// clients only read it back after approve/reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for blood units, created by a donor or hospital account.
/// The requester is null when the account was deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: i64,
    #[serde(default)]
    pub requester: Option<User>,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl BloodRequest {
    pub fn requester_name(&self) -> String {
        self.requester
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "(deleted)".to_string())
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// A donation record. `blood_bank` is the bank id the units go to
/// once an admin approves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    #[serde(default)]
    pub donor: Option<User>,
    #[serde(default)]
    pub blood_bank: Option<i64>,
    pub blood_group: BloodGroup,
    pub units: u32,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    pub fn donor_name(&self) -> String {
        self.donor
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "(deleted)".to_string())
    }

    pub fn status_label(&self) -> &'static str {
        if self.approved {
            "approved"
        } else {
            "pending"
        }
    }
}

/// Payload for `POST donations/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewDonation {
    pub blood_group: BloodGroup,
    pub units: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_bank: Option<i64>,
}

/// Payload for `POST blood-requests/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewBloodRequest {
    pub blood_group: BloodGroup,
    pub units: u32,
}

/// Aggregate returned by `GET admin/dashboard/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_donors: i64,
    #[serde(default)]
    pub pending_requests: i64,
    #[serde(default)]
    pub available_units: BTreeMap<BloodGroup, u32>,
}

impl DashboardStats {
    pub fn total_units(&self) -> u32 {
        self.available_units.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blood_request() {
        let json = r#"{
            "id": 12,
            "requester": {"id": 3, "username": "donor1", "role": "donor"},
            "blood_group": "B-",
            "units": 2,
            "status": "pending",
            "created_at": "2026-08-01T09:15:00Z"
        }"#;
        let req: BloodRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_pending());
        assert_eq!(req.requester_name(), "donor1");
        assert_eq!(req.blood_group, BloodGroup::BNegative);
    }

    #[test]
    fn test_parse_request_with_deleted_requester() {
        let json = r#"{
            "id": 13,
            "requester": null,
            "blood_group": "O+",
            "units": 1,
            "status": "rejected",
            "created_at": "2026-07-20T18:00:00.123456Z"
        }"#;
        let req: BloodRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.requester_name(), "(deleted)");
        assert_eq!(req.status, RequestStatus::Rejected);
    }

    #[test]
    fn test_parse_donation() {
        let json = r#"{
            "id": 5,
            "donor": {"id": 3, "username": "donor1", "first_name": "Dana",
                      "last_name": "Reyes", "role": "donor"},
            "blood_bank": 1,
            "blood_group": "O-",
            "units": 1,
            "approved": false,
            "created_at": "2026-08-10T12:00:00Z"
        }"#;
        let donation: Donation = serde_json::from_str(json).unwrap();
        assert_eq!(donation.status_label(), "pending");
        assert_eq!(donation.donor_name(), "Dana Reyes");
        assert_eq!(donation.blood_bank, Some(1));
    }

    #[test]
    fn test_parse_dashboard_stats() {
        let json = r#"{
            "total_donors": 42,
            "pending_requests": 3,
            "available_units": {"A+": 5, "A-": 0, "B+": 3, "B-": 1,
                                "O+": 10, "O-": 2, "AB+": 0, "AB-": 0}
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_donors, 42);
        assert_eq!(stats.available_units[&BloodGroup::OPositive], 10);
        assert_eq!(stats.total_units(), 21);
    }
}
