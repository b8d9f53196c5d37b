//! Data models for the blood-donation service.
//!
//! This module contains the data structures returned by (and sent to) the
//! REST backend:
//!
//! - `User`, `Role`: accounts and their capabilities
//! - `BloodGroup`: the eight ABO/Rh groups
//! - `DonorProfile`: donor contact/availability records
//! - `BloodBank`: per-group inventory of a bank
//! - `Donation`, `BloodRequest`: the two record types admins review
//! - `DashboardStats`: the admin dashboard aggregate

pub mod bank;
pub mod blood;
pub mod donor;
pub mod records;
pub mod user;

pub use bank::BloodBank;
pub use blood::BloodGroup;
pub use donor::{DonorProfile, DonorSortColumn, NewDonorProfile};
pub use records::{
    BloodRequest, DashboardStats, Donation, NewBloodRequest, NewDonation, RequestStatus,
};
pub use user::{NewUser, Role, User};
