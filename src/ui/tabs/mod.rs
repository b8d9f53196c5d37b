//! Tab-specific rendering for each main view.

pub mod banks;
pub mod dashboard;
pub mod donations;
pub mod donors;
pub mod requests;
