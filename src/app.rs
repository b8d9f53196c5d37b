//! Application state management for hemodesk.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, the fetched collections, session handling, and
//! background refresh coordination.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::auth::TokenStore;
use crate::config::Config;
use crate::models::{
    BloodBank, BloodGroup, BloodRequest, DashboardStats, Donation, DonorProfile,
    DonorSortColumn, RequestStatus, User,
};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh produces fewer than ten messages; 16 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Donations,
    Requests,
    Banks,
    Donors,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Donations => "Donations",
            Tab::Requests => "Requests",
            Tab::Banks => "Banks",
            Tab::Donors => "Donors",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Donations,
            Tab::Donations => Tab::Requests,
            Tab::Requests => Tab::Banks,
            Tab::Banks => Tab::Donors,
            Tab::Donors => Tab::Dashboard,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Donors,
            Tab::Donations => Tab::Dashboard,
            Tab::Requests => Tab::Donations,
            Tab::Banks => Tab::Requests,
            Tab::Donors => Tab::Banks,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background refresh tasks.
///
/// Sent through an MPSC channel from the spawned refresh task back to the
/// main loop, one variant per fetched collection.
enum RefreshResult {
    /// The authenticated user record
    Me(User),
    /// All donation records visible to this account
    Donations(Vec<Donation>),
    /// All blood request records visible to this account
    Requests(Vec<BloodRequest>),
    /// Blood bank inventories
    Banks(Vec<BloodBank>),
    /// Donor profiles (donor search)
    Donors(Vec<DonorProfile>),
    /// Admin dashboard aggregate (admins only)
    Dashboard(DashboardStats),
    /// Signal that all refresh tasks have completed
    RefreshComplete,
    /// Credentials no longer work and could not be refreshed
    SessionExpired,
    /// An error occurred during refresh
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Selection indices
    pub donation_selection: usize,
    pub request_selection: usize,
    pub bank_selection: usize,
    pub donor_selection: usize,

    // Donor search state
    pub donor_sort_column: DonorSortColumn,
    pub donor_sort_ascending: bool,
    pub donor_group_filter: Option<BloodGroup>,
    pub donor_available_only: bool,

    // Fetched data
    pub me: Option<User>,
    pub donations: Vec<Donation>,
    pub requests: Vec<BloodRequest>,
    pub banks: Vec<BloodBank>,
    pub donors: Vec<DonorProfile>,
    pub dashboard: DashboardStats,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,
    pub refreshing: bool,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        // Load any persisted token pair so a previous session survives restart
        let mut tokens = TokenStore::new(cache_dir);
        match tokens.load() {
            Ok(found) => debug!(found, "Token store loaded"),
            Err(e) => warn!(error = %e, "Failed to load tokens"),
        }

        let tokens = Arc::new(Mutex::new(tokens));
        let api = ApiClient::new(&config.server_url(), tokens)
            .map_err(|e| anyhow::anyhow!("Failed to create API client: {}", e))?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login form from env vars or config
        let login_username = std::env::var("HEMODESK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var("HEMODESK_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            api,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            donation_selection: 0,
            request_selection: 0,
            bank_selection: 0,
            donor_selection: 0,

            donor_sort_column: DonorSortColumn::Name,
            donor_sort_ascending: true,
            donor_group_filter: None,
            donor_available_only: false,

            me: None,
            donations: Vec::new(),
            requests: Vec::new(),
            banks: Vec::new(),
            donors: Vec::new(),
            dashboard: DashboardStats::default(),

            refresh_rx: rx,
            refresh_tx: tx,

            status_message: None,
            refreshing: false,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if a stored access token exists. Expiry is discovered through
    /// the refresh protocol, not wall-clock checks.
    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.me.as_ref().map(User::is_admin).unwrap_or(false)
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        match self.api.login(&username, &password).await {
            Ok(()) => {
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                self.refresh_all_background();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let user_message = if e.is_unauthorized() {
                    "Invalid username or password".to_string()
                } else if e.to_string().to_lowercase().contains("network")
                    || e.to_string().to_lowercase().contains("connect")
                {
                    "Unable to connect to server. Check the server URL.".to_string()
                } else if e.to_string().to_lowercase().contains("timeout") {
                    "Connection timed out. Please try again.".to_string()
                } else {
                    format!("Login failed: {}", e)
                };
                self.login_error = Some(user_message);
                Err(e.into())
            }
        }
    }

    /// Drop the session and return to the login overlay
    pub fn logout(&mut self) {
        info!("Logging out");
        self.api.logout();
        self.me = None;
        self.donations.clear();
        self.requests.clear();
        self.donors.clear();
        self.dashboard = DashboardStats::default();
        self.start_login();
    }

    /// Unrecoverable auth failure. A failed refresh already cleared the
    /// stored pair, but a second 401 on a retried request leaves it
    /// intact; drop it here so the login overlay starts from a clean
    /// session either way.
    fn force_relogin(&mut self) {
        warn!("Session expired, forcing re-login");
        self.api.logout();
        self.me = None;
        self.status_message = Some("Session expired, please log in again".to_string());
        self.start_login();
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all data
    pub fn refresh_all_background(&mut self) {
        if self.refreshing {
            return;
        }
        info!("Starting background refresh of all data");
        self.refreshing = true;
        self.status_message = Some("Refreshing data...".to_string());

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api).await;
        });
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Execute the background refresh task.
    ///
    /// Runs in a spawned tokio task: fetches the current user first (the
    /// role decides whether the admin dashboard applies), then all
    /// collections in parallel on cheap client clones. Each fetch runs its
    /// own silent token refresh if it hits a 401; an auth failure that
    /// survives that is reported as `SessionExpired`.
    async fn execute_background_refresh(tx: mpsc::Sender<RefreshResult>, api: ApiClient) {
        info!("Background refresh task started");

        let me = match api.current_user().await {
            Ok(user) => user,
            Err(e) if e.is_unauthorized() => {
                Self::send_result(&tx, RefreshResult::SessionExpired).await;
                Self::send_result(&tx, RefreshResult::RefreshComplete).await;
                return;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch current user");
                Self::send_result(&tx, RefreshResult::Error(e.to_string())).await;
                Self::send_result(&tx, RefreshResult::RefreshComplete).await;
                return;
            }
        };
        let is_admin = me.is_admin();
        Self::send_result(&tx, RefreshResult::Me(me)).await;

        let api1 = api.clone();
        let api2 = api.clone();
        let api3 = api.clone();
        let api4 = api.clone();

        let (donations_res, requests_res, banks_res, donors_res) = futures::join!(
            api1.list_donations(),
            api2.list_blood_requests(),
            api3.list_blood_banks(),
            api4.list_donor_profiles(None, None),
        );

        let mut session_expired = false;
        let mut handle = |name: &str,
                          result: Result<RefreshResult, crate::api::ApiError>|
         -> Option<RefreshResult> {
            match result {
                Ok(msg) => Some(msg),
                Err(e) if e.is_unauthorized() => {
                    session_expired = true;
                    None
                }
                Err(e) => {
                    warn!(collection = name, error = %e, "Fetch failed");
                    Some(RefreshResult::Error(format!("{}: {}", name, e)))
                }
            }
        };

        let msgs = [
            handle("donations", donations_res.map(RefreshResult::Donations)),
            handle("requests", requests_res.map(RefreshResult::Requests)),
            handle("banks", banks_res.map(RefreshResult::Banks)),
            handle("donors", donors_res.map(RefreshResult::Donors)),
        ];
        for msg in msgs.into_iter().flatten() {
            Self::send_result(&tx, msg).await;
        }

        if is_admin && !session_expired {
            match api.admin_dashboard().await {
                Ok(stats) => Self::send_result(&tx, RefreshResult::Dashboard(stats)).await,
                Err(e) if e.is_unauthorized() => session_expired = true,
                Err(e) => {
                    warn!(error = %e, "Failed to fetch dashboard");
                    Self::send_result(&tx, RefreshResult::Error(e.to_string())).await;
                }
            }
        }

        if session_expired {
            Self::send_result(&tx, RefreshResult::SessionExpired).await;
        }

        info!("Background refresh complete");
        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
    }

    /// Drain completed background task results. Called once per frame.
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.refresh_rx.try_recv() {
            match result {
                RefreshResult::Me(user) => {
                    debug!(username = %user.username, role = %user.role, "Current user loaded");
                    self.me = Some(user);
                }
                RefreshResult::Donations(list) => {
                    self.donations = list;
                    self.donation_selection = self
                        .donation_selection
                        .min(self.donations.len().saturating_sub(1));
                }
                RefreshResult::Requests(list) => {
                    self.requests = list;
                    self.request_selection = self
                        .request_selection
                        .min(self.requests.len().saturating_sub(1));
                }
                RefreshResult::Banks(list) => {
                    self.banks = list;
                    self.bank_selection =
                        self.bank_selection.min(self.banks.len().saturating_sub(1));
                }
                RefreshResult::Donors(list) => {
                    self.donors = list;
                    self.donor_selection =
                        self.donor_selection.min(self.donors.len().saturating_sub(1));
                }
                RefreshResult::Dashboard(stats) => {
                    self.dashboard = stats;
                }
                RefreshResult::SessionExpired => {
                    self.refreshing = false;
                    self.force_relogin();
                }
                RefreshResult::Error(msg) => {
                    self.status_message = Some(msg);
                }
                RefreshResult::RefreshComplete => {
                    self.refreshing = false;
                    if self
                        .status_message
                        .as_deref()
                        .is_some_and(|m| m.starts_with("Refreshing"))
                    {
                        self.status_message = None;
                    }
                }
            }
        }
    }

    // =========================================================================
    // Admin Actions
    // =========================================================================

    /// Approve the selected donation (admin only).
    pub async fn approve_selected_donation(&mut self) {
        let Some(id) = self
            .visible_donations()
            .get(self.donation_selection)
            .map(|d| d.id)
        else {
            return;
        };

        match self.api.approve_donation(id).await {
            Ok(updated) => {
                self.apply_donation_update(updated);
                self.status_message = Some(format!("Donation #{} approved", id));
            }
            Err(e) if e.is_unauthorized() => self.force_relogin(),
            Err(e) => {
                self.status_message = Some(format!("Approve failed: {}", e));
            }
        }
    }

    /// Approve the selected blood request (admin only).
    pub async fn approve_selected_request(&mut self) {
        let Some(id) = self
            .visible_requests()
            .get(self.request_selection)
            .map(|r| r.id)
        else {
            return;
        };

        match self.api.approve_blood_request(id).await {
            Ok(updated) => {
                self.apply_request_update(updated);
                self.status_message = Some(format!("Request #{} approved", id));
            }
            Err(e) if e.is_unauthorized() => self.force_relogin(),
            Err(e) => {
                self.status_message = Some(format!("Approve failed: {}", e));
            }
        }
    }

    /// Reject the selected blood request (admin only).
    pub async fn reject_selected_request(&mut self) {
        let Some(id) = self
            .visible_requests()
            .get(self.request_selection)
            .map(|r| r.id)
        else {
            return;
        };

        match self.api.reject_blood_request(id).await {
            Ok(updated) => {
                self.apply_request_update(updated);
                self.status_message = Some(format!("Request #{} rejected", id));
            }
            Err(e) if e.is_unauthorized() => self.force_relogin(),
            Err(e) => {
                self.status_message = Some(format!("Reject failed: {}", e));
            }
        }
    }

    /// Replace a donation record in place with the server's updated copy.
    fn apply_donation_update(&mut self, updated: Donation) {
        if let Some(existing) = self.donations.iter_mut().find(|d| d.id == updated.id) {
            *existing = updated;
        }
    }

    /// Replace a blood request record in place with the server's updated copy.
    fn apply_request_update(&mut self, updated: BloodRequest) {
        if let Some(existing) = self.requests.iter_mut().find(|r| r.id == updated.id) {
            *existing = updated;
        }
    }

    // =========================================================================
    // Filtering / Sorting
    // =========================================================================

    /// Donations matching the search query (donor name or blood group)
    pub fn visible_donations(&self) -> Vec<&Donation> {
        let mut list: Vec<&Donation> = self.donations.iter().collect();
        if !self.search_query.is_empty() {
            let query = self.search_query.clone();
            list.retain(|d| {
                contains_ignore_case(&d.donor_name(), &query)
                    || contains_ignore_case(d.blood_group.as_str(), &query)
            });
        }
        list
    }

    /// Blood requests matching the search query (requester, group or status)
    pub fn visible_requests(&self) -> Vec<&BloodRequest> {
        let mut list: Vec<&BloodRequest> = self.requests.iter().collect();
        if !self.search_query.is_empty() {
            let query = self.search_query.clone();
            list.retain(|r| {
                contains_ignore_case(&r.requester_name(), &query)
                    || contains_ignore_case(r.blood_group.as_str(), &query)
                    || contains_ignore_case(r.status.as_str(), &query)
            });
        }
        list
    }

    /// Blood banks matching the search query (name or city)
    pub fn visible_banks(&self) -> Vec<&BloodBank> {
        let mut list: Vec<&BloodBank> = self.banks.iter().collect();
        if !self.search_query.is_empty() {
            let query = self.search_query.clone();
            list.retain(|b| {
                contains_ignore_case(&b.name, &query) || contains_ignore_case(&b.city, &query)
            });
        }
        list
    }

    /// Donor profiles after the group/availability filters, the search
    /// query, and the current sort column.
    pub fn sorted_donors(&self) -> Vec<&DonorProfile> {
        let mut list: Vec<&DonorProfile> = self.donors.iter().collect();

        if let Some(group) = self.donor_group_filter {
            list.retain(|d| d.blood_group == group);
        }
        if self.donor_available_only {
            list.retain(|d| d.available);
        }
        if !self.search_query.is_empty() {
            let query = self.search_query.clone();
            list.retain(|d| {
                contains_ignore_case(&d.display_name(), &query)
                    || contains_ignore_case(d.city_or_dash(), &query)
            });
        }

        list.sort_by(|a, b| {
            let by_name = cmp_ignore_case(&a.display_name(), &b.display_name());

            let cmp = match self.donor_sort_column {
                DonorSortColumn::Name => by_name,
                DonorSortColumn::Group => a.blood_group.cmp(&b.blood_group).then(by_name),
                DonorSortColumn::City => {
                    cmp_ignore_case(a.city_or_dash(), b.city_or_dash()).then(by_name)
                }
            };

            if self.donor_sort_ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });

        list
    }

    /// List length of the current tab, after filters. Used for clamping
    /// selection movement.
    pub fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Dashboard => 0,
            Tab::Donations => self.visible_donations().len(),
            Tab::Requests => self.visible_requests().len(),
            Tab::Banks => self.visible_banks().len(),
            Tab::Donors => self.sorted_donors().len(),
        }
    }

    /// Mutable reference to the current tab's selection index
    pub fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Dashboard => None,
            Tab::Donations => Some(&mut self.donation_selection),
            Tab::Requests => Some(&mut self.request_selection),
            Tab::Banks => Some(&mut self.bank_selection),
            Tab::Donors => Some(&mut self.donor_selection),
        }
    }

    /// Toggle donor sort column - if already sorting by this column, flip
    /// direction; otherwise switch to it ascending. Resets selection.
    pub fn toggle_donor_sort(&mut self, column: DonorSortColumn) {
        if self.donor_sort_column == column {
            self.donor_sort_ascending = !self.donor_sort_ascending;
        } else {
            self.donor_sort_column = column;
            self.donor_sort_ascending = true;
        }
        self.donor_selection = 0;
    }

    /// Cycle the donor blood-group filter: off -> A+ -> ... -> AB- -> off
    pub fn cycle_donor_group_filter(&mut self) {
        self.donor_group_filter = match self.donor_group_filter {
            None => Some(BloodGroup::ALL[0]),
            Some(g) if g == BloodGroup::ALL[BloodGroup::ALL.len() - 1] => None,
            Some(g) => Some(g.next()),
        };
        self.donor_selection = 0;
    }

    pub fn toggle_donor_available_filter(&mut self) {
        self.donor_available_only = !self.donor_available_only;
        self.donor_selection = 0;
    }

    /// Count of records still awaiting review, for the status bar
    pub fn pending_counts(&self) -> (usize, usize) {
        let donations = self.donations.iter().filter(|d| !d.approved).count();
        let requests = self
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count();
        (donations, requests)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn user(id: i64, username: &str, role: Role) -> User {
        User {
            id,
            username: username.to_string(),
            email: None,
            first_name: None,
            last_name: None,
            role,
        }
    }

    fn donor(id: i64, name: &str, group: BloodGroup, city: &str, available: bool) -> DonorProfile {
        DonorProfile {
            id,
            user: user(id, name, Role::Donor),
            phone: None,
            blood_group: group,
            city: Some(city.to_string()),
            last_donated: None,
            available,
        }
    }

    fn donation(id: i64, approved: bool) -> Donation {
        Donation {
            id,
            donor: Some(user(1, "donor1", Role::Donor)),
            blood_bank: None,
            blood_group: BloodGroup::OPositive,
            units: 1,
            approved,
            created_at: Utc::now(),
        }
    }

    fn request(id: i64, status: RequestStatus) -> BloodRequest {
        BloodRequest {
            id,
            requester: Some(user(1, "donor1", Role::Donor)),
            blood_group: BloodGroup::APositive,
            units: 2,
            status,
            created_at: Utc::now(),
        }
    }

    fn test_app() -> App {
        // App::new touches config/cache dirs; build a bare instance instead
        let tokens = Arc::new(Mutex::new(TokenStore::new(std::env::temp_dir())));
        let api = ApiClient::new("http://localhost:8000/api/", tokens).unwrap();
        test_app_with(api)
    }

    fn test_app_with(api: ApiClient) -> App {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        App {
            config: Config::default(),
            api,
            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            login_username: String::new(),
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,
            donation_selection: 0,
            request_selection: 0,
            bank_selection: 0,
            donor_selection: 0,
            donor_sort_column: DonorSortColumn::Name,
            donor_sort_ascending: true,
            donor_group_filter: None,
            donor_available_only: false,
            me: None,
            donations: Vec::new(),
            requests: Vec::new(),
            banks: Vec::new(),
            donors: Vec::new(),
            dashboard: DashboardStats::default(),
            refresh_rx: rx,
            refresh_tx: tx,
            status_message: None,
            refreshing: false,
        }
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next_wraps() {
        assert_eq!(Tab::Dashboard.next(), Tab::Donations);
        assert_eq!(Tab::Donations.next(), Tab::Requests);
        assert_eq!(Tab::Requests.next(), Tab::Banks);
        assert_eq!(Tab::Banks.next(), Tab::Donors);
        assert_eq!(Tab::Donors.next(), Tab::Dashboard);
    }

    #[test]
    fn test_tab_prev_wraps() {
        assert_eq!(Tab::Dashboard.prev(), Tab::Donors);
        assert_eq!(Tab::Donors.prev(), Tab::Banks);
        assert_eq!(Tab::Banks.prev(), Tab::Requests);
        assert_eq!(Tab::Requests.prev(), Tab::Donations);
        assert_eq!(Tab::Donations.prev(), Tab::Dashboard);
    }

    // -------------------------------------------------------------------------
    // Session tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_force_relogin_clears_stored_tokens() {
        // A retried request that still comes back 401 fails through with
        // the stored pair intact; the forced re-login must drop it.
        let dir = tempfile::TempDir::new().unwrap();
        let tokens = Arc::new(Mutex::new(TokenStore::new(dir.path().to_path_buf())));
        tokens
            .lock()
            .unwrap()
            .set_tokens(Some("A1".to_string()), Some("R1".to_string()))
            .unwrap();
        let api = ApiClient::new("http://localhost:8000/api/", Arc::clone(&tokens)).unwrap();

        let mut app = test_app_with(api);
        app.me = Some(user(3, "donor1", Role::Donor));
        assert!(app.is_authenticated());

        app.force_relogin();

        assert!(!app.is_authenticated());
        assert!(tokens.lock().unwrap().refresh_token().is_none());
        assert!(app.me.is_none());
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.status_message.is_some());
    }

    // -------------------------------------------------------------------------
    // Donor filter/sort tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_sorted_donors_filters_by_group_and_availability() {
        let mut app = test_app();
        app.donors = vec![
            donor(1, "alice", BloodGroup::ONegative, "Springfield", true),
            donor(2, "bob", BloodGroup::APositive, "Springfield", true),
            donor(3, "carol", BloodGroup::ONegative, "Shelbyville", false),
        ];

        app.donor_group_filter = Some(BloodGroup::ONegative);
        let visible = app.sorted_donors();
        assert_eq!(visible.len(), 2);

        app.donor_available_only = true;
        let visible = app.sorted_donors();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].user.username, "alice");
    }

    #[test]
    fn test_sorted_donors_search_and_sort() {
        let mut app = test_app();
        app.donors = vec![
            donor(1, "zed", BloodGroup::APositive, "Springfield", true),
            donor(2, "amy", BloodGroup::BPositive, "Springfield", true),
            donor(3, "mel", BloodGroup::ONegative, "Shelbyville", true),
        ];

        let sorted = app.sorted_donors();
        assert_eq!(sorted[0].user.username, "amy");
        assert_eq!(sorted[2].user.username, "zed");

        app.donor_sort_ascending = false;
        assert_eq!(app.sorted_donors()[0].user.username, "zed");

        app.donor_sort_ascending = true;
        app.search_query = "spring".to_string();
        let filtered = app.sorted_donors();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_toggle_donor_sort_flips_direction() {
        let mut app = test_app();
        app.donor_selection = 4;
        app.toggle_donor_sort(DonorSortColumn::City);
        assert_eq!(app.donor_sort_column, DonorSortColumn::City);
        assert!(app.donor_sort_ascending);
        assert_eq!(app.donor_selection, 0);

        app.toggle_donor_sort(DonorSortColumn::City);
        assert!(!app.donor_sort_ascending);
    }

    #[test]
    fn test_cycle_donor_group_filter_round_trip() {
        let mut app = test_app();
        assert!(app.donor_group_filter.is_none());
        // Eight groups then back to off
        for _ in 0..BloodGroup::ALL.len() {
            app.cycle_donor_group_filter();
            assert!(app.donor_group_filter.is_some());
        }
        app.cycle_donor_group_filter();
        assert!(app.donor_group_filter.is_none());
    }

    // -------------------------------------------------------------------------
    // Record update tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_apply_donation_update_replaces_in_place() {
        let mut app = test_app();
        app.donations = vec![donation(1, false), donation(2, false)];

        let mut updated = donation(2, true);
        updated.units = 3;
        app.apply_donation_update(updated);

        assert!(!app.donations[0].approved);
        assert!(app.donations[1].approved);
        assert_eq!(app.donations[1].units, 3);
    }

    #[test]
    fn test_apply_request_update_replaces_in_place() {
        let mut app = test_app();
        app.requests = vec![request(10, RequestStatus::Pending)];

        app.apply_request_update(request(10, RequestStatus::Rejected));
        assert_eq!(app.requests[0].status, RequestStatus::Rejected);
    }

    #[test]
    fn test_pending_counts() {
        let mut app = test_app();
        app.donations = vec![donation(1, false), donation(2, true), donation(3, false)];
        app.requests = vec![
            request(1, RequestStatus::Pending),
            request(2, RequestStatus::Approved),
        ];
        assert_eq!(app.pending_counts(), (2, 1));
    }

    #[test]
    fn test_visible_requests_search_by_status() {
        let mut app = test_app();
        app.requests = vec![
            request(1, RequestStatus::Pending),
            request(2, RequestStatus::Approved),
        ];
        app.search_query = "pending".to_string();
        let visible = app.visible_requests();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);
    }

    // -------------------------------------------------------------------------
    // Input validation tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
