//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_password_char, can_add_username_char, App, AppState, Focus, LoginFocus, Tab,
    PAGE_SCROLL_SIZE,
};
use crate::models::DonorSortColumn;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Dashboard;
            app.focus = Focus::List;
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Donations;
            app.focus = Focus::List;
        }
        KeyCode::Char('3') => {
            app.current_tab = Tab::Requests;
            app.focus = Focus::List;
        }
        KeyCode::Char('4') => {
            app.current_tab = Tab::Banks;
            app.focus = Focus::List;
        }
        KeyCode::Char('5') => {
            app.current_tab = Tab::Donors;
            app.focus = Focus::List;
        }
        KeyCode::Left => {
            app.current_tab = app.current_tab.prev();
            app.focus = Focus::List;
        }
        KeyCode::Right => {
            app.current_tab = app.current_tab.next();
            app.focus = Focus::List;
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
        }
        KeyCode::Char('L') => {
            app.logout();
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.search_query.clear();
        }
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Esc => {
            app.search_query.clear();
            app.focus = Focus::List;
        }
        _ => {
            // Tab-specific input
            match app.current_tab {
                Tab::Dashboard => {}
                Tab::Donations => handle_donations_input(app, key).await,
                Tab::Requests => handle_requests_input(app, key).await,
                Tab::Banks => handle_list_navigation(app, key),
                Tab::Donors => handle_donors_input(app, key),
            }
        }
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            // Reset selection when search changes
            if let Some(selection) = app.current_selection_mut() {
                *selection = 0;
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => {
            match app.login_focus {
                LoginFocus::Username => {
                    app.login_focus = LoginFocus::Password;
                }
                LoginFocus::Password => {
                    app.login_focus = LoginFocus::Button;
                }
                LoginFocus::Button => {
                    // On success attempt_login kicks off the data refresh;
                    // on failure login_error is set for the overlay
                    let _ = app.attempt_login().await;
                }
            }
        }
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

/// Up/down/home/end/page movement for the current tab's list
fn handle_list_navigation(app: &mut App, key: KeyEvent) {
    let max_index = app.current_list_len().saturating_sub(1);
    let Some(selection) = app.current_selection_mut() else {
        return;
    };

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            *selection = (*selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            *selection = selection.saturating_sub(1);
        }
        KeyCode::Home => {
            *selection = 0;
        }
        KeyCode::End => {
            *selection = max_index;
        }
        KeyCode::PageDown => {
            *selection = (*selection + PAGE_SCROLL_SIZE).min(max_index);
        }
        KeyCode::PageUp => {
            *selection = selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        _ => {}
    }
}

async fn handle_donations_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') if app.is_admin() => {
            app.approve_selected_donation().await;
        }
        _ => handle_list_navigation(app, key),
    }
}

async fn handle_requests_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') if app.is_admin() => {
            app.approve_selected_request().await;
        }
        KeyCode::Char('x') if app.is_admin() => {
            app.reject_selected_request().await;
        }
        _ => handle_list_navigation(app, key),
    }
}

fn handle_donors_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => {
            app.toggle_donor_sort(DonorSortColumn::Name);
        }
        KeyCode::Char('g') => {
            app.toggle_donor_sort(DonorSortColumn::Group);
        }
        KeyCode::Char('c') => {
            app.toggle_donor_sort(DonorSortColumn::City);
        }
        KeyCode::Char('f') => {
            app.cycle_donor_group_filter();
        }
        KeyCode::Char('v') => {
            app.toggle_donor_available_filter();
        }
        _ => handle_list_navigation(app, key),
    }
}
