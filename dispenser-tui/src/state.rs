//! Application state and key handling.
//!
//! Every handler runs to completion synchronously, so the whole UI can be
//! driven in tests without a terminal.

use dispenser_core::{DispenserError, LedgerError, UsageRecord};
use dispenser_ledger::{DispenserService, RecordOrigin, Session};

use crate::keys::Action;
use crate::notifications::{Notification, NotificationLevel};
use crate::theme::Theme;

pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password. Try again.";

/// Which view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dispenser,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    /// Shown under the form after a rejected attempt.
    pub error: Option<String>,
}

impl LoginForm {
    pub fn push(&mut self, c: char) {
        match self.focus {
            LoginField::Username => self.username.push(c),
            LoginField::Password => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            LoginField::Username => self.username.pop(),
            LoginField::Password => self.password.pop(),
        };
    }

    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct App {
    pub theme: Theme,
    service: DispenserService,
    pub session: Session,
    pub login: LoginForm,
    pub notification: Option<Notification>,
    /// Past records, shown when toggled on.
    pub history: Option<Vec<UsageRecord>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(service: DispenserService, theme: Theme) -> Self {
        Self {
            theme,
            service,
            session: Session::LoggedOut,
            login: LoginForm::default(),
            notification: None,
            history: None,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_logged_in() {
            Screen::Dispenser
        } else {
            Screen::Login
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Input(c) => self.login.push(c),
            Action::Backspace => self.login.backspace(),
            Action::NextField | Action::PrevField => self.login.focus = self.login.focus.toggle(),
            Action::Submit => self.submit_login(),
            Action::Dispense => self.dispense(),
            Action::Logout => self.logout(),
            Action::Refresh => {
                self.refresh();
            }
            Action::ToggleHistory => self.toggle_history(),
            Action::Dismiss => self.notification = None,
        }
    }

    /// Periodic check for a day change while a user sits on the dispenser view.
    pub fn tick(&mut self) {
        let today = self.service.ledger().today();
        let stale = self
            .session
            .active()
            .is_some_and(|active| active.record().date != today);
        if stale && self.refresh() {
            self.notify(Notification::new(
                NotificationLevel::Info,
                "A new day has started.",
            ));
        }
    }

    fn submit_login(&mut self) {
        match self.service.login(&self.login.username, &self.login.password) {
            Ok(active) => {
                self.notification = match active.origin() {
                    RecordOrigin::Recovered { .. } => Some(Notification::warning(
                        "Today's saved usage could not be read and was reset.",
                    )),
                    RecordOrigin::Existing | RecordOrigin::Created => None,
                };
                self.login.reset();
                self.history = None;
                self.session = Session::LoggedIn(active);
            }
            Err(e) if e.is_invalid_credentials() => {
                self.login.error = Some(INVALID_LOGIN_MESSAGE.to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                self.login.error = Some(format!("Could not log in: {e}"));
            }
        }
    }

    fn dispense(&mut self) {
        let Some(active) = self.session.active_mut() else {
            return;
        };
        let result = self.service.dispense(active);
        let notification = match result {
            Ok(receipt) => Notification::success(format!(
                "Dispensed {} sheets of paper at {}.",
                receipt.sheets,
                receipt.at.format(dispenser_core::TIME_FORMAT)
            )),
            Err(DispenserError::Ledger(LedgerError::CapReached { limit, .. })) => {
                Notification::error(format!(
                    "Daily limit of {limit} reached. No more paper until tomorrow."
                ))
            }
            Err(e) => {
                tracing::error!(error = %e, "Dispense failed");
                Notification::error(format!("Could not dispense: {e}"))
            }
        };
        self.notify(notification);
        if self.history.is_some() {
            self.load_history();
        }
    }

    /// Reload today's record. Returns whether a reload happened.
    fn refresh(&mut self) -> bool {
        let Some(active) = self.session.active_mut() else {
            return false;
        };
        if let Err(e) = self.service.refresh(active) {
            tracing::error!(error = %e, "Refresh failed");
            self.notify(Notification::error(format!("Could not refresh: {e}")));
            return false;
        }
        if let Some(RecordOrigin::Recovered { .. }) = self.session.active().map(|a| a.origin()) {
            self.notify(Notification::warning(
                "Today's saved usage could not be read and was reset.",
            ));
        }
        if self.history.is_some() {
            self.load_history();
        }
        true
    }

    fn logout(&mut self) {
        if let Session::LoggedIn(active) = std::mem::take(&mut self.session) {
            self.session = self.service.logout(active);
        }
        self.login.reset();
        self.notification = None;
        self.history = None;
    }

    fn toggle_history(&mut self) {
        if self.history.take().is_none() {
            self.load_history();
        }
    }

    fn load_history(&mut self) {
        let Some(user) = self.session.active().map(|a| a.user().clone()) else {
            return;
        };
        match self.service.ledger().history(&user) {
            Ok(records) => self.history = Some(records),
            Err(e) => {
                tracing::error!(error = %e, "Loading history failed");
                self.history = None;
                self.notify(Notification::error(format!("Could not load history: {e}")));
            }
        }
    }
}
