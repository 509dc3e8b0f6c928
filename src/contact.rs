//! The contact action: opens the reader's mail client and, the first time
//! only, shows a confirmation toast.

use std::fmt;
use url::Url;

pub const DEFAULT_TOAST_TITLE: &str = "Thanks for reaching out!";
pub const DEFAULT_TOAST_DESCRIPTION: &str = "I'll get back to you as soon as possible.";
pub const DEFAULT_TOAST_CLASS: &str = "bg-white border border-slate-200 shadow-md";

/// Transient feedback shown by a [`Notifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub class: String,
}

impl Default for Toast {
    fn default() -> Self {
        Toast {
            title: DEFAULT_TOAST_TITLE.to_owned(),
            description: DEFAULT_TOAST_DESCRIPTION.to_owned(),
            class: DEFAULT_TOAST_CLASS.to_owned(),
        }
    }
}

/// Hands an address to the system mail composer. Fire-and-forget.
pub trait MailLauncher {
    fn compose(&mut self, address: &str);
}

/// Displays transient notifications. Fire-and-forget.
pub trait Notifier {
    fn notify(&mut self, toast: Toast);
}

/// A validated contact address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn parse(address: &str) -> Result<Email, InvalidEmailError> {
        let address = address.trim();
        let (local, domain) = match address.split_once('@') {
            Some(parts) => parts,
            None => return Err(InvalidEmailError(address.to_owned())),
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(InvalidEmailError(address.to_owned()));
        }
        // the address must survive being dropped into a `mailto:` URL
        Url::parse(&format!("mailto:{}", address))
            .map_err(|_| InvalidEmailError(address.to_owned()))?;
        Ok(Email(address.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mailto(&self) -> String {
        format!("mailto:{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidEmailError(String);

impl fmt::Display for InvalidEmailError {
    /// Displays an [`InvalidEmailError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid email address: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidEmailError {}

/// The contact button's state: where mail goes, what the toast says, and
/// whether it has been shown yet.
#[derive(Clone, Debug)]
pub struct ContactAction {
    email: Email,
    toast: Toast,
    notified: bool,
}

impl ContactAction {
    pub fn new(email: Email, toast: Toast) -> ContactAction {
        ContactAction {
            email,
            toast,
            notified: false,
        }
    }

    pub fn has_notified(&self) -> bool {
        self.notified
    }

    /// Launches the mail composer. The first activation also shows the
    /// toast.
    pub fn activate(&mut self, launcher: &mut dyn MailLauncher, notifier: &mut dyn Notifier) {
        launcher.compose(self.email.as_str());
        if !self.notified {
            self.notified = true;
            notifier.notify(self.toast.clone());
        }
    }
}
