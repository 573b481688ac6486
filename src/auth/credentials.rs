use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service identifier for remembered admin credentials
const KEYCHAIN_SERVICE: &str = "bayan-admin";

/// OS-keychain storage for the admin password, keyed by login email.
///
/// Backs the dashboard's "remember me" option without ever writing the
/// password to a file of our own.
pub struct CredentialVault;

impl CredentialVault {
    /// Remember the password for an admin email
    pub fn remember(email: &str, password: &str) -> Result<()> {
        let entry =
            Entry::new(KEYCHAIN_SERVICE, email).context("Failed to open keychain entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Look up the remembered password for an email
    pub fn lookup(email: &str) -> Result<String> {
        let entry =
            Entry::new(KEYCHAIN_SERVICE, email).context("Failed to open keychain entry")?;
        entry
            .get_password()
            .context("No remembered password for this email")
    }

    /// Forget the stored password for an email
    pub fn forget(email: &str) -> Result<()> {
        let entry =
            Entry::new(KEYCHAIN_SERVICE, email).context("Failed to open keychain entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Whether a password is remembered for this email
    pub fn is_remembered(email: &str) -> bool {
        Entry::new(KEYCHAIN_SERVICE, email)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
