use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for remembered logins
const SERVICE_NAME: &str = "sportline";

/// Optional remember-me storage backed by the OS keychain.
///
/// Used by the CLI so a user can log back in without retyping their
/// password. Entirely separate from the session file: tokens live there,
/// passwords live here, and neither knows about the other.
pub struct CredentialStore;

impl CredentialStore {
    /// Remember the password for an account email.
    pub fn remember(email: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the remembered password for an account email.
    pub fn password(email: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, email)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("No remembered password for this account")
    }

    /// Forget the remembered password, if any.
    pub fn forget(email: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to remove password from keychain")?;
        Ok(())
    }

    /// Whether a password is remembered for this account.
    pub fn has_saved(email: &str) -> bool {
        Entry::new(SERVICE_NAME, email)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
