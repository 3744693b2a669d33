// CLASSIFICATION: COMMUNITY
// Filename: bus.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! The transport seam: the kwalletd RPC surface as a trait.
//!
//! This crate deliberately ships no session-bus binding. A host that talks
//! to a real daemon implements [`WalletBus`] over its bus library of choice
//! using the names in [`crate::consts`]; tests and demos use the in-process
//! [`crate::inprocess::MemoryBus`].

use std::collections::BTreeMap;

use crate::consts;
use crate::error::Error;

/// Entry types kwalletd reports, with the daemon's raw codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum EntryType {
    /// Unclassified entry.
    Unknown = 0,
    /// Text secret.
    Password = 1,
    /// Binary secret (kwalletd calls these streams).
    Stream = 2,
    /// String→string dictionary secret.
    Map = 3,
}

impl TryFrom<i32> for EntryType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Unknown,
            1 => Self::Password,
            2 => Self::Stream,
            3 => Self::Map,
            other => return Err(Error::UnknownEntryType(other)),
        })
    }
}

impl From<EntryType> for i32 {
    fn from(value: EntryType) -> Self {
        value as i32
    }
}

/// Check a daemon result code, turning refusals into errors.
pub fn result_check(result: i32) -> Result<(), Error> {
    if result_passed(result) {
        Ok(())
    } else {
        Err(Error::OperationFailed(result))
    }
}

/// True when a daemon result code signals success.
pub fn result_passed(result: i32) -> bool {
    result == consts::RESULT_OK
}

/// One method per kwalletd RPC the wrapper tree uses.
///
/// Byte-valued reads return raw wire bytes; the typed wrappers own any
/// decoding (notably the map codec). Mutating calls return the daemon's
/// integer result code verbatim so callers can apply [`result_check`].
/// `window_id` parameters carry the X11/Wayland window the daemon may
/// parent an unlock prompt to; pass 0 when headless.
pub trait WalletBus: Send + Sync {
    /// Whether the wallet service is enabled at all.
    fn is_enabled(&self) -> Result<bool, Error>;

    /// Names of every wallet the daemon knows.
    fn wallets(&self) -> Result<Vec<String>, Error>;

    /// Name of the local wallet.
    fn local_wallet(&self) -> Result<String, Error>;

    /// Name of the network wallet.
    fn network_wallet(&self) -> Result<String, Error>;

    /// Open (unlock) a wallet, returning a handle. Negative means refusal.
    fn open(&self, wallet: &str, window_id: i64, app_id: &str) -> Result<i32, Error>;

    /// Whether a wallet is currently open.
    fn is_open(&self, wallet: &str) -> Result<bool, Error>;

    /// Close an open wallet by handle, releasing it for `app_id`.
    fn close_handle(&self, handle: i32, force: bool, app_id: &str) -> Result<i32, Error>;

    /// Close a wallet by name regardless of who holds handles.
    fn close_wallet(&self, wallet: &str, force: bool) -> Result<i32, Error>;

    /// Close every open wallet.
    fn close_all_wallets(&self) -> Result<(), Error>;

    /// Delete a wallet outright.
    fn delete_wallet(&self, wallet: &str) -> Result<i32, Error>;

    /// Disconnect an application from a wallet.
    fn disconnect_application(&self, wallet: &str, app_id: &str) -> Result<bool, Error>;

    /// Interactively change a wallet's password.
    fn change_password(&self, wallet: &str, window_id: i64, app_id: &str) -> Result<(), Error>;

    /// Folder names within an open wallet.
    fn folder_list(&self, handle: i32, app_id: &str) -> Result<Vec<String>, Error>;

    /// Whether a wallet holds the named folder.
    fn has_folder(&self, handle: i32, folder: &str, app_id: &str) -> Result<bool, Error>;

    /// Create a folder; `false` means the daemon declined.
    fn create_folder(&self, handle: i32, folder: &str, app_id: &str) -> Result<bool, Error>;

    /// Remove a folder; `false` means the daemon declined.
    fn remove_folder(&self, handle: i32, folder: &str, app_id: &str) -> Result<bool, Error>;

    /// Entry names within a folder.
    fn entry_list(&self, handle: i32, folder: &str, app_id: &str) -> Result<Vec<String>, Error>;

    /// Whether a folder holds the named entry.
    fn has_entry(&self, handle: i32, folder: &str, key: &str, app_id: &str)
        -> Result<bool, Error>;

    /// Raw type code of an entry.
    fn entry_type(&self, handle: i32, folder: &str, key: &str, app_id: &str)
        -> Result<i32, Error>;

    /// Raw bytes of any entry.
    fn read_entry(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        app_id: &str,
    ) -> Result<Vec<u8>, Error>;

    /// A password entry's text.
    fn read_password(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        app_id: &str,
    ) -> Result<String, Error>;

    /// A map entry's wire bytes (see [`kwmap_codec`]).
    fn read_map(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        app_id: &str,
    ) -> Result<Vec<u8>, Error>;

    /// Every entry in a folder as raw bytes, keyed by entry name.
    fn read_entry_list(
        &self,
        handle: i32,
        folder: &str,
        app_id: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, Error>;

    /// Every password entry in a folder, keyed by entry name.
    fn read_password_list(
        &self,
        handle: i32,
        folder: &str,
        app_id: &str,
    ) -> Result<BTreeMap<String, String>, Error>;

    /// Every map entry in a folder as wire bytes, keyed by entry name.
    fn read_map_list(
        &self,
        handle: i32,
        folder: &str,
        app_id: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, Error>;

    /// Write raw bytes with an explicit entry type.
    fn write_entry(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        value: &[u8],
        entry_type: EntryType,
        app_id: &str,
    ) -> Result<i32, Error>;

    /// Write a password entry.
    fn write_password(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        value: &str,
        app_id: &str,
    ) -> Result<i32, Error>;

    /// Write a map entry from wire bytes.
    fn write_map(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        value: &[u8],
        app_id: &str,
    ) -> Result<i32, Error>;

    /// Remove an entry from a folder.
    fn remove_entry(&self, handle: i32, folder: &str, key: &str, app_id: &str)
        -> Result<i32, Error>;

    /// Rename an entry within a folder.
    fn rename_entry(
        &self,
        handle: i32,
        folder: &str,
        old: &str,
        new: &str,
        app_id: &str,
    ) -> Result<i32, Error>;
}
