// CLASSIFICATION: COMMUNITY
// Filename: wallet.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Wallet wrapper: open/close lifecycle and folder management.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::bus::{result_check, WalletBus};
use crate::error::{Error, Warnings};
use crate::folder::Folder;
use crate::recurse::RecurseOpts;

/// One wallet known to the daemon.
///
/// A wallet owns no daemon state until opened: the daemon hands out a
/// per-connection handle on `open`, and every folder operation requires
/// one. Operations that need a handle open the wallet on demand.
#[derive(Clone, Serialize)]
pub struct Wallet {
    #[serde(skip)]
    bus: Arc<dyn WalletBus>,
    #[serde(skip)]
    app_id: String,
    /// Wallet name.
    name: String,
    #[serde(skip)]
    handle: Option<i32>,
    /// Whether the daemon reports this wallet unlocked.
    #[serde(rename = "open")]
    unlocked: bool,
    #[serde(rename = "recurse_opts")]
    recurse: RecurseOpts,
    /// Folders, keyed by name.
    folders: BTreeMap<String, Folder>,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("unlocked", &self.unlocked)
            .field("folders", &self.folders.len())
            .finish()
    }
}

impl Wallet {
    /// Attach to (and open) the named wallet, recursing per `recurse`.
    pub fn new(
        bus: Arc<dyn WalletBus>,
        app_id: &str,
        name: &str,
        recurse: RecurseOpts,
    ) -> Result<(Self, Warnings), Error> {
        let mut wallet = Self {
            bus,
            app_id: app_id.to_string(),
            name: name.to_string(),
            handle: None,
            unlocked: false,
            recurse,
            folders: BTreeMap::new(),
        };
        wallet.open()?;
        let warnings = if recurse.wants_folders() {
            wallet.update()?
        } else {
            Warnings::new()
        };
        Ok((wallet, warnings))
    }

    /// Wallet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The daemon handle, if this wallet has been opened.
    pub fn handle(&self) -> Option<i32> {
        self.handle
    }

    /// Last-seen unlocked state (see [`Wallet::is_open`] to refresh it).
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Ask the daemon whether this wallet is open, refreshing the cache.
    pub fn is_open(&mut self) -> Result<bool, Error> {
        self.unlocked = self.bus.is_open(&self.name)?;
        Ok(self.unlocked)
    }

    /// Open (unlock) the wallet. No-op when already open with a live
    /// handle. A handle is re-requested even when the daemon reports the
    /// wallet unlocked: unlocked-ness is daemon state, a handle is ours.
    pub fn open(&mut self) -> Result<(), Error> {
        self.is_open()?;
        if self.handle.is_none() || !self.unlocked {
            let handle = self.bus.open(&self.name, 0, &self.app_id)?;
            if handle < 0 {
                return Err(Error::NoHandle(handle));
            }
            self.handle = Some(handle);
            self.unlocked = true;
            info!("opened wallet {:?} (handle {handle})", self.name);
        }
        Ok(())
    }

    /// Close the wallet's handle. `force` closes even while other parts of
    /// the application still use it.
    pub fn close(&mut self, force: bool) -> Result<(), Error> {
        let handle = self.handle.ok_or(Error::NotInitialized)?;
        result_check(self.bus.close_handle(handle, force, &self.app_id)?)?;
        info!("closed wallet {:?} (handle {handle})", self.name);
        self.handle = None;
        self.unlocked = false;
        Ok(())
    }

    pub(crate) fn mark_closed(&mut self) {
        self.handle = None;
        self.unlocked = false;
    }

    /// Interactively change this wallet's password.
    pub fn change_password(&mut self) -> Result<(), Error> {
        self.bus.change_password(&self.name, 0, &self.app_id)
    }

    pub(crate) fn ensure_open(&mut self) -> Result<i32, Error> {
        if self.handle.is_none() || !self.unlocked {
            self.open()?;
        }
        self.handle.ok_or(Error::NotInitialized)
    }

    /// Folder names the daemon lists for this wallet.
    pub fn list_folders(&mut self) -> Result<Vec<String>, Error> {
        let handle = self.ensure_open()?;
        self.bus.folder_list(handle, &self.app_id)
    }

    /// Whether the wallet holds the named folder.
    pub fn has_folder(&mut self, name: &str) -> Result<bool, Error> {
        let handle = self.ensure_open()?;
        self.bus.has_folder(handle, name, &self.app_id)
    }

    /// Create a folder and cache an empty wrapper for it.
    pub fn create_folder(&mut self, name: &str) -> Result<&mut Folder, Error> {
        let handle = self.ensure_open()?;
        if !self.bus.create_folder(handle, name, &self.app_id)? {
            return Err(Error::CreateFailed(name.to_string()));
        }
        let (folder, _) = Folder::new(
            Arc::clone(&self.bus),
            self.app_id.clone(),
            handle,
            name.to_string(),
            RecurseOpts::lazy(),
        )?;
        self.folders.insert(name.to_string(), folder);
        self.folders.get_mut(name).ok_or(Error::NotInitialized)
    }

    /// Remove a folder from the wallet and the cache.
    pub fn remove_folder(&mut self, name: &str) -> Result<(), Error> {
        let handle = self.ensure_open()?;
        if !self.bus.remove_folder(handle, name, &self.app_id)? {
            return Err(Error::RemoveFolderFailed(name.to_string()));
        }
        self.folders.remove(name);
        Ok(())
    }

    /// Re-list folders and rebuild the cache, recursing into items per the
    /// wallet's recursion flags. Per-folder failures become warnings.
    pub fn update(&mut self) -> Result<Warnings, Error> {
        let handle = self.ensure_open()?;
        let names = self.bus.folder_list(handle, &self.app_id)?;
        let mut warnings = Warnings::new();
        self.folders.clear();
        for name in names {
            match Folder::new(
                Arc::clone(&self.bus),
                self.app_id.clone(),
                handle,
                name.clone(),
                self.recurse,
            ) {
                Ok((folder, folder_warnings)) => {
                    warnings.absorb(folder_warnings);
                    self.folders.insert(name, folder);
                }
                Err(err) => warnings.push(format!("folder {name:?}: {err}")),
            }
        }
        Ok(warnings)
    }

    /// Cached folders.
    pub fn folders(&self) -> &BTreeMap<String, Folder> {
        &self.folders
    }

    /// One cached folder.
    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.get(name)
    }

    /// One cached folder, mutably.
    pub fn folder_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.get_mut(name)
    }
}
