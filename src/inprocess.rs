// CLASSIFICATION: COMMUNITY
// Filename: inprocess.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! In-process stand-in for the wallet daemon.
//!
//! [`MemoryBus`] implements [`WalletBus`] against a tree held behind a
//! mutex, with kwalletd's observable semantics: sequential non-negative
//! handles, result code 0 for success and -1 for refusal, wallets created
//! on first open, and map entries stored as their wire bytes so the codec
//! path is exercised end to end. Serves tests and demos; a real deployment
//! implements [`WalletBus`] over the session bus instead.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::bus::{EntryType, WalletBus};
use crate::consts;
use crate::error::Error;

#[derive(Debug, Clone)]
struct Entry {
    ty: i32,
    bytes: Vec<u8>,
}

type FolderState = BTreeMap<String, Entry>;

#[derive(Debug, Default)]
struct WalletState {
    open: bool,
    folders: BTreeMap<String, FolderState>,
}

#[derive(Debug)]
struct State {
    enabled: bool,
    local: String,
    network: String,
    next_handle: i32,
    handles: BTreeMap<i32, String>,
    wallets: BTreeMap<String, WalletState>,
}

impl State {
    fn wallet_by_handle(&self, handle: i32) -> Result<&WalletState, Error> {
        let name = self
            .handles
            .get(&handle)
            .ok_or_else(|| Error::Bus(format!("unknown wallet handle {handle}")))?;
        self.wallets
            .get(name)
            .ok_or_else(|| Error::Bus(format!("handle {handle} references deleted wallet")))
    }

    fn wallet_mut_by_handle(&mut self, handle: i32) -> Result<&mut WalletState, Error> {
        let name = self
            .handles
            .get(&handle)
            .cloned()
            .ok_or_else(|| Error::Bus(format!("unknown wallet handle {handle}")))?;
        self.wallets
            .get_mut(&name)
            .ok_or_else(|| Error::Bus(format!("handle {handle} references deleted wallet")))
    }

    fn entry(&self, handle: i32, folder: &str, key: &str) -> Result<&Entry, Error> {
        self.wallet_by_handle(handle)?
            .folders
            .get(folder)
            .and_then(|entries| entries.get(key))
            .ok_or_else(|| Error::Bus(format!("no entry {key:?} in folder {folder:?}")))
    }
}

/// An in-memory wallet daemon.
pub struct MemoryBus {
    state: Mutex<State>,
}

impl MemoryBus {
    /// A bus holding one closed, empty default wallet
    /// ([`consts::DEFAULT_WALLET`]).
    pub fn new() -> Self {
        Self::with_wallets([consts::DEFAULT_WALLET])
    }

    /// A bus pre-seeded with the named wallets, all closed and empty. The
    /// first name doubles as the local and network wallet.
    pub fn with_wallets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut wallets = BTreeMap::new();
        for name in names {
            wallets.insert(name.into(), WalletState::default());
        }
        let first = wallets
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| consts::DEFAULT_WALLET.to_string());
        Self {
            state: Mutex::new(State {
                enabled: true,
                local: first.clone(),
                network: first,
                next_handle: 1,
                handles: BTreeMap::new(),
                wallets,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, Error> {
        self.state
            .lock()
            .map_err(|_| Error::Bus("memory bus lock poisoned".to_string()))
    }

    /// Flip the service-enabled flag.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), Error> {
        self.lock()?.enabled = enabled;
        Ok(())
    }

    /// Plant an entry directly, creating the wallet and folder as needed.
    pub fn seed_entry(
        &self,
        wallet: &str,
        folder: &str,
        key: &str,
        ty: EntryType,
        bytes: Vec<u8>,
    ) -> Result<(), Error> {
        let mut state = self.lock()?;
        state
            .wallets
            .entry(wallet.to_string())
            .or_default()
            .folders
            .entry(folder.to_string())
            .or_default()
            .insert(
                key.to_string(),
                Entry {
                    ty: ty.into(),
                    bytes,
                },
            );
        Ok(())
    }

    /// Plant a map entry from a dictionary, encoding it to wire bytes.
    pub fn seed_map(
        &self,
        wallet: &str,
        folder: &str,
        key: &str,
        map: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        let wire = kwmap_codec::encode_map(Some(map))?;
        self.seed_entry(wallet, folder, key, EntryType::Map, wire)
    }

    /// Plant an entry carrying a raw type code the client does not know,
    /// for exercising unknown-type handling.
    pub fn seed_raw_entry(
        &self,
        wallet: &str,
        folder: &str,
        key: &str,
        raw_type: i32,
        bytes: Vec<u8>,
    ) -> Result<(), Error> {
        let mut state = self.lock()?;
        state
            .wallets
            .entry(wallet.to_string())
            .or_default()
            .folders
            .entry(folder.to_string())
            .or_default()
            .insert(key.to_string(), Entry { ty: raw_type, bytes });
        Ok(())
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletBus for MemoryBus {
    fn is_enabled(&self) -> Result<bool, Error> {
        Ok(self.lock()?.enabled)
    }

    fn wallets(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock()?.wallets.keys().cloned().collect())
    }

    fn local_wallet(&self) -> Result<String, Error> {
        Ok(self.lock()?.local.clone())
    }

    fn network_wallet(&self) -> Result<String, Error> {
        Ok(self.lock()?.network.clone())
    }

    fn open(&self, wallet: &str, _window_id: i64, _app_id: &str) -> Result<i32, Error> {
        let mut state = self.lock()?;
        if !state.enabled {
            return Ok(-1);
        }
        // The daemon creates a wallet on first open.
        state
            .wallets
            .entry(wallet.to_string())
            .or_default()
            .open = true;
        let handle = state.next_handle;
        state.next_handle += 1;
        state.handles.insert(handle, wallet.to_string());
        Ok(handle)
    }

    fn is_open(&self, wallet: &str) -> Result<bool, Error> {
        Ok(self
            .lock()?
            .wallets
            .get(wallet)
            .map(|w| w.open)
            .unwrap_or(false))
    }

    fn close_handle(&self, handle: i32, force: bool, _app_id: &str) -> Result<i32, Error> {
        let mut state = self.lock()?;
        let Some(name) = state.handles.remove(&handle) else {
            return Ok(-1);
        };
        let still_referenced = state.handles.values().any(|held| *held == name);
        if force || !still_referenced {
            if let Some(wallet) = state.wallets.get_mut(&name) {
                wallet.open = false;
            }
        }
        Ok(consts::RESULT_OK)
    }

    fn close_wallet(&self, wallet: &str, _force: bool) -> Result<i32, Error> {
        let mut state = self.lock()?;
        let state = &mut *state;
        if let Some(entry) = state.wallets.get_mut(wallet) {
            entry.open = false;
            state.handles.retain(|_, held| held != wallet);
            Ok(consts::RESULT_OK)
        } else {
            Ok(-1)
        }
    }

    fn close_all_wallets(&self) -> Result<(), Error> {
        let mut state = self.lock()?;
        for wallet in state.wallets.values_mut() {
            wallet.open = false;
        }
        state.handles.clear();
        Ok(())
    }

    fn delete_wallet(&self, wallet: &str) -> Result<i32, Error> {
        let mut state = self.lock()?;
        if state.wallets.remove(wallet).is_some() {
            state.handles.retain(|_, held| held != wallet);
            Ok(consts::RESULT_OK)
        } else {
            Ok(-1)
        }
    }

    fn disconnect_application(&self, wallet: &str, _app_id: &str) -> Result<bool, Error> {
        let mut state = self.lock()?;
        if state.wallets.contains_key(wallet) {
            state.handles.retain(|_, held| held != wallet);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn change_password(&self, wallet: &str, _window_id: i64, _app_id: &str) -> Result<(), Error> {
        let state = self.lock()?;
        if state.wallets.contains_key(wallet) {
            Ok(())
        } else {
            Err(Error::Bus(format!("no wallet {wallet:?}")))
        }
    }

    fn folder_list(&self, handle: i32, _app_id: &str) -> Result<Vec<String>, Error> {
        let state = self.lock()?;
        Ok(state
            .wallet_by_handle(handle)?
            .folders
            .keys()
            .cloned()
            .collect())
    }

    fn has_folder(&self, handle: i32, folder: &str, _app_id: &str) -> Result<bool, Error> {
        let state = self.lock()?;
        Ok(state.wallet_by_handle(handle)?.folders.contains_key(folder))
    }

    fn create_folder(&self, handle: i32, folder: &str, _app_id: &str) -> Result<bool, Error> {
        let mut state = self.lock()?;
        state
            .wallet_mut_by_handle(handle)?
            .folders
            .entry(folder.to_string())
            .or_default();
        Ok(true)
    }

    fn remove_folder(&self, handle: i32, folder: &str, _app_id: &str) -> Result<bool, Error> {
        let mut state = self.lock()?;
        Ok(state
            .wallet_mut_by_handle(handle)?
            .folders
            .remove(folder)
            .is_some())
    }

    fn entry_list(&self, handle: i32, folder: &str, _app_id: &str) -> Result<Vec<String>, Error> {
        let state = self.lock()?;
        Ok(state
            .wallet_by_handle(handle)?
            .folders
            .get(folder)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn has_entry(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        _app_id: &str,
    ) -> Result<bool, Error> {
        let state = self.lock()?;
        Ok(state
            .wallet_by_handle(handle)?
            .folders
            .get(folder)
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false))
    }

    fn entry_type(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        _app_id: &str,
    ) -> Result<i32, Error> {
        let state = self.lock()?;
        Ok(state.entry(handle, folder, key)?.ty)
    }

    fn read_entry(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        _app_id: &str,
    ) -> Result<Vec<u8>, Error> {
        let state = self.lock()?;
        Ok(state.entry(handle, folder, key)?.bytes.clone())
    }

    fn read_password(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        _app_id: &str,
    ) -> Result<String, Error> {
        let state = self.lock()?;
        let entry = state.entry(handle, folder, key)?;
        String::from_utf8(entry.bytes.clone())
            .map_err(|_| Error::Bus(format!("password entry {key:?} is not utf8")))
    }

    fn read_map(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        _app_id: &str,
    ) -> Result<Vec<u8>, Error> {
        let state = self.lock()?;
        Ok(state.entry(handle, folder, key)?.bytes.clone())
    }

    fn read_entry_list(
        &self,
        handle: i32,
        folder: &str,
        _app_id: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, Error> {
        let state = self.lock()?;
        Ok(state
            .wallet_by_handle(handle)?
            .folders
            .get(folder)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, entry)| (key.clone(), entry.bytes.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn read_password_list(
        &self,
        handle: i32,
        folder: &str,
        _app_id: &str,
    ) -> Result<BTreeMap<String, String>, Error> {
        let state = self.lock()?;
        let mut listed = BTreeMap::new();
        if let Some(entries) = state.wallet_by_handle(handle)?.folders.get(folder) {
            for (key, entry) in entries {
                if entry.ty != i32::from(EntryType::Password) {
                    continue;
                }
                let text = String::from_utf8(entry.bytes.clone())
                    .map_err(|_| Error::Bus(format!("password entry {key:?} is not utf8")))?;
                listed.insert(key.clone(), text);
            }
        }
        Ok(listed)
    }

    fn read_map_list(
        &self,
        handle: i32,
        folder: &str,
        _app_id: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, Error> {
        let state = self.lock()?;
        Ok(state
            .wallet_by_handle(handle)?
            .folders
            .get(folder)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, entry)| entry.ty == i32::from(EntryType::Map))
                    .map(|(key, entry)| (key.clone(), entry.bytes.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write_entry(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        value: &[u8],
        entry_type: EntryType,
        _app_id: &str,
    ) -> Result<i32, Error> {
        let mut state = self.lock()?;
        let Ok(wallet) = state.wallet_mut_by_handle(handle) else {
            return Ok(-1);
        };
        let Some(entries) = wallet.folders.get_mut(folder) else {
            return Ok(-1);
        };
        entries.insert(
            key.to_string(),
            Entry {
                ty: entry_type.into(),
                bytes: value.to_vec(),
            },
        );
        Ok(consts::RESULT_OK)
    }

    fn write_password(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        value: &str,
        app_id: &str,
    ) -> Result<i32, Error> {
        self.write_entry(
            handle,
            folder,
            key,
            value.as_bytes(),
            EntryType::Password,
            app_id,
        )
    }

    fn write_map(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        value: &[u8],
        app_id: &str,
    ) -> Result<i32, Error> {
        self.write_entry(handle, folder, key, value, EntryType::Map, app_id)
    }

    fn remove_entry(
        &self,
        handle: i32,
        folder: &str,
        key: &str,
        _app_id: &str,
    ) -> Result<i32, Error> {
        let mut state = self.lock()?;
        let Ok(wallet) = state.wallet_mut_by_handle(handle) else {
            return Ok(-1);
        };
        let removed = wallet
            .folders
            .get_mut(folder)
            .and_then(|entries| entries.remove(key))
            .is_some();
        Ok(if removed { consts::RESULT_OK } else { -1 })
    }

    fn rename_entry(
        &self,
        handle: i32,
        folder: &str,
        old: &str,
        new: &str,
        _app_id: &str,
    ) -> Result<i32, Error> {
        let mut state = self.lock()?;
        let Ok(wallet) = state.wallet_mut_by_handle(handle) else {
            return Ok(-1);
        };
        let Some(entries) = wallet.folders.get_mut(folder) else {
            return Ok(-1);
        };
        match entries.remove(old) {
            Some(entry) => {
                entries.insert(new.to_string(), entry);
                Ok(consts::RESULT_OK)
            }
            None => Ok(-1),
        }
    }
}
