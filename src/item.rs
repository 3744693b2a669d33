// CLASSIFICATION: COMMUNITY
// Filename: item.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! The four item kinds a folder can hold.
//!
//! Each item caches one entry's value and knows enough (bus handle, wallet
//! handle, folder name) to refresh or rewrite itself without walking back
//! up the tree. Items are created by [`crate::folder::Folder`]; the daemon
//! remains the source of truth and `update` re-fetches on demand.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::bus::{result_check, EntryType, WalletBus};
use crate::error::Error;

/// Common surface of the four item kinds.
pub trait WalletItem {
    /// Entry name within the folder.
    fn name(&self) -> &str;
    /// The kwalletd entry type this item maps to.
    fn entry_type(&self) -> EntryType;
}

/// Shared plumbing every item carries.
#[derive(Clone)]
pub(crate) struct ItemHandle {
    pub(crate) bus: Arc<dyn WalletBus>,
    pub(crate) app_id: String,
    pub(crate) wallet_handle: i32,
    pub(crate) folder: String,
}

impl fmt::Debug for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHandle")
            .field("app_id", &self.app_id)
            .field("wallet_handle", &self.wallet_handle)
            .field("folder", &self.folder)
            .finish()
    }
}

/// A single-value text secret.
#[derive(Debug, Clone, Serialize)]
pub struct Password {
    #[serde(skip)]
    handle: ItemHandle,
    /// Entry name.
    name: String,
    /// Cached secret text.
    value: String,
}

impl Password {
    pub(crate) fn new(handle: ItemHandle, name: String, value: String) -> Self {
        Self {
            handle,
            name,
            value,
        }
    }

    /// The cached secret text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Re-fetch the value from the daemon.
    pub fn update(&mut self) -> Result<(), Error> {
        self.value = self.handle.bus.read_password(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            &self.handle.app_id,
        )?;
        Ok(())
    }

    /// Write a new value through to the daemon and cache it.
    pub fn set(&mut self, value: &str) -> Result<(), Error> {
        result_check(self.handle.bus.write_password(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            value,
            &self.handle.app_id,
        )?)?;
        self.value = value.to_string();
        Ok(())
    }
}

impl WalletItem for Password {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_type(&self) -> EntryType {
        EntryType::Password
    }
}

/// A string→string dictionary secret.
///
/// The value is `Option` so the daemon-side distinction between "no map"
/// and "empty map" survives: a freshly listed but never fetched item holds
/// `None`, and writing `None` is refused (see
/// [`kwmap_codec::CodecError::MissingMap`]).
#[derive(Debug, Clone, Serialize)]
pub struct Map {
    #[serde(skip)]
    handle: ItemHandle,
    /// Entry name.
    name: String,
    /// Cached dictionary, if fetched.
    value: Option<BTreeMap<String, String>>,
}

impl Map {
    pub(crate) fn new(
        handle: ItemHandle,
        name: String,
        value: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            handle,
            name,
            value,
        }
    }

    /// The cached dictionary, if it has been fetched.
    pub fn value(&self) -> Option<&BTreeMap<String, String>> {
        self.value.as_ref()
    }

    /// Look up one key in the cached dictionary.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.value.as_ref()?.get(key).map(String::as_str)
    }

    /// Re-fetch and decode the dictionary from the daemon.
    pub fn update(&mut self) -> Result<(), Error> {
        let wire = self.handle.bus.read_map(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            &self.handle.app_id,
        )?;
        let (map, count) = kwmap_codec::decode_map(&wire)?;
        debug!("decoded map entry {:?}: {count} wire entries", self.name);
        self.value = Some(map);
        Ok(())
    }

    /// Encode and write a new dictionary through to the daemon, then cache
    /// it.
    pub fn set(&mut self, value: &BTreeMap<String, String>) -> Result<(), Error> {
        let wire = kwmap_codec::encode_map(Some(value))?;
        result_check(self.handle.bus.write_map(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            &wire,
            &self.handle.app_id,
        )?)?;
        self.value = Some(value.clone());
        Ok(())
    }
}

impl WalletItem for Map {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_type(&self) -> EntryType {
        EntryType::Map
    }
}

/// A binary secret (a kwalletd stream entry).
#[derive(Debug, Clone, Serialize)]
pub struct Blob {
    #[serde(skip)]
    handle: ItemHandle,
    /// Entry name.
    name: String,
    /// Cached bytes.
    value: Vec<u8>,
}

impl Blob {
    pub(crate) fn new(handle: ItemHandle, name: String, value: Vec<u8>) -> Self {
        Self {
            handle,
            name,
            value,
        }
    }

    /// The cached bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Re-fetch the bytes from the daemon.
    pub fn update(&mut self) -> Result<(), Error> {
        self.value = self.handle.bus.read_entry(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            &self.handle.app_id,
        )?;
        Ok(())
    }

    /// Write new bytes through to the daemon and cache them.
    pub fn set(&mut self, value: &[u8]) -> Result<(), Error> {
        result_check(self.handle.bus.write_entry(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            value,
            EntryType::Stream,
            &self.handle.app_id,
        )?)?;
        self.value = value.to_vec();
        Ok(())
    }
}

impl WalletItem for Blob {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_type(&self) -> EntryType {
        EntryType::Stream
    }
}

/// An entry the daemon could not classify.
///
/// The value is kept as the raw bytes `readEntry` returned, alongside the
/// raw type code the daemon reported. Read-only: writing an entry of
/// unknown classification back would guess at its wire form.
#[derive(Debug, Clone, Serialize)]
pub struct UnknownItem {
    #[serde(skip)]
    handle: ItemHandle,
    /// Entry name.
    name: String,
    /// Cached raw bytes.
    value: Vec<u8>,
    /// Type code the daemon reported for this entry.
    raw_type: i32,
}

impl UnknownItem {
    pub(crate) fn new(handle: ItemHandle, name: String, value: Vec<u8>, raw_type: i32) -> Self {
        Self {
            handle,
            name,
            value,
            raw_type,
        }
    }

    /// The cached raw bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The raw type code the daemon reported.
    pub fn raw_type(&self) -> i32 {
        self.raw_type
    }

    /// Re-fetch the bytes and type code from the daemon.
    pub fn update(&mut self) -> Result<(), Error> {
        self.value = self.handle.bus.read_entry(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            &self.handle.app_id,
        )?;
        self.raw_type = self.handle.bus.entry_type(
            self.handle.wallet_handle,
            &self.handle.folder,
            &self.name,
            &self.handle.app_id,
        )?;
        Ok(())
    }
}

impl WalletItem for UnknownItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_type(&self) -> EntryType {
        EntryType::Unknown
    }
}
