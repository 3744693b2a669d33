// CLASSIFICATION: COMMUNITY
// Filename: folder.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Folder wrapper: entry listing, classification, and typed access.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::bus::{result_check, EntryType, WalletBus};
use crate::error::{Error, Warnings};
use crate::item::{Blob, ItemHandle, Map, Password, UnknownItem};
use crate::recurse::RecurseOpts;

/// One folder within an open wallet, caching its items by kind.
///
/// Bulk updates walk every entry the daemon lists and keep going past
/// per-entry failures, reporting them as [`Warnings`]; the single-entry
/// `read_*`/`write_*` calls fail hard instead.
#[derive(Clone, Serialize)]
pub struct Folder {
    #[serde(skip)]
    bus: Arc<dyn WalletBus>,
    #[serde(skip)]
    app_id: String,
    #[serde(skip)]
    wallet_handle: i32,
    /// Folder name.
    name: String,
    #[serde(rename = "recurse_opts")]
    recurse: RecurseOpts,
    /// Password items, keyed by entry name.
    passwords: BTreeMap<String, Password>,
    /// Map items, keyed by entry name.
    maps: BTreeMap<String, Map>,
    /// Blob items, keyed by entry name.
    #[serde(rename = "binary_data")]
    blobs: BTreeMap<String, Blob>,
    /// Unclassified items, keyed by entry name.
    unknown: BTreeMap<String, UnknownItem>,
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("name", &self.name)
            .field("wallet_handle", &self.wallet_handle)
            .field("passwords", &self.passwords.len())
            .field("maps", &self.maps.len())
            .field("blobs", &self.blobs.len())
            .field("unknown", &self.unknown.len())
            .finish()
    }
}

impl Folder {
    pub(crate) fn new(
        bus: Arc<dyn WalletBus>,
        app_id: String,
        wallet_handle: i32,
        name: String,
        recurse: RecurseOpts,
    ) -> Result<(Self, Warnings), Error> {
        let mut folder = Self {
            bus,
            app_id,
            wallet_handle,
            name,
            recurse,
            passwords: BTreeMap::new(),
            maps: BTreeMap::new(),
            blobs: BTreeMap::new(),
            unknown: BTreeMap::new(),
        };
        let warnings = if recurse.wants_any_items() {
            folder.update()?
        } else {
            Warnings::new()
        };
        Ok((folder, warnings))
    }

    fn item_handle(&self) -> ItemHandle {
        ItemHandle {
            bus: Arc::clone(&self.bus),
            app_id: self.app_id.clone(),
            wallet_handle: self.wallet_handle,
            folder: self.name.clone(),
        }
    }

    /// Folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry names the daemon lists for this folder.
    pub fn entry_names(&self) -> Result<Vec<String>, Error> {
        self.bus
            .entry_list(self.wallet_handle, &self.name, &self.app_id)
    }

    /// Whether the folder holds the named entry.
    pub fn has_entry(&self, key: &str) -> Result<bool, Error> {
        self.bus
            .has_entry(self.wallet_handle, &self.name, key, &self.app_id)
    }

    /// The type of the named entry.
    pub fn entry_type(&self, key: &str) -> Result<EntryType, Error> {
        let raw = self
            .bus
            .entry_type(self.wallet_handle, &self.name, key, &self.app_id)?;
        EntryType::try_from(raw)
    }

    /// Re-list every entry, classify by type, and rebuild the item caches
    /// selected by the folder's recursion flags.
    pub fn update(&mut self) -> Result<Warnings, Error> {
        let mut warnings = Warnings::new();
        self.passwords.clear();
        self.maps.clear();
        self.blobs.clear();
        self.unknown.clear();

        let names = self.entry_names()?;
        for key in names {
            if let Err(err) = self.fetch_entry(&key) {
                warnings.push(format!("folder {:?} entry {key:?}: {err}", self.name));
            }
        }
        debug!(
            "folder {:?} updated: {} passwords, {} maps, {} blobs, {} unknown",
            self.name,
            self.passwords.len(),
            self.maps.len(),
            self.blobs.len(),
            self.unknown.len()
        );
        Ok(warnings)
    }

    /// Fetch one listed entry into the cache its type selects, honouring
    /// the recursion flags. An unrecognised type code is treated as
    /// unclassified rather than an error: the daemon may learn new types
    /// before this client does.
    fn fetch_entry(&mut self, key: &str) -> Result<(), Error> {
        let raw = self
            .bus
            .entry_type(self.wallet_handle, &self.name, key, &self.app_id)?;
        match EntryType::try_from(raw) {
            Ok(EntryType::Password) if self.recurse.wants_passwords() => {
                self.read_password(key)?;
            }
            Ok(EntryType::Map) if self.recurse.wants_maps() => {
                self.read_map(key)?;
            }
            Ok(EntryType::Stream) if self.recurse.wants_blobs() => {
                self.read_blob(key)?;
            }
            Ok(EntryType::Unknown) | Err(_) if self.recurse.wants_unknown() => {
                let bytes =
                    self.bus
                        .read_entry(self.wallet_handle, &self.name, key, &self.app_id)?;
                self.unknown.insert(
                    key.to_string(),
                    UnknownItem::new(self.item_handle(), key.to_string(), bytes, raw),
                );
            }
            _ => {}
        }
        Ok(())
    }

    /// Rebuild the password cache from the daemon's bulk list. The bulk
    /// RPC returns decoded text directly, so this never warns; the return
    /// type matches the other bulk updates.
    pub fn update_passwords(&mut self) -> Result<Warnings, Error> {
        let listed = self
            .bus
            .read_password_list(self.wallet_handle, &self.name, &self.app_id)?;
        self.passwords = listed
            .into_iter()
            .map(|(key, value)| {
                let item = Password::new(self.item_handle(), key.clone(), value);
                (key, item)
            })
            .collect();
        Ok(Warnings::new())
    }

    /// Rebuild the map cache from the daemon's bulk list, decoding each
    /// entry. Undecodable entries are skipped with a warning.
    pub fn update_maps(&mut self) -> Result<Warnings, Error> {
        let mut warnings = Warnings::new();
        let listed = self
            .bus
            .read_map_list(self.wallet_handle, &self.name, &self.app_id)?;
        self.maps.clear();
        for (key, wire) in listed {
            match kwmap_codec::decode_map(&wire) {
                Ok((value, _)) => {
                    let item = Map::new(self.item_handle(), key.clone(), Some(value));
                    self.maps.insert(key, item);
                }
                Err(err) => {
                    warn!("folder {:?} map {key:?} failed to decode: {err}", self.name);
                    warnings.push(format!("map {key:?}: {err}"));
                }
            }
        }
        Ok(warnings)
    }

    /// Rebuild the blob cache from the daemon's bulk entry list.
    pub fn update_blobs(&mut self) -> Result<Warnings, Error> {
        let mut warnings = Warnings::new();
        let listed = self
            .bus
            .read_entry_list(self.wallet_handle, &self.name, &self.app_id)?;
        self.blobs.clear();
        for (key, bytes) in listed {
            match self.entry_type(&key) {
                Ok(EntryType::Stream) => {
                    let item = Blob::new(self.item_handle(), key.clone(), bytes);
                    self.blobs.insert(key, item);
                }
                Ok(_) => {}
                Err(err) => warnings.push(format!("blob {key:?}: {err}")),
            }
        }
        Ok(warnings)
    }

    /// Rebuild the unclassified cache from the daemon's entry list. There
    /// is no bulk RPC for these; each candidate is fetched individually and
    /// per-entry failures become warnings.
    pub fn update_unknown(&mut self) -> Result<Warnings, Error> {
        let mut warnings = Warnings::new();
        let names = self.entry_names()?;
        self.unknown.clear();
        for key in names {
            let raw = self
                .bus
                .entry_type(self.wallet_handle, &self.name, &key, &self.app_id)?;
            match EntryType::try_from(raw) {
                Ok(EntryType::Unknown) | Err(_) => {}
                Ok(_) => continue,
            }
            match self
                .bus
                .read_entry(self.wallet_handle, &self.name, &key, &self.app_id)
            {
                Ok(bytes) => {
                    let item = UnknownItem::new(self.item_handle(), key.clone(), bytes, raw);
                    self.unknown.insert(key, item);
                }
                Err(err) => warnings.push(format!("unknown item {key:?}: {err}")),
            }
        }
        Ok(warnings)
    }

    /// Read one password entry and cache it.
    pub fn read_password(&mut self, key: &str) -> Result<Password, Error> {
        let value = self
            .bus
            .read_password(self.wallet_handle, &self.name, key, &self.app_id)?;
        let item = Password::new(self.item_handle(), key.to_string(), value);
        self.passwords.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Write one password entry and cache it.
    pub fn write_password(&mut self, key: &str, value: &str) -> Result<Password, Error> {
        result_check(self.bus.write_password(
            self.wallet_handle,
            &self.name,
            key,
            value,
            &self.app_id,
        )?)?;
        let item = Password::new(self.item_handle(), key.to_string(), value.to_string());
        self.passwords.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Read one map entry, decode it, and cache it.
    pub fn read_map(&mut self, key: &str) -> Result<Map, Error> {
        let wire = self
            .bus
            .read_map(self.wallet_handle, &self.name, key, &self.app_id)?;
        let (value, count) = kwmap_codec::decode_map(&wire)?;
        debug!("decoded map entry {key:?}: {count} wire entries");
        let item = Map::new(self.item_handle(), key.to_string(), Some(value));
        self.maps.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Encode and write one map entry, then cache it.
    ///
    /// `None` is refused with [`Error::InvalidMap`] before anything touches
    /// the bus; `Some` of an empty dictionary is a valid write.
    pub fn write_map(
        &mut self,
        key: &str,
        value: Option<&BTreeMap<String, String>>,
    ) -> Result<Map, Error> {
        let wire = kwmap_codec::encode_map(value).map_err(|err| match err {
            kwmap_codec::CodecError::MissingMap => Error::InvalidMap,
            other => Error::Codec(other),
        })?;
        result_check(self.bus.write_map(
            self.wallet_handle,
            &self.name,
            key,
            &wire,
            &self.app_id,
        )?)?;
        // encode_map already rejected None.
        let cached = value.cloned();
        let item = Map::new(self.item_handle(), key.to_string(), cached);
        self.maps.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Read one blob entry and cache it.
    pub fn read_blob(&mut self, key: &str) -> Result<Blob, Error> {
        let bytes = self
            .bus
            .read_entry(self.wallet_handle, &self.name, key, &self.app_id)?;
        let item = Blob::new(self.item_handle(), key.to_string(), bytes);
        self.blobs.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Write one blob entry and cache it.
    pub fn write_blob(&mut self, key: &str, value: &[u8]) -> Result<Blob, Error> {
        result_check(self.bus.write_entry(
            self.wallet_handle,
            &self.name,
            key,
            value,
            EntryType::Stream,
            &self.app_id,
        )?)?;
        let item = Blob::new(self.item_handle(), key.to_string(), value.to_vec());
        self.blobs.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Read one entry without classifying it, caching it as unknown.
    pub fn read_unknown(&mut self, key: &str) -> Result<UnknownItem, Error> {
        let bytes = self
            .bus
            .read_entry(self.wallet_handle, &self.name, key, &self.app_id)?;
        let raw = self
            .bus
            .entry_type(self.wallet_handle, &self.name, key, &self.app_id)?;
        let item = UnknownItem::new(self.item_handle(), key.to_string(), bytes, raw);
        self.unknown.insert(key.to_string(), item.clone());
        Ok(item)
    }

    /// Remove an entry from the folder and every cache.
    pub fn remove_entry(&mut self, key: &str) -> Result<(), Error> {
        result_check(
            self.bus
                .remove_entry(self.wallet_handle, &self.name, key, &self.app_id)?,
        )?;
        self.passwords.remove(key);
        self.maps.remove(key);
        self.blobs.remove(key);
        self.unknown.remove(key);
        Ok(())
    }

    /// Rename an entry, re-keying any cached item under its new name.
    pub fn rename_entry(&mut self, old: &str, new: &str) -> Result<(), Error> {
        result_check(
            self.bus
                .rename_entry(self.wallet_handle, &self.name, old, new, &self.app_id)?,
        )?;
        if let Some(item) = self.passwords.remove(old) {
            self.passwords.insert(
                new.to_string(),
                Password::new(self.item_handle(), new.to_string(), item.value().to_string()),
            );
        }
        if let Some(item) = self.maps.remove(old) {
            self.maps.insert(
                new.to_string(),
                Map::new(self.item_handle(), new.to_string(), item.value().cloned()),
            );
        }
        if let Some(item) = self.blobs.remove(old) {
            self.blobs.insert(
                new.to_string(),
                Blob::new(self.item_handle(), new.to_string(), item.value().to_vec()),
            );
        }
        if let Some(item) = self.unknown.remove(old) {
            self.unknown.insert(
                new.to_string(),
                UnknownItem::new(
                    self.item_handle(),
                    new.to_string(),
                    item.value().to_vec(),
                    item.raw_type(),
                ),
            );
        }
        Ok(())
    }

    /// Cached password items.
    pub fn passwords(&self) -> &BTreeMap<String, Password> {
        &self.passwords
    }

    /// One cached password item.
    pub fn password(&self, key: &str) -> Option<&Password> {
        self.passwords.get(key)
    }

    /// Cached map items.
    pub fn maps(&self) -> &BTreeMap<String, Map> {
        &self.maps
    }

    /// One cached map item.
    pub fn map(&self, key: &str) -> Option<&Map> {
        self.maps.get(key)
    }

    /// Cached blob items.
    pub fn blobs(&self) -> &BTreeMap<String, Blob> {
        &self.blobs
    }

    /// One cached blob item.
    pub fn blob(&self, key: &str) -> Option<&Blob> {
        self.blobs.get(key)
    }

    /// Cached unclassified items.
    pub fn unknown_items(&self) -> &BTreeMap<String, UnknownItem> {
        &self.unknown
    }

    /// One cached unclassified item.
    pub fn unknown_item(&self, key: &str) -> Option<&UnknownItem> {
        self.unknown.get(key)
    }
}
