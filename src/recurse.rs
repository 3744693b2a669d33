// CLASSIFICATION: COMMUNITY
// Filename: recurse.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Recursion policy for populating the wallet tree.

use serde::Serialize;

use crate::error::Warnings;

/// Controls how eagerly each layer of the tree fetches its children.
///
/// Every constructor in the tree consults these flags: a manager populates
/// its wallets only when `all` or `wallets` is set, a wallet its folders
/// only under `all` or `folders`, and a folder its items per the item
/// flags. Anything left lazy can still be fetched later through the
/// `update` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecurseOpts {
    /// Recurse everything below the structural layers; forces `wallets`
    /// and `folders`. Item recursion stays governed by `all_wallet_items`.
    pub all: bool,
    /// Populate `Wallet` objects when building a manager.
    pub wallets: bool,
    /// Populate `Folder` objects when building a wallet.
    pub folders: bool,
    /// Fetch every item kind; forces the four item flags below.
    pub all_wallet_items: bool,
    /// Fetch `Password` values when building a folder.
    pub passwords: bool,
    /// Fetch `Map` values when building a folder.
    pub maps: bool,
    /// Fetch `Blob` values when building a folder.
    pub blobs: bool,
    /// Fetch `UnknownItem` values when building a folder.
    pub unknown_items: bool,
}

impl RecurseOpts {
    /// Build options from explicit flags, applying the override rules.
    ///
    /// `all` silently forces `wallets` and `folders`; `all_wallet_items`
    /// silently forces the four item flags. Each override of a flag the
    /// caller set to `false` is reported in the returned [`Warnings`].
    pub fn new(
        all: bool,
        mut wallets: bool,
        mut folders: bool,
        all_wallet_items: bool,
        mut passwords: bool,
        mut maps: bool,
        mut blobs: bool,
        mut unknown_items: bool,
    ) -> (Self, Warnings) {
        let mut warnings = Warnings::new();
        if all {
            if !wallets {
                warnings.push("wallets was false but all is true; all overrides wallets to true");
                wallets = true;
            }
            if !folders {
                warnings.push("folders was false but all is true; all overrides folders to true");
                folders = true;
            }
        }
        if all_wallet_items {
            for (flag, name) in [
                (&mut passwords, "passwords"),
                (&mut maps, "maps"),
                (&mut blobs, "blobs"),
                (&mut unknown_items, "unknown_items"),
            ] {
                if !*flag {
                    warnings.push(format!(
                        "{name} was false but all_wallet_items is true; \
                         all_wallet_items overrides {name} to true"
                    ));
                    *flag = true;
                }
            }
        }
        (
            Self {
                all,
                wallets,
                folders,
                all_wallet_items,
                passwords,
                maps,
                blobs,
                unknown_items,
            },
            warnings,
        )
    }

    /// Recurse every layer and every item kind.
    pub fn everything() -> Self {
        let (opts, _) = Self::new(true, true, true, true, true, true, true, true);
        opts
    }

    /// Fetch nothing eagerly; the whole tree stays lazy.
    pub fn lazy() -> Self {
        Self {
            all: false,
            wallets: false,
            folders: false,
            all_wallet_items: false,
            passwords: false,
            maps: false,
            blobs: false,
            unknown_items: false,
        }
    }

    pub(crate) fn wants_wallets(&self) -> bool {
        self.all || self.wallets
    }

    pub(crate) fn wants_folders(&self) -> bool {
        self.all || self.folders
    }

    pub(crate) fn wants_passwords(&self) -> bool {
        self.all_wallet_items || self.passwords
    }

    pub(crate) fn wants_maps(&self) -> bool {
        self.all_wallet_items || self.maps
    }

    pub(crate) fn wants_blobs(&self) -> bool {
        self.all_wallet_items || self.blobs
    }

    pub(crate) fn wants_unknown(&self) -> bool {
        self.all_wallet_items || self.unknown_items
    }

    pub(crate) fn wants_any_items(&self) -> bool {
        self.wants_passwords() || self.wants_maps() || self.wants_blobs() || self.wants_unknown()
    }
}

impl Default for RecurseOpts {
    /// Structural layers eager, item values lazy.
    fn default() -> Self {
        Self {
            all: false,
            wallets: true,
            folders: true,
            all_wallet_items: false,
            passwords: false,
            maps: false,
            blobs: false,
            unknown_items: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_overrides_structural_flags_with_warnings() {
        let (opts, warnings) = RecurseOpts::new(true, false, false, false, false, false, false, false);
        assert!(opts.wallets);
        assert!(opts.folders);
        assert!(!opts.passwords);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn all_wallet_items_overrides_item_flags_with_warnings() {
        let (opts, warnings) = RecurseOpts::new(false, true, true, true, false, true, false, false);
        assert!(opts.passwords);
        assert!(opts.maps);
        assert!(opts.blobs);
        assert!(opts.unknown_items);
        // maps was already true, so only three overrides fire.
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn consistent_flags_warn_nothing() {
        let (_, warnings) = RecurseOpts::new(false, true, true, false, true, false, false, false);
        assert!(warnings.is_empty());
    }

    #[test]
    fn default_is_structural_only() {
        let opts = RecurseOpts::default();
        assert!(opts.wants_wallets());
        assert!(opts.wants_folders());
        assert!(!opts.wants_any_items());
    }
}
