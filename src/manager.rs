// CLASSIFICATION: COMMUNITY
// Filename: manager.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Top of the tree: wallet discovery and service-level operations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::bus::{result_check, WalletBus};
use crate::consts;
use crate::error::{Error, Warnings};
use crate::recurse::RecurseOpts;
use crate::wallet::Wallet;

/// Handle on the wallet service as a whole.
#[derive(Clone, Serialize)]
pub struct WalletManager {
    #[serde(skip)]
    bus: Arc<dyn WalletBus>,
    /// Application identifier reported to the daemon.
    app_id: String,
    #[serde(rename = "recurse_opts")]
    recurse: RecurseOpts,
    /// Wallets, keyed by name.
    wallets: BTreeMap<String, Wallet>,
    /// Whether the service reported itself enabled at the last probe.
    enabled: bool,
    /// Name of the local wallet, once resolved.
    #[serde(rename = "local_wallet")]
    local: Option<String>,
    /// Name of the network wallet, once resolved.
    #[serde(rename = "network_wallet")]
    network: Option<String>,
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager")
            .field("app_id", &self.app_id)
            .field("enabled", &self.enabled)
            .field("wallets", &self.wallets.len())
            .finish()
    }
}

impl WalletManager {
    /// Connect to the wallet service over the given bus.
    ///
    /// `app_id` defaults to [`consts::DEFAULT_APP_ID`] when `None`. The
    /// service is probed for its enabled state immediately; wallets are
    /// discovered eagerly only when the recursion flags ask for it.
    pub fn new(
        bus: Arc<dyn WalletBus>,
        app_id: Option<&str>,
        recurse: RecurseOpts,
    ) -> Result<(Self, Warnings), Error> {
        let app_id = app_id.unwrap_or(consts::DEFAULT_APP_ID).to_string();
        let enabled = bus.is_enabled()?;
        info!("wallet service enabled = {enabled} (app id {app_id:?})");
        let mut manager = Self {
            bus,
            app_id,
            recurse,
            wallets: BTreeMap::new(),
            enabled,
            local: None,
            network: None,
        };
        let warnings = if recurse.wants_wallets() {
            manager.update()?
        } else {
            Warnings::new()
        };
        Ok((manager, warnings))
    }

    /// The application identifier this manager reports to the daemon.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Last-probed enabled state.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Ask the daemon whether the service is enabled, refreshing the cache.
    pub fn is_enabled(&mut self) -> Result<bool, Error> {
        self.enabled = self.bus.is_enabled()?;
        Ok(self.enabled)
    }

    /// Resolve (and cache) the local wallet's name.
    pub fn local_wallet(&mut self) -> Result<String, Error> {
        let name = self.bus.local_wallet()?;
        self.local = Some(name.clone());
        Ok(name)
    }

    /// Resolve (and cache) the network wallet's name.
    pub fn network_wallet(&mut self) -> Result<String, Error> {
        let name = self.bus.network_wallet()?;
        self.network = Some(name.clone());
        Ok(name)
    }

    /// Wallet names straight from the daemon.
    pub fn list_wallets(&self) -> Result<Vec<String>, Error> {
        self.bus.wallets()
    }

    /// Re-probe the service and rebuild the wallet cache, recursing per
    /// the manager's recursion flags. A wallet that refuses to open (for
    /// instance one the user declines to unlock) becomes a warning, not a
    /// failure of the whole walk.
    pub fn update(&mut self) -> Result<Warnings, Error> {
        self.enabled = self.bus.is_enabled()?;
        self.local = Some(self.bus.local_wallet()?);
        self.network = Some(self.bus.network_wallet()?);

        let names = self.bus.wallets()?;
        let mut warnings = Warnings::new();
        self.wallets.clear();
        for name in names {
            match Wallet::new(Arc::clone(&self.bus), &self.app_id, &name, self.recurse) {
                Ok((wallet, wallet_warnings)) => {
                    warnings.absorb(wallet_warnings);
                    self.wallets.insert(name, wallet);
                }
                Err(err) => warnings.push(format!("wallet {name:?}: {err}")),
            }
        }
        Ok(warnings)
    }

    /// Open the named wallet, attaching it to the cache first if needed.
    pub fn open_wallet(&mut self, name: &str) -> Result<&mut Wallet, Error> {
        if !self.wallets.contains_key(name) {
            let (wallet, warnings) =
                Wallet::new(Arc::clone(&self.bus), &self.app_id, name, self.recurse)?;
            if !warnings.is_empty() {
                warn!("opening wallet {name:?} produced warnings:\n{warnings}");
            }
            self.wallets.insert(name.to_string(), wallet);
        }
        let wallet = self.wallets.get_mut(name).ok_or(Error::NotInitialized)?;
        wallet.open()?;
        Ok(wallet)
    }

    /// Cached wallets.
    pub fn wallets(&self) -> &BTreeMap<String, Wallet> {
        &self.wallets
    }

    /// One cached wallet.
    pub fn wallet(&self, name: &str) -> Option<&Wallet> {
        self.wallets.get(name)
    }

    /// One cached wallet, mutably.
    pub fn wallet_mut(&mut self, name: &str) -> Option<&mut Wallet> {
        self.wallets.get_mut(name)
    }

    /// Close every open wallet and drop all cached handles.
    pub fn close_all_wallets(&mut self) -> Result<(), Error> {
        self.bus.close_all_wallets()?;
        for wallet in self.wallets.values_mut() {
            wallet.mark_closed();
        }
        info!("closed all wallets");
        Ok(())
    }

    /// Delete a wallet outright and evict it from the cache.
    pub fn delete_wallet(&mut self, name: &str) -> Result<(), Error> {
        result_check(self.bus.delete_wallet(name)?)?;
        self.wallets.remove(name);
        info!("deleted wallet {name:?}");
        Ok(())
    }

    /// Disconnect an application from a wallet.
    pub fn disconnect_application(&self, wallet: &str, app_id: &str) -> Result<(), Error> {
        if !self.bus.disconnect_application(wallet, app_id)? {
            return Err(Error::DisconnectFailed {
                wallet: wallet.to_string(),
                app: app_id.to_string(),
            });
        }
        Ok(())
    }
}
