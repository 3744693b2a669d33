// CLASSIFICATION: COMMUNITY
// Filename: consts.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Bus names, defaults, and result codes for the kwalletd service.

/// Session-bus service name of the KWallet daemon.
pub const SERVICE: &str = "org.kde.kwalletd5";

/// Object path the daemon exposes its module on.
pub const PATH: &str = "/modules/kwalletd5";

/// Interface all wallet-manager methods live on.
pub const INTERFACE: &str = "org.kde.KWallet";

/// Name of the wallet the daemon creates by default.
pub const DEFAULT_WALLET: &str = "kdewallet";

/// Application identifier reported to the daemon when the caller gives none.
pub const DEFAULT_APP_ID: &str = "kwallet-client";

/// Result code the daemon returns for a successful mutating call. Anything
/// else (conventionally -1) is a refusal.
pub const RESULT_OK: i32 = 0;

/// Method member names on [`INTERFACE`], for transport implementations.
pub mod member {
    /// Change a wallet's password interactively.
    pub const CHANGE_PASSWORD: &str = "changePassword";
    /// Close a wallet by handle or name.
    pub const CLOSE: &str = "close";
    /// Close every open wallet.
    pub const CLOSE_ALL_WALLETS: &str = "closeAllWallets";
    /// Create a folder in a wallet.
    pub const CREATE_FOLDER: &str = "createFolder";
    /// Delete a wallet outright.
    pub const DELETE_WALLET: &str = "deleteWallet";
    /// Disconnect an application from a wallet.
    pub const DISCONNECT_APPLICATION: &str = "disconnectApplication";
    /// List entry names in a folder.
    pub const ENTRY_LIST: &str = "entryList";
    /// Report the type of an entry.
    pub const ENTRY_TYPE: &str = "entryType";
    /// List folder names in a wallet.
    pub const FOLDER_LIST: &str = "folderList";
    /// Check whether a folder holds an entry.
    pub const HAS_ENTRY: &str = "hasEntry";
    /// Check whether a wallet holds a folder.
    pub const HAS_FOLDER: &str = "hasFolder";
    /// Check whether the wallet service is enabled.
    pub const IS_ENABLED: &str = "isEnabled";
    /// Check whether a wallet is open.
    pub const IS_OPEN: &str = "isOpen";
    /// Name of the local wallet.
    pub const LOCAL_WALLET: &str = "localWallet";
    /// Name of the network wallet.
    pub const NETWORK_WALLET: &str = "networkWallet";
    /// Open (unlock) a wallet, yielding a handle.
    pub const OPEN: &str = "open";
    /// Read a raw entry as bytes.
    pub const READ_ENTRY: &str = "readEntry";
    /// Read every entry in a folder as bytes.
    pub const READ_ENTRY_LIST: &str = "readEntryList";
    /// Read a map entry as its wire bytes.
    pub const READ_MAP: &str = "readMap";
    /// Read every map entry in a folder as wire bytes.
    pub const READ_MAP_LIST: &str = "readMapList";
    /// Read a password entry.
    pub const READ_PASSWORD: &str = "readPassword";
    /// Read every password entry in a folder.
    pub const READ_PASSWORD_LIST: &str = "readPasswordList";
    /// Remove an entry from a folder.
    pub const REMOVE_ENTRY: &str = "removeEntry";
    /// Remove a folder from a wallet.
    pub const REMOVE_FOLDER: &str = "removeFolder";
    /// Rename an entry within a folder.
    pub const RENAME_ENTRY: &str = "renameEntry";
    /// List wallet names known to the daemon.
    pub const WALLETS: &str = "wallets";
    /// Write a raw entry with an explicit type.
    pub const WRITE_ENTRY: &str = "writeEntry";
    /// Write a map entry from wire bytes.
    pub const WRITE_MAP: &str = "writeMap";
    /// Write a password entry.
    pub const WRITE_PASSWORD: &str = "writePassword";
}
