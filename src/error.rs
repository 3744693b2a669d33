// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Error and warning types shared across the wallet tree.

use std::fmt;

use thiserror::Error;

/// Errors surfaced by wallet operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The object has no live daemon state behind it, typically a wallet
    /// that was never opened and so holds no handle.
    #[error("object not properly initialized")]
    NotInitialized,
    /// The daemon answered a mutating call with a refusal code.
    #[error("wallet service operation failed with result code {0}")]
    OperationFailed(i32),
    /// An open request was answered with a refusal handle.
    #[error("wallet open request returned refusal handle {0}")]
    NoHandle(i32),
    /// The daemon declined to create a folder.
    #[error("failed to create folder {0:?}")]
    CreateFailed(String),
    /// The daemon declined to remove a folder.
    #[error("failed to remove folder {0:?}")]
    RemoveFolderFailed(String),
    /// The daemon declined to disconnect an application from a wallet.
    #[error("failed to disconnect application {app:?} from wallet {wallet:?}")]
    DisconnectFailed {
        /// Wallet the disconnect targeted.
        wallet: String,
        /// Application that was to be disconnected.
        app: String,
    },
    /// A map write was attempted with no dictionary at all. An empty
    /// dictionary is valid; its absence is not.
    #[error("map value is absent; cannot write a missing map")]
    InvalidMap,
    /// The daemon reported an entry type this client does not know.
    #[error("unknown entry type code {0}")]
    UnknownEntryType(i32),
    /// The underlying bus transport failed.
    #[error("bus transport failure: {0}")]
    Bus(String),
    /// Map wire data failed to encode or decode.
    #[error("map codec failure: {0}")]
    Codec(#[from] kwmap_codec::CodecError),
}

/// An ordered collection of non-fatal messages.
///
/// Tree walks (manager→wallets, wallet→folders, folder→items) keep going
/// when one child fails, collecting the failures here instead of aborting,
/// so one locked wallet cannot hide every other one.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    entries: Vec<String>,
}

impl Warnings {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one warning message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    /// Fold another collection's messages into this one.
    pub fn absorb(&mut self, other: Warnings) {
        self.entries.extend(other.entries);
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate the recorded messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
