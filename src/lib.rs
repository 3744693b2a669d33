// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-08-14

//! Typed client for the KWallet secret-storage daemon.
//!
//! kwalletd exposes a hierarchical secret store over the session bus. This
//! crate wraps that RPC surface in owned objects, caching remote state as a
//! tree with lazy or eager population controlled by [`RecurseOpts`]:
//!
//! ```text
//! WalletManager
//! ├─ Wallet "A"
//! │   ├─ Folder "A_1"
//! │   │   ├─ Passwords
//! │   │   ├─ Maps
//! │   │   ├─ Blobs
//! │   │   └─ Unknown
//! │   └─ Folder "A_2"
//! └─ Wallet "B"
//!     └─ Folder "B_1"
//! ```
//!
//! The bus transport itself is injected: implement [`WalletBus`] over
//! whatever session-bus binding the host offers and hand it to
//! [`WalletManager::new`]. An in-process stand-in ([`MemoryBus`], feature
//! `inprocess`, on by default) serves tests and demos without a daemon.
//!
//! The one piece of real wire work lives in the re-exported
//! [`kwmap_codec`] crate: the length-prefixed, null-interleaved encoding
//! kwalletd uses for `Map` entries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bus;
pub mod consts;
pub mod error;
pub mod folder;
#[cfg(feature = "inprocess")]
pub mod inprocess;
pub mod item;
pub mod manager;
pub mod recurse;
pub mod wallet;

pub use bus::{result_check, result_passed, EntryType, WalletBus};
pub use error::{Error, Warnings};
pub use folder::Folder;
#[cfg(feature = "inprocess")]
pub use inprocess::MemoryBus;
pub use item::{Blob, Map, Password, UnknownItem, WalletItem};
pub use kwmap_codec;
pub use manager::WalletManager;
pub use recurse::RecurseOpts;
pub use wallet::Wallet;
