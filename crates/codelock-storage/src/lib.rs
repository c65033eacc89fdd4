//! Persistent storage protocol for the codelock access controller.
//!
//! The controller owns a small region at the start of a byte store:
//!
//! ```text
//! offset 0            2                    2+N
//!        ┌────────────┬────────────────────┐
//!        │ marker     │ code (N digits)    │
//!        │ 127, 127   │ one byte per digit │
//!        └────────────┴────────────────────┘
//! ```
//!
//! The marker proves the region was initialized by this controller. Any
//! other marker value, including the erased all-zero state, triggers
//! formatting on boot.

pub mod code_store;
pub mod error;
pub mod layout;
pub mod records;

pub use code_store::{BootStatus, CodeStore};
pub use error::{StorageError, StorageResult};
pub use layout::{StorageLayout, StorageRecord};
pub use records::{ConfigMarker, PersistedCode};
