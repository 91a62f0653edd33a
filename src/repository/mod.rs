//! Repository Pattern Implementation
//!
//! Abstract interfaces for the client's durable state, so the storage
//! backend (JSON file, in-memory, anything else) can be swapped without
//! touching the preference logic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         PreferencesRepository           │
//! │  (Abstract interface for data access)   │
//! └──────────────┬──────────────────────────┘
//!                │
//!        ┌───────┴──────────┐
//!        │                  │
//! ┌──────▼──────────┐ ┌─────▼────────────┐
//! │FilePreferences  │ │MemoryPreferences │
//! │                 │ │                  │
//! │- JSON store     │ │- Tests           │
//! │- Survives exit  │ │- Ephemeral runs  │
//! └─────────────────┘ └──────────────────┘
//! ```

pub mod factory;
pub mod file;
pub mod memory;
pub mod traits;


// Re-export main types
pub use factory::RepositoryFactory;
pub use file::FilePreferencesRepository;
pub use memory::MemoryPreferencesRepository;
pub use traits::PreferencesRepository;
