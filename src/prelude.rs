//! Convenient imports for escrowmap.
//!
//! ```
//! use escrowmap::prelude::*;
//!
//! let map = EscrowMap::ephemeral()?;
//! map.set_mapping("order-1", 3, None, None)?;
//! # Ok::<(), escrowmap::Error>(())
//! ```

// Main entry point
pub use crate::manager::{EscrowMap, EscrowMapBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Records
pub use crate::types::{ContractIdMapping, MappingStats, MappingStatus, MappingTable};

// Configuration
pub use crate::types::{OpenOptions, RetentionPolicy, StoreKeys};

// Registration flow
pub use crate::types::{ChainError, EscrowChain};
