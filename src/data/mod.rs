//! Data layer: core types, loading, merging and filtering.
//!
//! Architecture:
//! ```text
//!  meat .csv/.parquet     GDP .csv/.parquet
//!          │                     │
//!          ▼                     ▼
//!   ┌─────────────────────────────────┐
//!   │ loader   parse → typed raw rows │
//!   └─────────────────────────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────────┐
//!   │ prepare  join, total, memoize   │  → Arc<MergedTable>
//!   └─────────────────────────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────────┐
//!   │ filter   selection → view       │
//!   └─────────────────────────────────┘
//! ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod prepare;
pub mod stats;
