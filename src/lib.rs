//! Hierarchical arrangement of flat result rows.
//!
//! Build a join tree once (in code or from a JSON `JoinSpec`), then feed it the
//! rows of a denormalized query to get nested records back.

pub mod config;
pub mod error;
pub mod join;
pub mod records;
pub mod row;

pub use config::{load_join_spec, JoinSpec};
pub use error::{JoinError, JoinResult};
pub use join::{normalize_join_id, Columnar, Join, Joins, Tabular};
pub use records::{JointData, Record, Records};
pub use row::{Row, SplitRow};

// Test-only printing helper: expands to eprintln! during tests and is absent otherwise.
// Usage in tests: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        if false { let _ = format!($($arg)*); }
    });
}
