// Leave Ledger - Core Library
// Exposes all modules for use in the CLI, the sheet proxy server, and tests

pub mod balance;
pub mod model;
pub mod store;
pub mod tabular;

#[cfg(feature = "server")]
pub mod sheets;

// Re-export commonly used types
pub use balance::{
    balances_as_of, months_since_baseline, validate_request, Balances, BASELINE_MONTH,
    BASELINE_YEAR, OVERDRAW_TOLERANCE,
};
pub use model::{
    parse_mm_yy, Employee, LeaveCategory, LeaveTransaction, StartPeriod, StartingBalances,
};
pub use store::{EmployeeStore, STORAGE_KEY};
pub use tabular::{match_container, tab_view, GridRow, TabError, TabView, HEADER_ROW_INDEX};

#[cfg(feature = "server")]
pub use sheets::{quote_sheet_name, ProxyConfig, ServiceAccountKey, SheetsClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
