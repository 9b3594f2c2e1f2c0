/// Price-threshold dispatch state machine.
pub mod dispatch;
pub mod summary;
/// Charge/discharge threshold derivation.
pub mod threshold;
pub mod types;

pub use dispatch::{DispatchOutcome, DispatchParameters, simulate, step};
pub use summary::{DailyRevenue, DispatchSummary, SummaryReport, daily_revenue};
pub use threshold::{PriceBand, ThresholdMode, ThresholdSet};
pub use types::{DispatchMode, HourlyRecord};
