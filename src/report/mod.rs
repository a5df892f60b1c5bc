//! The two report pages, each as a pure `compute` over rows plus a `fetch`
//! that loads those rows through the record accessors.

mod dashboard;
mod financial;

pub use dashboard::DashboardStats;
pub use financial::FinancialReport;
