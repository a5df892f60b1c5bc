use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{self, DailyCount};
use crate::error::Result;
use crate::models::{Chicken, ChickenStatus, EggProduction, Sale, SaleStatus};
use crate::records::ListFilter;
use crate::session::SessionContext;
use crate::window::{DateRange, ReportWindow};
use crate::CoopBook;

/// Headline numbers for the landing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Birds in active batches
    pub total_chickens: i64,
    pub today_eggs: i64,
    pub total_coops: u64,
    /// Completed sales, all time
    pub total_sales: f64,
    /// Daily egg totals over the last seven days
    pub week_production: Vec<DailyCount>,
}

impl DashboardStats {
    /// Build the stats from rows already scoped to one user.
    ///
    /// Rows outside the relevant status or date are ignored, so callers may
    /// pass wider result sets than `fetch` asks for.
    pub fn compute(
        today: NaiveDate,
        total_coops: u64,
        chickens: &[Chicken],
        production: &[EggProduction],
        sales: &[Sale],
    ) -> Self {
        let total_chickens: i64 = aggregate::sum_by(
            chickens.iter().filter(|c| c.is_active()),
            |c: &Chicken| i64::from(c.current_count),
        );
        let today_range = DateRange::day(today);
        let today_eggs = aggregate::total_eggs(aggregate::within(production, &today_range));
        let total_sales = aggregate::completed_sales(sales);

        let week = ReportWindow::SevenDay.bounds(today);
        let week_production = aggregate::daily_production(aggregate::within(production, &week));

        Self {
            total_chickens,
            today_eggs,
            total_coops,
            total_sales,
            week_production,
        }
    }

    /// True when there is nothing to show yet.
    pub fn is_empty(&self) -> bool {
        self.total_coops == 0
            && self.total_chickens == 0
            && self.week_production.is_empty()
            && self.total_sales == 0.0
    }

    /// A farm without coops should be pointed at creating one.
    pub fn needs_first_coop(&self) -> bool {
        self.total_coops == 0
    }

    pub async fn fetch(
        book: &CoopBook,
        session: &SessionContext,
        today: NaiveDate,
    ) -> Result<Self> {
        let chickens = book
            .chickens()
            .list(
                session,
                &ListFilter::new().eq("status", ChickenStatus::Active),
            )
            .await?;

        let total_coops = book.coops().count(session, &ListFilter::new()).await?;

        let production = book
            .egg_production()
            .list(
                session,
                &ListFilter::new().within(ReportWindow::SevenDay.bounds(today)),
            )
            .await?;

        let sales = book
            .sales()
            .list(session, &ListFilter::new().eq("status", SaleStatus::Completed))
            .await?;

        debug!(
            chickens = chickens.len(),
            total_coops,
            production = production.len(),
            sales = sales.len(),
            "loaded dashboard rows"
        );
        Ok(Self::compute(today, total_coops, &chickens, &production, &sales))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;
    use crate::models::EggGrade;

    #[test]
    fn test_zero_coops_is_an_empty_state() {
        let stats = DashboardStats::compute(day("2024-03-08"), 0, &[], &[], &[]);
        assert_eq!(stats.total_coops, 0);
        assert_eq!(stats.total_chickens, 0);
        assert!(stats.week_production.is_empty());
        assert!(stats.is_empty());
        assert!(stats.needs_first_coop());
    }

    #[test]
    fn test_only_active_batches_are_counted() {
        let chickens = [
            chicken(120, ChickenStatus::Active),
            chicken(80, ChickenStatus::Active),
            chicken(50, ChickenStatus::Sold),
            chicken(3, ChickenStatus::Dead),
        ];
        let stats = DashboardStats::compute(day("2024-03-08"), 1, &chickens, &[], &[]);
        assert_eq!(stats.total_chickens, 200);
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_today_and_week() {
        let production = [
            production("2024-03-08", 850, EggGrade::A),
            production("2024-03-08", 150, EggGrade::B),
            production("2024-03-05", 700, EggGrade::A),
            production("2024-02-01", 999, EggGrade::A),
        ];
        let sales = [
            sale("2024-01-10", 1000.0, SaleStatus::Completed),
            sale("2024-03-07", 500.0, SaleStatus::Pending),
        ];
        let stats = DashboardStats::compute(day("2024-03-08"), 2, &[], &production, &sales);

        assert_eq!(stats.today_eggs, 1000);
        assert_eq!(stats.total_sales, 1000.0);
        assert_eq!(
            stats.week_production,
            vec![
                DailyCount { date: day("2024-03-05"), count: 700 },
                DailyCount { date: day("2024-03-08"), count: 1000 },
            ]
        );
        assert!(!stats.is_empty());
        assert!(!stats.needs_first_coop());
    }
}
