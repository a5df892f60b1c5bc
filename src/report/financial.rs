use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{self, DailyCount, GradeCount};
use crate::error::Result;
use crate::models::{EggProduction, Feed, HealthRecord, Sale, SaleStatus};
use crate::records::ListFilter;
use crate::session::SessionContext;
use crate::window::{DateRange, ReportWindow};
use crate::CoopBook;

/// Production and money over one reporting window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub window: ReportWindow,
    pub range: DateRange,
    pub total_eggs: i64,
    /// Completed sales only
    pub total_sales: f64,
    pub total_feed_cost: f64,
    pub total_health_cost: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub egg_production: Vec<DailyCount>,
    pub eggs_by_grade: Vec<GradeCount>,
}

impl FinancialReport {
    /// Rows dated outside the window, and sales that are not completed, are
    /// left out regardless of what the caller passes in.
    pub fn compute(
        window: ReportWindow,
        today: NaiveDate,
        production: &[EggProduction],
        sales: &[Sale],
        feed: &[Feed],
        health: &[HealthRecord],
    ) -> Self {
        let range = window.bounds(today);

        let total_eggs = aggregate::total_eggs(aggregate::within(production, &range));
        let total_sales = aggregate::completed_sales(aggregate::within(sales, &range));
        let total_feed_cost: f64 =
            aggregate::sum_by(aggregate::within(feed, &range), |f: &Feed| f.cost);
        let total_health_cost: f64 =
            aggregate::sum_by(aggregate::within(health, &range), |h: &HealthRecord| h.cost);

        Self {
            window,
            range,
            total_eggs,
            total_sales,
            total_feed_cost,
            total_health_cost,
            total_cost: total_feed_cost + total_health_cost,
            profit: aggregate::profit_within(&range, sales, feed, health),
            egg_production: aggregate::daily_production(aggregate::within(production, &range)),
            eggs_by_grade: aggregate::grade_breakdown(aggregate::within(production, &range)),
        }
    }

    /// Break-even counts as profitable.
    pub fn is_profitable(&self) -> bool {
        self.profit >= 0.0
    }

    pub fn has_production(&self) -> bool {
        !self.egg_production.is_empty()
    }

    pub async fn fetch(
        book: &CoopBook,
        session: &SessionContext,
        window: ReportWindow,
        today: NaiveDate,
    ) -> Result<Self> {
        let in_window = ListFilter::new().within(window.bounds(today));

        let production = book.egg_production().list(session, &in_window).await?;
        let sales = book
            .sales()
            .list(session, &in_window.clone().eq("status", SaleStatus::Completed))
            .await?;
        let feed = book.feed().list(session, &in_window).await?;
        let health = book.health_records().list(session, &in_window).await?;

        debug!(
            %window,
            production = production.len(),
            sales = sales.len(),
            feed = feed.len(),
            health = health.len(),
            "loaded report rows"
        );
        Ok(Self::compute(window, today, &production, &sales, &feed, &health))
    }
}
