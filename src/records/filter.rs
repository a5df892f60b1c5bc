use coopbook_postgrest::{PostgrestClient, SortOrder};

use crate::window::DateRange;

/// Narrowing and ordering for a `list` or `count` call.
///
/// An empty filter lists every visible row in the table's default order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    ranges: Vec<(String, DateRange)>,
    equals: Vec<(String, String)>,
    nulls: Vec<String>,
    order: Vec<(String, SortOrder)>,
    limit: Option<u32>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows whose `date` falls inside `range`, both ends included.
    pub fn within(self, range: DateRange) -> Self {
        self.between("date", range)
    }

    pub fn between(mut self, column: &str, range: DateRange) -> Self {
        self.ranges.push((column.to_string(), range));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.equals.push((column.to_string(), value.to_string()));
        self
    }

    /// Rows where `column` has no value, e.g. batches not housed in a coop.
    pub fn is_null(mut self, column: &str) -> Self {
        self.nulls.push(column.to_string());
        self
    }

    /// Replaces the table's default ordering. Repeat for secondary keys.
    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order.push((column.to_string(), order));
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.limit = Some(count);
        self
    }

    pub(crate) fn apply_conditions(&self, mut query: PostgrestClient) -> PostgrestClient {
        for (column, range) in &self.ranges {
            query = query
                .gte(column, &range.start.to_string())
                .lte(column, &range.end.to_string());
        }
        for (column, value) in &self.equals {
            query = query.eq(column, value);
        }
        for column in &self.nulls {
            query = query.is_null(column);
        }
        query
    }

    pub(crate) fn apply(
        &self,
        query: PostgrestClient,
        default_order: (&str, SortOrder),
    ) -> PostgrestClient {
        let mut query = self.apply_conditions(query.select("*"));
        if self.order.is_empty() {
            query = query.order(default_order.0, default_order.1);
        } else {
            for (column, order) in &self.order {
                query = query.order(column, *order);
            }
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}
