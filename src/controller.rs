use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use crate::comparison::{Comparison, ComparisonMode, compute};
use crate::dates::DateRange;
use crate::error::Result;
use crate::orders::OrderBook;
use crate::query::QueryState;
use crate::series::{ComparisonSeries, generate};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DashboardState {
    pub current: Option<DateRange>,
    pub mode: ComparisonMode,
    pub comparison: Option<Comparison>,
    pub series: Option<ComparisonSeries>,
}

impl DashboardState {
    pub fn derive(current: Option<DateRange>, mode: ComparisonMode, orders: &OrderBook) -> Self {
        let Some(current) = current else {
            return Self {
                mode,
                ..Self::default()
            };
        };

        let comparison = compute(&current, mode);
        let series = comparison
            .range()
            .map(|range| generate(&current, range, |date| orders.count_for(date)));

        Self {
            current: Some(current),
            mode,
            comparison: Some(comparison),
            series,
        }
    }

    pub fn comparison_range(&self) -> Option<&DateRange> {
        self.comparison.as_ref().and_then(Comparison::range)
    }
}

pub struct Controller {
    orders: OrderBook,
    query: QueryState,
    state: DashboardState,
}

impl Controller {
    pub fn new(orders: OrderBook, mode: ComparisonMode) -> Self {
        Self {
            orders,
            query: QueryState::default(),
            state: DashboardState {
                mode,
                ..DashboardState::default()
            },
        }
    }

    pub fn restore(&mut self, query: QueryState) {
        let current = match query.range_bounds() {
            Some((start, end)) => match DateRange::new(start, end) {
                Ok(range) => Some(range),
                Err(err) => {
                    warn!("ignoring persisted range: {err}");
                    None
                }
            },
            None => {
                if !query.is_empty() {
                    debug!("query '{query}' has no usable range");
                }
                None
            }
        };

        self.query = query;
        if let Some(range) = &current {
            info!("restored range {}", range.label());
        }
        self.recompute(current, self.state.mode);
    }

    pub fn select_range(&mut self, bounds: Option<(NaiveDate, NaiveDate)>) -> Result<()> {
        let current = match bounds {
            Some((start, end)) => Some(DateRange::new(start, end)?),
            None => None,
        };
        self.query.set_range(current.as_ref());
        match &current {
            Some(range) => info!("selected range {}", range.label()),
            None => info!("cleared range selection"),
        }
        self.recompute(current, self.state.mode);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ComparisonMode) {
        if mode == self.state.mode {
            return;
        }
        info!("comparison mode set to {}", mode.label());
        self.recompute(self.state.current, mode);
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    fn recompute(&mut self, current: Option<DateRange>, mode: ComparisonMode) {
        let next = DashboardState::derive(current, mode, &self.orders);
        if let Some(Comparison::Unsupported { reason }) = &next.comparison {
            warn!("no comparison available: {reason}");
        }
        self.state = next;
    }
}
