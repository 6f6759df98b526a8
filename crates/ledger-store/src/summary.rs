use serde::{Deserialize, Serialize};

/// Running totals for the whole ledger.
///
/// Exactly one summary exists. It is only ever changed by adding a
/// [`SummaryDelta`] inside a ledger commit, never overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StockSummary {
    /// Stock on hand in kilograms.
    pub current_stock: f64,
    /// Sum of inbound amounts.
    pub total_cost: f64,
    /// Sum of outbound amounts.
    pub total_sales: f64,
}

impl StockSummary {
    /// Returns the zero summary a fresh ledger starts with.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sales minus cost.
    pub fn profit(&self) -> f64 {
        self.total_sales - self.total_cost
    }

    /// Adds a delta to every field.
    pub fn apply(&mut self, delta: SummaryDelta) {
        self.current_stock += delta.stock;
        self.total_cost += delta.cost;
        self.total_sales += delta.sales;
    }

    /// Returns a copy with `delta` applied.
    pub fn with(mut self, delta: SummaryDelta) -> Self {
        self.apply(delta);
        self
    }

    /// Largest absolute field difference between two summaries.
    pub fn drift(&self, other: &StockSummary) -> f64 {
        (self.current_stock - other.current_stock)
            .abs()
            .max((self.total_cost - other.total_cost).abs())
            .max((self.total_sales - other.total_sales).abs())
    }
}

/// Additive change to the summary; stock is in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryDelta {
    pub stock: f64,
    pub cost: f64,
    pub sales: f64,
}

impl SummaryDelta {
    pub fn new(stock: f64, cost: f64, sales: f64) -> Self {
        Self { stock, cost, sales }
    }

    /// The delta that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            stock: -self.stock,
            cost: -self.cost,
            sales: -self.sales,
        }
    }

    /// Combines two deltas.
    pub fn then(&self, next: SummaryDelta) -> Self {
        Self {
            stock: self.stock + next.stock,
            cost: self.cost + next.cost,
            sales: self.sales + next.sales,
        }
    }
}

impl std::ops::Add for SummaryDelta {
    type Output = SummaryDelta;

    fn add(self, rhs: Self) -> Self::Output {
        self.then(rhs)
    }
}

impl std::ops::Neg for SummaryDelta {
    type Output = SummaryDelta;

    fn neg(self) -> Self::Output {
        self.inverse()
    }
}
