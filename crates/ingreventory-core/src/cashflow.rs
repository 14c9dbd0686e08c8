//! # Cash-Flow Summary
//!
//! Daily till arithmetic for a store.
//!
//! ```text
//! net = Σ order.total + Σ cash in − Σ cash out
//! ```
//! `total_cost` is reported alongside for margin display but does not enter
//! `net`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Cashflow, CashflowType, Order};

/// Totals for a store over a time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: Money,
    pub total_cost: Money,
    pub cash_in: Money,
    pub cash_out: Money,
    pub net: Money,
}

impl SalesSummary {
    /// Computes the summary from the orders and cash entries of a window.
    pub fn compute(orders: &[Order], entries: &[Cashflow]) -> Self {
        let total_sales: Money = orders.iter().map(Order::total).sum();
        let total_cost: Money = orders.iter().map(Order::total_cost).sum();
        let cash_in = sum_of(entries, CashflowType::In);
        let cash_out = sum_of(entries, CashflowType::Out);

        SalesSummary {
            total_sales,
            total_cost,
            cash_in,
            cash_out,
            net: total_sales + cash_in - cash_out,
        }
    }
}

fn sum_of(entries: &[Cashflow], flow_type: CashflowType) -> Money {
    entries
        .iter()
        .filter(|entry| entry.flow_type == flow_type)
        .map(Cashflow::amount)
        .sum()
}

/// Default summary window: from midnight UTC today until `now`.
pub fn default_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now);
    (start, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Customer, NewOrder, ShippingAddress};
    use chrono::TimeZone;

    fn order(total: i64, cost: i64) -> Order {
        NewOrder {
            customer: Customer::default(),
            shipping_address: ShippingAddress::default(),
            payment_method_id: None,
            items: vec![],
            store_id: Some("s".into()),
            store_name: None,
            user_id: None,
            total_cost_cents: cost,
            subtotal_cents: total,
            shipping_cents: 0,
            total_cents: total,
            cash_given_cents: None,
        }
        .into_order(uuid::Uuid::new_v4().to_string(), Utc::now())
    }

    fn entry(flow_type: CashflowType, amount: i64) -> Cashflow {
        Cashflow {
            id: uuid::Uuid::new_v4().to_string(),
            flow_type,
            amount_cents: amount,
            note: None,
            user_id: None,
            store_id: "s".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_arithmetic() {
        let orders = vec![order(10_000, 4_000), order(5_000, 2_500)];
        let entries = vec![
            entry(CashflowType::In, 20_000),
            entry(CashflowType::Out, 3_000),
            entry(CashflowType::Out, 1_000),
        ];

        let summary = SalesSummary::compute(&orders, &entries);
        assert_eq!(summary.total_sales.cents(), 15_000);
        assert_eq!(summary.total_cost.cents(), 6_500);
        assert_eq!(summary.cash_in.cents(), 20_000);
        assert_eq!(summary.cash_out.cents(), 4_000);
        assert_eq!(summary.net.cents(), 31_000);
    }

    #[test]
    fn test_empty_window_is_zero() {
        assert_eq!(SalesSummary::compute(&[], &[]), SalesSummary::default());
    }

    #[test]
    fn test_default_window_starts_at_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 15, 42, 7).unwrap();
        let (start, end) = default_window(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
        assert_eq!(end, now);
    }
}
