//! Period analytics
//!
//! Rolls sealed day records up into a [`PeriodSummary`]. The summary is always
//! recomputed from scratch; nothing is accumulated between calls.

use chrono::NaiveDate;
use shared::Cents;
use shared::models::{
    BusiestDay, DailyRevenue, DaySummary, EmployeeOrderCount, ItemSales, PeriodSummary,
};
use shared::money::average_major;
use std::collections::HashMap;

use crate::utils::time::window_end;

/// Number of entries in the top items list
pub const TOP_ITEMS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodAnalyticsAggregator;

impl PeriodAnalyticsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Summarize the days inside `[start, start + days - 1]`
    ///
    /// Days outside the window are ignored. Voided orders count towards
    /// nothing; revenue, refunds and tips come from payment and refund records.
    pub fn summarize(&self, day_records: &[DaySummary], start: NaiveDate, days: u32) -> PeriodSummary {
        let end = window_end(start, days);

        let mut total_orders: u64 = 0;
        let mut total_revenue: Cents = 0;
        let mut total_refunds: Cents = 0;
        let mut total_tips: Cents = 0;
        let mut busiest_day: Option<BusiestDay> = None;
        let mut daily_revenue = Vec::new();

        // 插入顺序 + 计数，保证并列时先出现者在前
        let mut item_index: HashMap<&str, usize> = HashMap::new();
        let mut items: Vec<ItemSales> = Vec::new();
        let mut employee_index: HashMap<&str, usize> = HashMap::new();
        let mut employees: Vec<EmployeeOrderCount> = Vec::new();

        for day in day_records
            .iter()
            .filter(|d| days > 0 && d.date >= start && d.date <= end)
        {
            let orders = day.counted_orders().count() as u64;
            let revenue = day.revenue();
            let refunds = day.refunded();

            total_orders += orders;
            total_revenue += revenue;
            total_refunds += refunds;
            total_tips += day.tips();

            if busiest_day.as_ref().is_none_or(|b| orders > b.orders) {
                busiest_day = Some(BusiestDay {
                    date: day.date,
                    orders,
                });
            }

            daily_revenue.push(DailyRevenue {
                date: day.date,
                orders,
                revenue,
                refunds,
            });

            for order in day.counted_orders() {
                for li in &order.line_items {
                    let idx = *item_index.entry(li.item_id.as_str()).or_insert_with(|| {
                        items.push(ItemSales {
                            item_id: li.item_id.clone(),
                            name: li.name.clone(),
                            quantity: 0,
                        });
                        items.len() - 1
                    });
                    items[idx].quantity += u64::from(li.quantity);
                }

                if let Some(employee_id) = order.employee_id.as_deref() {
                    let idx = *employee_index.entry(employee_id).or_insert_with(|| {
                        employees.push(EmployeeOrderCount {
                            employee_id: employee_id.to_string(),
                            orders: 0,
                        });
                        employees.len() - 1
                    });
                    employees[idx].orders += 1;
                }
            }
        }

        // sort_by 是稳定排序
        items.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        items.truncate(TOP_ITEMS);
        employees.sort_by(|a, b| b.orders.cmp(&a.orders));

        PeriodSummary {
            start_date: start,
            end_date: end,
            days,
            total_orders,
            total_revenue,
            total_refunds,
            total_net_revenue: total_revenue - total_refunds,
            total_tips,
            average_order_value: average_major(total_revenue, total_orders),
            busiest_day,
            top_items: items,
            employee_order_counts: employees,
            daily_revenue,
        }
    }
}
