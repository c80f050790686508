use crate::clock::Clock;
use crate::models::{DashboardStats, Sale};
use crate::schedule::Standing;
use chrono::NaiveDateTime;

/// Days since purchase within which a client still counts as new.
const NEW_CLIENT_DAYS: i64 = 7;

pub fn build_stats(sales: &[Sale], clock: &dyn Clock) -> DashboardStats {
    build_stats_at(clock.now(), sales)
}

pub fn build_stats_at(now: NaiveDateTime, sales: &[Sale]) -> DashboardStats {
    sales.iter().fold(DashboardStats::default(), |mut acc, sale| {
        let standing = Standing::of(sale.expiry_date, now);

        acc.total_sales_value += sale.value;
        acc.total_profit += sale.profit();
        acc.sales_count += 1;

        if standing == Standing::ExpiringSoon {
            acc.expiring_count += 1;
        }
        if standing.is_expired() {
            acc.expired_count += 1;
            acc.expired_value += sale.value;
        } else {
            acc.current_count += 1;
            acc.current_value += sale.value;
        }

        // Compared against the purchase date as stored, which a renewal moves
        // to the new billing anchor.
        if (now.date() - sale.purchase_date.date()).num_days() <= NEW_CLIENT_DAYS {
            acc.new_count += 1;
        }

        if sale.is_active() {
            acc.active_count += 1;
        } else {
            acc.inactive_count += 1;
        }
        acc
    })
}

impl DashboardStats {
    /// Share of non-expired records, in percent.
    pub fn current_share(&self) -> f64 {
        share(self.current_count, self.sales_count)
    }

    pub fn expired_share(&self) -> f64 {
        share(self.expired_count, self.sales_count)
    }
}

fn share(part: u64, total: u64) -> f64 {
    part as f64 / total.max(1) as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Plan, SaleStatus};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn sale(id: &str, purchase: NaiveDateTime, expiry: NaiveDateTime, value: f64, cost: f64) -> Sale {
        Sale {
            id: id.to_string(),
            client_name: format!("Cliente {id}"),
            username: id.to_string(),
            password: None,
            contact: "11999990000".to_string(),
            server: "SERVIDOR 01".to_string(),
            plan: Plan::Monthly,
            purchase_date: purchase,
            expiry_date: expiry,
            value,
            cost,
            base_value: Some(value),
            base_cost: Some(cost),
            status: SaleStatus::Active,
            renewal_count: 0,
        }
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let stats = build_stats_at(day(2024, 1, 15), &[]);
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.current_share(), 0.0);
        assert_eq!(stats.expired_share(), 0.0);
    }

    #[test]
    fn single_expired_record() {
        let now = day(2024, 2, 15);
        let sales = [sale("a", day(2024, 1, 1), day(2024, 1, 31), 35.0, 10.0)];
        let stats = build_stats_at(now, &sales);

        assert_eq!(stats.sales_count, 1);
        assert_eq!(stats.expired_count + stats.current_count, 1);
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.expired_value, 35.0);
        assert_eq!(stats.current_value, 0.0);
        assert_eq!(stats.expiring_count, 0);
        assert_eq!(stats.total_profit, 25.0);
        assert_eq!(stats.new_count, 0);
        assert_eq!(stats.expired_share(), 100.0);
    }

    #[test]
    fn single_current_record() {
        let now = day(2024, 1, 5);
        let sales = [sale("a", day(2024, 1, 1), day(2024, 1, 31), 35.0, 10.0)];
        let stats = build_stats_at(now, &sales);

        assert_eq!(stats.current_count, 1);
        assert_eq!(stats.current_value, 35.0);
        assert_eq!(stats.expired_count, 0);
        assert_eq!(stats.new_count, 1);
        assert_eq!(stats.active_count, 1);
    }

    #[test]
    fn mixed_collection_splits_every_axis() {
        let now = day(2024, 1, 28);
        let mut inactive = sale("c", day(2023, 12, 1), day(2024, 2, 29), 60.0, 20.0);
        inactive.status = SaleStatus::Inactive;
        let sales = [
            sale("a", day(2023, 12, 1), day(2023, 12, 31), 35.0, 10.0),
            sale("b", day(2024, 1, 1), day(2024, 1, 31), 35.0, 10.0),
            inactive,
            sale("d", day(2024, 1, 25), day(2024, 2, 24), 40.0, 15.0),
        ];
        let stats = build_stats_at(now, &sales);

        assert_eq!(stats.sales_count, 4);
        assert_eq!(stats.total_sales_value, 170.0);
        assert_eq!(stats.total_profit, 115.0);
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.expired_value, 35.0);
        assert_eq!(stats.current_count, 3);
        assert_eq!(stats.current_value, 135.0);
        assert_eq!(stats.expiring_count, 1);
        assert_eq!(stats.new_count, 1);
        assert_eq!(stats.active_count, 3);
        assert_eq!(stats.inactive_count, 1);
        assert_eq!(stats.current_share(), 75.0);
    }

    #[test]
    fn status_flag_does_not_affect_expiry_split() {
        let now = day(2024, 1, 5);
        let mut record = sale("a", day(2024, 1, 1), day(2024, 1, 31), 35.0, 10.0);
        record.status = SaleStatus::Inactive;
        let stats = build_stats(&[record], &FixedClock(now));

        assert_eq!(stats.current_count, 1);
        assert_eq!(stats.inactive_count, 1);
        assert_eq!(stats.active_count, 0);
    }
}
