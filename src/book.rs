use crate::format::{format_currency, format_date};
use crate::models::{DEFAULT_SERVER, Sale, SaleInput, SaleRow, SaleStatus};
use crate::notify::notification_link;
use crate::schedule::{Standing, calculate_expiry, days_remaining, subscription_progress};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    NotFound(String),
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::NotFound(id) => write!(f, "sale {id} not found"),
        }
    }
}

impl std::error::Error for BookError {}

/// The ordered sale collection. Serializes as a plain JSON list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SalesBook {
    sales: Vec<Sale>,
}

/// Loads record by record: an unreadable entry is skipped instead of
/// rejecting the whole list, and a record without an id gets a fresh one.
impl<'de> Deserialize<'de> for SalesBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let mut book = SalesBook::default();
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Sale>(record) {
                Ok(mut sale) => {
                    if sale.id.trim().is_empty() {
                        sale.id = book.fresh_id();
                    }
                    book.sales.push(sale);
                }
                Err(err) => warn!(index, "skipping unreadable sale record: {err}"),
            }
        }
        Ok(book)
    }
}

impl SalesBook {
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|sale| sale.id == id)
    }

    pub fn create(&mut self, input: SaleInput, now: NaiveDateTime) -> &Sale {
        let purchase_date = input.purchase_date.unwrap_or_else(|| start_of_day(now));
        let plan = input.plan.unwrap_or_default();
        let sale = Sale {
            id: self.fresh_id(),
            client_name: input.client_name.unwrap_or_default(),
            username: input.username.unwrap_or_default(),
            password: input.password,
            contact: input.contact.unwrap_or_default(),
            server: input.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            plan,
            purchase_date,
            expiry_date: calculate_expiry(purchase_date, plan),
            value: input.value,
            cost: input.cost,
            base_value: Some(input.value),
            base_cost: Some(input.cost),
            status: input.status.unwrap_or_default(),
            renewal_count: 0,
        };
        self.sales.push(sale);
        &self.sales[self.sales.len() - 1]
    }

    /// Replaces the editable fields. The id, renewal count and captured base
    /// amounts are kept.
    pub fn edit(&mut self, id: &str, input: SaleInput, now: NaiveDateTime) -> Result<&Sale, BookError> {
        let sale = self.get_mut(id)?;
        let purchase_date = input.purchase_date.unwrap_or_else(|| start_of_day(now));
        let plan = input.plan.unwrap_or_default();

        sale.client_name = input.client_name.unwrap_or_default();
        sale.username = input.username.unwrap_or_default();
        sale.password = input.password;
        sale.contact = input.contact.unwrap_or_default();
        sale.server = input.server.unwrap_or_else(|| DEFAULT_SERVER.to_string());
        sale.plan = plan;
        sale.purchase_date = purchase_date;
        sale.expiry_date = calculate_expiry(purchase_date, plan);
        sale.value = input.value;
        sale.cost = input.cost;
        sale.base_value = sale.base_value.filter(|v| *v != 0.0).or(Some(input.value));
        sale.base_cost = sale.base_cost.filter(|v| *v != 0.0).or(Some(input.cost));
        sale.status = input.status.unwrap_or_default();
        Ok(sale)
    }

    /// Extends a sale by one plan interval. A sale that has not expired yet
    /// is extended from its current expiry; a lapsed one restarts at `now`.
    pub fn renew(&mut self, id: &str, now: NaiveDateTime) -> Result<&Sale, BookError> {
        let sale = self.get_mut(id)?;
        let anchor = if sale.expiry_date > now { sale.expiry_date } else { now };

        let value = sale.renewal_value();
        let cost = sale.renewal_cost();
        sale.purchase_date = anchor;
        sale.expiry_date = calculate_expiry(anchor, sale.plan);
        sale.value += value;
        sale.cost += cost;
        sale.renewal_count = sale.renewal_count.saturating_add(1);
        sale.status = SaleStatus::Active;
        Ok(sale)
    }

    pub fn toggle_status(&mut self, id: &str) -> Result<&Sale, BookError> {
        let sale = self.get_mut(id)?;
        sale.status = sale.status.toggled();
        Ok(sale)
    }

    pub fn delete(&mut self, id: &str) -> Result<Sale, BookError> {
        let idx = self
            .sales
            .iter()
            .position(|sale| sale.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        Ok(self.sales.remove(idx))
    }

    /// Case-insensitive match on client name, username or server, ordered by
    /// expiry. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Sale> {
        let needle = query.trim().to_lowercase();
        let mut found: Vec<&Sale> = self
            .sales
            .iter()
            .filter(|sale| {
                needle.is_empty()
                    || sale.client_name.to_lowercase().contains(&needle)
                    || sale.username.to_lowercase().contains(&needle)
                    || sale.server.to_lowercase().contains(&needle)
            })
            .collect();
        found.sort_by_key(|sale| sale.expiry_date);
        found
    }

    pub fn rows(&self, query: &str, now: NaiveDateTime) -> Vec<SaleRow> {
        self.search(query)
            .into_iter()
            .map(|sale| sale_row(sale, now))
            .collect()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Sale, BookError> {
        self.sales
            .iter_mut()
            .find(|sale| sale.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

pub fn sale_row(sale: &Sale, now: NaiveDateTime) -> SaleRow {
    let days = days_remaining(sale.expiry_date, now);
    SaleRow {
        sale: sale.clone(),
        days_remaining: days,
        progress: subscription_progress(sale.purchase_date, sale.expiry_date, now),
        standing: Standing::from_days(days),
        value_label: format_currency(sale.value),
        expiry_label: format_date(sale.expiry_date),
        notify_link: notification_link(sale, now),
    }
}

fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(chrono::NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plan;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn input(name: &str, username: &str, server: &str) -> SaleInput {
        SaleInput {
            client_name: Some(name.to_string()),
            username: Some(username.to_string()),
            password: Some("pw".to_string()),
            contact: Some("(21) 91234-5678".to_string()),
            server: Some(server.to_string()),
            plan: Some(Plan::Monthly),
            purchase_date: Some(day(2024, 1, 1)),
            value: 35.0,
            cost: 10.0,
            status: None,
        }
    }

    fn book_with_one() -> (SalesBook, String) {
        let mut book = SalesBook::default();
        let id = book.create(input("Carlos", "carlos", "SERVIDOR 01"), day(2024, 1, 1)).id.clone();
        (book, id)
    }

    #[test]
    fn create_sets_defaults_and_expiry() {
        let (book, id) = book_with_one();
        let sale = book.get(&id).unwrap();
        assert_eq!(sale.expiry_date, day(2024, 1, 31));
        assert_eq!(sale.status, SaleStatus::Active);
        assert_eq!(sale.renewal_count, 0);
        assert_eq!(sale.base_value, Some(35.0));
        assert_eq!(sale.base_cost, Some(10.0));
    }

    #[test]
    fn create_from_empty_input_uses_form_defaults() {
        let mut book = SalesBook::default();
        let now = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(15, 30, 0).unwrap();
        let sale = book.create(SaleInput::default(), now);
        assert_eq!(sale.server, DEFAULT_SERVER);
        assert_eq!(sale.plan, Plan::Monthly);
        assert_eq!(sale.purchase_date, day(2024, 5, 10));
        assert_eq!(sale.expiry_date, day(2024, 6, 9));
        assert_eq!(sale.value, 0.0);
    }

    #[test]
    fn ids_are_unique() {
        let mut book = SalesBook::default();
        let a = book.create(SaleInput::default(), day(2024, 1, 1)).id.clone();
        let b = book.create(SaleInput::default(), day(2024, 1, 1)).id.clone();
        assert_ne!(a, b);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn renew_before_expiry_stacks_on_old_expiry() {
        let (mut book, id) = book_with_one();
        let sale = book.renew(&id, day(2024, 1, 15)).unwrap();

        assert_eq!(sale.purchase_date, day(2024, 1, 31));
        assert_eq!(sale.expiry_date, day(2024, 3, 1));
        assert_eq!(sale.value, 70.0);
        assert_eq!(sale.cost, 20.0);
        assert_eq!(sale.renewal_count, 1);
        assert_eq!(sale.status, SaleStatus::Active);
    }

    #[test]
    fn renew_after_expiry_restarts_from_now() {
        let (mut book, id) = book_with_one();
        book.toggle_status(&id).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap().and_hms_opt(9, 45, 0).unwrap();
        let sale = book.renew(&id, now).unwrap();

        assert_eq!(sale.purchase_date, now);
        assert_eq!(sale.expiry_date.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(sale.value, 70.0);
        assert_eq!(sale.renewal_count, 1);
        assert_eq!(sale.status, SaleStatus::Active);
    }

    #[test]
    fn renew_on_expiry_instant_restarts_from_now() {
        let (mut book, id) = book_with_one();
        let sale = book.renew(&id, day(2024, 1, 31)).unwrap();
        assert_eq!(sale.expiry_date, day(2024, 3, 1));
        assert_eq!(sale.purchase_date, day(2024, 1, 31));
    }

    #[test]
    fn repeated_renewals_accumulate_base_amounts() {
        let (mut book, id) = book_with_one();
        for _ in 0..3 {
            book.renew(&id, day(2024, 1, 15)).unwrap();
        }
        let sale = book.get(&id).unwrap();
        assert_eq!(sale.value, 140.0);
        assert_eq!(sale.cost, 40.0);
        assert_eq!(sale.renewal_count, 3);
        assert_eq!(sale.expiry_date, day(2024, 4, 30));
    }

    #[test]
    fn renew_without_base_amounts_uses_current_value() {
        let (mut book, id) = book_with_one();
        book.sales[0].base_value = None;
        book.sales[0].base_cost = None;
        let sale = book.renew(&id, day(2024, 1, 15)).unwrap();
        assert_eq!(sale.value, 70.0);
        assert_eq!(sale.cost, 20.0);
    }

    #[test]
    fn edit_recomputes_expiry_and_keeps_identity() {
        let (mut book, id) = book_with_one();
        book.renew(&id, day(2024, 1, 15)).unwrap();

        let mut changes = input("Carlos Silva", "carlos", "P2P TURBO");
        changes.plan = Some(Plan::Annual);
        changes.purchase_date = Some(day(2024, 2, 1));
        changes.value = 300.0;
        let sale = book.edit(&id, changes, day(2024, 2, 1)).unwrap();

        assert_eq!(sale.id, id);
        assert_eq!(sale.client_name, "Carlos Silva");
        assert_eq!(sale.expiry_date, day(2025, 1, 31));
        assert_eq!(sale.renewal_count, 1);
        assert_eq!(sale.base_value, Some(35.0));
        assert_eq!(sale.value, 300.0);
    }

    #[test]
    fn toggle_and_delete() {
        let (mut book, id) = book_with_one();
        assert_eq!(book.toggle_status(&id).unwrap().status, SaleStatus::Inactive);
        assert_eq!(book.toggle_status(&id).unwrap().status, SaleStatus::Active);

        let removed = book.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(book.is_empty());
        assert_eq!(book.delete(&id), Err(BookError::NotFound(id.clone())));
        assert!(book.renew(&id, day(2024, 1, 1)).is_err());
    }

    #[test]
    fn search_matches_name_username_and_server() {
        let mut book = SalesBook::default();
        let mut later = input("Ana Souza", "ana", "SERVIDOR 02");
        later.plan = Some(Plan::Annual);
        book.create(later, day(2024, 1, 1));
        book.create(input("Bruno", "bru.tv", "P2P TURBO"), day(2024, 1, 1));
        book.create(input("Carla", "carla", "SERVIDOR 01"), day(2024, 1, 1));

        let names = |q: &str| -> Vec<String> {
            book.search(q).iter().map(|s| s.client_name.clone()).collect()
        };
        assert_eq!(names("souza"), vec!["Ana Souza"]);
        assert_eq!(names("BRU.TV"), vec!["Bruno"]);
        assert_eq!(names("turbo"), vec!["Bruno"]);
        assert_eq!(names("servidor"), vec!["Carla", "Ana Souza"]);
        assert_eq!(names("  ").len(), 3);
        assert_eq!(names("ana")[0], "Ana Souza");
        assert!(names("zzz").is_empty());
    }

    #[test]
    fn rows_carry_derived_fields() {
        let (book, _) = book_with_one();
        let rows = book.rows("", day(2024, 1, 28));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.days_remaining, 3);
        assert_eq!(row.standing, Standing::ExpiringSoon);
        assert_eq!(row.value_label, "R$ 35,00");
        assert_eq!(row.expiry_label, "31/01/2024");
        assert!(row.notify_link.starts_with("https://wa.me/5521912345678?text="));
        assert!(row.progress > 89.0 && row.progress < 91.0);
    }

    #[test]
    fn book_serializes_as_plain_list() {
        let (book, _) = book_with_one();
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.is_array());
        let back: SalesBook = serde_json::from_value(json).unwrap();
        assert_eq!(back, book);
    }

    #[test]
    fn far_future_dates_saturate_instead_of_panicking() {
        let input: SaleInput =
            serde_json::from_str(r#"{"clientName":"X","purchaseDate":"+262142-12-20"}"#).unwrap();
        assert!(input.purchase_date.is_some());

        let mut book = SalesBook::default();
        let sale = book.create(input, day(2024, 1, 15)).clone();
        assert_eq!(sale.expiry_date, NaiveDateTime::MAX);

        let renewed = book.renew(&sale.id, day(2024, 1, 15)).unwrap();
        assert_eq!(renewed.expiry_date, NaiveDateTime::MAX);
        assert_eq!(renewed.renewal_count, 1);
        assert_eq!(sale_row(renewed, day(2024, 1, 15)).progress, 100.0);
    }

    #[test]
    fn malformed_records_do_not_sink_the_list() {
        let raw = r#"[
            {"id":"a1","clientName":"Ana","plan":"Mensal","purchaseDate":"2024-01-01","expiryDate":"2024-01-31"},
            {"id":"b2","clientName":"Bia","plan":null,"purchaseDate":"2024-01-01","expiryDate":"2024-01-31"},
            {"id":"c3","clientName":null,"plan":3,"status":7,"renewalCount":null,"purchaseDate":"2024-01-01","expiryDate":"2024-01-31"},
            {"clientName":"Sem id","purchaseDate":"2024-01-01","expiryDate":"2024-01-31"},
            {"id":"d4","clientName":"Sem datas"},
            "lixo"
        ]"#;
        let book: SalesBook = serde_json::from_str(raw).unwrap();
        assert_eq!(book.len(), 4);
        assert_eq!(book.get("b2").unwrap().plan, Plan::Monthly);
        assert_eq!(book.get("c3").unwrap().client_name, "");
        assert_eq!(book.get("c3").unwrap().status, SaleStatus::Active);
        assert!(book.get("d4").is_none());

        let generated = &book.sales()[3];
        assert_eq!(generated.client_name, "Sem id");
        assert_eq!(generated.id.len(), 32);
    }
}
