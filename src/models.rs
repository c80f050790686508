use crate::schedule::Standing;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Server presets offered by the sale form. Not enforced on stored records.
pub const SERVER_PRESETS: [&str; 4] = ["SERVIDOR 01", "SERVIDOR 02", "SERVIDOR 03", "P2P TURBO"];

pub const DEFAULT_SERVER: &str = SERVER_PRESETS[0];

/// Subscription tier. Serialized with the dashboard's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Plan {
    #[default]
    #[serde(rename = "Mensal")]
    Monthly,
    #[serde(rename = "Bimestral")]
    Bimonthly,
    #[serde(rename = "Trimestral")]
    Quarterly,
    #[serde(rename = "Semestral")]
    Semiannual,
    #[serde(rename = "Anual")]
    Annual,
}

impl Plan {
    pub const ALL: [Plan; 5] = [
        Plan::Monthly,
        Plan::Bimonthly,
        Plan::Quarterly,
        Plan::Semiannual,
        Plan::Annual,
    ];

    /// Parses a plan label. Unrecognized labels fall back to `Monthly`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "mensal" | "monthly" => Plan::Monthly,
            "bimestral" | "bimonthly" => Plan::Bimonthly,
            "trimestral" | "quarterly" => Plan::Quarterly,
            "semestral" | "semiannual" => Plan::Semiannual,
            "anual" | "annual" => Plan::Annual,
            _ => Plan::Monthly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Plan::Monthly => "Mensal",
            Plan::Bimonthly => "Bimestral",
            Plan::Quarterly => "Trimestral",
            Plan::Semiannual => "Semestral",
            Plan::Annual => "Anual",
        }
    }
}

impl From<serde_json::Value> for Plan {
    fn from(raw: serde_json::Value) -> Self {
        raw.as_str().map(Plan::parse).unwrap_or_default()
    }
}

/// Manual status flag, independent of the expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum SaleStatus {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
}

impl SaleStatus {
    /// Parses a status label. Unrecognized labels fall back to `Active`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "inativo" | "inactive" => SaleStatus::Inactive,
            _ => SaleStatus::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SaleStatus::Active => "Ativo",
            SaleStatus::Inactive => "Inativo",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SaleStatus::Active => SaleStatus::Inactive,
            SaleStatus::Inactive => SaleStatus::Active,
        }
    }
}

impl From<serde_json::Value> for SaleStatus {
    fn from(raw: serde_json::Value) -> Self {
        raw.as_str().map(SaleStatus::parse).unwrap_or_default()
    }
}

/// One client subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub client_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub username: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<String>,
    #[serde(rename = "whatsapp", default, deserialize_with = "lenient_text")]
    pub contact: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub server: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(with = "timestamp")]
    pub purchase_date: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub expiry_date: NaiveDateTime,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub cost: f64,
    #[serde(
        default,
        deserialize_with = "lenient_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_value: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_cost: Option<f64>,
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default, deserialize_with = "lenient_count")]
    pub renewal_count: u32,
}

impl Sale {
    /// Amount added to `value` on each renewal. Records saved before base
    /// amounts existed (or with a zero base) reuse the current value.
    pub fn renewal_value(&self) -> f64 {
        self.base_value.filter(|v| *v != 0.0).unwrap_or(self.value)
    }

    pub fn renewal_cost(&self) -> f64 {
        self.base_cost.filter(|v| *v != 0.0).unwrap_or(self.cost)
    }

    pub fn profit(&self) -> f64 {
        self.value - self.cost
    }

    pub fn is_active(&self) -> bool {
        self.status == SaleStatus::Active
    }
}

/// Create/edit payload. Missing or invalid fields take the form defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleInput {
    pub client_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "whatsapp")]
    pub contact: Option<String>,
    pub server: Option<String>,
    pub plan: Option<Plan>,
    #[serde(deserialize_with = "lenient_optional_timestamp")]
    pub purchase_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "lenient_amount")]
    pub value: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub cost: f64,
    pub status: Option<SaleStatus>,
}

/// Dashboard summary folded from the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "totalSalesValue")]
    pub total_sales_value: f64,
    #[serde(rename = "totalProfit")]
    pub total_profit: f64,
    #[serde(rename = "salesCount")]
    pub sales_count: u64,
    #[serde(rename = "expiringCount")]
    pub expiring_count: u64,
    #[serde(rename = "vencidosCount")]
    pub expired_count: u64,
    #[serde(rename = "vencidosValue")]
    pub expired_value: f64,
    #[serde(rename = "emDiaCount")]
    pub current_count: u64,
    #[serde(rename = "emDiaValue")]
    pub current_value: f64,
    #[serde(rename = "novosCount")]
    pub new_count: u64,
    #[serde(rename = "ativosCount")]
    pub active_count: u64,
    #[serde(rename = "inativosCount")]
    pub inactive_count: u64,
}

/// A sale with the presentation data derived at one evaluation instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRow {
    #[serde(flatten)]
    pub sale: Sale,
    pub days_remaining: i64,
    pub progress: f64,
    pub standing: Standing,
    pub value_label: String,
    pub expiry_label: String,
    pub notify_link: String,
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub link: String,
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` and RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&chrono::Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub(crate) mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

fn lenient_optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

fn coerce_amount(raw: Option<serde_json::Value>) -> Option<f64> {
    let amount = match raw? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(coerce_amount(raw).unwrap_or(0.0))
}

fn lenient_optional_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(coerce_amount(raw))
}

fn coerce_text(raw: Option<serde_json::Value>) -> Option<String> {
    match raw? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(coerce_text(raw).unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(coerce_text(raw))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let count = match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX)))
}
