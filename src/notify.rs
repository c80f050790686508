use crate::format::format_date;
use crate::models::Sale;
use crate::schedule::days_remaining;
use chrono::NaiveDateTime;

const WHATSAPP_BASE: &str = "https://wa.me/";
const COUNTRY_CODE: &str = "55";

/// Reminder text for a sale, picked by how far it is from expiry.
pub fn notification_message(sale: &Sale, now: NaiveDateTime) -> String {
    let days = days_remaining(sale.expiry_date, now);
    let name = &sale.client_name;

    if days < 0 {
        format!(
            "Olá {name}! 🚨 Notamos que seu acesso IPTV (Login: {}) venceu há {} dias. \
             Gostaria de renovar para não perder sua programação favorita?",
            sale.username,
            days.abs()
        )
    } else if days == 0 {
        format!("Olá {name}! ⚡ Seu acesso IPTV vence HOJE. Vamos renovar agora para evitar interrupções?")
    } else {
        format!(
            "Olá {name}! 👋 Passando para avisar que seu acesso IPTV vence em {days} dias ({}). \
             Podemos agendar sua renovação?",
            format_date(sale.expiry_date)
        )
    }
}

/// WhatsApp deep link carrying the reminder. Malformed numbers still yield a
/// link; only the digits are kept.
pub fn notification_link(sale: &Sale, now: NaiveDateTime) -> String {
    let phone: String = sale.contact.chars().filter(char::is_ascii_digit).collect();
    let message = notification_message(sale, now);
    format!(
        "{WHATSAPP_BASE}{COUNTRY_CODE}{phone}?text={}",
        urlencoding::encode(&message)
    )
}
