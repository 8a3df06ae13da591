use chrono::{DateTime, Utc};

use wildfire_shared::format::format_start_date;

/// Date in the browser's locale, falling back to month/day/year.
#[cfg(target_arch = "wasm32")]
pub fn locale_date(date: &DateTime<Utc>) -> String {
    let js_date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(
        date.timestamp_millis() as f64,
    ));
    let formatted: String = js_date
        .to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED)
        .into();
    if formatted.is_empty() || formatted == "Invalid Date" {
        format_start_date(date)
    } else {
        formatted
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn locale_date(date: &DateTime<Utc>) -> String {
    format_start_date(date)
}

pub fn started_label(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => format!("Started: {}", locale_date(&date)),
        None => "Started: unknown".to_string(),
    }
}
