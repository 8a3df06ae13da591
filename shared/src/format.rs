use std::fmt::Write;

use chrono::{DateTime, Datelike, Utc};

use crate::feed::WildfireEvent;

/// Numeric month/day/year date, e.g. `6/1/2024`.
pub fn format_start_date(date: &DateTime<Utc>) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// `lat, lng` with four decimals, from the event's first geometry.
pub fn format_coordinates(event: &WildfireEvent) -> Option<String> {
    let position = event.position()?;
    Some(format!("{:.4}, {:.4}", position.lat, position.lng))
}

pub fn wildfire_count_label(count: usize) -> String {
    format!("Displaying {count} active wildfires worldwide.")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Info bubble body for a tapped marker. Feed text is escaped before it is
/// handed to the SDK as HTML.
pub fn bubble_html(title: &str, started: &str) -> String {
    let mut html = String::with_capacity(320);
    html.push_str(
        r#"<div style="padding: 10px; max-width: 200px; background-color: white; border-radius: 20px;">"#,
    );
    let _ = write!(
        html,
        r#"<h3 style="margin: 0 0 5px; font-size: 14px; font-weight: bold;">{}</h3>"#,
        escape_html(title)
    );
    let _ = write!(
        html,
        r#"<p style="margin: 0; font-size: 12px;">Started: {}</p>"#,
        escape_html(started)
    );
    html.push_str("</div>");
    html
}
