// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! Result-page extraction.

use super::profile::{FieldRule, ScrapeProfile};
use billcheck::mock::billing_period;
use billcheck::{AcquisitionResult, BillDetails};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// A captured result page, parsed once and queried per field.
pub struct ResultPage {
    document: Html,
}

impl ResultPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// First non-empty text produced by `rules`, in order.
    pub fn first_text(&self, rules: &[FieldRule]) -> Option<String> {
        rules.iter().find_map(|rule| self.texts(rule).into_iter().next())
    }

    /// First positive amount produced by `rules`, in order.
    pub fn first_amount(&self, rules: &[FieldRule]) -> Option<f64> {
        rules
            .iter()
            .find_map(|rule| self.texts(rule).iter().find_map(|t| parse_amount(t)))
    }

    /// Whether the visible page text contains any of `phrases`, ignoring case.
    pub fn mentions_any(&self, phrases: &[&str]) -> bool {
        let text = self.rendered_text().to_lowercase();
        phrases.iter().any(|p| text.contains(&p.to_lowercase()))
    }

    /// Text content outside `<script>`, `<style>` and `<noscript>`.
    pub fn rendered_text(&self) -> String {
        let mut out = String::new();
        for node in self.document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
        out
    }

    /// Non-empty candidate texts for one rule, in document order.
    fn texts(&self, rule: &FieldRule) -> Vec<String> {
        match rule {
            FieldRule::LabelledCell(label) => self.labelled_cells(label),
            FieldRule::Css(css) => {
                let Ok(selector) = Selector::parse(css) else {
                    debug!(selector = css, "skipping unparsable selector");
                    return Vec::new();
                };
                self.document
                    .select(&selector)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .collect()
            }
        }
    }

    fn labelled_cells(&self, label: &str) -> Vec<String> {
        let Ok(cells) = Selector::parse("td") else {
            return Vec::new();
        };
        self.document
            .select(&cells)
            .filter(|td| td.text().collect::<String>().contains(label))
            .filter_map(|td| td.next_siblings().find_map(ElementRef::wrap))
            .filter(|next| next.value().name() == "td")
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Whitespace-collapsed text of an element.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep digits and `.`, read the leading decimal number, require it positive.
pub fn parse_amount(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let kept = kept.trim_start_matches('.');

    let mut seen_dot = false;
    let number: String = kept
        .chars()
        .take_while(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();

    number
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Turn a captured result page into an acquisition result.
pub fn extract(
    html: &str,
    profile: &ScrapeProfile,
    bill_number: &str,
    customer_reference: Option<&str>,
    now: DateTime<Utc>,
) -> AcquisitionResult {
    let page = ResultPage::parse(html);
    let rules = &profile.rules;

    let customer_name = page.first_text(&rules.customer_name);
    let amount_due = page.first_amount(&rules.amount_due);
    let due_date = page.first_text(&rules.due_date);
    let period = page.first_text(&rules.billing_period);

    if page.mentions_any(&profile.negative_phrases) {
        return AcquisitionResult::not_found(
            bill_number,
            customer_reference.map(str::to_string),
            profile.provider_display_name,
            profile.rejected_reason,
        );
    }

    AcquisitionResult::found(
        bill_number,
        customer_reference.map(str::to_string),
        profile.provider_display_name,
        BillDetails {
            customer_name: Some(
                customer_name.unwrap_or_else(|| profile.default_customer_name.to_string()),
            ),
            billing_period: Some(period.unwrap_or_else(|| billing_period(now))),
            amount_due,
            due_date,
            ..Default::default()
        },
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::profile::lesco;
    use billcheck::BillStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    const BILL_TABLE: &str = r#"
        <html><head><title>LESCO Bill</title>
        <script>var msg = "error handler installed";</script></head>
        <body><table>
          <tr><td>Consumer Name</td><td>  MUHAMMAD   ASLAM </td></tr>
          <tr><td>Bill Month</td><td>SEP 26</td></tr>
          <tr><td>Amount Due</td><td></td></tr>
          <tr><td>Current Bill</td><td>Rs. 4,520.00</td></tr>
          <tr><td>Due Date</td><td>23-OCT-26</td></tr>
        </table></body></html>"#;

    #[test]
    fn test_labelled_cells_fill_fields() {
        let result = extract(BILL_TABLE, &lesco(), "04111234567890", Some("CR1"), now());
        assert!(result.succeeded);
        assert_eq!(result.status, BillStatus::Unpaid);
        assert_eq!(result.customer_name.as_deref(), Some("MUHAMMAD ASLAM"));
        assert_eq!(result.billing_period.as_deref(), Some("SEP 26"));
        assert_eq!(result.amount_due, Some(4520.0));
        assert_eq!(result.due_date.as_deref(), Some("23-OCT-26"));
        assert_eq!(result.customer_reference.as_deref(), Some("CR1"));
        assert_eq!(
            result.provider_display_name,
            "Lahore Electric Supply Company (LESCO)"
        );
        assert!(result.is_consistent());
    }

    #[test]
    fn test_script_text_does_not_trigger_negative_phrase() {
        let page = ResultPage::parse(BILL_TABLE);
        assert!(!page.mentions_any(&["error"]));
        assert!(page.rendered_text().contains("Consumer Name"));
    }

    #[test]
    fn test_css_rules_apply_after_labels() {
        let html = r#"<div><span class="customer-name">Ayesha Khan</span>
            <span data-label="amount-total">PKR 1200</span>
            <span class="due-date"> 2026-11-01 </span></div>"#;
        let result = extract(html, &lesco(), "04111234567890", None, now());
        assert_eq!(result.customer_name.as_deref(), Some("Ayesha Khan"));
        assert_eq!(result.amount_due, Some(1200.0));
        assert_eq!(result.due_date.as_deref(), Some("2026-11-01"));
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let result = extract("<p>Thank you</p>", &lesco(), "04111234567890", None, now());
        assert_eq!(result.status, BillStatus::Unpaid);
        assert_eq!(result.customer_name.as_deref(), Some("LESCO Customer"));
        assert_eq!(result.billing_period.as_deref(), Some("October 2026"));
        assert_eq!(result.amount_due, None);
        assert_eq!(result.due_date, None);
    }

    #[test]
    fn test_negative_phrase_overrides_extracted_fields() {
        let html = r#"<table><tr><td>Customer Name</td><td>Someone</td></tr></table>
            <p>No Record Found for this reference</p>"#;
        let result = extract(html, &lesco(), "1234567890", Some("CR1"), now());
        assert!(!result.succeeded);
        assert_eq!(result.status, BillStatus::NotFound);
        assert_eq!(
            result.failure_reason.as_deref(),
            Some("Bill not found in LESCO records")
        );
        assert_eq!(result.customer_name, None);
    }

    #[test]
    fn test_zero_amount_falls_through_to_next_rule() {
        let html = r#"<table>
            <tr><td>Amount Due</td><td>0.00</td></tr>
            <tr><td>Total Amount</td><td>3,150</td></tr></table>"#;
        let page = ResultPage::parse(html);
        assert_eq!(page.first_amount(&lesco().rules.amount_due), Some(3150.0));
    }

    #[test]
    fn test_parse_amount_edge_cases() {
        assert_eq!(parse_amount("Rs. 4,520.00"), Some(4520.0));
        assert_eq!(parse_amount("1.234.56"), Some(1.234));
        assert_eq!(parse_amount("12."), Some(12.0));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_label_cell_must_be_followed_by_td() {
        let html = r#"<table><tr><td>Customer Name</td><th>Header</th></tr></table>"#;
        let page = ResultPage::parse(html);
        assert_eq!(page.first_text(&[FieldRule::LabelledCell("Customer Name")]), None);
    }
}
