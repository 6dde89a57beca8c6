// Copyright 2026 Billcheck Contributors
// SPDX-License-Identifier: MIT

//! In-page scripts that locate, fill and submit an upstream lookup form.
//!
//! Controls are located once and tagged with `data-billcheck-*` attributes so
//! the fill step acts on exactly the elements that were found.

use super::profile::ScrapeProfile;
use serde::Deserialize;

const INPUT_MARK: &str = "data-billcheck-input";
const SUBMIT_MARK: &str = "data-billcheck-submit";

/// Which selectors matched when locating the form controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormControls {
    pub input: Option<String>,
    pub submit: Option<String>,
}

impl FormControls {
    pub fn is_complete(&self) -> bool {
        self.input.is_some() && self.submit.is_some()
    }
}

/// Outcome reported by the fill-and-submit script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitOutcome {
    #[serde(default)]
    pub success: bool,
}

/// Truthy once the document has loaded and any input candidate exists.
pub fn form_ready_script(profile: &ScrapeProfile) -> String {
    format!(
        r#"(() => {{
            const inputs = {inputs};
            return document.readyState === 'complete'
                && inputs.some(s => document.querySelector(s) !== null);
        }})()"#,
        inputs = js_string_list(&profile.input_selectors),
    )
}

/// Find and tag the bill-number input and the submit control.
pub fn locate_controls_script(profile: &ScrapeProfile) -> String {
    let button_text = profile
        .submit_button_text
        .map(|t| format!("'{}'", sanitize_js_string(t)))
        .unwrap_or_else(|| "null".to_string());
    format!(
        r#"(() => {{
            const inputs = {inputs};
            const submits = {submits};
            const buttonText = {button_text};
            document.querySelectorAll('[{INPUT_MARK}],[{SUBMIT_MARK}]').forEach(el => {{
                el.removeAttribute('{INPUT_MARK}');
                el.removeAttribute('{SUBMIT_MARK}');
            }});
            let input = null;
            for (const s of inputs) {{
                const el = document.querySelector(s);
                if (el) {{ el.setAttribute('{INPUT_MARK}', ''); input = s; break; }}
            }}
            let submit = null;
            for (const s of submits) {{
                const el = document.querySelector(s);
                if (el) {{ el.setAttribute('{SUBMIT_MARK}', ''); submit = s; break; }}
            }}
            if (!submit && buttonText) {{
                const btn = [...document.querySelectorAll('button')]
                    .find(b => (b.textContent || '').includes(buttonText));
                if (btn) {{ btn.setAttribute('{SUBMIT_MARK}', ''); submit = 'button:' + buttonText; }}
            }}
            return {{ input, submit }};
        }})()"#,
        inputs = js_string_list(&profile.input_selectors),
        submits = js_string_list(&profile.submit_selectors),
    )
}

/// Clear the tagged input, type the bill number and click submit.
///
/// Snapshots the body text first so result readiness can detect a change.
pub fn fill_and_submit_script(bill_number: &str) -> String {
    format!(
        r#"(() => {{
            const input = document.querySelector('[{INPUT_MARK}]');
            const submit = document.querySelector('[{SUBMIT_MARK}]');
            if (!input || !submit) return {{ success: false }};
            window.__billcheckBefore = document.body ? document.body.innerText : '';
            input.focus();
            input.value = '';
            input.value = '{value}';
            input.dispatchEvent(new Event('input', {{ bubbles: true }}));
            input.dispatchEvent(new Event('change', {{ bubbles: true }}));
            submit.click();
            return {{ success: true }};
        }})()"#,
        value = sanitize_js_string(bill_number),
    )
}

/// Truthy once the page has loaded and differs from the pre-submit snapshot.
///
/// A full navigation drops the snapshot, which also counts as changed.
pub fn result_settled_script() -> &'static str {
    r#"(() => document.readyState === 'complete'
        && document.body !== null
        && document.body.innerText !== window.__billcheckBefore)()"#
}

fn js_string_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|s| format!("'{}'", sanitize_js_string(s)))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Escape a string for a single- or double-quoted JavaScript literal.
pub fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            _ => result.push(ch),
        }
    }
    result
}
