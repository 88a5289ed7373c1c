//! Booking
//!
//! The finalize action: compose a `mailto:` link carrying the quote
//! summary and contact details. Consumes only the finished breakdown and
//! the selection's contact fields; nothing is persisted.

use rusty_money::Money;

use crate::{breakdown::Breakdown, calculator::Calculator, selection::Selection};

/// Compose a `mailto:` URL finalizing the quote, or `None` when the
/// selection is not bookable yet (unresolved required categories or
/// incomplete contact details).
///
/// The recipient address is left unescaped; some mail clients mishandle a
/// percent-encoded addr-spec.
#[must_use]
pub fn mailto_link(
    to: &str,
    calculator: &Calculator,
    selection: &Selection,
    breakdown: &Breakdown,
) -> Option<String> {
    if !selection.is_bookable(calculator) {
        return None;
    }

    let subject = format!("{} booking request", calculator.name());
    let body = quote_summary(calculator, selection, breakdown);

    Some(format!(
        "mailto:{to}?subject={}&body={}",
        escape(&subject),
        escape(&body),
    ))
}

/// Plain-text quote summary used as the email body.
#[must_use]
pub fn quote_summary(
    calculator: &Calculator,
    selection: &Selection,
    breakdown: &Breakdown,
) -> String {
    let contact = &selection.contact;
    let mut body = format!("{} quote\n\n", calculator.name());

    for line in breakdown.lines() {
        let amount = Money::from_minor(line.amount, breakdown.currency());
        body.push_str(&format!("{}: {amount}\n", line.label));
    }

    body.push_str(&format!("\nSubtotal: {}\n", breakdown.subtotal()));
    if breakdown.discount_minor() != 0 {
        body.push_str(&format!("Discount: {}\n", breakdown.discount()));
    }
    body.push_str(&format!("Total: {}\n\n", breakdown.total()));

    body.push_str(&format!("Name: {}\n", contact.name));
    body.push_str(&format!("Email: {}\n", contact.email));
    if let Some(phone) = &contact.phone {
        body.push_str(&format!("Phone: {phone}\n"));
    }
    if let Some(company) = &contact.company {
        body.push_str(&format!("Company: {company}\n"));
    }

    body
}

/// Percent-encode a subject or body for use inside a `mailto:` URL
/// (RFC 6068). Everything outside the unreserved set is escaped.
fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }

    escaped
}
