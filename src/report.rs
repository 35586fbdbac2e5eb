//! Console reports
//!
//! Renders a cart, its budget and a payment split as terminal tables.

use std::{io, ops::Range};

use rust_decimal::Decimal;
use rusty_money::{MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    budget::BudgetStatus,
    cart::Cart,
    chat::ChatLog,
    members::MemberUuid,
    pricing::PricingError,
    splits::{SplitKind, SplitOutcome},
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A line total could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Writes the cart's items followed by its total and budget.
///
/// # Errors
///
/// Returns an error if a line total overflows or the output cannot be written.
pub fn write_cart(mut out: impl io::Write, cart: &Cart) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Category", "Qty", "Price", "Total", "Added By"]);

    for item in cart.items() {
        let added_by = item
            .added_by()
            .iter()
            .map(|member| member_name(cart, *member))
            .collect::<Vec<_>>()
            .join("\n");

        builder.push_record([
            item.name().to_string(),
            item.category().to_string(),
            item.quantity().to_string(),
            item.price().to_string(),
            item.line_total()?.to_string(),
            added_by,
        ]);
    }

    writeln!(out, "\n{}", cart.name()).map_err(|_err| ReportError::IO)?;

    if let Some(description) = cart.description() {
        writeln!(out, "{description}").map_err(|_err| ReportError::IO)?;
    }

    write_table(&mut out, builder, 2..5)?;

    write_summary_line(&mut out, "Total:", &cart.total_spent().to_string())?;

    if let Some(status) = BudgetStatus::for_cart(cart)? {
        write_budget(&mut out, &status)?;
    }

    writeln!(out).map_err(|_err| ReportError::IO)
}

/// Writes each member's share of a split.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_split(
    mut out: impl io::Write,
    cart: &Cart,
    outcome: &SplitOutcome,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Member", "Amount", "Policy"]);

    for split in &outcome.splits {
        builder.push_record([
            member_name(cart, split.member).to_string(),
            format_amount(split.amount, cart.currency()),
            kind_label(split.kind).to_string(),
        ]);
    }

    write_table(&mut out, builder, 1..2)?;

    if let Some(validation) = &outcome.validation {
        let verdict = if validation.valid {
            "balanced".to_string()
        } else {
            format!(
                "off by {}",
                format_amount(validation.delta, cart.currency())
            )
        };

        write_summary_line(
            &mut out,
            "Allocated:",
            &format!(
                "{} of {} ({verdict})",
                format_amount(validation.supplied_total, cart.currency()),
                format_amount(validation.expected_total, cart.currency()),
            ),
        )?;
    } else {
        write_summary_line(
            &mut out,
            "Total:",
            &format_amount(outcome.total(), cart.currency()),
        )?;
    }

    writeln!(out).map_err(|_err| ReportError::IO)
}

/// Writes the chat history, one line per message.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_chat(mut out: impl io::Write, chat: &ChatLog) -> Result<(), ReportError> {
    for message in chat.messages() {
        let reactions = message
            .reactions()
            .iter()
            .map(|reaction| format!("{} {}", reaction.emoji(), reaction.count()))
            .collect::<Vec<_>>()
            .join("  ");

        writeln!(
            out,
            "[{}] {}: {}",
            message.sent_at().strftime("%H:%M"),
            message.author().name(),
            message.text()
        )
        .map_err(|_err| ReportError::IO)?;

        if !reactions.is_empty() {
            writeln!(out, "        {reactions}").map_err(|_err| ReportError::IO)?;
        }
    }

    Ok(())
}

fn write_budget(out: &mut impl io::Write, status: &BudgetStatus) -> Result<(), ReportError> {
    write_summary_line(out, "Budget:", &status.budget().to_string())?;
    write_summary_line(out, "Used:", &format!("{}%", status.percent_used().round_dp(1)))?;

    match status.overage() {
        Some(overage) => {
            let overage = color_red().colorize(overage.to_string());

            write_summary_line(out, "Over by:", &overage)
        }
        None => write_summary_line(out, "Remaining:", &status.remaining().to_string()),
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: Range<usize>,
) -> Result<(), ReportError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| ReportError::IO)
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
) -> Result<(), ReportError> {
    writeln!(out, " {label:>10}  {value}").map_err(|_err| ReportError::IO)
}

fn member_name(cart: &Cart, member: MemberUuid) -> &str {
    cart.member(member).map_or("<former member>", |member| member.name())
}

fn kind_label(kind: SplitKind) -> &'static str {
    match kind {
        SplitKind::Even => "even",
        SplitKind::ItemBased => "item-based",
        SplitKind::Custom => "custom",
    }
}

/// Formats a major-unit amount to two places with the currency symbol.
///
/// The sign leads the symbol, so a shortfall reads `-$7.27`.
fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    let rounded = amount.round_dp(2);

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{:.2}", currency.symbol, rounded.abs())
    } else {
        format!("{}{:.2}", currency.symbol, rounded.abs())
    }
}

/// ANSI red foreground (budget overage).
fn color_red() -> Color {
    Color::new("\x1b[31m", "\x1b[0m")
}
