//! Locale-aware money formatting.

use super::{decimal_places, round_half_away_from_zero};
use crate::i18n::code;

const NBSP: char = '\u{a0}';
const NARROW_NBSP: char = '\u{202f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    /// `$1,234.56`
    Prefix,
    /// `€ 1.234,56`
    PrefixSpaced,
    /// `1.234,56 €`
    SuffixSpaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    /// 1,234,567
    Thousands,
    /// 12,34,567
    Indian,
}

#[derive(Debug, Clone, Copy)]
struct NumberStyle {
    group: char,
    decimal: char,
    grouping: Grouping,
    placement: SymbolPlacement,
}

impl NumberStyle {
    const fn new(group: char, decimal: char, placement: SymbolPlacement) -> Self {
        Self {
            group,
            decimal,
            grouping: Grouping::Thousands,
            placement,
        }
    }

    const fn indian(mut self) -> Self {
        self.grouping = Grouping::Indian;
        self
    }
}

/// Display symbol for a currency code.
pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    let symbol = match currency.trim().to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "CAD" => "C$",
        "AUD" => "A$",
        "MXN" => "MX$",
        "ARS" => "AR$",
        "BRL" => "R$",
        "CLP" => "CL$",
        "JPY" => "¥",
        "CNY" => "¥",
        "TWD" => "NT$",
        "KRW" => "₩",
        "INR" => "₹",
        "PKR" => "Rs",
        "RUB" => "₽",
        "SAR" => "﷼",
        "AED" => "د.إ",
        "TRY" => "₺",
        "CHF" => "CHF",
        "SEK" => "kr",
        "NOK" => "kr",
        "DKK" => "kr",
        "PLN" => "zł",
        "CZK" => "Kč",
        "HUF" => "Ft",
        "RON" => "lei",
        "BGN" => "лв",
        "HRK" => "kn",
        "ILS" => "₪",
        "ZAR" => "R",
        "NZD" => "NZ$",
        "SGD" => "S$",
        "HKD" => "HK$",
        "THB" => "฿",
        "MYR" => "RM",
        "IDR" => "Rp",
        "PHP" => "₱",
        "VND" => "₫",
        _ => return None,
    };
    Some(symbol)
}

/// Number conventions for a locale: exact code first, then its base language.
fn number_style(locale: &str) -> Option<NumberStyle> {
    use SymbolPlacement::*;

    let locale = code::normalize(locale);
    let exact = match locale.as_str() {
        "es-mx" | "es-us" => Some(NumberStyle::new(',', '.', Prefix)),
        "pt-br" => Some(NumberStyle::new('.', ',', PrefixSpaced)),
        "de-at" => Some(NumberStyle::new('.', ',', PrefixSpaced)),
        "de-ch" => Some(NumberStyle::new('\'', '.', PrefixSpaced)),
        "fr-ca" => Some(NumberStyle::new(NBSP, ',', SuffixSpaced)),
        "fr-ch" => Some(NumberStyle::new(NARROW_NBSP, ',', SuffixSpaced)),
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }

    match code::base_language(&locale) {
        "en" | "ja" | "zh" | "ko" => Some(NumberStyle::new(',', '.', Prefix)),
        "hi" => Some(NumberStyle::new(',', '.', Prefix).indian()),
        "ur" => Some(NumberStyle::new(',', '.', PrefixSpaced)),
        "es" | "de" | "it" | "pt" => Some(NumberStyle::new('.', ',', SuffixSpaced)),
        "nl" => Some(NumberStyle::new('.', ',', PrefixSpaced)),
        "fr" => Some(NumberStyle::new(NARROW_NBSP, ',', SuffixSpaced)),
        "ru" => Some(NumberStyle::new(NBSP, ',', SuffixSpaced)),
        "ar" => Some(NumberStyle::new(',', '.', SuffixSpaced)),
        _ => None,
    }
}

fn group_digits(digits: &str, separator: char, grouping: Grouping) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2);

    for (i, ch) in digits.chars().enumerate() {
        let remaining = len - i;
        let boundary = match grouping {
            Grouping::Thousands => remaining % 3 == 0,
            // last group of three, then groups of two
            Grouping::Indian => remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0),
        };
        if i > 0 && boundary {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Format `amount` in `currency` following `locale`'s number conventions.
///
/// Returns `None` when the currency has no known symbol, the locale has no
/// number conventions, or the amount is not finite.
pub fn format_money(amount: f64, currency: &str, locale: &str) -> Option<String> {
    if !amount.is_finite() {
        return None;
    }

    let symbol = currency_symbol(currency)?;
    let style = number_style(locale)?;
    let decimals = decimal_places(currency);

    let rounded = round_half_away_from_zero(amount, decimals);
    let fixed = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut number = group_digits(int_part, style.group, style.grouping);
    if let Some(frac) = frac_part {
        number.push(style.decimal);
        number.push_str(frac);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    let formatted = match style.placement {
        SymbolPlacement::Prefix => format!("{sign}{symbol}{number}"),
        SymbolPlacement::PrefixSpaced => format!("{sign}{symbol}{NBSP}{number}"),
        SymbolPlacement::SuffixSpaced => format!("{sign}{number}{NBSP}{symbol}"),
    };
    Some(formatted)
}

/// Plain `"{CODE} {amount}"` rendering used when locale formatting fails.
pub fn format_plain(amount: f64, currency: &str) -> String {
    let currency = currency.trim().to_ascii_uppercase();
    let decimals = decimal_places(&currency);
    format!(
        "{} {:.*}",
        currency,
        decimals as usize,
        round_half_away_from_zero(amount, decimals)
    )
}
