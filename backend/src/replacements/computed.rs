//! Placeholders derived from other values rather than typed into the form.

use crate::replacements::format::{format_current_date, format_number_indian};
use crate::replacements::{RawForm, ReplacementMap};
use chrono::NaiveDate;
use common::model::family::{CauseOfActionRecipe, ComputedRecipe};
use log::warn;
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const CURRENT_DATE: &str = "(CURRENT_DATE)";
pub const TOTAL_AMOUNT: &str = "(TOTAL_AMOUNT)";
pub const CAUSE_OF_ACTION: &str = "(CAUSE_OF_ACTION)";
pub const PETITIONER_ADDRESS: &str = "(PETITIONER_ADDRESS)";
pub const ARES2: &str = "(ARES2)";
pub const DISTRICT: &str = "(DISTRICT)";
pub const ESTABLISHMENT: &str = "(ESTABLISHMENT)";

/// Every placeholder this module may write.
pub const COMPUTED_PLACEHOLDERS: [&str; 7] = [
    CURRENT_DATE,
    TOTAL_AMOUNT,
    CAUSE_OF_ACTION,
    PETITIONER_ADDRESS,
    ARES2,
    DISTRICT,
    ESTABLISHMENT,
];

const DATE1: &str = "(DATE1)";
const VILLAGE: &str = "(VILLAGE)";
const TALUK: &str = "(TALUK)";
const PINCODE: &str = "(PINCODE)";
const SYNO2: &str = "(SYNO2)";
const AMOUNTS: [&str; 3] = ["(AMNT1)", "(AMNT2)", "(AMNT3)"];

/// Checkbox that asks for the petitioner's address block.
pub const ADDRESS_FLAG: &str = "petitioner_address_checker";

static SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("invalid slot regex"));

/// Adds the computed entries to a map that already holds every field value.
pub fn apply(map: &mut ReplacementMap, recipe: &ComputedRecipe, form: &RawForm, today: NaiveDate) {
    let cause_of_action = cause_of_action(map, &recipe.cause_of_action);
    map.insert(CAUSE_OF_ACTION, cause_of_action);

    let ares2 = ares2_clause(map, &recipe.ares2_wording);
    map.insert(ARES2, ares2);

    for placeholder in &recipe.uppercase {
        let upper = map.value_or(placeholder, "").to_uppercase();
        map.insert(placeholder.as_str(), upper);
    }

    map.insert(
        CURRENT_DATE,
        format_current_date(today, recipe.current_date_day_of),
    );

    let total = total_amount(map, recipe.group_total_amount);
    map.insert(TOTAL_AMOUNT, total);

    let address = if form.get(ADDRESS_FLAG).is_some_and(|v| v == "on") {
        petitioner_address(map)
    } else {
        String::new()
    };
    map.insert(PETITIONER_ADDRESS, address);
}

/// Fills `{name}` slots in one pass so values containing braces stay intact.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    SLOT.replace_all(template, |caps: &Captures| {
        let slot = &caps[1];
        values
            .iter()
            .find(|(name, _)| *name == slot)
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

fn cause_of_action(map: &ReplacementMap, recipe: &CauseOfActionRecipe) -> String {
    let mut text = fill(&recipe.opening, &[("date", map.value_or(DATE1, ""))]);

    for clause in &recipe.compensation {
        let amount = map.value_or(&clause.placeholder, "0");
        if !amount.is_empty() && amount != "0" {
            text.push_str(&fill(&clause.sentence, &[("amount", amount)]));
        }
    }

    text.push_str(&fill(
        &recipe.closing,
        &[
            ("village", map.value_or(VILLAGE, "")),
            ("taluk", map.value_or(TALUK, "")),
        ],
    ));
    text
}

fn ares2_clause(map: &ReplacementMap, wording: &str) -> String {
    let ares = map.value_or(ARES2, "0");
    if ares.is_empty() || ares == "0" {
        return String::new();
    }
    fill(wording, &[("ares", ares), ("syno", map.value_or(SYNO2, ""))])
}

/// Sum of the three compensation amounts, `"0"` when the sum overflows.
fn total_amount(map: &ReplacementMap, grouped: bool) -> String {
    let total = AMOUNTS
        .iter()
        .map(|placeholder| parse_amount(map.value_or(placeholder, "0")))
        .try_fold(0i64, i64::checked_add);

    match total {
        Some(total) if grouped => {
            let digits = total.to_string();
            format_number_indian(&digits).unwrap_or(digits)
        }
        Some(total) => total.to_string(),
        None => {
            warn!("Failed to calculate total amount");
            "0".to_string()
        }
    }
}

/// Amounts arrive grouped (`1,00,000`); anything unparsable counts as zero.
fn parse_amount(value: &str) -> i64 {
    value.replace(',', "").trim().parse().unwrap_or(0)
}

fn petitioner_address(map: &ReplacementMap) -> String {
    format!(
        "{} Village, {} Taluk, {} District. PIN -{}",
        map.value_or(VILLAGE, ""),
        map.value_or(TALUK, ""),
        map.value_or(DISTRICT, ""),
        map.value_or(PINCODE, "")
    )
}
