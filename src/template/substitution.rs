//! Variable substitution engine for `{{n}}` placeholder tokens
//!
//! Both payload examples and previews go through this module, so the token
//! grammar lives in exactly one place.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::types::{FieldValues, Variable};

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\{\{(\d+)\}\}").unwrap();
}

/// Render the token for a variable index.
pub fn token(index: u32) -> String {
    format!("{{{{{}}}}}", index)
}

/// Token indices in encounter order, repeats included.
pub fn token_indices(text: &str) -> Vec<u32> {
    TOKEN_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Number of tokens in the text, repeats included.
pub fn count_tokens(text: &str) -> usize {
    TOKEN_PATTERN.find_iter(text).count()
}

/// Replace every bound token with its resolved value.
///
/// With `values == None` (no sample record selected) each variable falls back
/// to its alternate text. Tokens without a matching variable are kept as-is.
/// Replacement is a single scan, so a value that itself contains `{{k}}` is
/// never substituted again.
pub fn substitute(text: &str, variables: &[Variable], values: Option<&FieldValues>) -> String {
    if variables.is_empty() {
        return text.to_string();
    }

    TOKEN_PATTERN
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(|index| variables.iter().find(|v| v.index == index))
                .map(|variable| resolve_value(variable, values))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn resolve_value(variable: &Variable, values: Option<&FieldValues>) -> String {
    values
        .and_then(|values| values.get(&variable.binding_key()))
        .cloned()
        .unwrap_or_else(|| variable.example_value())
}

/// Rewrite every token through `mapping`; indices mapped to `None` are
/// dropped from the text, unmapped indices are left untouched.
fn rewrite_tokens(text: &str, mapping: &HashMap<u32, Option<u32>>) -> String {
    TOKEN_PATTERN
        .replace_all(text, |caps: &Captures| {
            let index = caps[1].parse::<u32>().ok();
            match index.and_then(|i| mapping.get(&i)) {
                Some(Some(new_index)) => token(*new_index),
                Some(None) => String::new(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Delete the variable with `index`, renumber the rest `1..n-1` in list
/// order and rewrite the whole text to match.
///
/// Returns `None` when no variable carries `index`.
pub fn remove_variable(
    text: &str,
    variables: &[Variable],
    index: u32,
) -> Option<(String, Vec<Variable>)> {
    if !variables.iter().any(|v| v.index == index) {
        return None;
    }

    let mut mapping = HashMap::with_capacity(variables.len());
    let mut remaining = Vec::with_capacity(variables.len().saturating_sub(1));

    for variable in variables {
        if variable.index == index {
            mapping.insert(variable.index, None);
            continue;
        }
        let new_index = remaining.len() as u32 + 1;
        mapping.insert(variable.index, Some(new_index));
        remaining.push(Variable {
            index: new_index,
            ..variable.clone()
        });
    }

    Some((rewrite_tokens(text, &mapping), remaining))
}

/// Relabel variables `1..k` in the order their tokens first appear in the
/// text. Variables whose token never appears keep their list order after
/// the encountered ones.
pub fn renumber_by_encounter(text: &str, variables: &[Variable]) -> (String, Vec<Variable>) {
    let mut order: Vec<u32> = Vec::with_capacity(variables.len());
    for index in token_indices(text) {
        if !order.contains(&index) && variables.iter().any(|v| v.index == index) {
            order.push(index);
        }
    }
    for variable in variables {
        if !order.contains(&variable.index) {
            order.push(variable.index);
        }
    }

    let mut mapping = HashMap::with_capacity(order.len());
    let mut renumbered = Vec::with_capacity(order.len());
    for (position, old_index) in order.iter().enumerate() {
        let new_index = position as u32 + 1;
        mapping.insert(*old_index, Some(new_index));
        if let Some(variable) = variables.iter().find(|v| v.index == *old_index) {
            renumbered.push(Variable {
                index: new_index,
                ..variable.clone()
            });
        }
    }

    (rewrite_tokens(text, &mapping), renumbered)
}

/// Append a new variable and its token to the end of the text.
pub fn append_variable(
    text: &str,
    variables: &[Variable],
    object: &str,
    field: &str,
    alternate_text: Option<String>,
) -> (String, Vec<Variable>) {
    let index = variables.len() as u32 + 1;
    let mut updated = variables.to_vec();
    updated.push(Variable {
        index,
        object: object.to_string(),
        field: field.to_string(),
        alternate_text,
    });

    (format!("{}{}", text, token(index)), updated)
}
