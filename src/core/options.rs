//! Parsing of multi-value part lists
//!
//! A multi-value cell such as `"2x Lgt. Ion Engine, Med. Laser OR Hvy. Laser"`
//! is a `", "`-separated list of tokens. Each token is either a single option
//! (optionally prefixed with a quantity) or several mutually exclusive
//! alternatives joined with `" OR "`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Separator between tokens of a multi-value cell
pub const VALUE_SEPARATOR: &str = ", ";

/// Separator between alternatives inside one token
pub const OR_SEPARATOR: &str = " OR ";

static QUANTITY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)x (.*)").unwrap());

static PERCENT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*) \(\d*%\)").unwrap());

/// One alternative inside an OR group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// A parsed entry of a multi-value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionEntry {
    Single(String),
    Choice(Vec<Alternative>),
}

/// Split a quantity prefix off an option
fn parse_quantity(option: &str) -> Option<(u32, &str)> {
    let caps = QUANTITY_PATTERN.captures(option)?;
    let count = caps.get(1)?.as_str().parse().ok()?;
    Some((count, caps.get(2)?.as_str()))
}

fn parse_alternative(option: &str) -> Alternative {
    if let Some((number, name)) = parse_quantity(option) {
        return Alternative {
            name: name.to_string(),
            number: Some(number),
        };
    }

    if let Some(name) = PERCENT_PATTERN.captures(option).and_then(|c| c.get(1)) {
        return Alternative {
            name: name.as_str().to_string(),
            number: None,
        };
    }

    Alternative {
        name: option.to_string(),
        number: None,
    }
}

/// Parse one token, appending its entries to `out`
///
/// A single quantified option unrolls into repeated plain entries.
pub fn parse_token(token: &str, out: &mut Vec<OptionEntry>) {
    let options: Vec<&str> = token.split(OR_SEPARATOR).collect();

    if options.len() > 1 {
        out.push(OptionEntry::Choice(
            options.into_iter().map(parse_alternative).collect(),
        ));
        return;
    }

    let option = options[0];
    match parse_quantity(option) {
        Some((count, name)) => {
            for _ in 0..count {
                out.push(OptionEntry::Single(name.to_string()));
            }
        }
        None => out.push(OptionEntry::Single(option.to_string())),
    }
}

/// Parse a whole multi-value cell
pub fn parse_multi_value(value: &str) -> Vec<OptionEntry> {
    let mut entries = Vec::new();
    for token in value.split(VALUE_SEPARATOR) {
        parse_token(token, &mut entries);
    }
    entries
}

/// Parse a multi-value cell straight into JSON
pub fn multi_value_json(value: &str) -> Value {
    Value::Array(
        parse_multi_value(value)
            .into_iter()
            .map(|entry| match entry {
                OptionEntry::Single(name) => Value::String(name),
                OptionEntry::Choice(alternatives) => Value::Array(
                    alternatives
                        .into_iter()
                        .map(|alt| {
                            let mut obj = serde_json::Map::new();
                            obj.insert("name".to_string(), Value::String(alt.name));
                            if let Some(number) = alt.number {
                                obj.insert("number".to_string(), Value::from(number));
                            }
                            Value::Object(obj)
                        })
                        .collect(),
                ),
            })
            .collect(),
    )
}
