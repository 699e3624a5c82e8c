use super::{Constraint, Parameter, ParameterError, ParameterValue};
use crate::imports::*;
use crate::units::convert;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `"<prefix> <index>"`, e.g. `"AddOn CAPEX 2"`
    static ref POSITIONAL_KEY: Regex = Regex::new(r"^(?P<prefix>.*\S)\s+(?P<index>\d+)$").unwrap();
}

/// Separator of list values given on a single line
const LIST_SEPARATOR: char = ';';

/// Reads one raw entry into `param`.  Never fails: a value that cannot be parsed, converted or
/// validated is logged, the parameter falls back to its default and `valid` is cleared.
pub fn read_parameter(entry: &ParameterEntry, param: &mut Parameter) {
    param.provided = true;
    match parse_value(&entry.value, param) {
        Ok((value, units)) => {
            accept(param, value, units);
            if let Some(note) = ignored_unit(&entry.value, param) {
                log::warn!("{note}");
                param.read_message = Some(note.to_string());
            }
        }
        Err(err) => reject(param, err),
    }
}

/// Integer parameters are unitless; a unit token after the number is accepted but reported
fn ignored_unit(raw: &str, param: &Parameter) -> Option<ParameterError> {
    if !matches!(param.value, ParameterValue::Int(_)) {
        return None;
    }
    let (_, unit) = raw.trim().split_once(char::is_whitespace)?;
    Some(ParameterError::UnitIgnored {
        name: param.name.clone(),
        unit: unit.trim().to_string(),
    })
}

/// Reads positional `"<prefix> 1"`, `"<prefix> 2"`, ... entries into the list parameter `param`.
/// Reading stops at the first missing index; later indices are reported and ignored.
pub fn read_list_parameter(input: &InputParameters, param: &mut Parameter) {
    let Some(prefix) = param.positional_prefix.clone() else {
        return;
    };
    let found: BTreeMap<usize, &ParameterEntry> = input
        .iter()
        .filter_map(|entry| {
            let caps = POSITIONAL_KEY.captures(&entry.name)?;
            if &caps["prefix"] != prefix {
                return None;
            }
            caps["index"].parse::<usize>().ok().map(|i| (i, entry))
        })
        .collect();
    if found.is_empty() {
        return;
    }
    param.provided = true;

    let contiguous = found
        .keys()
        .zip(1..)
        .take_while(|(index, expected)| **index == *expected)
        .count();
    let ignored: Vec<usize> = found
        .keys()
        .copied()
        .filter(|&i| i == 0 || i > contiguous)
        .collect();
    let taken: Vec<&ParameterEntry> = (1..=contiguous).filter_map(|i| found.get(&i).copied()).collect();

    let gap = (!ignored.is_empty()).then(|| ParameterError::ListGap {
        name: param.name.clone(),
        ignored,
    });
    if taken.is_empty() {
        if let Some(err) = gap {
            reject(param, err);
        }
        return;
    }

    let parsed: Result<ParameterValue, ParameterError> = match &param.value {
        ParameterValue::StrList(_) => Ok(ParameterValue::StrList(
            taken.iter().map(|entry| entry.value.trim().to_string()).collect(),
        )),
        _ => taken
            .iter()
            .map(|entry| parse_in_preferred(&entry.value, param))
            .collect::<Result<Vec<f64>, _>>()
            .map(ParameterValue::List),
    };
    match parsed {
        Ok(value) => {
            let units = param.preferred_units;
            accept(param, value, units);
            if let Some(err) = gap {
                log::warn!("{err}");
                param.read_message = Some(err.to_string());
            }
        }
        Err(err) => reject(param, err),
    }
}

fn accept(param: &mut Parameter, value: ParameterValue, units: Unit) {
    param.value = value;
    param.current_units = units;
    param.valid = true;
    param.read_message = None;
}

fn reject(param: &mut Parameter, err: ParameterError) {
    log::warn!("{err}; {}", param.err_message);
    param.reset_to_default();
    param.valid = false;
    param.read_message = Some(err.to_string());
}

fn parse_value(raw: &str, param: &Parameter) -> Result<(ParameterValue, Unit), ParameterError> {
    let raw = raw.trim();
    match &param.value {
        ParameterValue::Float(_) => {
            let (value, units) = split_value_unit(raw, param)?;
            check_numeric(convert_to_preferred(value, units, param)?, raw, param)?;
            Ok((ParameterValue::Float(value), units))
        }
        ParameterValue::Int(_) => {
            let (value, _) = split_value_unit(raw, param)?;
            if value.fract() != 0.0 {
                return Err(parse_error(raw, param));
            }
            check_numeric(value, raw, param)?;
            Ok((ParameterValue::Int(value as i64), param.preferred_units))
        }
        ParameterValue::Bool(_) => match raw.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok((ParameterValue::Bool(true), param.preferred_units)),
            "false" | "no" | "off" | "0" => Ok((ParameterValue::Bool(false), param.preferred_units)),
            _ => Err(parse_error(raw, param)),
        },
        ParameterValue::Str(_) => {
            if raw.is_empty() {
                return Err(parse_error(raw, param));
            }
            if let Constraint::AllowableStrs(allowed) = &param.constraint {
                if !allowed.iter().any(|a| a.eq_ignore_ascii_case(raw)) {
                    return Err(ParameterError::NotAllowed {
                        name: param.name.clone(),
                        raw: raw.to_string(),
                        allowed: allowed.join(", "),
                    });
                }
            }
            Ok((ParameterValue::Str(raw.to_string()), param.preferred_units))
        }
        ParameterValue::List(_) => {
            let values = raw
                .split(LIST_SEPARATOR)
                .map(|token| parse_in_preferred(token, param))
                .collect::<Result<Vec<f64>, _>>()?;
            Ok((ParameterValue::List(values), param.preferred_units))
        }
        ParameterValue::StrList(_) => Ok((
            ParameterValue::StrList(
                raw.split(LIST_SEPARATOR)
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty())
                    .collect(),
            ),
            param.preferred_units,
        )),
    }
}

/// Parses one numeric list entry, validated and converted to preferred units
fn parse_in_preferred(raw: &str, param: &Parameter) -> Result<f64, ParameterError> {
    let raw = raw.trim();
    let (value, units) = split_value_unit(raw, param)?;
    let value = convert_to_preferred(value, units, param)?;
    check_numeric(value, raw, param)?;
    Ok(value)
}

/// Splits `"<number>[ <unit>]"`; a missing unit means the preferred unit
fn split_value_unit(raw: &str, param: &Parameter) -> Result<(f64, Unit), ParameterError> {
    let (number, unit_token) = match raw.split_once(char::is_whitespace) {
        Some((number, unit_token)) => (number, unit_token.trim()),
        None => (raw, ""),
    };
    let value: f64 = number.parse().map_err(|_| parse_error(raw, param))?;
    if !value.is_finite() {
        return Err(parse_error(raw, param));
    }
    let units = if unit_token.is_empty() {
        param.preferred_units
    } else {
        Unit::from_symbol(unit_token).map_err(|source| ParameterError::Unit {
            name: param.name.clone(),
            source,
        })?
    };
    Ok((value, units))
}

fn convert_to_preferred(value: f64, units: Unit, param: &Parameter) -> Result<f64, ParameterError> {
    convert(value, units, param.preferred_units).map_err(|source| ParameterError::Unit {
        name: param.name.clone(),
        source,
    })
}

fn check_numeric(value: f64, raw: &str, param: &Parameter) -> Result<(), ParameterError> {
    match &param.constraint {
        Constraint::Range { min, max } if value < *min || value > *max => {
            Err(ParameterError::OutOfRange {
                name: param.name.clone(),
                value,
                min: *min,
                max: *max,
            })
        }
        Constraint::AllowableInts(allowed) if !allowed.contains(&(value as i64)) => {
            Err(ParameterError::NotAllowed {
                name: param.name.clone(),
                raw: raw.to_string(),
                allowed: format!("{allowed:?}"),
            })
        }
        _ => Ok(()),
    }
}

fn parse_error(raw: &str, param: &Parameter) -> ParameterError {
    ParameterError::Parse {
        name: param.name.clone(),
        raw: raw.to_string(),
        expected: param.value.kind(),
    }
}
