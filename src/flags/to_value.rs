//! Extraction of flag values from parsed matches.
//!
//! The `*_value` helpers return the zero value when a flag was not given,
//! even if it carries a default. The `*_pointer` helpers return `None` in that
//! case so update commands can tell "unset" from "set to zero". The
//! `flag_with_default_*` helpers always return what clap resolved, defaults included.

use crate::cli::error::CliError;
use crate::print::{Level, Printer};
use chrono::{DateTime, FixedOffset};
use clap::parser::ValueSource;
use clap::ArgMatches;
use std::any::Any;
use std::collections::BTreeMap;

/// Whether the user supplied `name` on the command line or through its environment variable.
pub fn is_flag_set(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable)
    )
}

fn get_one<T: Any + Clone + Send + Sync + 'static>(
    p: &Printer,
    matches: &ArgMatches,
    name: &str,
) -> Option<T> {
    match matches.try_get_one::<T>(name) {
        Ok(v) => v.cloned(),
        Err(e) => {
            p.debug(Level::Error, &format!("convert flag {} to value: {}", name, e));
            None
        }
    }
}

fn get_many<T: Any + Clone + Send + Sync + 'static>(
    p: &Printer,
    matches: &ArgMatches,
    name: &str,
) -> Option<Vec<T>> {
    match matches.try_get_many::<T>(name) {
        Ok(v) => v.map(|vals| vals.cloned().collect()),
        Err(e) => {
            p.debug(Level::Error, &format!("convert flag {} to value: {}", name, e));
            None
        }
    }
}

pub fn flag_to_string_value(p: &Printer, matches: &ArgMatches, name: &str) -> String {
    flag_to_string_pointer(p, matches, name).unwrap_or_default()
}

pub fn flag_to_bool_value(p: &Printer, matches: &ArgMatches, name: &str) -> bool {
    flag_to_bool_pointer(p, matches, name).unwrap_or_default()
}

pub fn flag_to_string_slice_value(p: &Printer, matches: &ArgMatches, name: &str) -> Vec<String> {
    flag_to_string_slice_pointer(p, matches, name).unwrap_or_default()
}

pub fn flag_to_int64_value(p: &Printer, matches: &ArgMatches, name: &str) -> i64 {
    flag_to_int64_pointer(p, matches, name).unwrap_or_default()
}

pub fn flag_to_string_pointer(p: &Printer, matches: &ArgMatches, name: &str) -> Option<String> {
    if !is_flag_set(matches, name) {
        return None;
    }
    get_one::<String>(p, matches, name)
}

pub fn flag_to_int64_pointer(p: &Printer, matches: &ArgMatches, name: &str) -> Option<i64> {
    if !is_flag_set(matches, name) {
        return None;
    }
    get_one::<i64>(p, matches, name)
}

/// Works for both switches and `true`/`false` enum flags.
pub fn flag_to_bool_pointer(p: &Printer, matches: &ArgMatches, name: &str) -> Option<bool> {
    if !is_flag_set(matches, name) {
        return None;
    }
    get_one::<bool>(p, matches, name)
}

pub fn flag_to_string_slice_pointer(
    p: &Printer,
    matches: &ArgMatches,
    name: &str,
) -> Option<Vec<String>> {
    if !is_flag_set(matches, name) {
        return None;
    }
    get_many::<String>(p, matches, name)
}

pub fn flag_to_string_to_string_pointer(
    p: &Printer,
    matches: &ArgMatches,
    name: &str,
) -> Option<BTreeMap<String, String>> {
    let pairs = flag_to_string_slice_pointer(p, matches, name)?;
    Some(
        pairs
            .iter()
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Parses the flag with a chrono `format` string, e.g. `%Y-%m-%dT%H:%M:%S%:z`.
pub fn flag_to_date_time_pointer(
    p: &Printer,
    matches: &ArgMatches,
    name: &str,
    format: &str,
) -> Result<Option<DateTime<FixedOffset>>, CliError> {
    let Some(raw) = flag_to_string_pointer(p, matches, name) else {
        return Ok(None);
    };
    DateTime::parse_from_str(&raw, format)
        .map(Some)
        .map_err(|e| {
            CliError::flag(
                name,
                format!("could not convert to date-time with the format {}: {}", format, e),
            )
        })
}

pub fn flag_with_default_to_string_value(p: &Printer, matches: &ArgMatches, name: &str) -> String {
    get_one::<String>(p, matches, name).unwrap_or_default()
}

pub fn flag_with_default_to_int64_value(p: &Printer, matches: &ArgMatches, name: &str) -> i64 {
    get_one::<i64>(p, matches, name).unwrap_or_default()
}

pub fn flag_with_default_to_string_slice_pointer(
    p: &Printer,
    matches: &ArgMatches,
    name: &str,
) -> Option<Vec<String>> {
    get_many::<String>(p, matches, name)
}
