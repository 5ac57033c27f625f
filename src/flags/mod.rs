//! Typed flag definitions.
//!
//! Every flag is a plain [`clap::Arg`] whose value parser performs the
//! validation, so a bad value stops the invocation before the handler runs.
//! Slice kinds accumulate across repeated occurrences.

mod to_value;

pub use to_value::*;

use clap::{value_parser, Arg, ArgAction, Command};
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

pub type FileReader = Arc<dyn Fn(&Path) -> io::Result<String> + Send + Sync>;

pub fn string(name: &'static str, help: impl Into<String>) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help.into())
        .action(ArgAction::Set)
}

pub fn int64(name: &'static str, help: impl Into<String>) -> Arg {
    string(name, help).value_parser(value_parser!(i64))
}

/// A switch that takes no value.
pub fn bool(name: &'static str, help: impl Into<String>) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help.into())
        .action(ArgAction::SetTrue)
}

/// Comma-separated values, appended across occurrences.
pub fn string_slice(name: &'static str, help: impl Into<String>) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help.into())
        .action(ArgAction::Append)
        .value_delimiter(',')
}

/// One element per occurrence, commas kept verbatim.
pub fn string_array(name: &'static str, help: impl Into<String>) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help.into())
        .action(ArgAction::Append)
}

/// `key=value` pairs, comma-separated and appended across occurrences.
pub fn string_to_string(name: &'static str, help: impl Into<String>) -> Arg {
    string_slice(name, help).value_parser(parse_key_value)
}

pub fn enum_flag(
    name: &'static str,
    help: impl Into<String>,
    ignore_case: bool,
    options: &[&str],
) -> Arg {
    string(name, help).value_parser(enum_parser(ignore_case, options))
}

/// Enum values, comma-separated and appended across occurrences. `defaults`
/// apply until the flag is given, at which point the user's values replace them.
pub fn enum_slice(
    name: &'static str,
    help: impl Into<String>,
    ignore_case: bool,
    defaults: &[&str],
    options: &[&str],
) -> Arg {
    let arg = string_slice(name, help).value_parser(enum_parser(ignore_case, options));
    if defaults.is_empty() {
        arg
    } else {
        let defaults: Vec<String> = defaults.iter().map(|d| d.to_string()).collect();
        arg.default_values(defaults)
    }
}

/// A boolean that requires an explicit `true` or `false`.
pub fn enum_bool(name: &'static str, help: impl Into<String>) -> Arg {
    string(name, help).value_parser(parse_enum_bool)
}

pub fn uuid(name: &'static str, help: impl Into<String>) -> Arg {
    string(name, help).value_parser(parse_uuid)
}

pub fn uuid_slice(name: &'static str, help: impl Into<String>) -> Arg {
    string_slice(name, help).value_parser(parse_uuid)
}

pub fn cidr(name: &'static str, help: impl Into<String>) -> Arg {
    string(name, help).value_parser(parse_cidr)
}

pub fn cidr_slice(name: &'static str, help: impl Into<String>) -> Arg {
    string_slice(name, help).value_parser(parse_cidr)
}

/// Literal value, or file contents when prefixed with `@`.
pub fn read_from_file(name: &'static str, help: impl Into<String>) -> Arg {
    read_from_file_with(name, help, Arc::new(|p: &Path| std::fs::read_to_string(p)))
}

pub fn read_from_file_with(name: &'static str, help: impl Into<String>, reader: FileReader) -> Arg {
    string(name, help).value_parser(move |raw: &str| read_file_value(raw, reader.as_ref()))
}

/// Marks already registered flags as required.
pub fn mark_flags_required(mut cmd: Command, names: &[&'static str]) -> Command {
    for name in names {
        cmd = cmd.mut_arg(*name, |a| a.required(true));
    }
    cmd
}

/// Makes the given flags mutually exclusive.
pub fn mark_flags_mutually_exclusive(mut cmd: Command, names: &[&'static str]) -> Command {
    for name in names {
        let others: Vec<&'static str> = names.iter().copied().filter(|n| n != name).collect();
        cmd = cmd.mut_arg(*name, |a| a.conflicts_with_all(others));
    }
    cmd
}

pub fn parse_uuid(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("value cannot be empty".to_string());
    }
    uuid::Uuid::parse_str(value)
        .map(|_| value.to_string())
        .map_err(|e| format!("parse {} as UUID: {}", value, e))
}

pub fn parse_cidr(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("value cannot be empty".to_string());
    }
    let (addr, prefix) = value
        .split_once('/')
        .ok_or_else(|| format!("parse {} as CIDR: missing prefix length", value))?;
    let ip: IpAddr = addr
        .parse()
        .map_err(|e| format!("parse {} as CIDR: {}", value, e))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| format!("parse {} as CIDR: invalid prefix length {:?}", value, prefix))?;
    let max = if ip.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(format!(
            "parse {} as CIDR: prefix length {} is out of range 0-{}",
            value, prefix, max
        ));
    }
    Ok(value.to_string())
}

pub fn parse_enum_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("value {:?} must be one of \"true\" or \"false\"", value)),
    }
}

pub fn parse_key_value(value: &str) -> Result<String, String> {
    match value.split_once('=') {
        Some((k, _)) if !k.is_empty() => Ok(value.to_string()),
        _ => Err(format!("{:?} must be formatted as key=value", value)),
    }
}

pub fn enum_parser(
    ignore_case: bool,
    options: &[&str],
) -> impl Fn(&str) -> Result<String, String> + Clone + Send + Sync + 'static {
    let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
    move |value: &str| {
        if value.is_empty() {
            return Err("value cannot be empty".to_string());
        }
        let found = if ignore_case {
            let lower = value.to_lowercase();
            options
                .iter()
                .any(|o| o.to_lowercase() == lower)
                .then_some(lower)
        } else {
            options.iter().any(|o| o == value).then(|| value.to_string())
        };
        found.ok_or_else(|| format!("value {:?} must be one of {:?}", value, options))
    }
}

fn read_file_value(raw: &str, reader: &(dyn Fn(&Path) -> io::Result<String> + Send + Sync)) -> Result<String, String> {
    match raw.strip_prefix('@') {
        None => Ok(raw.to_string()),
        Some(path) => {
            let path = path.trim_matches(|c| c == '"' || c == '\'');
            reader(Path::new(path)).map_err(|e| format!("read file {:?}: {}", path, e))
        }
    }
}
