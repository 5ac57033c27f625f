pub mod args;
pub mod error;
pub mod examples;
pub mod globalflags;
pub mod operation;
pub mod params;
pub mod parser;
pub mod tree;
pub mod ui;

use crate::commands;
use crate::print::{Level, Printer};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use error::CliError;
use lazy_static::lazy_static;
use params::CmdParams;
use regex::Regex;
use std::ffi::OsString;
use tree::CommandNode;

lazy_static! {
    static ref FLAG_NAME: Regex =
        Regex::new(r"^--?([A-Za-z0-9][A-Za-z0-9-]*)").expect("flag name pattern");
    static ref ARG_NAME: Regex = Regex::new(r"^<([^>]+)>").expect("argument name pattern");
}

/// Runs one invocation and returns the process exit code.
///
/// This is the only place that reports errors to the user.
pub async fn execute<I, T>(args: I, params: &CmdParams) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let root = commands::root();
    execute_tree(&root, args, params).await
}

pub async fn execute_tree<I, T>(root: &CommandNode, args: I, params: &CmdParams) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let p = params.printer.as_ref();
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let matches = match root.build().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                p.output(&e.render().to_string());
                return 0;
            }
            _ => {
                let code = report(p, map_clap_error(&e));
                p.errln(&usage_tip(root, &args));
                return code;
            }
        },
    };

    let (path, node, leaf_matches) = root.resolve(&matches);
    let globals = globalflags::parse(p, leaf_matches, &params.config);
    p.set_verbosity(globals.verbosity);
    p.debug(
        Level::Debug,
        &format!("resolved command \"{}\"", path.join(" ")),
    );

    let Some(handler) = node.handler() else {
        p.output(&group_help(root, &path));
        return 0;
    };

    match handler(params, leaf_matches).await {
        Ok(()) => 0,
        Err(e) => report(p, e),
    }
}

fn report(p: &Printer, err: CliError) -> i32 {
    match &err {
        CliError::Aborted => p.errln("aborted"),
        CliError::Interrupted => {
            p.debug(Level::Debug, "invocation interrupted");
        }
        other => p.error(&other.to_string()),
    }
    err.exit_code()
}

/// Points at the help of the deepest command named in `args`.
fn usage_tip(root: &CommandNode, args: &[OsString]) -> String {
    let mut current = root.build();
    let mut path = vec![current.get_name().to_string()];
    for arg in args.iter().skip(1).filter_map(|a| a.to_str()) {
        if arg.starts_with('-') {
            continue;
        }
        if let Some(sub) = current.find_subcommand(arg).cloned() {
            path.push(arg.to_string());
            current = sub;
        }
    }
    format!("For usage help, run `{} --help`", path.join(" "))
}

/// Long help of the group at `path`, rendered without touching the network.
fn group_help(root: &CommandNode, path: &[&str]) -> String {
    let mut current = root.build();
    current.build();
    for name in path {
        match current.find_subcommand(name) {
            Some(sub) => current = sub.clone(),
            None => break,
        }
    }
    current.render_long_help().to_string()
}

fn context_string(e: &clap::Error, kind: ContextKind) -> Option<String> {
    match e.get(kind)? {
        ContextValue::String(s) => Some(s.clone()),
        ContextValue::Strings(v) => v.first().cloned(),
        _ => None,
    }
}

fn context_strings(e: &clap::Error, kind: ContextKind) -> Vec<String> {
    match e.get(kind) {
        Some(ContextValue::String(s)) => vec![s.clone()],
        Some(ContextValue::Strings(v)) => v.clone(),
        _ => Vec::new(),
    }
}

fn flag_name(display: &str) -> Option<String> {
    FLAG_NAME
        .captures(display)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn arg_name(display: &str) -> Option<String> {
    ARG_NAME
        .captures(display)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn first_line(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

/// Maps a clap parse failure onto the error taxonomy.
fn map_clap_error(e: &clap::Error) -> CliError {
    let invalid_arg = context_string(e, ContextKind::InvalidArg).unwrap_or_default();
    match e.kind() {
        ErrorKind::ValueValidation | ErrorKind::InvalidValue => {
            let details = std::error::Error::source(e)
                .map(|s| s.to_string())
                .unwrap_or_else(|| first_line(e));
            if let Some(flag) = flag_name(&invalid_arg) {
                CliError::FlagValidation { flag, details }
            } else {
                CliError::ArgValidation {
                    arg: context_string(e, ContextKind::InvalidValue).unwrap_or(invalid_arg),
                    details,
                }
            }
        }
        ErrorKind::MissingRequiredArgument => {
            let missing = context_strings(e, ContextKind::InvalidArg);
            let flags: Vec<String> = missing.iter().filter_map(|m| flag_name(m)).collect();
            if flags.is_empty() {
                match missing.first().and_then(|m| arg_name(m)) {
                    Some(expected) => CliError::SingleArgExpected { expected, got: 0 },
                    None => CliError::Usage(first_line(e)),
                }
            } else {
                CliError::RequiredFlags { flags }
            }
        }
        ErrorKind::UnknownArgument => {
            let kind = if invalid_arg.starts_with('-') {
                "flag"
            } else {
                "argument"
            };
            CliError::InputUnknown {
                input: invalid_arg,
                kind,
            }
        }
        ErrorKind::InvalidSubcommand => CliError::SubcommandUnknown(
            context_string(e, ContextKind::InvalidSubcommand).unwrap_or(invalid_arg),
        ),
        _ => CliError::Usage(first_line(e)),
    }
}
