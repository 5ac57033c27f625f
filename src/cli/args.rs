//! Positional argument specs.

use clap::{Arg, ArgAction, ArgMatches, Command};

pub type ArgValidator = fn(&str) -> Result<String, String>;

/// What positionals a command accepts.
#[derive(Clone, Copy)]
pub enum ArgSpec {
    NoArgs,
    SingleArg {
        name: &'static str,
        validator: Option<ArgValidator>,
    },
    ExactArgs {
        name: &'static str,
        count: usize,
    },
    /// One or more values, each checked by `validator`.
    MinimumArgs {
        name: &'static str,
        min: usize,
        validator: Option<ArgValidator>,
    },
}

impl ArgSpec {
    pub fn single(name: &'static str, validator: ArgValidator) -> Self {
        ArgSpec::SingleArg {
            name,
            validator: Some(validator),
        }
    }

    /// Adds the positionals to `cmd`. Commands without positionals reject any.
    pub fn apply(self, cmd: Command) -> Command {
        match self {
            ArgSpec::NoArgs => cmd,
            ArgSpec::SingleArg { name, validator } => {
                let arg = positional(name, validator).required(true).num_args(1);
                cmd.arg(arg)
            }
            ArgSpec::ExactArgs { name, count } => cmd.arg(
                positional(name, None)
                    .required(count > 0)
                    .num_args(count)
                    .action(ArgAction::Append),
            ),
            ArgSpec::MinimumArgs {
                name,
                min,
                validator,
            } => cmd.arg(
                positional(name, validator)
                    .required(min > 0)
                    .num_args(min.max(1)..)
                    .action(ArgAction::Append),
            ),
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            ArgSpec::NoArgs => None,
            ArgSpec::SingleArg { name, .. }
            | ArgSpec::ExactArgs { name, .. }
            | ArgSpec::MinimumArgs { name, .. } => Some(name),
        }
    }
}

fn positional(name: &'static str, validator: Option<ArgValidator>) -> Arg {
    let arg = Arg::new(name).value_name(name);
    match validator {
        Some(v) => arg.value_parser(v),
        None => arg,
    }
}

/// The single positional value of a `SingleArg` command.
pub fn single_value(matches: &ArgMatches, name: &str) -> String {
    matches.get_one::<String>(name).cloned().unwrap_or_default()
}

pub fn many_values(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}
