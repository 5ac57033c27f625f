use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::sdk::wait::WaitError;
use crate::sdk::SdkError;
use thiserror::Error;

/// Every failure a command can surface to the user.
///
/// Only the executor prints these; handlers return them.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no project ID set; use --project-id, set it via \"stackit config set --project-id xxx\" or the STACKIT_PROJECT_ID environment variable")]
    ProjectId,

    #[error("invalid --{flag}: {details}")]
    FlagValidation { flag: String, details: String },

    #[error("invalid argument \"{arg}\": {details}")]
    ArgValidation { arg: String, details: String },

    #[error("no values provided to update")]
    EmptyUpdate,

    #[error("required flag(s) {} not set", quote_all(.flags))]
    RequiredFlags { flags: Vec<String> },

    #[error("expected argument {expected:?}, got {got} argument(s)")]
    SingleArgExpected { expected: String, got: usize },

    #[error("unknown {kind} {input:?}")]
    InputUnknown { input: String, kind: &'static str },

    #[error("unknown subcommand {0:?}")]
    SubcommandUnknown(String),

    #[error("{0}")]
    Usage(String),

    #[error("authentication failed: {0}; set STACKIT_ACCESS_TOKEN or STACKIT_SERVICE_ACCOUNT_TOKEN")]
    Auth(#[from] AuthError),

    #[error("the instance flavor was not correctly provided; either provide --flavor-id or --cpu and --ram (list options with \"stackit {service} options --flavors\")")]
    DatabaseInputFlavor { service: String },

    #[error("the provided instance flavor is not valid: {details}; list options with \"stackit {service} options --flavors\"")]
    DatabaseInvalidFlavor { service: String, details: String },

    #[error("the provided instance storage is not valid: {details}; list options with \"stackit {service} options --storages --flavor-id {flavor_id}\"")]
    DatabaseInvalidStorage {
        service: String,
        details: String,
        flavor_id: String,
    },

    #[error("the service plan was not correctly provided; either provide --plan-id or --plan-name and --version (list options with \"stackit {service} plans\")")]
    DsaInputPlan { service: String },

    #[error("the provided plan is not valid: {details}; list options with \"stackit {service} plans\"")]
    DsaInvalidPlan { service: String, details: String },

    /// The user declined a confirmation prompt.
    #[error("aborted")]
    Aborted,

    /// The invocation was interrupted by a signal.
    #[error("operation cancelled")]
    Interrupted,

    #[error("{0}")]
    Prompt(String),

    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: SdkError,
    },

    #[error("{context}: {source}")]
    Wait {
        context: String,
        #[source]
        source: WaitError,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CliError>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn flag(flag: impl Into<String>, details: impl Into<String>) -> Self {
        CliError::FlagValidation {
            flag: flag.into(),
            details: details.into(),
        }
    }

    /// A refused prompt ends the invocation successfully unless something wrapped it.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Aborted => 0,
            _ => 1,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, CliError::Interrupted)
    }
}

fn quote_all(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("{:?}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Conversion of lower-layer failures into a [`CliError`] carrying a one-line context.
pub trait IntoCliError {
    fn into_cli_error(self, context: String) -> CliError;
}

impl IntoCliError for SdkError {
    fn into_cli_error(self, context: String) -> CliError {
        match self {
            SdkError::Cancelled => CliError::Interrupted,
            SdkError::Unauthorized(message) => CliError::Auth(AuthError::Rejected(message)),
            source => CliError::Remote { context, source },
        }
    }
}

impl IntoCliError for WaitError {
    fn into_cli_error(self, context: String) -> CliError {
        match self {
            WaitError::Cancelled | WaitError::Request(SdkError::Cancelled) => CliError::Interrupted,
            source => CliError::Wait { context, source },
        }
    }
}

impl IntoCliError for CliError {
    fn into_cli_error(self, context: String) -> CliError {
        match self {
            CliError::Interrupted => CliError::Interrupted,
            source => CliError::Context {
                context,
                source: Box::new(source),
            },
        }
    }
}

pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, CliError>;
}

impl<T, E: IntoCliError> ResultExt<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, CliError> {
        self.map_err(|e| e.into_cli_error(context.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_user_messages() {
        assert_eq!(
            CliError::flag("acl", "bad prefix").to_string(),
            "invalid --acl: bad prefix"
        );
        assert_eq!(CliError::EmptyUpdate.to_string(), "no values provided to update");
        assert_eq!(
            CliError::RequiredFlags {
                flags: vec!["name".into(), "acl".into()]
            }
            .to_string(),
            "required flag(s) \"name\", \"acl\" not set"
        );
        assert!(CliError::ProjectId.to_string().starts_with("no project ID set"));
    }

    #[test]
    fn aborted_exits_zero_only_when_unwrapped() {
        assert_eq!(CliError::Aborted.exit_code(), 0);
        let wrapped: Result<(), CliError> = Err(CliError::Aborted);
        let wrapped = wrapped.context("update failed").unwrap_err();
        assert_eq!(wrapped.exit_code(), 1);
        assert_eq!(wrapped.to_string(), "update failed: aborted");
    }

    #[test]
    fn sdk_errors_are_classified() {
        let remote = Err::<(), _>(SdkError::Status {
            status: 404,
            message: "instance not found".into(),
        })
        .context("delete PostgreSQL Flex instance")
        .unwrap_err();
        assert_eq!(
            remote.to_string(),
            "delete PostgreSQL Flex instance: HTTP 404: instance not found"
        );

        let cancelled = Err::<(), _>(SdkError::Cancelled).context("x").unwrap_err();
        assert!(cancelled.is_interrupted());

        let auth = Err::<(), _>(SdkError::Unauthorized("token expired".into()))
            .context("x")
            .unwrap_err();
        assert!(matches!(auth, CliError::Auth(_)));
    }
}
