use super::model::{Credentials, LoadBalancer};
use super::LoadBalancerApi;
use crate::sdk::SdkError;
use std::collections::BTreeSet;

/// Which credentials survive [`filter_credentials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsFilter {
    All,
    Used,
    Unused,
}

impl CredentialsFilter {
    pub fn from_flags(used: bool, unused: bool) -> Self {
        match (used, unused) {
            (true, _) => Self::Used,
            (false, true) => Self::Unused,
            _ => Self::All,
        }
    }

    /// Adjective for user-facing messages, with a trailing space when non-empty.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Used => "used ",
            Self::Unused => "unused ",
        }
    }
}

/// Credentials references attached to any load balancer's logs or metrics push.
pub fn used_credentials_refs(load_balancers: &[LoadBalancer]) -> BTreeSet<String> {
    load_balancers
        .iter()
        .filter_map(|lb| lb.options.as_ref()?.observability.as_ref())
        .flat_map(|o| [o.logs.as_ref(), o.metrics.as_ref()])
        .flatten()
        .filter_map(|target| target.credentials_ref.clone())
        .collect()
}

/// Applies `filter` and returns the credentials sorted by reference.
pub fn filter_credentials(
    credentials: Vec<Credentials>,
    load_balancers: &[LoadBalancer],
    filter: CredentialsFilter,
) -> Vec<Credentials> {
    let used = used_credentials_refs(load_balancers);
    let mut kept: Vec<Credentials> = credentials
        .into_iter()
        .filter(|c| {
            let is_used = c
                .credentials_ref
                .as_ref()
                .is_some_and(|r| used.contains(r));
            match filter {
                CredentialsFilter::All => true,
                CredentialsFilter::Used => is_used,
                CredentialsFilter::Unused => !is_used,
            }
        })
        .collect();
    kept.sort_by(|a, b| a.credentials_ref.cmp(&b.credentials_ref));
    kept
}

pub async fn get_credentials_display_name(
    api: &dyn LoadBalancerApi,
    project_id: &str,
    region: &str,
    credentials_ref: &str,
) -> Result<String, SdkError> {
    let credentials = api.get_credentials(project_id, region, credentials_ref).await?;
    credentials.display_name.ok_or_else(|| SdkError::Status {
        status: 404,
        message: format!("credentials {} have no display name", credentials_ref),
    })
}
