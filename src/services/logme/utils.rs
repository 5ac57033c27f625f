use super::model::Offering;
use super::{LogMeApi, SERVICE_NAME};
use crate::cli::error::CliError;
use crate::sdk::SdkError;

fn invalid_plan(details: String) -> CliError {
    CliError::DsaInvalidPlan {
        service: SERVICE_NAME.to_string(),
        details,
    }
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(|i| format!("\n- {}", i)).collect()
}

/// Finds the plan called `plan_name` in the offering with `version`. Both compare case-insensitively.
pub fn load_plan_id(
    plan_name: &str,
    version: &str,
    offerings: &[Offering],
) -> Result<String, CliError> {
    let matching: Vec<&Offering> = offerings
        .iter()
        .filter(|o| {
            o.version
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(version))
        })
        .collect();

    if matching.is_empty() {
        return Err(invalid_plan(format!(
            "you provided version {:?}, which is invalid; available versions are: {}",
            version,
            bullet_list(offerings.iter().filter_map(|o| o.version.as_deref()))
        )));
    }

    let plans = matching
        .iter()
        .flat_map(|o| o.plans.as_deref().unwrap_or_default());
    let mut names = Vec::new();
    for plan in plans {
        let Some(name) = plan.name.as_deref() else {
            continue;
        };
        if name.eq_ignore_ascii_case(plan_name) {
            if let Some(id) = &plan.id {
                return Ok(id.clone());
            }
        }
        names.push(name);
    }
    Err(invalid_plan(format!(
        "you provided plan name {:?} for version {}, which is invalid; available plan names for that version are: {}",
        plan_name,
        version,
        bullet_list(names.into_iter())
    )))
}

pub fn validate_plan_id(plan_id: &str, offerings: &[Offering]) -> Result<(), CliError> {
    let known = offerings
        .iter()
        .flat_map(|o| o.plans.as_deref().unwrap_or_default())
        .filter_map(|p| p.id.as_deref())
        .any(|id| id.eq_ignore_ascii_case(plan_id));
    if known {
        Ok(())
    } else {
        Err(invalid_plan(format!(
            "you provided plan ID {:?}, which is invalid",
            plan_id
        )))
    }
}

pub async fn get_instance_name(
    api: &dyn LogMeApi,
    project_id: &str,
    instance_id: &str,
) -> Result<String, SdkError> {
    let instance = api.get_instance(project_id, instance_id).await?;
    instance.name.ok_or_else(|| SdkError::Status {
        status: 404,
        message: format!("instance {} has no name", instance_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logme::model::Plan;

    fn plan(id: &str, name: &str) -> Plan {
        Plan {
            id: Some(id.into()),
            name: Some(name.into()),
            description: None,
            free: None,
        }
    }

    fn offerings() -> Vec<Offering> {
        vec![
            Offering {
                name: Some("logme".into()),
                version: Some("1".into()),
                plans: Some(vec![plan("p1-small", "stackit-logme-1.2.10-single")]),
                ..Default::default()
            },
            Offering {
                name: Some("logme".into()),
                version: Some("2".into()),
                plans: Some(vec![
                    plan("p2-single", "stackit-logme2-1.2.50-single"),
                    plan("p2-replica", "stackit-logme2-1.2.50-replica"),
                ]),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn loads_plan_by_name_and_version() {
        let id = load_plan_id("STACKIT-LOGME2-1.2.50-REPLICA", "2", &offerings()).unwrap();
        assert_eq!(id, "p2-replica");
    }

    #[test]
    fn unknown_version_lists_versions() {
        let err = load_plan_id("x", "3", &offerings()).unwrap_err();
        assert!(matches!(err, CliError::DsaInvalidPlan { .. }));
        let msg = err.to_string();
        assert!(msg.contains("version \"3\""));
        assert!(msg.contains("\n- 1\n- 2"));
    }

    #[test]
    fn unknown_plan_lists_plans_of_version() {
        let err = load_plan_id("tiny", "1", &offerings()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("stackit-logme-1.2.10-single"));
        assert!(!msg.contains("logme2"));
    }

    #[test]
    fn validates_plan_id() {
        assert!(validate_plan_id("p2-single", &offerings()).is_ok());
        assert!(validate_plan_id("P1-SMALL", &offerings()).is_ok());
        assert!(validate_plan_id("nope", &offerings()).is_err());
        assert!(validate_plan_id("p1-small", &[]).is_err());
    }
}
