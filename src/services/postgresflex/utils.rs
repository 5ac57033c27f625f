use super::model::{Flavor, ListStoragesResponse};
use super::{PostgresFlexApi, SERVICE_NAME};
use crate::cli::error::CliError;
use crate::sdk::SdkError;
use semver::Version;

const INSTANCE_TYPES: [(&str, i64); 2] = [("Single", 1), ("Replica", 3)];

pub fn available_instance_types() -> Vec<&'static str> {
    INSTANCE_TYPES.iter().map(|(t, _)| *t).collect()
}

pub fn get_instance_replicas(instance_type: &str) -> Result<i64, CliError> {
    INSTANCE_TYPES
        .iter()
        .find(|(t, _)| *t == instance_type)
        .map(|(_, r)| *r)
        .ok_or_else(|| {
            CliError::flag(
                "type",
                format!(
                    "invalid instance type {:?}, must be one of {:?}",
                    instance_type,
                    available_instance_types()
                ),
            )
        })
}

pub fn get_instance_type(replicas: i64) -> Result<&'static str, CliError> {
    INSTANCE_TYPES
        .iter()
        .find(|(_, r)| *r == replicas)
        .map(|(t, _)| *t)
        .ok_or_else(|| anyhow::anyhow!("unexpected number of replicas: {}", replicas).into())
}

fn flavor_summary(flavors: &[Flavor]) -> String {
    flavors
        .iter()
        .filter_map(|f| Some(format!("{}/{}", f.cpu?, f.memory?)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// ID of the first flavor with exactly `cpu` cores and `ram` GB.
pub fn load_flavor_id(cpu: i64, ram: i64, flavors: &[Flavor]) -> Result<String, CliError> {
    let found = flavors
        .iter()
        .find(|f| f.cpu == Some(cpu) && f.memory == Some(ram))
        .and_then(|f| f.id.clone());
    found.ok_or_else(|| CliError::DatabaseInvalidFlavor {
        service: SERVICE_NAME.to_string(),
        details: format!(
            "provided instance CPU and RAM combination ({}/{}) do not match any of the available flavors (CPU/RAM): {}",
            cpu,
            ram,
            flavor_summary(flavors)
        ),
    })
}

pub fn validate_flavor_id(flavor_id: &str, flavors: &[Flavor]) -> Result<(), CliError> {
    if flavors.is_empty() {
        return Err(CliError::DatabaseInvalidFlavor {
            service: SERVICE_NAME.to_string(),
            details: "no flavors available".to_string(),
        });
    }
    if flavors.iter().any(|f| f.id.as_deref() == Some(flavor_id)) {
        return Ok(());
    }
    Err(CliError::DatabaseInvalidFlavor {
        service: SERVICE_NAME.to_string(),
        details: format!("provided flavor ID {:?} is not valid", flavor_id),
    })
}

/// Checks the class is offered and the size lies within the inclusive range for `flavor_id`.
pub fn validate_storage(
    storage_class: Option<&str>,
    storage_size: Option<i64>,
    storages: Option<&ListStoragesResponse>,
    flavor_id: &str,
) -> Result<(), CliError> {
    let invalid = |details: String| CliError::DatabaseInvalidStorage {
        service: SERVICE_NAME.to_string(),
        details,
        flavor_id: flavor_id.to_string(),
    };
    let Some(storages) = storages else {
        return Err(invalid("storages response is empty".to_string()));
    };

    if let Some(class) = storage_class {
        let classes = storages.storage_classes.as_deref().unwrap_or_default();
        if !classes.iter().any(|c| c == class) {
            return Err(invalid(format!(
                "storage class {:?} is not supported, available classes: {:?}",
                class, classes
            )));
        }
    }

    if let Some(size) = storage_size {
        let range = storages.storage_range.as_ref();
        let (Some(min), Some(max)) = (range.and_then(|r| r.min), range.and_then(|r| r.max)) else {
            return Err(invalid("storage size range is not available".to_string()));
        };
        if size < min || size > max {
            return Err(invalid(format!(
                "storage size {} is out of bounds (minimum: {}, maximum: {})",
                size, min, max
            )));
        }
    }
    Ok(())
}

/// Lenient semantic version: missing minor and patch components count as zero.
fn parse_version(v: &str) -> Option<Version> {
    let v = v.trim().trim_start_matches('v');
    let mut parts: Vec<&str> = v.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&parts.join(".")).ok()
}

/// Highest version, compared semantically so "10" beats "9".
pub fn get_latest_version(versions: &[String]) -> Result<String, CliError> {
    versions
        .iter()
        .filter_map(|v| parse_version(v).map(|parsed| (parsed, v)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, v)| v.clone())
        .ok_or_else(|| anyhow::anyhow!("no valid PostgreSQL versions available").into())
}

pub async fn get_instance_name(
    api: &dyn PostgresFlexApi,
    project_id: &str,
    region: &str,
    instance_id: &str,
) -> Result<String, SdkError> {
    let instance = api.get_instance(project_id, region, instance_id).await?;
    instance.name.ok_or_else(|| SdkError::Status {
        status: 404,
        message: format!("instance {} has no name", instance_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::postgresflex::model::StorageRange;

    fn flavor(id: &str, cpu: i64, memory: i64) -> Flavor {
        Flavor {
            id: Some(id.into()),
            cpu: Some(cpu),
            memory: Some(memory),
            description: None,
        }
    }

    fn storages() -> ListStoragesResponse {
        ListStoragesResponse {
            storage_classes: Some(vec!["bar-1".into(), "bar-2".into(), "foo".into()]),
            storage_range: Some(StorageRange {
                min: Some(5),
                max: Some(100),
            }),
        }
    }

    #[test]
    fn replicas_and_types_are_inverse() {
        assert_eq!(get_instance_replicas("Single").unwrap(), 1);
        assert_eq!(get_instance_replicas("Replica").unwrap(), 3);
        assert!(get_instance_replicas("replica").is_err());
        assert_eq!(get_instance_type(3).unwrap(), "Replica");
        assert!(get_instance_type(2).is_err());
    }

    #[test]
    fn loads_flavor_by_cpu_and_ram() {
        let flavors = vec![flavor("a", 2, 4), flavor("foo", 4, 16), flavor("b", 4, 16)];
        assert_eq!(load_flavor_id(4, 16, &flavors).unwrap(), "foo");

        let err = load_flavor_id(8, 32, &flavors).unwrap_err();
        assert!(matches!(err, CliError::DatabaseInvalidFlavor { .. }));
        assert!(err.to_string().contains("2/4, 4/16, 4/16"));
    }

    #[test]
    fn validates_flavor_id() {
        let flavors = vec![flavor("foo", 2, 4)];
        assert!(validate_flavor_id("foo", &flavors).is_ok());
        assert!(validate_flavor_id("bar", &flavors).is_err());
        assert!(validate_flavor_id("foo", &[]).is_err());
    }

    #[test]
    fn validates_storage() {
        let s = storages();
        assert!(validate_storage(Some("foo"), Some(10), Some(&s), "f").is_ok());
        assert!(validate_storage(None, None, Some(&s), "f").is_ok());
        assert!(validate_storage(Some("baz"), Some(10), Some(&s), "f").is_err());
        assert!(validate_storage(Some("foo"), Some(4), Some(&s), "f").is_err());
        assert!(validate_storage(Some("foo"), Some(100), Some(&s), "f").is_ok());
        assert!(validate_storage(Some("foo"), Some(101), Some(&s), "f").is_err());
        assert!(validate_storage(Some("foo"), Some(10), None, "f").is_err());

        let no_range = ListStoragesResponse {
            storage_range: None,
            ..storages()
        };
        let err = validate_storage(None, Some(10), Some(&no_range), "flavor-1").unwrap_err();
        assert!(err.to_string().contains("--flavor-id flavor-1"));
    }

    #[test]
    fn latest_version_compares_semantically() {
        let versions: Vec<String> = ["8", "10", "9", "9.6"].iter().map(|s| s.to_string()).collect();
        assert_eq!(get_latest_version(&versions).unwrap(), "10");
        assert!(get_latest_version(&[]).is_err());
        assert!(get_latest_version(&["latest".to_string()]).is_err());
    }
}
