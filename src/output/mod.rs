pub mod format;
pub mod table;
pub mod yaml;

pub use table::Table;

use crate::cli::error::CliError;
use crate::print::Printer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Nothing selected; the command's own representation.
    #[default]
    #[serde(rename = "")]
    Default,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "yaml")]
    Yaml,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "none")]
    None,
}

impl OutputFormat {
    pub const VALUES: [&'static str; 4] = ["json", "yaml", "pretty", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Default => "",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Pretty => "pretty",
            OutputFormat::None => "none",
        }
    }

    pub fn is_machine_readable(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" => Ok(OutputFormat::Default),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "pretty" => Ok(OutputFormat::Pretty),
            "none" => Ok(OutputFormat::None),
            other => Err(format!(
                "unknown output format {:?}, must be one of {:?}",
                other,
                OutputFormat::VALUES
            )),
        }
    }
}

/// Renders `payload` on stdout in the selected format.
///
/// JSON and YAML serialise the payload itself; the default and pretty formats
/// delegate to `render_default`; `none` prints nothing.
pub fn output_result<T, F>(
    p: &Printer,
    format: OutputFormat,
    payload: &T,
    render_default: F,
) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> Result<(), CliError>,
{
    match format {
        OutputFormat::Json => {
            let details = serde_json::to_string_pretty(payload)
                .map_err(|e| anyhow::anyhow!("marshal output to JSON: {}", e))?;
            p.outputln(&details);
            Ok(())
        }
        OutputFormat::Yaml => {
            let details = yaml::to_string(payload)
                .map_err(|e| anyhow::anyhow!("marshal output to YAML: {}", e))?;
            p.outputln(details.trim_end());
            Ok(())
        }
        OutputFormat::Pretty | OutputFormat::Default => render_default(),
        OutputFormat::None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::buffered_printer;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Instance {
        instance_id: String,
        acl: Vec<String>,
    }

    #[test]
    fn empty_list_renders_as_json_array() {
        let (p, out, err) = buffered_printer("");
        let items: Vec<Instance> = Vec::new();
        output_result(&p, OutputFormat::Json, &items, || unreachable!()).unwrap();
        assert_eq!(out.contents(), "[]\n");
        assert_eq!(err.contents(), "");
    }

    #[test]
    fn json_is_indented_with_upstream_keys() {
        let (p, out, _) = buffered_printer("");
        let item = Instance {
            instance_id: "x".into(),
            acl: vec!["1.2.3.0/24".into()],
        };
        output_result(&p, OutputFormat::Json, &item, || unreachable!()).unwrap();
        assert_eq!(
            out.contents(),
            "{\n  \"instanceId\": \"x\",\n  \"acl\": [\n    \"1.2.3.0/24\"\n  ]\n}\n"
        );
    }

    #[test]
    fn yaml_has_single_trailing_newline() {
        let (p, out, _) = buffered_printer("");
        let item = Instance {
            instance_id: "x".into(),
            acl: vec!["1.2.3.0/24".into()],
        };
        output_result(&p, OutputFormat::Yaml, &item, || unreachable!()).unwrap();
        assert_eq!(out.contents(), "instanceId: x\nacl:\n  - 1.2.3.0/24\n");
    }

    #[test]
    fn default_and_pretty_delegate_and_none_suppresses() {
        for format in [OutputFormat::Default, OutputFormat::Pretty] {
            let (p, out, _) = buffered_printer("");
            output_result(&p, format, &(), || {
                p.outputln("table");
                Ok(())
            })
            .unwrap();
            assert_eq!(out.contents(), "table\n");
        }

        let (p, out, _) = buffered_printer("");
        output_result(&p, OutputFormat::None, &vec![1, 2], || unreachable!()).unwrap();
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn parses_formats() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("".parse::<OutputFormat>(), Ok(OutputFormat::Default));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
