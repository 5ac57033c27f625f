use clap::Command;

/// A usage example shown in a command's help.
pub struct Example {
    pub description: String,
    pub command: String,
}

impl Example {
    pub fn new(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: command.into(),
        }
    }
}

pub fn build(examples: &[Example]) -> String {
    examples
        .iter()
        .map(|e| format!("  {}\n    {}", e.description, e.command))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Appends an `Examples:` section to the help of `cmd`.
pub fn with_examples(cmd: Command, examples: &[Example]) -> Command {
    if examples.is_empty() {
        return cmd;
    }
    cmd.after_help(format!("Examples:\n{}", build(examples)))
}
