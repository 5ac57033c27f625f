use super::globalflags;
use clap::Command;

pub const VERSION_INFO: &str = env!("STACKIT_BUILD_VERSION");

/// The bare `stackit` command carrying the global flags.
pub fn root_command() -> Command {
    let cmd = Command::new("stackit")
        .about("Manage STACKIT cloud services")
        .long_about(
            "Manage STACKIT cloud services.\n\
             Use \"stackit <command> --help\" for more information about a command.",
        )
        .version(VERSION_INFO);
    globalflags::configure(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_flag_stays_on_the_root() {
        let m = root_command()
            .subcommand(Command::new("create").arg(crate::flags::string("version", "Version")))
            .try_get_matches_from(["stackit", "create", "--version", "16"])
            .unwrap();
        let (_, sub) = m.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("version").map(String::as_str), Some("16"));
    }
}
