use super::error::CliError;
use super::params::CmdParams;
use clap::{ArgMatches, Command};
use futures::future::LocalBoxFuture;

pub type HandlerFuture<'a> = LocalBoxFuture<'a, Result<(), CliError>>;

/// Entry point of a leaf command.
pub type Handler = for<'a> fn(&'a CmdParams, &'a ArgMatches) -> HandlerFuture<'a>;

/// A node of the command tree: a group delegating to children, or a leaf with a handler.
pub struct CommandNode {
    command: Command,
    handler: Option<Handler>,
    children: Vec<CommandNode>,
}

impl CommandNode {
    pub fn group(command: Command) -> Self {
        Self {
            command,
            handler: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(command: Command, handler: Handler) -> Self {
        Self {
            command,
            handler: Some(handler),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: CommandNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    pub fn handler(&self) -> Option<Handler> {
        self.handler
    }

    /// The clap command for this node and everything below it.
    pub fn build(&self) -> Command {
        self.children
            .iter()
            .fold(self.command.clone(), |cmd, child| cmd.subcommand(child.build()))
    }

    /// Follows the matched subcommands down to the deepest node.
    ///
    /// Returns the names along the way (excluding this node), the node itself
    /// and its matches.
    pub fn resolve<'n, 'm>(
        &'n self,
        matches: &'m ArgMatches,
    ) -> (Vec<&'n str>, &'n CommandNode, &'m ArgMatches) {
        let mut path = Vec::new();
        let mut node = self;
        let mut current = matches;
        while let Some((name, sub)) = current.subcommand() {
            match node.children.iter().find(|c| c.name() == name) {
                Some(child) => {
                    path.push(child.name());
                    node = child;
                    current = sub;
                }
                None => break,
            }
        }
        (path, node, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn noop<'a>(_: &'a CmdParams, _: &'a ArgMatches) -> HandlerFuture<'a> {
        async { Ok(()) }.boxed_local()
    }

    fn tree() -> CommandNode {
        CommandNode::group(Command::new("stackit")).child(
            CommandNode::group(Command::new("postgresflex"))
                .child(CommandNode::group(Command::new("instance")).child(CommandNode::leaf(
                    Command::new("list"),
                    noop,
                ))),
        )
    }

    #[test]
    fn resolves_leaf_and_group() {
        let root = tree();
        let m = root
            .build()
            .try_get_matches_from(["stackit", "postgresflex", "instance", "list"])
            .unwrap();
        let (path, node, _) = root.resolve(&m);
        assert_eq!(path, vec!["postgresflex", "instance", "list"]);
        assert!(node.handler().is_some());

        let m = root
            .build()
            .try_get_matches_from(["stackit", "postgresflex"])
            .unwrap();
        let (path, node, _) = root.resolve(&m);
        assert_eq!(path, vec!["postgresflex"]);
        assert!(node.handler().is_none());
    }
}
