use crate::auth::Authenticator;
use crate::config::Config;
use crate::print::Printer;
use crate::services::ClientFactory;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a command handler needs from the outside world, passed down the tree.
#[derive(Clone)]
pub struct CmdParams {
    pub printer: Arc<Printer>,
    pub cli_version: String,
    pub authenticator: Arc<dyn Authenticator>,
    pub clients: Arc<dyn ClientFactory>,
    pub config: Config,
    pub config_path: PathBuf,
    pub cancel: CancellationToken,
}
