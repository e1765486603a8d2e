pub mod branches;
pub mod init;
pub mod session;
pub mod sync;

use crate::config::WorkspaceConfig;

/// Everything a command needs to resolve config for one workspace.
pub struct Context {
    pub config: WorkspaceConfig,
}
