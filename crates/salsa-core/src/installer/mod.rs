//! Mod installation.
//!
//! [`ModInstaller`] is the error boundary of the pipeline: collaborators
//! return errors, the installer turns every one of them into an
//! [`InstallResult`].

mod mod_installer;
mod result;

pub use mod_installer::{ModInstaller, PhaseListener};
pub use result::{InstallOptions, InstallPhase, InstallResult};
