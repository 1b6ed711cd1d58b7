//! Host facts and external process plumbing.
//!
//! - [`arch`] - map the host CPU to the architecture names used in artifact names
//! - [`process`] - run installer and script commands, fail on non-zero exit

pub mod arch;
pub mod process;

pub use arch::current_arch;
pub use process::{CommandRunner, ProcessError, ShellRunner};
