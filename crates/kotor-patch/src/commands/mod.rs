mod install;
mod plan;
mod uninstall;

pub use install::*;
pub use plan::*;
pub use uninstall::*;
