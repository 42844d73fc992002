pub mod actions;
pub mod macros;
pub mod os;
pub mod sequences;
pub mod session;

pub use actions::{ActionError, ActionRouter};
pub use macros::{MacroError, MacroProcess, MacroProcessManager, MacroSupervisor};
pub use os::OsMacroSupervisor;
pub use session::{SessionError, SessionStore};
