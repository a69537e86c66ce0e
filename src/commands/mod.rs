mod convert_command;
pub use convert_command::*;

mod identify_command;
pub use identify_command::*;

mod session_command;
pub use session_command::*;
