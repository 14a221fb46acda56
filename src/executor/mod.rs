mod executor;
mod default_executor;
mod builtins;
mod job;
mod path_resolver;

pub use executor::{Executor, ExecError, ExecStatus, PipelineStatus, StageStatus};
pub use default_executor::DefaultExecutor;
pub use builtins::{BuiltinCommand, BuiltinError, BuiltinManager, BuiltinStatus};
pub use job::{Job, JobNotice, JobTable};
pub use path_resolver::PathResolver;
