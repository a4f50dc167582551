use crate::cli::Command;
use crate::core::types::OutputFormat;
use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// An operator running a command from a terminal.
    Interactive,
    /// Output is meant for another program; the console must stay clean.
    Quiet,
}

impl ExecutionContext {
    /// Returns `true` when console sinks should be disabled.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Quiet)
    }
}

/// Derive the active execution context from a parsed CLI command plus overrides.
pub fn detect_context(command: &Command) -> ExecutionContext {
    if quiet_override_enabled() {
        return ExecutionContext::Quiet;
    }

    match command {
        Command::Profiles(args) if args.format == OutputFormat::Json => ExecutionContext::Quiet,
        Command::Apply(_) | Command::Profiles(_) => ExecutionContext::Interactive,
    }
}

fn quiet_override_enabled() -> bool {
    env::var("CTM_PROMOTE_QUIET")
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}
