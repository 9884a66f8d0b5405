//! Command sequencing with exit status propagation
//!
//! The remote shell does not reliably report the exit status of a
//! multi-statement script, so the user command is always followed by a guard
//! that re-raises a non-zero `$?` with an explicit `exit`.

use std::sync::LazyLock;

/// Shell variable holding the user command's exit status
pub const EXIT_CODE_VAR: &str = "SSHRUN_PREV_COMMAND_EXIT_CODE";

static STATUS_GUARD: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{EXIT_CODE_VAR}=$? ; if [ ${EXIT_CODE_VAR} -ne 0 ]; then exit ${EXIT_CODE_VAR}; fi;"
    )
});

/// The statement appended after every user command
#[must_use]
pub fn status_guard() -> &'static str {
    &STATUS_GUARD
}

/// Pair the user command with the status guard
#[must_use]
pub fn command_sequence(command: &str) -> [String; 2] {
    [command.to_string(), status_guard().to_string()]
}
