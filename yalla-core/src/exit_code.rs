//! Standard exit codes for the command surface (C11, §4.11).
//!
//! Codes 64-78 mirror the POSIX `sysexits.h` family; everything above that
//! is a domain-specific addition this framework needs (locking, async
//! timeouts, cancellation, ...).

/// Exit code returned by `Command::execute` and surfaced by the CLI/REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    Success,
    Generic,
    Usage,
    DataErr,
    NoInput,
    NoUser,
    NoHost,
    Unavailable,
    Software,
    OsErr,
    OsFile,
    CantCreate,
    IoErr,
    TempFail,
    Protocol,
    NoPerm,
    Config,
    Locked,
    Timeout,
    Cancelled,
    Validation,
    MissingDependency,
    NotFound,
    Conflict,
    Rollback,
    Partial,
    Interrupted,
    Terminated,
    Custom(i32),
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Generic => 1,
            ExitCode::Usage => 2,
            ExitCode::DataErr => 65,
            ExitCode::NoInput => 66,
            ExitCode::NoUser => 67,
            ExitCode::NoHost => 68,
            ExitCode::Unavailable => 69,
            ExitCode::Software => 70,
            ExitCode::OsErr => 71,
            ExitCode::OsFile => 72,
            ExitCode::CantCreate => 73,
            ExitCode::IoErr => 74,
            ExitCode::TempFail => 75,
            ExitCode::Protocol => 76,
            ExitCode::NoPerm => 77,
            ExitCode::Config => 78,
            ExitCode::Locked => 79,
            ExitCode::Timeout => 80,
            ExitCode::Cancelled => 81,
            ExitCode::Validation => 82,
            ExitCode::MissingDependency => 83,
            ExitCode::NotFound => 84,
            ExitCode::Conflict => 85,
            ExitCode::Rollback => 86,
            ExitCode::Partial => 87,
            ExitCode::Interrupted => 130,
            ExitCode::Terminated => 143,
            ExitCode::Custom(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self.code() == 0
    }
}

impl From<ExitCode> for i32 {
    fn from(value: ExitCode) -> Self {
        value.code()
    }
}

/// Maps common standard error conditions onto an [`ExitCode`], the "mapping
/// for common standard exceptions" required by §4.11.
pub fn exit_code_for_io_error(err: &std::io::Error) -> ExitCode {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::NotFound => ExitCode::NotFound,
        ErrorKind::PermissionDenied => ExitCode::NoPerm,
        ErrorKind::AlreadyExists => ExitCode::Conflict,
        ErrorKind::TimedOut => ExitCode::Timeout,
        ErrorKind::InvalidInput | ErrorKind::InvalidData => ExitCode::DataErr,
        _ => ExitCode::IoErr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysexits_values_match_the_posix_family() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Generic.code(), 1);
        assert_eq!(ExitCode::Usage.code(), 2);
        assert_eq!(ExitCode::Usage.code(), 2);
        assert_eq!(ExitCode::DataErr.code(), 65);
        assert_eq!(ExitCode::Config.code(), 78);
    }

    #[test]
    fn domain_codes_extend_past_sysexits() {
        assert_eq!(ExitCode::Locked.code(), 79);
        assert_eq!(ExitCode::Partial.code(), 87);
        assert_eq!(ExitCode::Interrupted.code(), 130);
        assert_eq!(ExitCode::Terminated.code(), 143);
    }

    #[test]
    fn io_error_mapping_covers_common_kinds() {
        let err = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(exit_code_for_io_error(&err), ExitCode::NotFound);
    }
}
