use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ScanResult<T> = Result<T, ScanError>;
pub type ParserResult<T> = ScanResult<T>;
pub type SweepResult<T> = ScanResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl ScanErrorCategory {
    pub const fn exit_status(self) -> ExitStatus {
        match self {
            Self::InputValidationError => ExitStatus {
                exit_code: 2,
                rust_category: "InputValidationError",
                severity_class: "INPUT_FATAL",
            },
            Self::IoSystemError => ExitStatus {
                exit_code: 3,
                rust_category: "IoSystemError",
                severity_class: "IO_FATAL",
            },
            Self::ComputationError => ExitStatus {
                exit_code: 4,
                rust_category: "ComputationError",
                severity_class: "RUN_FATAL",
            },
            Self::InternalError => ExitStatus {
                exit_code: 5,
                rust_category: "InternalError",
                severity_class: "SYS_FATAL",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_status().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_status().rust_category
    }

    pub const fn severity_class(self) -> &'static str {
        self.exit_status().severity_class
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub exit_code: i32,
    pub rust_category: &'static str,
    pub severity_class: &'static str,
}

/// What went wrong, independent of how the failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanErrorKind {
    /// Too few samples or too few matching sweep rows.
    InsufficientData,
    /// A record that had to carry resonances carried none.
    NoResonanceFound,
    /// A feature with non-positive bandwidth or broken crossing order.
    InvalidFeature,
    /// The designated baseline record is absent from the sweep slice.
    BaselineNotFound,
    /// Sensitivity evaluated at zero parameter delta.
    UndefinedSensitivity,
    /// A non-axis parameter varies and was not pinned by the caller.
    UnresolvedControl,
    Parse,
    Config,
    Io,
    Internal,
}

impl ScanErrorKind {
    pub const fn category(self) -> ScanErrorCategory {
        match self {
            Self::InsufficientData
            | Self::UnresolvedControl
            | Self::BaselineNotFound
            | Self::Parse
            | Self::Config => ScanErrorCategory::InputValidationError,
            Self::NoResonanceFound | Self::InvalidFeature | Self::UndefinedSensitivity => {
                ScanErrorCategory::ComputationError
            }
            Self::Io => ScanErrorCategory::IoSystemError,
            Self::Internal => ScanErrorCategory::InternalError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    kind: ScanErrorKind,
    placeholder: &'static str,
    message: String,
}

impl ScanError {
    pub fn new(kind: ScanErrorKind, placeholder: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            placeholder,
            message: message.into(),
        }
    }

    pub fn insufficient_data(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::InsufficientData, placeholder, message)
    }

    pub fn no_resonance(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::NoResonanceFound, placeholder, message)
    }

    pub fn invalid_feature(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::InvalidFeature, placeholder, message)
    }

    pub fn baseline_not_found(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::BaselineNotFound, placeholder, message)
    }

    pub fn unresolved_control(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::UnresolvedControl, placeholder, message)
    }

    pub fn parse(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Parse, placeholder, message)
    }

    pub fn config(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Config, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Io, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Internal, placeholder, message)
    }

    pub const fn kind(&self) -> ScanErrorKind {
        self.kind
    }

    pub const fn category(&self) -> ScanErrorCategory {
        self.kind.category()
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category().rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for ScanError {}

#[cfg(test)]
mod tests {
    use super::{ScanError, ScanErrorCategory, ScanErrorKind};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (
                ScanErrorCategory::InputValidationError,
                2,
                "InputValidationError",
                "INPUT_FATAL",
            ),
            (
                ScanErrorCategory::IoSystemError,
                3,
                "IoSystemError",
                "IO_FATAL",
            ),
            (
                ScanErrorCategory::ComputationError,
                4,
                "ComputationError",
                "RUN_FATAL",
            ),
            (
                ScanErrorCategory::InternalError,
                5,
                "InternalError",
                "SYS_FATAL",
            ),
        ];

        for (category, exit_code, rust_category, severity_class) in cases {
            let status = category.exit_status();
            assert_eq!(status.exit_code, exit_code);
            assert_eq!(status.rust_category, rust_category);
            assert_eq!(status.severity_class, severity_class);
        }
    }

    #[test]
    fn sweep_structure_failures_are_input_errors() {
        let error = ScanError::baseline_not_found(
            "SWEEP.BASELINE_NOT_FOUND",
            "no record with er = 1 in the sweep slice",
        );

        assert_eq!(error.kind(), ScanErrorKind::BaselineNotFound);
        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [SWEEP.BASELINE_NOT_FOUND] no record with er = 1 in the sweep slice"
        );
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 2");
    }

    #[test]
    fn numeric_failures_map_to_computation_category() {
        let error = ScanError::no_resonance("SWEEP.BASELINE_NO_RESONANCE", "empty baseline");
        assert_eq!(error.category(), ScanErrorCategory::ComputationError);
        assert_eq!(error.exit_code(), 4);
        assert_eq!(
            error.to_string(),
            "ComputationError [SWEEP.BASELINE_NO_RESONANCE] empty baseline"
        );
    }

    #[test]
    fn internal_errors_keep_their_own_category() {
        let error = ScanError::internal("SYS.WORKER", "worker pool failed");
        assert_eq!(error.category(), ScanErrorCategory::InternalError);
        assert_eq!(error.exit_code(), 5);
    }
}
