//! # Verdicts and Exit Status
//!
//! Each checked product ends in one [`Verdict`]. Verdicts from all products
//! of one invocation are reduced to the highest [`Severity`] seen, which in
//! turn selects the process [`ExitStatus`].
//!
//! | Verdict               | Severity  | Exit status |
//! |-----------------------|-----------|-------------|
//! | `Ok`                  | `Ok`      | 0           |
//! | `HasWarningsOnly`     | `Warning` | 3           |
//! | `HasErrors`           | `Error`   | 2           |
//! | `StructuralFailure`   | `Error`   | 2           |
//!
//! Exit status 1 is reserved for an interrupted run and never results from
//! a verdict.

/// Per-product outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Every check passed and every file is accounted for.
    Ok,
    /// The product root or its MPH is missing, or the MPH is not XML.
    StructuralFailure,
    /// At least one error finding.
    HasErrors,
    /// No errors, but at least one file is not listed in the MPH.
    HasWarningsOnly,
}

impl Verdict {
    /// Classify a completed check from its finding counts.
    pub fn from_counts(errors: usize, warnings: usize) -> Self {
        if errors > 0 {
            Self::HasErrors
        } else if warnings > 0 {
            Self::HasWarningsOnly
        } else {
            Self::Ok
        }
    }

    /// Exit-significant severity of this verdict.
    pub fn severity(self) -> Severity {
        match self {
            Self::Ok => Severity::Ok,
            Self::HasWarningsOnly => Severity::Warning,
            Self::HasErrors | Self::StructuralFailure => Severity::Error,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::StructuralFailure => "STRUCTURAL_FAILURE",
            Self::HasErrors => "HAS_ERRORS",
            Self::HasWarningsOnly => "HAS_WARNINGS_ONLY",
        })
    }
}

/// Totally ordered severity: `Ok < Warning < Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Error,
}

impl Severity {
    /// The exit status a run with this overall severity ends with.
    pub fn exit_status(self) -> ExitStatus {
        match self {
            Self::Ok => ExitStatus::Success,
            Self::Warning => ExitStatus::Warnings,
            Self::Error => ExitStatus::Failed,
        }
    }
}

/// Process exit status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitStatus {
    /// All products OK.
    Success = 0,
    /// The run was interrupted.
    Interrupted = 1,
    /// At least one structural failure or error.
    Failed = 2,
    /// Warnings but no errors.
    Warnings = 3,
}

impl ExitStatus {
    /// Numeric process exit code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Running maximum over the verdicts of one invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    worst: Severity,
    products: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one product's verdict.
    pub fn record(&mut self, verdict: Verdict) {
        self.worst = self.worst.max(verdict.severity());
        self.products += 1;
    }

    /// Highest severity recorded so far.
    pub fn severity(&self) -> Severity {
        self.worst
    }

    /// Number of verdicts recorded.
    pub fn products(&self) -> usize {
        self.products
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.worst.exit_status()
    }
}

/// Highest severity across `verdicts`; `Ok` for none.
pub fn aggregate<I>(verdicts: I) -> Severity
where
    I: IntoIterator<Item = Verdict>,
{
    verdicts
        .into_iter()
        .map(Verdict::severity)
        .max()
        .unwrap_or_default()
}
