//! Final pass/fail reporting for a test run.

use core::fmt;

/// Overall result of a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestStatus {
    /// Every step passed.
    Complete,
    /// At least one step failed.
    Failed,
}

impl TestStatus {
    /// Process exit code: 0 on success, 1 on failure.
    #[inline]
    pub const fn exit_code(self) -> u8 {
        match self {
            TestStatus::Complete => 0,
            TestStatus::Failed => 1,
        }
    }

    /// Whether the run passed.
    #[inline]
    pub const fn passed(self) -> bool {
        matches!(self, TestStatus::Complete)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Complete => write!(f, "Test Complete"),
            TestStatus::Failed => write!(f, "Test Failed"),
        }
    }
}

/// Close a test run, logging the outcome.
pub fn test_complete(failed: bool) -> TestStatus {
    if failed {
        error!("Test Failed");
        TestStatus::Failed
    } else {
        info!("Test Complete");
        TestStatus::Complete
    }
}

#[cfg(feature = "std")]
impl From<TestStatus> for std::process::ExitCode {
    fn from(status: TestStatus) -> Self {
        std::process::ExitCode::from(status.exit_code())
    }
}
