use std::fmt;

/// Why a comparison did not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MismatchReason {
    /// The HTML differs; no more specific reason applies.
    #[default]
    None,
    /// The selector did not match any element.
    ElementNotFound,
    /// The selector matched more than one element while only one was allowed.
    MultipleElementsFound,
}

/// The outcome of a comparison done by an [`HtmlComparer`](crate::HtmlComparer).
///
/// A mismatch is an ordinary value, not an error. The `expected`/`actual` strings are carried
/// for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HtmlCompareResult {
    Match,
    /// `expected` and `actual` are unset for [`MismatchReason::ElementNotFound`] and
    /// [`MismatchReason::MultipleElementsFound`].
    Mismatch {
        expected: Option<String>,
        actual: Option<String>,
        reason: MismatchReason,
    },
}

impl HtmlCompareResult {
    /// A plain mismatch carrying both sides.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Mismatch {
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            reason: MismatchReason::None,
        }
    }

    pub fn element_not_found() -> Self {
        Self::Mismatch {
            expected: None,
            actual: None,
            reason: MismatchReason::ElementNotFound,
        }
    }

    pub fn multiple_elements_found() -> Self {
        Self::Mismatch {
            expected: None,
            actual: None,
            reason: MismatchReason::MultipleElementsFound,
        }
    }

    /// Whether the comparison found the HTML equal.
    pub fn matches(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// The mismatch reason, `None` for a match.
    pub fn reason(&self) -> Option<MismatchReason> {
        match self {
            Self::Match => None,
            Self::Mismatch { reason, .. } => Some(*reason),
        }
    }

    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::Match => None,
            Self::Mismatch { expected, .. } => expected.as_deref(),
        }
    }

    pub fn actual(&self) -> Option<&str> {
        match self {
            Self::Match => None,
            Self::Mismatch { actual, .. } => actual.as_deref(),
        }
    }
}

impl fmt::Display for HtmlCompareResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "HTML matches"),
            Self::Mismatch {
                reason: MismatchReason::ElementNotFound,
                ..
            } => write!(f, "No element matched the selector"),
            Self::Mismatch {
                reason: MismatchReason::MultipleElementsFound,
                ..
            } => write!(f, "More than one element matched the selector"),
            Self::Mismatch {
                expected, actual, ..
            } => write!(
                f,
                "HTML mismatch. Expected: {}, Actual: {}",
                expected.as_deref().unwrap_or("(empty)"),
                actual.as_deref().unwrap_or("(empty)")
            ),
        }
    }
}
