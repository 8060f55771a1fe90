/// Core error types for the Writing3D runtime.
use crate::types::FeatureKind;

/// A specialized Result type for Writing3D operations.
pub type W3dResult<T> = Result<T, W3dError>;

/// Top-level error type encompassing all Writing3D subsystems.
#[derive(Debug, thiserror::Error)]
pub enum W3dError {
    #[error("unknown {kind} '{name}'")]
    UnknownReference { kind: FeatureKind, name: String },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: FeatureKind, name: String },

    #[error("group '{0}' is empty but its members are required")]
    EmptyGroup(String),

    #[error("placement cycle through '{0}'")]
    PlacementCycle(String),

    #[error("group '{0}' contains itself")]
    GroupCycle(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("project failed validation with {} error(s)", .0.len())]
    Validation(Vec<W3dError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl W3dError {
    /// Create an unknown-reference error.
    pub fn unknown(kind: FeatureKind, name: impl Into<String>) -> Self {
        W3dError::UnknownReference {
            kind,
            name: name.into(),
        }
    }

    /// Create a duplicate-name error.
    pub fn duplicate(kind: FeatureKind, name: impl Into<String>) -> Self {
        W3dError::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Flatten a validation error into its individual problems.
    pub fn into_problems(self) -> Vec<W3dError> {
        match self {
            W3dError::Validation(errors) => errors,
            other => vec![other],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_display() {
        let err = W3dError::unknown(FeatureKind::Timeline, "intro");
        assert_eq!(err.to_string(), "unknown timeline 'intro'");
    }

    #[test]
    fn test_validation_display_counts_problems() {
        let err = W3dError::Validation(vec![
            W3dError::EmptyGroup("balls".into()),
            W3dError::PlacementCycle("cube".into()),
        ]);
        assert_eq!(err.to_string(), "project failed validation with 2 error(s)");
        assert_eq!(err.into_problems().len(), 2);
    }

    #[test]
    fn test_into_problems_wraps_single_error() {
        let err = W3dError::GroupCycle("g".into());
        let problems = err.into_problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].to_string().contains("contains itself"));
    }
}
