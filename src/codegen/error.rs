use thiserror::Error;

/// Why a run stopped. Every variant is fatal: the run produces no files.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    /// A type has no spelling on the target.
    #[error("{backend}: type `{ty}` has no mapping on this target")]
    UnmappedType { backend: &'static str, ty: String },

    /// A built-in operation has no lowering on the target.
    #[error("{backend}: built-in `{builtin}` is not supported on this target")]
    UnmappedBuiltin {
        backend: &'static str,
        builtin: &'static str,
    },

    /// A whole language feature has no representation on the target.
    #[error("{backend}: {feature}")]
    Unsupported {
        backend: &'static str,
        feature: String,
    },

    #[error("unknown target `{0}` (expected one of: {})", super::TARGETS.join(", "))]
    UnknownTarget(String),
}

pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_type_message_names_type() {
        let e = GenError::UnmappedType {
            backend: "as",
            ty: "long".into(),
        };
        assert_eq!(e.to_string(), "as: type `long` has no mapping on this target");
    }

    #[test]
    fn test_unmapped_builtin_message_names_builtin() {
        let e = GenError::UnmappedBuiltin {
            backend: "cl",
            builtin: "string.Substring",
        };
        assert!(e.to_string().contains("string.Substring"));
    }

    #[test]
    fn test_unknown_target_lists_targets() {
        let e = GenError::UnknownTarget("java".into());
        let msg = e.to_string();
        assert!(msg.contains("java"));
        assert!(msg.contains("cl"));
    }
}
