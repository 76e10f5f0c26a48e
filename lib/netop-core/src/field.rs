//! Field-path diagnostics for admission failures

use std::fmt;
use thiserror::Error;

/// Path to a field inside an object, rendered as `spec.ipPools[0].name`
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(root: &str) -> Self {
        Self(root.to_string())
    }

    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single constraint violation
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    #[error("{path}: Required value: {detail}")]
    Required { path: FieldPath, detail: String },

    #[error("{path}: Invalid value: {value}: {detail}")]
    Invalid {
        path: FieldPath,
        value: String,
        detail: String,
    },

    #[error("{path}: Forbidden: {detail}")]
    Forbidden { path: FieldPath, detail: String },

    #[error("{path}: Duplicate value: {value}")]
    Duplicate { path: FieldPath, value: String },

    #[error("{path}: Unsupported value: {value}: supported values: {supported}")]
    NotSupported {
        path: FieldPath,
        value: String,
        supported: String,
    },
}

impl FieldError {
    pub fn required(path: FieldPath, detail: impl Into<String>) -> Self {
        FieldError::Required {
            path,
            detail: detail.into(),
        }
    }

    pub fn invalid(path: FieldPath, value: impl fmt::Display, detail: impl Into<String>) -> Self {
        FieldError::Invalid {
            path,
            value: value.to_string(),
            detail: detail.into(),
        }
    }

    pub fn forbidden(path: FieldPath, detail: impl Into<String>) -> Self {
        FieldError::Forbidden {
            path,
            detail: detail.into(),
        }
    }

    pub fn duplicate(path: FieldPath, value: impl fmt::Display) -> Self {
        FieldError::Duplicate {
            path,
            value: value.to_string(),
        }
    }

    pub fn not_supported(path: FieldPath, value: impl fmt::Display, supported: &[&str]) -> Self {
        FieldError::NotSupported {
            path,
            value: value.to_string(),
            supported: supported
                .iter()
                .map(|s| format!("\"{}\"", s))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            FieldError::Required { path, .. }
            | FieldError::Invalid { path, .. }
            | FieldError::Forbidden { path, .. }
            | FieldError::Duplicate { path, .. }
            | FieldError::NotSupported { path, .. } => path,
        }
    }
}

/// Every violation found in one object
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no errors"),
            [single] => write!(f, "{}", single),
            many => {
                f.write_str("[")?;
                for (i, error) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", error)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_rendering() {
        let path = FieldPath::new("status")
            .child("defaultPortConfig")
            .child("vlan")
            .child("trunkRange")
            .index(0)
            .child("end");
        assert_eq!(path.as_str(), "status.defaultPortConfig.vlan.trunkRange[0].end");
        assert_eq!(FieldPath::default().child("spec").as_str(), "spec");
    }

    #[test]
    fn test_field_error_messages() {
        let err = FieldError::invalid(FieldPath::new("spec").child("gateway"), "x", "not an IP address");
        assert_eq!(err.to_string(), "spec.gateway: Invalid value: x: not an IP address");

        let err = FieldError::not_supported(FieldPath::new("spec").child("mode"), "static", &["dhcp", "none"]);
        assert_eq!(
            err.to_string(),
            "spec.mode: Unsupported value: static: supported values: \"dhcp\", \"none\""
        );
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push(FieldError::required(FieldPath::new("spec").child("portGroupID"), "must be set"));
        assert_eq!(errors.to_string(), "spec.portGroupID: Required value: must be set");

        errors.push(FieldError::duplicate(FieldPath::new("status").child("conditions").index(1), "IPPoolInvalid"));
        assert_eq!(
            errors.to_string(),
            "[spec.portGroupID: Required value: must be set, status.conditions[1]: Duplicate value: IPPoolInvalid]"
        );
        assert_eq!(errors.into_result().unwrap_err().len(), 2);
    }
}
