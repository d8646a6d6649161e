/// Errors raised by the geometry and matrix builders
use thiserror::Error;

/// Failure of a precondition or of the input geometry.
///
/// Every builder in this crate is a pure function, so these errors are never
/// transient: retrying with the same input fails the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A numeric argument is outside its valid range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The curve cannot produce a well-defined frame at `index`
    #[error("degenerate geometry at point {index}: {reason}")]
    DegenerateGeometry { index: usize, reason: &'static str },
}

impl GeometryError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn degenerate(index: usize, reason: &'static str) -> Self {
        Self::DegenerateGeometry { index, reason }
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Fail with `InvalidParameter` unless `condition` holds.
///
/// A NaN fails `x > 0.0` but slips through `!(x <= 0.0)`; infinities pass
/// both, so range checks go together with [`require_finite`].
pub(crate) fn require(condition: bool, name: &'static str, reason: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(GeometryError::invalid(name, reason))
    }
}

/// Fail with `InvalidParameter` if any of `values` is NaN or infinite
pub(crate) fn require_finite(name: &'static str, values: &[f32]) -> Result<()> {
    require(
        values.iter().all(|v| v.is_finite()),
        name,
        &format!("{} must be finite", name),
    )
}
