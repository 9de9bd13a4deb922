//! Unified error type for the f3kdb-core public API.
//!
//! All configuration problems are detected once, in [`Core::new`], and
//! reported through [`DebandError`]. Plane processing only fails when the
//! caller hands over buffers that cannot hold the plane it asked for.
//!
//! [`Core::new`]: crate::Core::new

use thiserror::Error;

/// Numeric error codes, compatible with the classic C interface numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    InvalidArgument = 3,
    InvalidState = 4,
}

/// Error type for core construction and plane processing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DebandError {
    /// A numeric parameter is outside its accepted bounds.
    #[error("Invalid parameter {name}, must be between {min} and {max} (got {value})")]
    OutOfRange {
        name: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    /// A floating-point parameter is not a number inside its bounds.
    #[error("Invalid parameter {name}, must be between {min} and {max} (got {value})")]
    OutOfRangeFloat {
        name: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    /// A video geometry/format condition does not hold.
    #[error("Invalid parameter condition: {0}")]
    InvalidVideoInfo(&'static str),

    /// Integer value does not name a variant of the target enum.
    #[error("Invalid value {value} for {name}")]
    InvalidEnum { name: &'static str, value: i32 },

    /// Internally inconsistent pixel layout / depth / dither combination.
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    /// A plane buffer or pitch cannot hold the requested plane.
    #[error("{buffer} buffer too small: pitch {pitch}, row {row_bytes}, len {len}, need {needed}")]
    BufferTooSmall {
        buffer: &'static str,
        pitch: usize,
        row_bytes: usize,
        len: usize,
        needed: usize,
    },
}

impl DebandError {
    /// Error code for hosts that report integers.
    pub fn code(&self) -> ErrorCode {
        match self {
            DebandError::InvalidState(_) => ErrorCode::InvalidState,
            DebandError::OutOfRange { .. }
            | DebandError::OutOfRangeFloat { .. }
            | DebandError::InvalidVideoInfo(_)
            | DebandError::InvalidEnum { .. }
            | DebandError::BufferTooSmall { .. } => ErrorCode::InvalidArgument,
        }
    }

    /// NaN and infinities fail as well.
    pub(crate) fn check_float_range(
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), DebandError> {
        if !(min..=max).contains(&value) {
            return Err(DebandError::OutOfRangeFloat {
                name,
                min,
                max,
                value,
            });
        }
        Ok(())
    }

    pub(crate) fn check_range(
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    ) -> Result<(), DebandError> {
        if value < min || value > max {
            return Err(DebandError::OutOfRange {
                name,
                min,
                max,
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let error = DebandError::OutOfRange {
            name: "range",
            min: 0,
            max: 31,
            value: 40,
        };
        assert_eq!(
            error.to_string(),
            "Invalid parameter range, must be between 0 and 31 (got 40)"
        );
        assert_eq!(error.code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_video_info_message() {
        let error = DebandError::InvalidVideoInfo("width < 16");
        assert_eq!(error.to_string(), "Invalid parameter condition: width < 16");
        assert_eq!(error.code() as i32, 3);
    }

    #[test]
    fn test_state_code() {
        let error =
            DebandError::InvalidState("output_mode = 0 is only valid when output_depth = 8");
        assert_eq!(error.code() as i32, 4);
    }

    #[test]
    fn test_check_range_bounds_inclusive() {
        assert!(DebandError::check_range("Y", 0, 0, 511).is_ok());
        assert!(DebandError::check_range("Y", 511, 0, 511).is_ok());
        assert!(DebandError::check_range("Y", 512, 0, 511).is_err());
        assert!(DebandError::check_range("Y", -1, 0, 511).is_err());
    }

    #[test]
    fn test_check_float_range_rejects_non_finite() {
        assert!(DebandError::check_float_range("sigma", 0.0, 0.0, 16.0).is_ok());
        assert!(DebandError::check_float_range("sigma", 16.0, 0.0, 16.0).is_ok());
        assert!(DebandError::check_float_range("sigma", f64::NAN, 0.0, 16.0).is_err());
        assert!(DebandError::check_float_range("sigma", f64::INFINITY, 0.0, 16.0).is_err());
        assert!(DebandError::check_float_range("sigma", -f64::MIN_POSITIVE, 0.0, 16.0).is_err());
    }
}
