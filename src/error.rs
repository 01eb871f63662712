use std::fmt;

use ultraviolet::DVec2;

/// Errors surfaced by the simulation core.
///
/// Zero-distance interactions are not errors: they contribute no force.
#[derive(Debug)]
pub enum Error {
    /// A body was rejected at construction time (bad mass or non-finite state).
    InvalidBody { index: usize, reason: &'static str },
    /// A body lies outside the simulation domain and cannot be inserted.
    OutOfBounds { index: usize, pos: DVec2 },
    /// The simulation configuration is unusable.
    InvalidConfig(String),
    /// The timestep is zero, negative or not finite.
    InvalidTimestep(f64),
    /// A configuration document failed to parse.
    Yaml(serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBody { index, reason } => {
                write!(f, "body {index} rejected: {reason}")
            }
            Error::OutOfBounds { index, pos } => {
                write!(f, "body {index} at ({}, {}) is outside the domain", pos.x, pos.y)
            }
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Error::InvalidTimestep(dt) => write!(f, "timestep must be positive and finite, got {dt}"),
            Error::Yaml(err) => write!(f, "failed to parse configuration: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Yaml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_body() {
        let err = Error::OutOfBounds {
            index: 3,
            pos: DVec2::new(500.0, -1.0),
        };
        assert_eq!(err.to_string(), "body 3 at (500, -1) is outside the domain");

        let err = Error::InvalidBody {
            index: 0,
            reason: "mass must be positive",
        };
        assert_eq!(err.to_string(), "body 0 rejected: mass must be positive");
    }

    #[test]
    fn yaml_errors_keep_their_source() {
        let yaml_err = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
