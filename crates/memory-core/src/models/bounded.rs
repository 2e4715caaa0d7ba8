use serde::{Deserialize, Serialize};

/// A real number clamped to `[0, 1]` at construction time.
///
/// Both `Importance` and `Confidence` share this shape; they are kept as
/// distinct types so a caller cannot accidentally swap one for the other.
macro_rules! unit_interval {
    ($name:ident, $default:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl $name {
            pub fn new(value: f64) -> Self {
                Self(value.clamp(0.0, 1.0))
            }

            pub fn get(self) -> f64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self($default)
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self::new(value)
            }
        }
    };
}

unit_interval!(Importance, 0.5);
unit_interval!(Confidence, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Importance::new(1.5).get(), 1.0);
        assert_eq!(Importance::new(-0.2).get(), 0.0);
        assert_eq!(Confidence::new(0.42).get(), 0.42);
    }

    #[test]
    fn defaults_match_service_layer_expectations() {
        assert_eq!(Importance::default().get(), 0.5);
        assert_eq!(Confidence::default().get(), 1.0);
    }
}
