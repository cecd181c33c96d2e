use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which axis the tree grows along: depth runs downward for top-to-bottom,
/// rightward for left-to-right. Serialized with the legacy short names the
/// persisted documents use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirection {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "LR")]
    LeftToRight,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositiveDimension { field: &'static str, value: f64 },
    #[error("{field} must be a non-negative finite number, got {value}")]
    NegativeGap { field: &'static str, value: f64 },
}

/// Geometry parameters for one layout call. Immutable once constructed;
/// [`LayoutConfig::new`] rejects degenerate values up front so the engine
/// never has to reason about zero-width boxes or NaN gaps. Deserialization
/// goes through the same check, so a persisted config cannot smuggle
/// degenerate geometry past it either.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LayoutConfigWire")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between adjacent sibling subtrees.
    pub horizontal_gap: f64,
    /// Gap between a parent level and its child level.
    pub vertical_gap: f64,
    pub direction: LayoutDirection,
}

impl LayoutConfig {
    pub fn new(
        node_width: f64,
        node_height: f64,
        horizontal_gap: f64,
        vertical_gap: f64,
        direction: LayoutDirection,
    ) -> Result<Self, LayoutConfigError> {
        let config = Self {
            node_width,
            node_height,
            horizontal_gap,
            vertical_gap,
            direction,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        for (field, value) in [
            ("node_width", self.node_width),
            ("node_height", self.node_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutConfigError::NonPositiveDimension { field, value });
            }
        }
        for (field, value) in [
            ("horizontal_gap", self.horizontal_gap),
            ("vertical_gap", self.vertical_gap),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutConfigError::NegativeGap { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigWire {
    node_width: f64,
    node_height: f64,
    horizontal_gap: f64,
    vertical_gap: f64,
    #[serde(default)]
    direction: LayoutDirection,
}

impl TryFrom<LayoutConfigWire> for LayoutConfig {
    type Error = LayoutConfigError;

    fn try_from(wire: LayoutConfigWire) -> Result<Self, Self::Error> {
        Self::new(
            wire.node_width,
            wire.node_height,
            wire.horizontal_gap,
            wire.vertical_gap,
            wire.direction,
        )
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 60.0,
            horizontal_gap: 80.0,
            vertical_gap: 100.0,
            direction: LayoutDirection::TopToBottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(LayoutConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_non_positive_node_width() {
        let err = LayoutConfig::new(0.0, 60.0, 80.0, 100.0, LayoutDirection::TopToBottom)
            .unwrap_err();
        assert_eq!(
            err,
            LayoutConfigError::NonPositiveDimension {
                field: "node_width",
                value: 0.0,
            }
        );
    }

    #[test]
    fn test_rejects_negative_gap() {
        let err = LayoutConfig::new(200.0, 60.0, -1.0, 100.0, LayoutDirection::TopToBottom)
            .unwrap_err();
        assert!(matches!(err, LayoutConfigError::NegativeGap { .. }));
    }

    #[test]
    fn test_rejects_nan_dimension() {
        let err = LayoutConfig::new(f64::NAN, 60.0, 80.0, 100.0, LayoutDirection::TopToBottom)
            .unwrap_err();
        assert!(matches!(err, LayoutConfigError::NonPositiveDimension { .. }));
    }

    #[test]
    fn test_deserialization_rejects_degenerate_config() {
        let err = serde_json::from_str::<LayoutConfig>(
            r#"{
                "nodeWidth": -5.0,
                "nodeHeight": 60.0,
                "horizontalGap": 80.0,
                "verticalGap": 100.0,
                "direction": "TB"
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("node_width"));

        let ok: LayoutConfig = serde_json::from_str(
            r#"{
                "nodeWidth": 200.0,
                "nodeHeight": 60.0,
                "horizontalGap": 80.0,
                "verticalGap": 100.0
            }"#,
        )
        .unwrap();
        assert_eq!(ok, LayoutConfig::default());
    }

    #[test]
    fn test_direction_serializes_with_short_names() {
        assert_eq!(
            serde_json::to_string(&LayoutDirection::TopToBottom).unwrap(),
            "\"TB\""
        );
        let d: LayoutDirection = serde_json::from_str("\"LR\"").unwrap();
        assert_eq!(d, LayoutDirection::LeftToRight);
    }
}
