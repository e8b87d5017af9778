use std::sync::OnceLock;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::error::LoadError;

static DEVICE_SCHEMA: OnceLock<JSONSchema> = OnceLock::new();

fn device_schema() -> &'static JSONSchema {
    DEVICE_SCHEMA.get_or_init(|| {
        let schema_value: Value =
            serde_json::from_str(include_str!("../../schema/device.schema.json"))
                .expect("embedded device schema should parse as JSON");
        JSONSchema::options()
            .with_draft(Draft::Draft202012)
            .compile(&schema_value)
            .expect("embedded device schema should compile")
    })
}

/// Validates a device description against the embedded schema.
pub fn validate_device_value(value: &Value, label: &str) -> Result<(), LoadError> {
    if let Err(errors) = device_schema().validate(value) {
        let messages: Vec<String> = errors.into_iter().map(|err| err.to_string()).collect();
        return Err(LoadError::Schema {
            label: label.to_string(),
            message: messages.join("\n"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_rgb_device() {
        let value = json!({
            "name": "par",
            "mapping": {
                "color": {"red": {"chan": 1}, "green": {"chan": 2}, "blue": {"chan": 3}}
            }
        });
        validate_device_value(&value, "par").expect("device should satisfy schema");
    }

    #[test]
    fn rejects_out_of_range_channel() {
        let value = json!({
            "name": "par",
            "mapping": {
                "color": {"red": {"chan": 513}, "green": {"chan": 2}, "blue": {"chan": 3}}
            }
        });
        let err = validate_device_value(&value, "par").unwrap_err();
        assert!(matches!(err, LoadError::Schema { .. }));
    }

    #[test]
    fn rejects_unknown_pulse_direction() {
        let value = json!({
            "name": "dimmer",
            "mapping": {
                "pulse": {
                    "speed": {"chan": 1},
                    "direction": {"chan": 2, "enum": {"sideways": [0, 10]}}
                }
            }
        });
        assert!(validate_device_value(&value, "dimmer").is_err());
    }

    #[test]
    fn rejects_color_without_blue() {
        let value = json!({
            "name": "par",
            "mapping": {"color": {"red": {"chan": 1}, "green": {"chan": 2}}}
        });
        assert!(validate_device_value(&value, "par").is_err());
    }
}
