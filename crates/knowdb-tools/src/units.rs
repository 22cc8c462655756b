//! Length, mass and temperature conversion.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{Tool, ToolError, ToolInput, ToolOutput, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Mass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    /// Factor to the base unit: metres for length, grams for mass.
    Linear(Dimension, f64),
    Temperature(Temperature),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temperature {
    Celsius,
    Fahrenheit,
    Kelvin,
}

fn unit(name: &str) -> Option<Unit> {
    use Dimension::{Length, Mass};
    let u = match name {
        "km" => Unit::Linear(Length, 1000.0),
        "m" => Unit::Linear(Length, 1.0),
        "cm" => Unit::Linear(Length, 0.01),
        "mm" => Unit::Linear(Length, 0.001),
        "mi" => Unit::Linear(Length, 1609.344),
        "yd" => Unit::Linear(Length, 0.9144),
        "ft" => Unit::Linear(Length, 0.3048),
        "in" => Unit::Linear(Length, 0.0254),
        "kg" => Unit::Linear(Mass, 1000.0),
        "g" => Unit::Linear(Mass, 1.0),
        "mg" => Unit::Linear(Mass, 0.001),
        "lb" => Unit::Linear(Mass, 453.592),
        "oz" => Unit::Linear(Mass, 28.3495),
        "c" => Unit::Temperature(Temperature::Celsius),
        "f" => Unit::Temperature(Temperature::Fahrenheit),
        "k" => Unit::Temperature(Temperature::Kelvin),
        _ => return None,
    };
    Some(u)
}

fn to_celsius(value: f64, from: Temperature) -> f64 {
    match from {
        Temperature::Celsius => value,
        Temperature::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        Temperature::Kelvin => value - 273.15,
    }
}

fn from_celsius(celsius: f64, to: Temperature) -> f64 {
    match to {
        Temperature::Celsius => celsius,
        Temperature::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        Temperature::Kelvin => celsius + 273.15,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub value: f64,
    /// Rendered as `"{value:?} {from} = {result} {to}"`, so whole inputs keep their `.0`.
    pub text: String,
}

/// Convert `value` between two units of the same dimension. Unit names are
/// case-insensitive.
pub fn convert(value: f64, from_unit: &str, to_unit: &str) -> ToolResult<Conversion> {
    if !value.is_finite() {
        return Err(ToolError::InvalidInput("value must be a finite number".into()));
    }
    let (from_name, to_name) = (from_unit.trim().to_ascii_lowercase(), to_unit.trim().to_ascii_lowercase());
    let lookup = |name: &str| unit(name).ok_or_else(|| ToolError::InvalidInput(format!("unknown unit: {name}")));
    let (from, to) = (lookup(&from_name)?, lookup(&to_name)?);

    match (from, to) {
        (Unit::Linear(fd, ff), Unit::Linear(td, tf)) if fd == td => {
            let result = value * ff / tf;
            Ok(Conversion { value: result, text: format!("{value:?} {from_name} = {result:.4} {to_name}") })
        }
        (Unit::Temperature(f), Unit::Temperature(t)) => {
            let result = from_celsius(to_celsius(value, f), t);
            Ok(Conversion {
                value: result,
                text: format!("{value:?} {} = {result:.2} {}", from_name.to_uppercase(), to_name.to_uppercase()),
            })
        }
        _ => Err(ToolError::InvalidInput(format!("cannot convert {from_name} to {to_name}"))),
    }
}

#[derive(Debug, Deserialize)]
struct ConvertArgs {
    value: f64,
    from_unit: String,
    to_unit: String,
}

pub struct ConvertUnitsTool;

#[async_trait]
impl Tool for ConvertUnitsTool {
    fn name(&self) -> &'static str {
        "convert_units"
    }

    fn description(&self) -> &'static str {
        "Convert a value between units. Length: km m cm mm mi yd ft in. Mass: kg g mg lb oz. Temperature: c f k."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "value": {"type": "number"},
                "from_unit": {"type": "string"},
                "to_unit": {"type": "string"}
            },
            "required": ["value", "from_unit", "to_unit"]
        })
    }

    async fn invoke(&self, input: ToolInput) -> ToolResult<ToolOutput> {
        let args: ConvertArgs = input.parse()?;
        let conversion = convert(args.value, &args.from_unit, &args.to_unit)?;
        Ok(ToolOutput::success_with_data(conversion.text, json!({"value": conversion.value})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_and_mass() {
        let c = convert(100.0, "km", "mi").unwrap();
        assert!((c.value - 62.137_119).abs() < 1e-5);
        assert_eq!(c.text, "100.0 km = 62.1371 mi");

        assert_eq!(convert(1.0, "LB", "g").unwrap().text, "1.0 lb = 453.5920 g");
        assert!((convert(12.0, "in", "ft").unwrap().value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn temperature() {
        assert_eq!(convert(100.0, "c", "f").unwrap().text, "100.0 C = 212.00 F");
        assert!((convert(0.0, "k", "c").unwrap().value + 273.15).abs() < 1e-9);
        assert_eq!(convert(32.0, "F", "k").unwrap().text, "32.0 F = 273.15 K");
    }

    #[test]
    fn fractional_inputs_print_as_given() {
        assert_eq!(convert(2.5, "kg", "g").unwrap().text, "2.5 kg = 2500.0000 g");
    }

    #[test]
    fn mismatched_or_unknown_units_are_rejected() {
        assert!(matches!(convert(1.0, "km", "kg"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(convert(1.0, "c", "m"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(convert(1.0, "parsec", "m"), Err(ToolError::InvalidInput(m)) if m.contains("parsec")));
    }
}
