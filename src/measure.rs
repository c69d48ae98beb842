// used for sizes of arbitrary precision
use bigdecimal::BigDecimal;

// used when parsing a magnitude out of a description
use std::str::FromStr;
// used to print out readable forms of a measurement
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

// ------------- Measurement -------------
// A length normalized to metres. Descriptions state sizes in free text
// ("grows up to 35 cm long"), so magnitudes keep arbitrary precision.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Measurement(BigDecimal);

impl Measurement {
    pub fn metres(&self) -> &BigDecimal {
        &self.0
    }
}
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} m", self.0)
    }
}

lazy_static! {
    static ref SIZE_PATTERN: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(millimetres?|millimeters?|centimetres?|centimeters?|kilometres?|kilometers?|metres?|meters?|mm|cm|km|m)\b"
    ).unwrap();
}

/// Parse the first stated size out of a free-text description.
///
/// Returns `None` when no size is stated, which is how callers decide
/// that a record cannot participate in size-based ordering.
pub fn extract_size(description: &str) -> Option<Measurement> {
    for captures in SIZE_PATTERN.captures_iter(description) {
        let Ok(magnitude) = BigDecimal::from_str(&captures[1]) else {
            continue;
        };
        let unit = captures[2].to_lowercase();
        let scale = match unit.as_str() {
            "mm" => BigDecimal::from_str("0.001"),
            "cm" => BigDecimal::from_str("0.01"),
            "km" => BigDecimal::from_str("1000"),
            "m" => BigDecimal::from_str("1"),
            u if u.starts_with("milli") => BigDecimal::from_str("0.001"),
            u if u.starts_with("centi") => BigDecimal::from_str("0.01"),
            u if u.starts_with("kilo") => BigDecimal::from_str("1000"),
            _ => BigDecimal::from_str("1"),
        };
        let Ok(scale) = scale else { continue };
        return Some(Measurement(magnitude * scale));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_units_normalize_to_metres() {
        let m = extract_size("adults reach 35 cm in sheltered water").unwrap();
        assert_eq!(m, extract_size("about 0.35 m").unwrap());
        let km = extract_size("colonies span 2 km of reef").unwrap();
        assert_eq!(km.metres(), &BigDecimal::from_str("2000").unwrap());
    }

    #[test]
    fn first_stated_size_wins() {
        let m = extract_size("12 cm at hatching, up to 3 m grown").unwrap();
        assert_eq!(m.metres(), &BigDecimal::from_str("0.12").unwrap());
    }

    #[test]
    fn sizeless_description_yields_none() {
        assert!(extract_size("a timid grazer of the upper shelf").is_none());
        assert!(extract_size("").is_none());
    }

    #[test]
    fn measurements_order_across_units() {
        let small = extract_size("9 mm").unwrap();
        let large = extract_size("2 cm").unwrap();
        assert!(small < large);
    }
}
