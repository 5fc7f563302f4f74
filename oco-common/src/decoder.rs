//! Flat-file line decoding
//!
//! A flat-file line is `<key> <field> <field> ...`, whitespace separated.
//! The key has already been consumed by the offset index, so decoders
//! return only the payload fields. A line with no payload is a valid,
//! empty record.

/// Outcome of decoding one numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericField {
    /// Field parsed as a float
    Parsed(f64),
    /// Field was malformed and replaced by 0.0
    Defaulted,
}

impl NumericField {
    /// Value substituted into the decoded record
    pub fn value(self) -> f64 {
        match self {
            NumericField::Parsed(v) => v,
            NumericField::Defaulted => 0.0,
        }
    }
}

/// Payload fields of a line (everything after the key)
pub fn payload_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace().skip(1)
}

/// Decode a line into its payload tokens
pub fn decode_tokens(line: &str) -> Vec<String> {
    payload_fields(line).map(str::to_string).collect()
}

/// Decode a line into per-field numeric outcomes
pub fn decode_fields(line: &str) -> Vec<NumericField> {
    payload_fields(line)
        .map(|field| match parse_field(field) {
            Some(v) => NumericField::Parsed(v),
            None => NumericField::Defaulted,
        })
        .collect()
}

/// Decode a line into floats; malformed fields become 0.0
///
/// Field count is always preserved.
pub fn decode_numbers(line: &str) -> Vec<f64> {
    let fields = decode_fields(line);
    let defaulted = fields
        .iter()
        .filter(|f| matches!(f, NumericField::Defaulted))
        .count();
    if defaulted > 0 {
        tracing::debug!(
            defaulted,
            total = fields.len(),
            "Malformed numeric fields replaced with 0.0"
        );
    }
    fields.into_iter().map(NumericField::value).collect()
}

/// Finite float, or `None`
///
/// `nan` and `inf` parse as floats but have no JSON representation, so
/// they count as malformed like any other unparsable field.
fn parse_field(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}
