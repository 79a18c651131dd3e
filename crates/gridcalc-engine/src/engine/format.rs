use super::cell::CellValue;

/// Format a computed value for display. Errors become their short codes.
pub fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.clone(),
        CellValue::Error(e) => crate::engine::ErrorCode::from(*e).to_string(),
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    // Fold -0 into 0.
    let n = if n == 0.0 { 0.0 } else { n };
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CellError;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&CellValue::Empty), "");
        assert_eq!(format_value(&CellValue::Number(13.0)), "13");
        assert_eq!(format_value(&CellValue::Number(-0.5)), "-0.50");
        assert_eq!(format_value(&CellValue::Text("abc".into())), "abc");
        assert_eq!(format_value(&CellValue::Error(CellError::DivideByZero)), "#DIV0!");
        assert_eq!(format_value(&CellValue::Error(CellError::TypeError)), "#TYPE!");
        assert_eq!(format_value(&CellValue::Error(CellError::InvalidReference)), "#REF!");
    }
}
