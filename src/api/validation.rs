use super::ApiError;
use super::types::LabelInput;

/// Parse a comma-separated list of integer IDs from a query parameter.
/// Any malformed token fails the whole parameter.
pub fn parse_id_list(param: &str, raw: &str) -> Result<Vec<i32>, ApiError> {
    raw.split(',')
        .map(|token| {
            token.trim().parse::<i32>().map_err(|_| {
                ApiError::validation(format!(
                    "Invalid value '{}' for '{}': expected comma-separated integer IDs",
                    token, param
                ))
            })
        })
        .collect()
}

/// Parse a boolean-as-int query parameter: 0 is false, any other integer
/// is true, anything non-numeric is a client error.
pub fn parse_bool_flag(param: &str, raw: &str) -> Result<bool, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map(|v| v != 0)
        .map_err(|_| ApiError::validation(format!("Invalid value '{}' for '{}': expected 0 or 1", raw, param)))
}

/// Ratings carry at most two significant digits with one fractional digit,
/// so the representable range is -9.9..=9.9.
pub fn validate_rating(rating: f64) -> Result<f64, ApiError> {
    let scaled = rating * 10.0;

    if scaled.abs() > 99.0 + 1e-6 {
        return Err(ApiError::validation(
            "Rating must have no more than 2 digits in total",
        ));
    }

    if (scaled - scaled.round()).abs() > 1e-6 {
        return Err(ApiError::validation(
            "Rating must have no more than 1 decimal place",
        ));
    }

    Ok(rating)
}

pub fn validate_required_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(ApiError::validation(format!("{} may not be blank", field))),
        None => Err(ApiError::validation(format!("{} is required", field))),
    }
}

/// Pull the names out of a nested label list, rejecting blank entries.
pub fn label_names(field: &str, labels: Vec<LabelInput>) -> Result<Vec<String>, ApiError> {
    labels
        .into_iter()
        .map(|label| {
            if label.name.trim().is_empty() {
                Err(ApiError::validation(format!(
                    "{} names may not be blank",
                    field
                )))
            } else {
                Ok(label.name)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("tags", "1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("tags", "7").unwrap(), vec![7]);
        assert_eq!(parse_id_list("tags", " 1 , 2 ").unwrap(), vec![1, 2]);
        assert!(parse_id_list("tags", "1,x").is_err());
        assert!(parse_id_list("tags", "").is_err());
        assert!(parse_id_list("tags", "1,,2").is_err());
    }

    #[test]
    fn test_parse_bool_flag() {
        assert!(!parse_bool_flag("is_tag_destination", "0").unwrap());
        assert!(parse_bool_flag("is_tag_destination", "1").unwrap());
        assert!(parse_bool_flag("is_tag_destination", "2").unwrap());
        assert!(parse_bool_flag("is_tag_destination", "yes").is_err());
        assert!(parse_bool_flag("is_tag_destination", "").is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(4.5).is_ok());
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(-9.9).is_ok());
        assert!(validate_rating(9.9).is_ok());
        assert!(validate_rating(4.55).is_err());
        assert!(validate_rating(10.0).is_err());
        assert!(validate_rating(-10.1).is_err());
    }

    #[test]
    fn test_validate_required_text() {
        assert_eq!(
            validate_required_text("name", Some("Kyoto".to_string())).unwrap(),
            "Kyoto"
        );
        assert!(validate_required_text("name", Some("  ".to_string())).is_err());
        assert!(validate_required_text("name", None).is_err());
    }
}
