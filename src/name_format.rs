use crate::error::NameError;

fn title_case(word: &str) -> String {
    let lowered = word.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns `"conor NEY"` into the `"Ney,Conor"` form the schedule rows use.
///
/// # Errors
///
/// Returns [`NameError::Shape`] unless the input is exactly two words
/// separated by a single space.
pub fn schedule_key(name: &str) -> Result<String, NameError> {
    let parts = name.trim().split(' ').collect::<Vec<_>>();
    match parts.as_slice() {
        [first, last] if !first.is_empty() && !last.is_empty() => {
            Ok(format!("{},{}", title_case(last), title_case(first)))
        }
        _ => Err(NameError::Shape(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::schedule_key;
    use crate::error::NameError;

    #[test]
    fn reorders_and_title_cases() {
        assert_eq!(schedule_key("conor NEY").as_deref(), Ok("Ney,Conor"));
        assert_eq!(schedule_key("Jane Doe").as_deref(), Ok("Doe,Jane"));
        assert_eq!(schedule_key("  mary o'hara ").as_deref(), Ok("O'hara,Mary"));
    }

    #[test]
    fn rejects_other_shapes() {
        assert_eq!(
            schedule_key("Cher"),
            Err(NameError::Shape("Cher".to_string()))
        );
        assert!(schedule_key("Mary Ann Evans").is_err());
        assert!(schedule_key("Conor  Ney").is_err());
        assert!(schedule_key("").is_err());
    }
}
