use hopewell_status::{invalid_argument, well_known::required_field, Status};

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 200;

pub fn validate_email(field_name: &str, value: &str) -> Result<String, Status> {
    let email = required_field(field_name, value)?;
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid_argument!("'{}' is not a valid email address", field_name));
    }
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid_argument!("'{}' is not a valid email address", field_name))?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok {
        return Err(invalid_argument!("'{}' is not a valid email address", field_name));
    }
    Ok(email)
}

pub fn validate_name(field_name: &str, value: &str) -> Result<String, Status> {
    let name = required_field(field_name, value)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid_argument!(
            "'{}' must be at most {} characters",
            field_name,
            MAX_NAME_LEN
        ));
    }
    Ok(name)
}

/// Clamps a requested page size into `[1, 100]`.
pub fn page_size(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn accepts_ordinary_addresses() {
        assert_eq!(
            validate_email("donor_email", " asha.rao@example.org ").unwrap(),
            "asha.rao@example.org"
        );
        assert!(validate_email("donor_email", "a+tag@mail.example.co.in").is_ok());
    }

    #[test]
    pub fn rejects_malformed_addresses() {
        for email in [
            "",
            "asha",
            "@example.org",
            "asha@",
            "asha@example",
            "asha@.org",
            "asha@example.",
            "asha@@example.org",
            "asha rao@example.org",
        ] {
            assert!(validate_email("donor_email", email).is_err(), "{:?}", email);
        }
    }

    #[test]
    pub fn name_length_is_bounded() {
        assert!(validate_name("donor_name", &"x".repeat(200)).is_ok());
        assert!(validate_name("donor_name", &"x".repeat(201)).is_err());
        assert!(validate_name("donor_name", "  ").is_err());
    }

    #[test]
    pub fn page_size_is_clamped() {
        assert_eq!(page_size(None, 25), 25);
        assert_eq!(page_size(Some(0), 25), 1);
        assert_eq!(page_size(Some(500), 25), 100);
    }
}
