use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub details: Option<String>,
}

impl User {
    /// `local@domain.tld`: one `@`, no whitespace, and a dot inside the
    /// domain with text on both sides
    pub fn is_valid_email(email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }

        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }

        match domain.rsplit_once('.') {
            Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        for email in ["rider@rail.com", "a.b@mail.example.org", "x@y.z"] {
            assert!(User::is_valid_email(email), "{} should be valid", email);
        }
    }

    #[test]
    fn test_invalid_emails() {
        let invalid = [
            "",
            "rider",
            "@rail.com",
            "rider@",
            "rider@rail",
            "rider@.com",
            "rider@rail.",
            "a@b@c.d",
            "a b@c.d",
        ];
        for email in invalid {
            assert!(!User::is_valid_email(email), "{} should be invalid", email);
        }
    }
}
