//! Registration and password rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIGIT_REGEX: Regex = Regex::new(r"\d").unwrap();
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref SPECIAL_REGEX: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const PASSWORD_POLICY: &str = "Password must be at least 8 characters long, contain one uppercase letter, one number, and one special character.";

/// Departments a user can register in
pub const DEPARTMENTS: [&str; 15] = [
    "Finance",
    "IT",
    "Operations",
    "Marketing",
    "Customer Service",
    "Projects",
    "Engineering",
    "Safety and Compliance",
    "Legal",
    "Procurement",
    "Logistics",
    "Sales",
    "Technical Services",
    "Network Maintenance",
    "Strategy & Planning",
];

/// The four checks of the password policy, in order
fn checks(password: &str) -> [bool; 4] {
    [
        password.chars().count() >= MIN_PASSWORD_LENGTH,
        DIGIT_REGEX.is_match(password),
        UPPERCASE_REGEX.is_match(password),
        SPECIAL_REGEX.is_match(password),
    ]
}

/// Validate a new password against the policy
pub fn validate_password(password: &str) -> Result<(), String> {
    if checks(password).iter().all(|ok| *ok) {
        Ok(())
    } else {
        Err(PASSWORD_POLICY.to_string())
    }
}

pub fn validate_department(department: &str) -> Result<(), String> {
    if DEPARTMENTS.contains(&department) {
        Ok(())
    } else {
        Err("Please select a valid department".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
}

impl PasswordStrength {
    pub fn from_score(score: usize) -> Self {
        match score {
            0 => PasswordStrength::VeryWeak,
            1 => PasswordStrength::Weak,
            2 => PasswordStrength::Fair,
            3 => PasswordStrength::Good,
            _ => PasswordStrength::Strong,
        }
    }

    pub fn score(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::VeryWeak => "Very Weak",
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Fair => "Fair",
            PasswordStrength::Good => "Good",
            PasswordStrength::Strong => "Strong",
        }
    }
}

/// Strength meter reading; `None` while the field is empty
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }
    let score = checks(password).iter().filter(|ok| **ok).count();
    Some(PasswordStrength::from_score(score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert!(validate_password("Sh0rt!").is_err());
        assert!(validate_password("password1!").is_err());
        assert!(validate_password("Password!!").is_err());
        assert!(validate_password("Password11").is_err());
        assert_eq!(validate_password("x").unwrap_err(), PASSWORD_POLICY);
    }

    #[test]
    fn test_password_strength() {
        assert_eq!(password_strength(""), None);
        assert_eq!(password_strength("a"), Some(PasswordStrength::VeryWeak));
        assert_eq!(password_strength("abcdefgh"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("abcdefg1"), Some(PasswordStrength::Fair));
        assert_eq!(password_strength("Abcdefg1"), Some(PasswordStrength::Good));
        assert_eq!(password_strength("Abcdef1{"), Some(PasswordStrength::Strong));
        assert_eq!(PasswordStrength::Good.score(), 3);
        assert_eq!(PasswordStrength::from_score(0).label(), "Very Weak");
    }

    #[test]
    fn test_departments() {
        assert!(validate_department("Strategy & Planning").is_ok());
        assert!(validate_department("it").is_err());
        assert!(validate_department("").is_err());
    }
}
