//! Form validation.
//!
//! Every check runs before a request is built; a failure is reported with
//! the message shown to the user and nothing is sent. Individual checks
//! return `Result<(), String>`, the form types convert their first failure
//! into [`ClientError::Validation`].

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ClientError, Result};
use crate::models::{
    ActivityStatus, ActivityUpdate, Amount, NewActivity, NewUser, Role, SignupRequest, UserUpdate,
};

/// Image used for activities created without one
pub const DEFAULT_ACTIVITY_IMAGE: &str =
    "https://home.cdn.papaya.services/tu_thien_la_gi_5131bbcfa1.jpg";

pub const MIN_PASSWORD_LEN: usize = 3;

lazy_static! {
    /// Something@something.something, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// http(s) URL without spaces or double quotes
    static ref IMAGE_URL_REGEX: Regex = Regex::new(r#"^(http|https)://[^ "]+$"#).unwrap();
}

pub fn validate_login(email: &str, password: &str) -> std::result::Result<(), String> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err("Missing email or password".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> std::result::Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if !EMAIL_REGEX.is_match(email.trim()) {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str, confirm: &str) -> std::result::Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    if password != confirm {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

/// Parse a goal amount; any positive number is accepted and rounded to cents
pub fn validate_goal_amount(raw: &str) -> std::result::Result<Amount, String> {
    const MESSAGE: &str = "Goal amount must be a positive number";
    let value: f64 = raw.trim().parse().map_err(|_| MESSAGE.to_string())?;
    match Amount::from_f64(value) {
        Some(amount) if amount.is_positive() => Ok(amount),
        _ => Err(MESSAGE.to_string()),
    }
}

/// Parse an end date (`YYYY-MM-DD`). Today is allowed, earlier days are not.
pub fn validate_end_date(raw: &str, today: NaiveDate) -> std::result::Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("End date is required".to_string());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| "End date must be a valid date (YYYY-MM-DD)".to_string())?;
    if date < today {
        return Err("End date cannot be in the past".to_string());
    }
    Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

/// An empty image is allowed; anything else must be an http(s) URL
pub fn validate_image_url(image: &str) -> std::result::Result<(), String> {
    let image = image.trim();
    if !image.is_empty() && !IMAGE_URL_REGEX.is_match(image) {
        return Err("Please enter a valid image URL".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First name and last name are required".to_string());
        }
        validate_email(&self.email)?;
        validate_password(&self.password, &self.confirm_password)
    }

    pub fn into_request(self) -> Result<SignupRequest> {
        self.validate().map_err(ClientError::Validation)?;
        Ok(SignupRequest {
            email: self.email.trim().to_string(),
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        })
    }

    /// Same checks, for an account created by an administrator
    pub fn into_new_user(self, role: Option<Role>) -> Result<NewUser> {
        let request = self.into_request()?;
        Ok(NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: request.password,
            role,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityForm {
    pub name: String,
    pub description: String,
    pub goal_amount: String,
    pub end_date: String,
    pub image: String,
    pub status: Option<ActivityStatus>,
}

struct ValidActivity {
    name: String,
    description: String,
    goal_amount: Amount,
    end_at: DateTime<Utc>,
    image: Option<String>,
}

impl ActivityForm {
    fn check(&self, today: NaiveDate) -> std::result::Result<ValidActivity, String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        let goal_amount = validate_goal_amount(&self.goal_amount)?;
        let end_at = validate_end_date(&self.end_date, today)?;
        validate_image_url(&self.image)?;

        let image = Some(self.image.trim().to_string()).filter(|i| !i.is_empty());
        Ok(ValidActivity {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            goal_amount,
            end_at,
            image,
        })
    }

    pub fn validate(&self, today: NaiveDate) -> std::result::Result<(), String> {
        self.check(today).map(|_| ())
    }

    /// Body for a new activity: open, nothing raised yet
    pub fn into_new_activity(self, today: NaiveDate) -> Result<NewActivity> {
        let valid = self.check(today).map_err(ClientError::Validation)?;
        Ok(NewActivity {
            name: valid.name,
            description: valid.description,
            goal_amount: valid.goal_amount,
            end_at: valid.end_at,
            total_donations: Amount::ZERO,
            status: self.status.unwrap_or_default(),
            image: Some(valid.image.unwrap_or_else(|| DEFAULT_ACTIVITY_IMAGE.to_string())),
        })
    }

    /// Full replacement body for an existing activity
    pub fn into_update(self, today: NaiveDate) -> Result<ActivityUpdate> {
        let valid = self.check(today).map_err(ClientError::Validation)?;
        Ok(ActivityUpdate {
            name: Some(valid.name),
            description: Some(valid.description),
            goal_amount: Some(valid.goal_amount),
            end_at: Some(valid.end_at),
            status: self.status,
            image: Some(valid.image.unwrap_or_else(|| DEFAULT_ACTIVITY_IMAGE.to_string())),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl UserForm {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("First name is required".to_string());
        }
        validate_email(&self.email)
    }

    pub fn into_update(self) -> Result<UserUpdate> {
        self.validate().map_err(ClientError::Validation)?;
        Ok(UserUpdate {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            role: Some(self.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn activity_form() -> ActivityForm {
        ActivityForm {
            name: "Clean water".into(),
            description: "Wells for the valley".into(),
            goal_amount: "1000".into(),
            end_date: "2026-06-01".into(),
            image: String::new(),
            status: None,
        }
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("a@b.co", "pw").is_ok());
        assert_eq!(validate_login(" ", "pw").unwrap_err(), "Missing email or password");
        assert_eq!(validate_login("a@b.co", "").unwrap_err(), "Missing email or password");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.org").is_ok());
        assert_eq!(validate_email("").unwrap_err(), "Email is required");
        assert_eq!(validate_email("ada@example").unwrap_err(), "Please enter a valid email address");
        assert_eq!(validate_email("a da@example.org").unwrap_err(), "Please enter a valid email address");
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abc", "abc").is_ok());
        assert_eq!(validate_password("", "").unwrap_err(), "Password is required");
        assert_eq!(
            validate_password("ab", "ab").unwrap_err(),
            "Password must be at least 3 characters long"
        );
        assert_eq!(validate_password("abcd", "abce").unwrap_err(), "Passwords do not match");
    }

    #[test]
    fn test_signup_form() {
        let mut form = SignupForm {
            first_name: "Ada".into(),
            last_name: String::new(),
            email: "ada@example.org".into(),
            password: "secret".into(),
            confirm_password: "secret".into(),
        };
        assert_eq!(form.validate().unwrap_err(), "First name and last name are required");

        form.last_name = "Lovelace".into();
        let request = form.into_request().unwrap();
        assert_eq!(request.last_name, "Lovelace");
    }

    #[test]
    fn test_goal_amount() {
        assert_eq!(validate_goal_amount("250.5").unwrap(), Amount::from_cents(25050));
        for bad in ["", "abc", "0", "-10"] {
            assert_eq!(
                validate_goal_amount(bad).unwrap_err(),
                "Goal amount must be a positive number",
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_end_date() {
        assert!(validate_end_date("2026-03-15", today()).is_ok());
        assert_eq!(validate_end_date("", today()).unwrap_err(), "End date is required");
        assert_eq!(
            validate_end_date("2026-03-14", today()).unwrap_err(),
            "End date cannot be in the past"
        );
        assert!(validate_end_date("15/03/2026", today()).is_err());
    }

    #[test]
    fn test_image_url() {
        assert!(validate_image_url("").is_ok());
        assert!(validate_image_url("https://cdn.example.org/a.png").is_ok());
        assert_eq!(
            validate_image_url("ftp://cdn.example.org/a.png").unwrap_err(),
            "Please enter a valid image URL"
        );
        assert!(validate_image_url("https://cdn.example.org/a b.png").is_err());
    }

    #[test]
    fn test_activity_form_order_of_checks() {
        let mut form = activity_form();
        form.name = " ".into();
        form.goal_amount = "x".into();
        assert_eq!(form.validate(today()).unwrap_err(), "Name is required");

        let mut form = activity_form();
        form.description.clear();
        assert_eq!(form.validate(today()).unwrap_err(), "Description is required");
    }

    #[test]
    fn test_new_activity_defaults() {
        let activity = activity_form().into_new_activity(today()).unwrap();
        assert_eq!(activity.status, ActivityStatus::Open);
        assert_eq!(activity.total_donations, Amount::ZERO);
        assert_eq!(activity.image.as_deref(), Some(DEFAULT_ACTIVITY_IMAGE));
        assert_eq!(activity.end_at.to_rfc3339(), "2026-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_invalid_form_is_validation_error() {
        let mut form = activity_form();
        form.end_date = "2020-01-01".into();
        let err = form.into_update(today()).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref m) if m == "End date cannot be in the past"));
    }

    #[test]
    fn test_user_form() {
        let form = UserForm {
            first_name: String::new(),
            last_name: "L".into(),
            email: "x@y.z".into(),
            role: Role::User,
        };
        assert_eq!(form.validate().unwrap_err(), "First name is required");

        let update = UserForm {
            first_name: "Ada".into(),
            ..form
        }
        .into_update()
        .unwrap();
        assert_eq!(update.role, Some(Role::User));
    }
}
