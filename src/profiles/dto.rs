use serde::{Deserialize, Serialize};

use crate::bmi::services::{check_measurements, BmiReport};
use crate::error::{AppError, FieldError};
use crate::profiles::repo_types::{HealthProfile, NewProfile};

pub const GENDER_OPTIONS: [&str; 4] = ["male", "female", "non-binary", "prefer-not-to-say"];

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    #[serde(default)]
    pub allergies: Option<String>,
}

impl ProfileRequest {
    pub fn validate(self, user_id: i64) -> Result<NewProfile, AppError> {
        let mut errors = Vec::new();
        check_measurements(self.weight, self.height, &mut errors);
        if !(1..=120).contains(&self.age) {
            errors.push(FieldError::new("age", "Age must be between 1 and 120"));
        }
        let gender = self.gender.trim().to_string();
        if gender.is_empty() {
            errors.push(FieldError::new("gender", "Please select a gender"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(NewProfile {
            user_id,
            weight: self.weight,
            height: self.height,
            age: self.age,
            gender,
            allergies: self
                .allergies
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        })
    }
}

/// A stored profile together with the BMI derived from it.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: HealthProfile,
    pub bmi: BmiReport,
}

impl From<HealthProfile> for ProfileResponse {
    fn from(profile: HealthProfile) -> Self {
        let bmi = BmiReport::new(profile.weight, profile.height);
        Self { profile, bmi }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProfileRequest {
        ProfileRequest {
            weight: 70.0,
            height: 175.0,
            age: 30,
            gender: "male".into(),
            allergies: Some("  ".into()),
        }
    }

    #[test]
    fn valid_request_becomes_new_profile() {
        let p = request().validate(5).unwrap();
        assert_eq!(p.user_id, 5);
        assert_eq!(p.allergies, None);
        assert!(GENDER_OPTIONS.contains(&p.gender.as_str()));
    }

    #[test]
    fn free_text_gender_is_tolerated() {
        let mut req = request();
        req.gender = "agender".into();
        assert_eq!(req.validate(1).unwrap().gender, "agender");
    }

    #[test]
    fn out_of_range_values_are_collected() {
        let req = ProfileRequest {
            weight: 10.0,
            height: 300.0,
            age: 0,
            gender: " ".into(),
            allergies: None,
        };
        let AppError::Validation(errors) = req.validate(1).unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["weight", "height", "age", "gender"]);
    }
}
