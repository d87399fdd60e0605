use serde::Serialize;

use crate::error::FieldError;

/// Body-mass index from kilograms and centimetres.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Range checks shared with the health profile form.
pub fn check_measurements(weight: f64, height: f64, errors: &mut Vec<FieldError>) {
    if !(20.0..=300.0).contains(&weight) {
        errors.push(FieldError::new("weight", "Weight must be between 20 and 300 kg"));
    }
    if !(50.0..=250.0).contains(&height) {
        errors.push(FieldError::new("height", "Height must be between 50 and 250 cm"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Healthy Weight")]
    HealthyWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::HealthyWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::HealthyWeight => "Healthy Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            BmiCategory::Underweight | BmiCategory::Overweight => "#EAB308",
            BmiCategory::HealthyWeight => "#22C55E",
            BmiCategory::Obese => "#EF4444",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "You may need to gain some weight. Consider consulting with a healthcare professional about a healthy weight gain plan.",
            BmiCategory::HealthyWeight => "Your BMI indicates you're at a healthy weight. Continue with your balanced diet and regular exercise routine to maintain your health.",
            BmiCategory::Overweight => "You may benefit from losing some weight. Focus on a balanced diet and regular physical activity.",
            BmiCategory::Obese => "Your BMI indicates obesity, which increases risk for health conditions. Consider consulting a healthcare professional about a weight management plan.",
        }
    }
}

// Gauge anchors: each band between consecutive anchors spans 25 points.
const ANCHORS: [f64; 5] = [16.0, 18.5, 25.0, 30.0, 40.0];

/// Position of `bmi` on a 0..=100 gauge.
pub fn gauge_position(bmi: f64) -> f64 {
    if bmi.is_nan() || bmi <= ANCHORS[0] {
        return 0.0;
    }
    let band = ANCHORS
        .windows(2)
        .position(|w| bmi < w[1])
        .unwrap_or(ANCHORS.len() - 2);
    let (lo, hi) = (ANCHORS[band], ANCHORS[band + 1]);
    let within = ((bmi - lo) / (hi - lo) * 25.0).min(25.0);
    (band as f64 * 25.0 + within).clamp(0.0, 100.0)
}

/// Everything the calculator shows for one measurement.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BmiReport {
    pub value: f64,
    pub category: BmiCategory,
    pub color: &'static str,
    pub description: &'static str,
    pub gauge_position: f64,
}

impl BmiReport {
    pub fn new(weight_kg: f64, height_cm: f64) -> Self {
        let raw = bmi(weight_kg, height_cm);
        let category = BmiCategory::from_bmi(raw);
        Self {
            value: (raw * 10.0).round() / 10.0,
            category,
            color: category.color(),
            description: category.advice(),
            gauge_position: gauge_position(raw),
        }
    }
}
