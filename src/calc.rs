use serde::Serialize;
use std::fmt;

/// Unit grades below this value put a unit (or a whole subject) at risk.
pub const RISK_THRESHOLD: f64 = 80.0;
/// A subject is only evaluated for risk once all of its units are graded.
pub const UNITS_PER_SUBJECT: usize = 3;
pub const PARTIAL_UNIT_COST: i64 = 100;
pub const SEMESTER_SUBJECT_COST: i64 = 350;
/// Acronym used when a grade references a subject missing from `asignaturas`.
pub const UNKNOWN_ACRONYM: &str = "NA";

/// 1-decimal rounding, half up: `floor(10*x + 0.5) / 10`.
///
/// Grades are non-negative, so this agrees with half-away-from-zero.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Uppercased first two characters of a subject description.
pub fn subject_acronym(descripcion: &str) -> String {
    descripcion
        .chars()
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompetencyBand {
    /// AU
    Autonomous,
    /// SO
    Outstanding,
    /// RE
    Regular,
    /// NC
    NotCompetent,
}

impl CompetencyBand {
    /// Bands are checked top-down; each lower bound is inclusive.
    pub fn classify(average: f64) -> Self {
        if average >= 90.0 {
            CompetencyBand::Autonomous
        } else if average >= 80.0 {
            CompetencyBand::Outstanding
        } else if average >= 70.0 {
            CompetencyBand::Regular
        } else {
            CompetencyBand::NotCompetent
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            CompetencyBand::Autonomous => "AU",
            CompetencyBand::Outstanding => "SO",
            CompetencyBand::Regular => "RE",
            CompetencyBand::NotCompetent => "NC",
        }
    }
}

impl fmt::Display for CompetencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRisk {
    /// Not exactly three graded units; excluded from both counters.
    Incomplete,
    /// Three-unit mean below the threshold.
    Semester,
    /// Mean at or above the threshold; carries the number of failing units.
    Partial(i64),
}

pub fn classify_subject_risk(unit_scores: &[f64]) -> SubjectRisk {
    if unit_scores.len() != UNITS_PER_SUBJECT {
        return SubjectRisk::Incomplete;
    }
    let mean = unit_scores.iter().sum::<f64>() / UNITS_PER_SUBJECT as f64;
    if mean < RISK_THRESHOLD {
        SubjectRisk::Semester
    } else {
        let failing = unit_scores.iter().filter(|s| **s < RISK_THRESHOLD).count();
        SubjectRisk::Partial(failing as i64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub semestrales: i64,
    pub parciales: i64,
}

impl RiskCounts {
    pub fn add(&mut self, risk: SubjectRisk) {
        match risk {
            SubjectRisk::Incomplete => {}
            SubjectRisk::Semester => self.semestrales += 1,
            SubjectRisk::Partial(n) => self.parciales += n,
        }
    }

    pub fn tally<'a, I>(subjects: I) -> Self
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut counts = RiskCounts::default();
        for scores in subjects {
            counts.add(classify_subject_risk(scores));
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingAmounts {
    pub costo_parciales: i64,
    pub costo_semestrales: i64,
    pub costo_total: i64,
}

/// Missing counts bill as zero.
pub fn billing_for(parciales: Option<i64>, semestrales: Option<i64>) -> BillingAmounts {
    let costo_parciales = parciales.unwrap_or(0) * PARTIAL_UNIT_COST;
    let costo_semestrales = semestrales.unwrap_or(0) * SEMESTER_SUBJECT_COST;
    BillingAmounts {
        costo_parciales,
        costo_semestrales,
        costo_total: costo_parciales + costo_semestrales,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == "not_found"
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CalcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_off_is_half_up() {
        assert_eq!(round_off_1_decimal(0.0), 0.0);
        assert_eq!(round_off_1_decimal(68.333_333), 68.3);
        assert_eq!(round_off_1_decimal(3.55), 3.6);
        assert_eq!(round_off_1_decimal(86.25), 86.3);
        assert_eq!(round_off_1_decimal(100.0), 100.0);
    }

    #[test]
    fn exact_ties_round_up_not_to_even() {
        // (60 + 60.5) / 2
        assert_eq!(round_off_1_decimal(60.25), 60.3);
        assert_eq!(round_off_1_decimal(72.75), 72.8);
    }

    #[test]
    fn acronym_takes_two_chars_uppercased() {
        assert_eq!(subject_acronym("Matemáticas"), "MA");
        assert_eq!(subject_acronym("química"), "QU");
        assert_eq!(subject_acronym("ñandú"), "ÑA");
        assert_eq!(subject_acronym("x"), "X");
        assert_eq!(subject_acronym(""), "");
    }

    #[test]
    fn bands_use_inclusive_lower_bounds() {
        assert_eq!(CompetencyBand::classify(100.0).code(), "AU");
        assert_eq!(CompetencyBand::classify(90.0).code(), "AU");
        assert_eq!(CompetencyBand::classify(89.9).code(), "SO");
        assert_eq!(CompetencyBand::classify(80.0).code(), "SO");
        assert_eq!(CompetencyBand::classify(79.9).code(), "RE");
        assert_eq!(CompetencyBand::classify(70.0).code(), "RE");
        assert_eq!(CompetencyBand::classify(69.9).code(), "NC");
        assert_eq!(CompetencyBand::classify(0.0).code(), "NC");
    }

    #[test]
    fn subject_risk_rules() {
        assert_eq!(classify_subject_risk(&[85.0, 90.0, 80.0]), SubjectRisk::Partial(0));
        assert_eq!(classify_subject_risk(&[60.0, 70.0, 75.0]), SubjectRisk::Semester);
        // mean 83.3 with one failing unit
        assert_eq!(classify_subject_risk(&[95.0, 75.0, 80.0]), SubjectRisk::Partial(1));
        assert_eq!(classify_subject_risk(&[50.0, 60.0]), SubjectRisk::Incomplete);
        assert_eq!(
            classify_subject_risk(&[90.0, 90.0, 90.0, 90.0]),
            SubjectRisk::Incomplete
        );
        assert_eq!(classify_subject_risk(&[]), SubjectRisk::Incomplete);
    }

    #[test]
    fn tally_sums_across_subjects() {
        let a = [60.0, 70.0, 75.0];
        let b = [95.0, 85.0, 80.0];
        let c = [40.0, 40.0];
        let counts = RiskCounts::tally([&a[..], &b[..], &c[..]]);
        assert_eq!(
            counts,
            RiskCounts {
                semestrales: 1,
                parciales: 0
            }
        );

        let d = [100.0, 79.0, 70.0];
        let counts = RiskCounts::tally([&a[..], &d[..]]);
        assert_eq!(counts.semestrales, 1);
        assert_eq!(counts.parciales, 2);
    }

    #[test]
    fn billing_schedule() {
        let b = billing_for(Some(2), Some(1));
        assert_eq!(b.costo_parciales, 200);
        assert_eq!(b.costo_semestrales, 350);
        assert_eq!(b.costo_total, 550);

        let b = billing_for(None, None);
        assert_eq!(b.costo_total, 0);
    }
}
