use crate::calc::{subject_acronym, BillingAmounts, CompetencyBand, RiskCounts, UNKNOWN_ACRONYM};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub id_alumno: i64,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub id_asignatura: i64,
    pub descripcion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeRecord {
    pub id_alumno: i64,
    pub id_asignatura: i64,
    pub unidad: i64,
    pub calificacion: f64,
}

/// Subject acronyms keyed by subject id.
#[derive(Debug, Clone, Default)]
pub struct AcronymTable(HashMap<i64, String>);

impl AcronymTable {
    pub fn from_subjects<'a, I>(subjects: I) -> Self
    where
        I: IntoIterator<Item = &'a Subject>,
    {
        AcronymTable(
            subjects
                .into_iter()
                .map(|s| (s.id_asignatura, subject_acronym(&s.descripcion)))
                .collect(),
        )
    }

    pub fn lookup(&self, id_asignatura: i64) -> &str {
        self.0
            .get(&id_asignatura)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_ACRONYM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub id_asignatura: i64,
    pub promedio: f64,
}

/// Average and acronym shared by both kinds of competency rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyScore {
    pub id_asignatura: i64,
    pub promedio: f64,
    pub acronimo: String,
}

/// A row of `competencias`. Stored in one table; the general variant is the
/// one persisted with a NULL `id_alumno`.
#[derive(Debug, Clone, PartialEq)]
pub enum CompetencyRecord {
    PerStudent {
        id_alumno: i64,
        score: CompetencyScore,
    },
    General {
        band: CompetencyBand,
        score: CompetencyScore,
    },
}

impl CompetencyRecord {
    pub fn per_student(id_alumno: i64, id_asignatura: i64, promedio: f64, acronimo: &str) -> Self {
        CompetencyRecord::PerStudent {
            id_alumno,
            score: CompetencyScore {
                id_asignatura,
                promedio,
                acronimo: acronimo.to_string(),
            },
        }
    }

    pub fn general(average: SubjectAverage) -> Self {
        let band = CompetencyBand::classify(average.promedio);
        CompetencyRecord::General {
            band,
            score: CompetencyScore {
                id_asignatura: average.id_asignatura,
                promedio: average.promedio,
                acronimo: band.code().to_string(),
            },
        }
    }

    pub fn score(&self) -> &CompetencyScore {
        match self {
            CompetencyRecord::PerStudent { score, .. } | CompetencyRecord::General { score, .. } => {
                score
            }
        }
    }

    pub fn student_id(&self) -> Option<i64> {
        match self {
            CompetencyRecord::PerStudent { id_alumno, .. } => Some(*id_alumno),
            CompetencyRecord::General { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceIndicator {
    pub id_alumno: i64,
    pub cantidad_semestrales: i64,
    pub cantidad_parciales: i64,
}

impl PerformanceIndicator {
    pub fn new(id_alumno: i64, counts: RiskCounts) -> Self {
        Self {
            id_alumno,
            cantidad_semestrales: counts.semestrales,
            cantidad_parciales: counts.parciales,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingRecord {
    pub id_alumno: i64,
    #[serde(flatten)]
    pub amounts: BillingAmounts,
}
