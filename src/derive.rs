//! Batch recomputation passes. Each pass deletes its target rows and rebuilds
//! them from current source data inside a single `IMMEDIATE` transaction; an
//! error anywhere drops the transaction, which rolls the pass back.

use crate::calc::{billing_for, CalcError, RiskCounts};
use crate::model::{
    AcronymTable, BillingRecord, CompetencyRecord, PerformanceIndicator, SubjectAverage,
};
use crate::reports;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct AveragesSummary {
    pub student_subject_rows: usize,
    pub subject_averages: Vec<SubjectAverage>,
}

pub(crate) fn db_err(code: &'static str) -> impl Fn(rusqlite::Error) -> CalcError {
    move |e| CalcError::new(code, e.to_string())
}

fn begin(conn: &mut Connection) -> Result<Transaction<'_>, CalcError> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(db_err("db_tx_failed"))
}

fn insert_competency(conn: &Connection, record: &CompetencyRecord) -> Result<(), CalcError> {
    let score = record.score();
    conn.execute(
        "INSERT INTO competencias(promedio, acronimo, id_asignatura, id_alumno)
         VALUES(?, ?, ?, ?)",
        (
            score.promedio,
            &score.acronimo,
            score.id_asignatura,
            record.student_id(),
        ),
    )
    .map_err(db_err("db_insert_failed"))?;
    Ok(())
}

/// Rounded `AVG(calificacion)` per (student, subject).
fn student_subject_averages(conn: &Connection) -> Result<Vec<(i64, SubjectAverage)>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT id_alumno, id_asignatura, AVG(calificacion)
             FROM alumnos_asignaturas
             GROUP BY id_alumno, id_asignatura
             ORDER BY id_alumno, id_asignatura",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                SubjectAverage {
                    id_asignatura: r.get(1)?,
                    promedio: crate::calc::round_off_1_decimal(r.get(2)?),
                },
            ))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

/// Rounded `AVG(calificacion)` per subject over every student.
fn overall_subject_averages(conn: &Connection) -> Result<Vec<SubjectAverage>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT id_asignatura, AVG(calificacion)
             FROM alumnos_asignaturas
             GROUP BY id_asignatura
             ORDER BY id_asignatura",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(SubjectAverage {
                id_asignatura: r.get(0)?,
                promedio: crate::calc::round_off_1_decimal(r.get(1)?),
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

/// Rebuilds `promedios_asignaturas` and the per-student rows of
/// `competencias`.
///
/// The whole `competencias` table is cleared, general rows included; they come
/// back on the next [`recompute_general_competencies`] run.
pub fn recompute_averages(conn: &mut Connection) -> Result<AveragesSummary, CalcError> {
    let tx = begin(conn)?;

    tx.execute("DELETE FROM competencias", [])
        .map_err(db_err("db_delete_failed"))?;
    tx.execute("DELETE FROM promedios_asignaturas", [])
        .map_err(db_err("db_delete_failed"))?;

    let acronyms = AcronymTable::from_subjects(&reports::load_subjects(&tx)?);

    let pairs = student_subject_averages(&tx)?;
    for (id_alumno, avg) in &pairs {
        let record = CompetencyRecord::per_student(
            *id_alumno,
            avg.id_asignatura,
            avg.promedio,
            acronyms.lookup(avg.id_asignatura),
        );
        insert_competency(&tx, &record)?;
    }

    let subject_averages = overall_subject_averages(&tx)?;
    for avg in &subject_averages {
        tx.execute(
            "INSERT INTO promedios_asignaturas(promedio, id_asignatura) VALUES(?, ?)",
            (avg.promedio, avg.id_asignatura),
        )
        .map_err(db_err("db_insert_failed"))?;
    }

    tx.commit().map_err(db_err("db_commit_failed"))?;

    info!(
        student_subject_rows = pairs.len(),
        subject_rows = subject_averages.len(),
        "averages recomputed"
    );
    Ok(AveragesSummary {
        student_subject_rows: pairs.len(),
        subject_averages,
    })
}

/// Rebuilds `indicadores_rendimiento` with one row per student, zero counts
/// included.
pub fn recompute_indicators(conn: &mut Connection) -> Result<Vec<PerformanceIndicator>, CalcError> {
    let tx = begin(conn)?;

    tx.execute("DELETE FROM indicadores_rendimiento", [])
        .map_err(db_err("db_delete_failed"))?;

    let student_ids = reports::load_student_ids(&tx)?;

    // student -> subject -> unit scores, in unit order
    let mut by_student: BTreeMap<i64, BTreeMap<i64, Vec<f64>>> = BTreeMap::new();
    for g in reports::load_grades(&tx, None)? {
        by_student
            .entry(g.id_alumno)
            .or_default()
            .entry(g.id_asignatura)
            .or_default()
            .push(g.calificacion);
    }

    let mut out = Vec::with_capacity(student_ids.len());
    for id_alumno in student_ids {
        let counts = by_student
            .get(&id_alumno)
            .map(|subjects| RiskCounts::tally(subjects.values().map(Vec::as_slice)))
            .unwrap_or_default();
        let indicator = PerformanceIndicator::new(id_alumno, counts);
        tx.execute(
            "INSERT INTO indicadores_rendimiento(id_alumno, cantidad_semestrales, cantidad_parciales)
             VALUES(?, ?, ?)",
            (
                indicator.id_alumno,
                indicator.cantidad_semestrales,
                indicator.cantidad_parciales,
            ),
        )
        .map_err(db_err("db_insert_failed"))?;
        out.push(indicator);
    }

    tx.commit().map_err(db_err("db_commit_failed"))?;

    info!(students = out.len(), "indicators recomputed");
    Ok(out)
}

fn indicator_counts(conn: &Connection) -> Result<Vec<(i64, Option<i64>, Option<i64>)>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT id_alumno, cantidad_parciales, cantidad_semestrales
             FROM indicadores_rendimiento
             ORDER BY id",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows: Vec<(i64, Option<i64>, Option<i64>)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

/// Rebuilds `ingresos` from the current indicators.
pub fn recompute_billing(conn: &mut Connection) -> Result<Vec<BillingRecord>, CalcError> {
    let tx = begin(conn)?;

    tx.execute("DELETE FROM ingresos", [])
        .map_err(db_err("db_delete_failed"))?;

    let mut out = Vec::new();
    for (id_alumno, parciales, semestrales) in indicator_counts(&tx)? {
        let amounts = billing_for(parciales, semestrales);
        tx.execute(
            "INSERT INTO ingresos(costo_parciales, costo_semestrales, costo_total, id_alumno)
             VALUES(?, ?, ?, ?)",
            (
                amounts.costo_parciales,
                amounts.costo_semestrales,
                amounts.costo_total,
                id_alumno,
            ),
        )
        .map_err(db_err("db_insert_failed"))?;
        out.push(BillingRecord { id_alumno, amounts });
    }

    tx.commit().map_err(db_err("db_commit_failed"))?;

    info!(
        students = out.len(),
        total = out.iter().map(|b| b.amounts.costo_total).sum::<i64>(),
        "billing recomputed"
    );
    Ok(out)
}

/// Replaces the general (`id_alumno IS NULL`) competency rows with a band per
/// overall subject average. Per-student rows are left alone.
pub fn recompute_general_competencies(
    conn: &mut Connection,
) -> Result<Vec<CompetencyRecord>, CalcError> {
    let tx = begin(conn)?;

    tx.execute("DELETE FROM competencias WHERE id_alumno IS NULL", [])
        .map_err(db_err("db_delete_failed"))?;

    let mut out = Vec::new();
    for avg in reports::load_subject_averages(&tx)? {
        let record = CompetencyRecord::general(avg);
        if let CompetencyRecord::General { band, score } = &record {
            debug!(
                id_asignatura = score.id_asignatura,
                promedio = score.promedio,
                band = %band,
                "subject banded"
            );
        }
        insert_competency(&tx, &record)?;
        out.push(record);
    }

    tx.commit().map_err(db_err("db_commit_failed"))?;

    info!(subjects = out.len(), "general competencies recomputed");
    Ok(out)
}
