//! Read models behind the HTML pages. Nothing here writes.

use crate::calc::CalcError;
use crate::derive::db_err;
use crate::model::{GradeRecord, Student, Subject, SubjectAverage};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Shown as the student on every row of the general competency report.
// TODO: replace with the group tutor name once `alumnos` links to a group.
pub const GENERAL_REPORT_DISPLAY_NAME: &str = "LUIS ANGEL PEREZ LOPEZ";

pub fn load_students(conn: &Connection) -> Result<Vec<Student>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT id_alumno, COALESCE(nombre, ''), COALESCE(apellido_paterno, ''),
                    COALESCE(apellido_materno, '')
             FROM alumnos
             ORDER BY id_alumno",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], student_from_row)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

pub fn find_student(conn: &Connection, id_alumno: i64) -> Result<Option<Student>, CalcError> {
    conn.query_row(
        "SELECT id_alumno, COALESCE(nombre, ''), COALESCE(apellido_paterno, ''),
                COALESCE(apellido_materno, '')
         FROM alumnos
         WHERE id_alumno = ?",
        [id_alumno],
        student_from_row,
    )
    .optional()
    .map_err(db_err("db_query_failed"))
}

/// Student ids only; name columns may be NULL in older databases.
pub fn load_student_ids(conn: &Connection) -> Result<Vec<i64>, CalcError> {
    let mut stmt = conn
        .prepare("SELECT id_alumno FROM alumnos ORDER BY id_alumno")
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| r.get(0))
        .and_then(|it| it.collect::<Result<Vec<i64>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

fn student_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id_alumno: r.get(0)?,
        nombre: r.get(1)?,
        apellido_paterno: r.get(2)?,
        apellido_materno: r.get(3)?,
    })
}

pub fn load_subjects(conn: &Connection) -> Result<Vec<Subject>, CalcError> {
    let mut stmt = conn
        .prepare("SELECT id_asignatura, descripcion FROM asignaturas ORDER BY id_asignatura")
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Subject {
                id_asignatura: r.get(0)?,
                descripcion: r.get(1)?,
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

/// Grade rows ordered by student, subject and unit. `None` loads every
/// student.
pub fn load_grades(
    conn: &Connection,
    id_alumno: Option<i64>,
) -> Result<Vec<GradeRecord>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT id_alumno, id_asignatura, unidad, calificacion
             FROM alumnos_asignaturas
             WHERE ?1 IS NULL OR id_alumno = ?1
             ORDER BY id_alumno, id_asignatura, unidad",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([id_alumno], |r| {
            Ok(GradeRecord {
                id_alumno: r.get(0)?,
                id_asignatura: r.get(1)?,
                unidad: r.get(2)?,
                calificacion: r.get(3)?,
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

pub fn load_subject_averages(conn: &Connection) -> Result<Vec<SubjectAverage>, CalcError> {
    let mut stmt = conn
        .prepare("SELECT id_asignatura, promedio FROM promedios_asignaturas ORDER BY id")
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(SubjectAverage {
                id_asignatura: r.get(0)?,
                promedio: r.get(1)?,
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCell {
    pub unidad: i64,
    pub calificacion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectDetail {
    pub id_asignatura: i64,
    pub descripcion: String,
    /// `1..=max observed unit`, gaps included.
    pub unidades: Vec<i64>,
    pub califs_por_unidad: BTreeMap<i64, f64>,
    /// One cell per entry of `unidades`, `None` where the unit has no grade.
    pub celdas: Vec<UnitCell>,
    pub promedio_general: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDetail {
    pub alumno: Student,
    pub materias: Vec<SubjectDetail>,
}

pub fn assemble_subject_detail(
    subject: &Subject,
    grades: &[GradeRecord],
    promedio_general: Option<f64>,
) -> SubjectDetail {
    let mut califs_por_unidad = BTreeMap::new();
    let mut max_unidad = 0;
    for g in grades
        .iter()
        .filter(|g| g.id_asignatura == subject.id_asignatura)
    {
        // a repeated unit keeps its last grade
        califs_por_unidad.insert(g.unidad, g.calificacion);
        max_unidad = max_unidad.max(g.unidad);
    }

    let unidades: Vec<i64> = (1..=max_unidad).collect();
    let celdas = unidades
        .iter()
        .map(|u| UnitCell {
            unidad: *u,
            calificacion: califs_por_unidad.get(u).copied(),
        })
        .collect();

    SubjectDetail {
        id_asignatura: subject.id_asignatura,
        descripcion: subject.descripcion.clone(),
        unidades,
        califs_por_unidad,
        celdas,
        promedio_general,
    }
}

/// Every subject with the student's unit grades and the subject's overall
/// average, if one has been computed.
pub fn student_detail(conn: &Connection, id_alumno: i64) -> Result<StudentDetail, CalcError> {
    let Some(alumno) = find_student(conn, id_alumno)? else {
        return Err(CalcError::new(
            "not_found",
            format!("student {} not found", id_alumno),
        ));
    };

    let subjects = load_subjects(conn)?;
    let grades = load_grades(conn, Some(id_alumno))?;
    let averages: HashMap<i64, f64> = load_subject_averages(conn)?
        .into_iter()
        .map(|a| (a.id_asignatura, a.promedio))
        .collect();

    let materias = subjects
        .iter()
        .map(|s| assemble_subject_detail(s, &grades, averages.get(&s.id_asignatura).copied()))
        .collect();

    Ok(StudentDetail { alumno, materias })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingReportRow {
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub cantidad_parciales: i64,
    pub costo_parciales: i64,
    pub cantidad_semestrales: i64,
    pub costo_semestrales: i64,
    pub costo_total: i64,
}

/// Billing joined with student identity and indicator counts, ordered by
/// surnames then name under SQLite's BINARY collation.
pub fn billing_report(conn: &Connection) -> Result<Vec<BillingReportRow>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT COALESCE(a.nombre, ''), COALESCE(a.apellido_paterno, ''),
                    COALESCE(a.apellido_materno, ''),
                    ir.cantidad_parciales, i.costo_parciales,
                    ir.cantidad_semestrales, i.costo_semestrales,
                    i.costo_total
             FROM ingresos i
             JOIN alumnos a ON a.id_alumno = i.id_alumno
             JOIN indicadores_rendimiento ir ON ir.id_alumno = a.id_alumno
             ORDER BY a.apellido_paterno, a.apellido_materno, a.nombre",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(BillingReportRow {
                nombre: r.get(0)?,
                apellido_paterno: r.get(1)?,
                apellido_materno: r.get(2)?,
                cantidad_parciales: r.get::<_, Option<i64>>(3)?.unwrap_or(0),
                costo_parciales: r.get(4)?,
                cantidad_semestrales: r.get::<_, Option<i64>>(5)?.unwrap_or(0),
                costo_semestrales: r.get(6)?,
                costo_total: r.get(7)?,
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyReportRow {
    pub nombre_alumno: String,
    pub nombre_asignatura: String,
    pub promedio: f64,
    pub acronimo: String,
}

pub fn general_competency_report(conn: &Connection) -> Result<Vec<CompetencyReportRow>, CalcError> {
    let mut stmt = conn
        .prepare(
            "SELECT a.descripcion, c.promedio, c.acronimo
             FROM competencias c
             JOIN asignaturas a ON a.id_asignatura = c.id_asignatura
             WHERE c.id_alumno IS NULL
             ORDER BY c.id",
        )
        .map_err(db_err("db_query_failed"))?;
    let rows = stmt
        .query_map([], |r| {
            Ok(CompetencyReportRow {
                nombre_alumno: GENERAL_REPORT_DISPLAY_NAME.to_string(),
                nombre_asignatura: r.get(0)?,
                promedio: r.get(1)?,
                acronimo: r.get(2)?,
            })
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(db_err("db_query_failed"))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(id_asignatura: i64, unidad: i64, calificacion: f64) -> GradeRecord {
        GradeRecord {
            id_alumno: 1,
            id_asignatura,
            unidad,
            calificacion,
        }
    }

    fn subject(id: i64, desc: &str) -> Subject {
        Subject {
            id_asignatura: id,
            descripcion: desc.to_string(),
        }
    }

    #[test]
    fn unit_gaps_stay_absent() {
        let grades = vec![grade(1, 1, 90.0), grade(1, 3, 70.0), grade(2, 1, 50.0)];
        let d = assemble_subject_detail(&subject(1, "Matemáticas"), &grades, Some(80.0));

        assert_eq!(d.unidades, vec![1, 2, 3]);
        assert_eq!(d.califs_por_unidad.len(), 2);
        assert_eq!(d.califs_por_unidad.get(&2), None);
        assert_eq!(d.celdas[1].calificacion, None);
        assert_eq!(d.celdas[2].calificacion, Some(70.0));
        assert_eq!(d.promedio_general, Some(80.0));
    }

    #[test]
    fn subject_without_grades_has_no_units() {
        let grades = vec![grade(2, 1, 50.0)];
        let d = assemble_subject_detail(&subject(1, "Historia"), &grades, None);
        assert!(d.unidades.is_empty());
        assert!(d.celdas.is_empty());
        assert_eq!(d.promedio_general, None);
    }

    #[test]
    fn repeated_unit_keeps_last_grade() {
        let grades = vec![grade(1, 1, 60.0), grade(1, 1, 65.0)];
        let d = assemble_subject_detail(&subject(1, "Física"), &grades, None);
        assert_eq!(d.unidades, vec![1]);
        assert_eq!(d.califs_por_unidad.get(&1), Some(&65.0));
    }
}
