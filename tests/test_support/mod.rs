#![allow(dead_code)]

use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Fixture {
    _dir: TempDir,
    pub db_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("escolar.db");
        escolard::db::open_db(&db_path).expect("bootstrap schema");
        Self { _dir: dir, db_path }
    }

    /// Database created before the bootstrap, with nullable name columns.
    pub fn with_nullable_names() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("escolar.db");
        Connection::open(&db_path)
            .expect("open")
            .execute_batch(
                "CREATE TABLE alumnos(
                    id_alumno INTEGER PRIMARY KEY,
                    nombre TEXT,
                    apellido_paterno TEXT,
                    apellido_materno TEXT
                );",
            )
            .expect("create nullable alumnos");
        escolard::db::open_db(&db_path).expect("bootstrap schema");
        Self { _dir: dir, db_path }
    }

    pub fn conn(&self) -> Connection {
        escolard::db::connect(&self.db_path).expect("connect")
    }
}

pub fn add_student(conn: &Connection, id: i64, nombre: &str, paterno: &str, materno: &str) {
    conn.execute(
        "INSERT INTO alumnos(id_alumno, nombre, apellido_paterno, apellido_materno)
         VALUES(?, ?, ?, ?)",
        (id, nombre, paterno, materno),
    )
    .expect("insert alumno");
}

pub fn add_student_without_surname(conn: &Connection, id: i64, nombre: &str, paterno: &str) {
    conn.execute(
        "INSERT INTO alumnos(id_alumno, nombre, apellido_paterno, apellido_materno)
         VALUES(?, ?, ?, NULL)",
        (id, nombre, paterno),
    )
    .expect("insert alumno");
}

pub fn add_subject(conn: &Connection, id: i64, descripcion: &str) {
    conn.execute(
        "INSERT INTO asignaturas(id_asignatura, descripcion) VALUES(?, ?)",
        (id, descripcion),
    )
    .expect("insert asignatura");
}

pub fn add_grade(conn: &Connection, id_alumno: i64, id_asignatura: i64, unidad: i64, calificacion: f64) {
    conn.execute(
        "INSERT INTO alumnos_asignaturas(id_alumno, id_asignatura, unidad, calificacion)
         VALUES(?, ?, ?, ?)",
        (id_alumno, id_asignatura, unidad, calificacion),
    )
    .expect("insert calificacion");
}

/// Grades for units 1..=n in order.
pub fn add_grades(conn: &Connection, id_alumno: i64, id_asignatura: i64, scores: &[f64]) {
    for (i, s) in scores.iter().enumerate() {
        add_grade(conn, id_alumno, id_asignatura, i as i64 + 1, *s);
    }
}

/// One student, one subject, grades [60, 70, 75].
pub fn seed_single_at_risk(conn: &Connection) {
    add_student(conn, 1, "Luis", "Pérez", "López");
    add_subject(conn, 1, "Matemáticas");
    add_grades(conn, 1, 1, &[60.0, 70.0, 75.0]);
}
