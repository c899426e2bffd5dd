use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Plain connection to an existing database; no schema work.
pub fn connect(db_path: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.to_string_lossy()))?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Opens the records database, creating any missing tables.
///
/// Existing tables are left untouched so a pre-populated `escolar.db` keeps
/// its data and column layout.
pub fn open_db(db_path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }
    let conn = connect(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS alumnos(
            id_alumno INTEGER PRIMARY KEY,
            nombre TEXT NOT NULL,
            apellido_paterno TEXT NOT NULL,
            apellido_materno TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS asignaturas(
            id_asignatura INTEGER PRIMARY KEY,
            descripcion TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS alumnos_asignaturas(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            id_alumno INTEGER NOT NULL,
            id_asignatura INTEGER NOT NULL,
            unidad INTEGER NOT NULL,
            calificacion REAL NOT NULL,
            FOREIGN KEY(id_alumno) REFERENCES alumnos(id_alumno),
            FOREIGN KEY(id_asignatura) REFERENCES asignaturas(id_asignatura)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_alumnos_asignaturas_alumno
         ON alumnos_asignaturas(id_alumno, id_asignatura)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS promedios_asignaturas(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            promedio REAL NOT NULL,
            id_asignatura INTEGER NOT NULL,
            FOREIGN KEY(id_asignatura) REFERENCES asignaturas(id_asignatura)
        )",
        [],
    )?;

    // id_alumno NULL marks a general (class-level) row.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS competencias(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            promedio REAL NOT NULL,
            acronimo TEXT NOT NULL,
            id_asignatura INTEGER NOT NULL,
            id_alumno INTEGER,
            FOREIGN KEY(id_asignatura) REFERENCES asignaturas(id_asignatura),
            FOREIGN KEY(id_alumno) REFERENCES alumnos(id_alumno)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_competencias_alumno ON competencias(id_alumno)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS indicadores_rendimiento(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            id_alumno INTEGER NOT NULL,
            cantidad_semestrales INTEGER,
            cantidad_parciales INTEGER,
            FOREIGN KEY(id_alumno) REFERENCES alumnos(id_alumno)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ingresos(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            costo_parciales INTEGER NOT NULL,
            costo_semestrales INTEGER NOT NULL,
            costo_total INTEGER NOT NULL,
            id_alumno INTEGER NOT NULL,
            FOREIGN KEY(id_alumno) REFERENCES alumnos(id_alumno)
        )",
        [],
    )?;

    Ok(conn)
}

/// Number of rows currently in `table`. Used by health checks and tests.
pub fn count_rows(conn: &Connection, table: &str) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let n = conn
        .query_row(&sql, [], |r| r.get(0))
        .with_context(|| format!("failed to count rows in {}", table))?;
    Ok(n)
}
