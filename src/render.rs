use crate::model::Student;
use crate::reports::{BillingReportRow, CompetencyReportRow, StudentDetail};
use serde::Serialize;
use tera::{Context, Tera};

/// Fixed confirmation returned once averages are stored.
pub const AVERAGES_DONE_HTML: &str =
    "<h2>¡Promedios calculados y guardados exitosamente!</h2><a href='/'>Volver al inicio</a>";

const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("alumno.html", include_str!("../templates/alumno.html")),
    ("ingresos.html", include_str!("../templates/ingresos.html")),
    (
        "competencias_generales.html",
        include_str!("../templates/competencias_generales.html"),
    ),
];

/// HTML pages compiled once at startup. Output is autoescaped.
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Self { tera })
    }

    fn render<T: Serialize>(&self, name: &str, model: &T) -> Result<String, tera::Error> {
        self.tera.render(name, &Context::from_serialize(model)?)
    }

    pub fn index(&self, alumnos: &[Student]) -> Result<String, tera::Error> {
        #[derive(Serialize)]
        struct Model<'a> {
            alumnos: &'a [Student],
        }
        self.render("index.html", &Model { alumnos })
    }

    pub fn student(&self, detail: &StudentDetail) -> Result<String, tera::Error> {
        self.render("alumno.html", detail)
    }

    pub fn billing(&self, ingresos: &[BillingReportRow]) -> Result<String, tera::Error> {
        #[derive(Serialize)]
        struct Model<'a> {
            ingresos: &'a [BillingReportRow],
        }
        self.render("ingresos.html", &Model { ingresos })
    }

    pub fn general_competencies(
        &self,
        competencias: &[CompetencyReportRow],
    ) -> Result<String, tera::Error> {
        #[derive(Serialize)]
        struct Model<'a> {
            competencias: &'a [CompetencyReportRow],
        }
        self.render("competencias_generales.html", &Model { competencias })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{SubjectDetail, UnitCell};
    use std::collections::BTreeMap;

    fn student() -> Student {
        Student {
            id_alumno: 7,
            nombre: "Ana".to_string(),
            apellido_paterno: "<Ruiz>".to_string(),
            apellido_materno: "Díaz".to_string(),
        }
    }

    #[test]
    fn index_links_each_student_and_escapes_names() {
        let pages = Pages::new().expect("compile templates");
        let html = pages.index(&[student()]).expect("render");
        assert!(html.contains("href=\"/alumno/7\""));
        assert!(html.contains("&lt;Ruiz&gt;"));
        assert!(!html.contains("<Ruiz>"));
    }

    #[test]
    fn detail_marks_missing_units_and_averages() {
        let pages = Pages::new().expect("compile templates");
        let mut califs = BTreeMap::new();
        califs.insert(1, 90.0);
        let detail = StudentDetail {
            alumno: student(),
            materias: vec![SubjectDetail {
                id_asignatura: 1,
                descripcion: "Química".to_string(),
                unidades: vec![1, 2],
                califs_por_unidad: califs,
                celdas: vec![
                    UnitCell {
                        unidad: 1,
                        calificacion: Some(90.0),
                    },
                    UnitCell {
                        unidad: 2,
                        calificacion: None,
                    },
                ],
                promedio_general: None,
            }],
        };
        let html = pages.student(&detail).expect("render");
        assert!(html.contains("Química"));
        assert!(html.contains("U2: -"));
        assert!(html.contains("N/D"));
    }
}
