//! Student report filtering and CSV export

use crate::error::{Result, ViewError};
use chrono::NaiveDate;
use llama_core::EntityId;
use llama_core::types::{MasterLists, StudentReport};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Average at or above which a student counts as passing
pub const PASSING_AVERAGE: f64 = 13.0;

/// CSV header, in column order
pub const CSV_HEADER: [&str; 8] = [
    "Alumno",
    "Institucion",
    "Carrera",
    "Ciclo",
    "Curso",
    "Lecciones",
    "Promedio",
    "Estado",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Performance bucket filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PerformanceFilter {
    /// No restriction
    #[default]
    All,
    /// Average of at least [`PASSING_AVERAGE`]
    Passing,
    /// Average below [`PASSING_AVERAGE`]
    AtRisk,
}

impl PerformanceFilter {
    fn admits(self, average: f64) -> bool {
        match self {
            Self::All => true,
            Self::Passing => average >= PASSING_AVERAGE,
            Self::AtRisk => average < PASSING_AVERAGE,
        }
    }
}

/// Report filters; every set field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    /// Case-insensitive substring of the student name
    pub search: String,
    /// Institution id
    pub institution_id: Option<EntityId>,
    /// Career id
    pub career_id: Option<EntityId>,
    /// Course id, resolved to a name through the master course list
    pub course_id: Option<EntityId>,
    /// Performance bucket
    pub performance: PerformanceFilter,
}

impl ReportFilter {
    /// Students matching every filter, in input order
    ///
    /// A course id that is not in `lists.courses` does not restrict.
    #[must_use]
    pub fn apply<'a>(
        &self,
        students: &'a [StudentReport],
        lists: &MasterLists,
    ) -> Vec<&'a StudentReport> {
        let needle = self.search.to_lowercase();
        let course_name = self.course_id.and_then(|id| {
            let found = lists.courses.iter().find(|course| course.id == id);
            if found.is_none() {
                tracing::debug!(course_id = id, "course filter not in master list, ignoring");
            }
            found.map(|course| course.name.as_str())
        });

        students
            .iter()
            .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
            .filter(|s| self.institution_id.is_none_or(|id| s.institution_id == Some(id)))
            .filter(|s| self.career_id.is_none_or(|id| s.career_id == Some(id)))
            .filter(|s| course_name.is_none_or(|name| s.assigned_course == name))
            .filter(|s| self.performance.admits(s.overall_average))
            .collect()
    }
}

/// Encode students as CSV
///
/// The output starts with a UTF-8 BOM, uses `\n` line endings and quotes
/// every non-numeric field. An empty slice encodes to an empty buffer.
pub fn to_csv(students: &[&StudentReport]) -> Result<Vec<u8>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::NonNumeric)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buffer);

        writer.write_record(CSV_HEADER)?;
        for student in students {
            writer.write_record([
                student.name.clone(),
                student.institution.clone(),
                student.career.clone(),
                student.cycle.clone(),
                student.assigned_course.clone(),
                student.completed_lessons.to_string(),
                student.overall_average.to_string(),
                student.performance_level.clone(),
            ])?;
        }
        writer.flush()?;
    }

    Ok(buffer)
}

/// Export file name for `date`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("reporte_estudiantes_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the CSV export into `dir`
///
/// Returns `None` without touching the filesystem when there is nothing to
/// export.
pub fn export_csv(
    students: &[&StudentReport],
    dir: &Path,
    date: NaiveDate,
) -> Result<Option<PathBuf>> {
    if students.is_empty() {
        tracing::info!("no students match the filters, nothing to export");
        return Ok(None);
    }

    if !dir.is_dir() {
        return Err(ViewError::InvalidTarget {
            path: dir.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let bytes = to_csv(students)?;
    let path = dir.join(export_file_name(date));
    let mut file = std::fs::File::create(&path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    tracing::info!(path = %path.display(), rows = students.len(), "report exported");
    Ok(Some(path))
}

/// [`export_csv`] dated with the local calendar day
pub fn export_csv_today(students: &[&StudentReport], dir: &Path) -> Result<Option<PathBuf>> {
    export_csv(students, dir, chrono::Local::now().date_naive())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use llama_core::types::Choice;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn students() -> Vec<StudentReport> {
        serde_json::from_value(json!([
            {
                "id": 1, "nombre": "Ana Quispe", "institucion": "UNI", "institucion_id": 1,
                "carrera": "Sistemas", "carrera_id": 10, "ciclo": "Ciclo I",
                "curso_asignado": "Álgebra", "lecciones_completadas": 8,
                "promedio_global": 16.5, "nivel_rendimiento": "Alto"
            },
            {
                "id": 2, "nombre": "Luis Mamani", "institucion": "UNI", "institucion_id": "1",
                "carrera": "Civil", "carrera_id": 11, "ciclo": "Ciclo II",
                "curso_asignado": "Cálculo", "lecciones_completadas": "3",
                "promedio_global": "11", "nivel_rendimiento": "Bajo"
            },
            {
                "id": 3, "nombre": "Rosa Condori", "institucion": "UNMSM", "institucion_id": 2,
                "carrera": "Sistemas", "carrera_id": 12, "ciclo": "Ciclo I",
                "curso_asignado": "Álgebra", "lecciones_completadas": 5,
                "promedio_global": 13, "nivel_rendimiento": "Medio"
            }
        ]))
        .unwrap()
    }

    fn lists() -> MasterLists {
        MasterLists {
            institutions: Vec::new(),
            careers: Vec::new(),
            courses: vec![
                Choice { id: 100, name: "Álgebra".to_string() },
                Choice { id: 200, name: "Cálculo".to_string() },
            ],
        }
    }

    fn ids(rows: &[&StudentReport]) -> Vec<EntityId> {
        rows.iter().map(|s| s.id).collect()
    }

    #[rstest]
    #[case(ReportFilter::default(), vec![1, 2, 3])]
    #[case(ReportFilter { search: "QUISPE".into(), ..Default::default() }, vec![1])]
    #[case(ReportFilter { institution_id: Some(1), ..Default::default() }, vec![1, 2])]
    #[case(ReportFilter { career_id: Some(12), ..Default::default() }, vec![3])]
    #[case(ReportFilter { course_id: Some(100), ..Default::default() }, vec![1, 3])]
    #[case(ReportFilter { course_id: Some(999), ..Default::default() }, vec![1, 2, 3])]
    #[case(ReportFilter { performance: PerformanceFilter::Passing, ..Default::default() }, vec![1, 3])]
    #[case(ReportFilter { performance: PerformanceFilter::AtRisk, ..Default::default() }, vec![2])]
    #[case(
        ReportFilter {
            institution_id: Some(1),
            course_id: Some(100),
            performance: PerformanceFilter::Passing,
            ..Default::default()
        },
        vec![1]
    )]
    fn test_filters(#[case] filter: ReportFilter, #[case] expected: Vec<EntityId>) {
        let all = students();
        assert_eq!(ids(&filter.apply(&all, &lists())), expected);
    }

    #[test]
    fn test_csv_layout() {
        let all = students();
        let rows: Vec<&StudentReport> = all.iter().collect();
        let bytes = to_csv(&rows).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), rows.len() + 1);
        assert_eq!(lines[0], "\"Alumno\",\"Institucion\",\"Carrera\",\"Ciclo\",\"Curso\",\"Lecciones\",\"Promedio\",\"Estado\"");
        assert_eq!(
            lines[1],
            "\"Ana Quispe\",\"UNI\",\"Sistemas\",\"Ciclo I\",\"Álgebra\",8,16.5,\"Alto\""
        );
        assert_eq!(lines[2], "\"Luis Mamani\",\"UNI\",\"Civil\",\"Ciclo II\",\"Cálculo\",3,11,\"Bajo\"");
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        let mut all = students();
        all[0].name = "Quispe, Ana".to_string();
        let bytes = to_csv(&[&all[0]]).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("\"Quispe, Ana\""));
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        assert!(to_csv(&[]).unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(export_csv(&[], dir.path(), date).unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_writes_dated_file() {
        let all = students();
        let filtered = ReportFilter {
            performance: PerformanceFilter::AtRisk,
            ..Default::default()
        }
        .apply(&all, &lists());

        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let path = export_csv(&filtered, dir.path(), date).unwrap().unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "reporte_estudiantes_2025-03-09.csv"
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_export_rejects_missing_directory() {
        let all = students();
        let rows: Vec<&StudentReport> = all.iter().collect();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let err = export_csv(&rows, &missing, date).unwrap_err();
        assert!(matches!(err, ViewError::InvalidTarget { .. }));
    }
}
