//! Reports page: student table, CSV export and charts

use crate::shell::Shell;
use llama_client::resources;
use llama_core::types::{AnalyticsOverview, StudentReport};
use llama_views::charts::{self, Bar};
use llama_views::reports::export_csv_today;
use llama_views::{Column, ReportFilter, TableModel};
use std::path::Path;

const BAR_WIDTH: usize = 30;

fn student_columns() -> Vec<Column<StudentReport>> {
    vec![
        Column::keyed("Student", "nombre", |s: &StudentReport| s.name.as_str().into()),
        Column::keyed("Institution", "institucion", |s: &StudentReport| {
            s.institution.as_str().into()
        }),
        Column::keyed("Career", "carrera", |s: &StudentReport| s.career.as_str().into()),
        Column::keyed("Cycle", "ciclo", |s: &StudentReport| s.cycle.as_str().into()),
        Column::keyed("Course", "curso_asignado", |s: &StudentReport| {
            s.assigned_course.as_str().into()
        }),
        Column::keyed("Lessons", "lecciones_completadas", |s: &StudentReport| {
            s.completed_lessons.into()
        }),
        Column::keyed("Average", "promedio_global", |s: &StudentReport| {
            s.overall_average.into()
        }),
        Column::keyed("Level", "nivel_rendimiento", |s: &StudentReport| {
            s.performance_level.as_str().into()
        }),
    ]
}

pub(crate) async fn students(
    shell: &Shell,
    filter: &ReportFilter,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let (overview, advanced) = resources::reports(&shell.api)
        .await
        .map_err(|err| shell.failure(&err, "Failed to load reports"))?;

    println!("At risk (average < 13)   {}", overview.stats.at_risk_count);
    println!("Excellence (average > 17) {}", overview.stats.excellence_count);
    println!();

    let filtered = filter.apply(&advanced.students, &advanced.lists);
    tracing::debug!(total = advanced.students.len(), kept = filtered.len(), "report filtered");

    let mut table = TableModel::new(student_columns());
    table.set_rows(filtered.iter().copied().cloned().collect());
    print!("{}", table.render_text());

    if let Some(dir) = export {
        match export_csv_today(&filtered, dir)? {
            Some(path) => println!("Exported to {}", path.display()),
            None => println!("Nothing to export"),
        }
    }
    Ok(())
}

pub(crate) async fn charts(shell: &Shell) -> anyhow::Result<()> {
    let overview = resources::analytics_overview(&shell.api)
        .await
        .map_err(|err| shell.failure(&err, "Failed to load analytics"))?;
    print!("{}", render_overview(&overview));
    Ok(())
}

fn radar_bars(ranking: &[llama_core::types::ScoredName]) -> Vec<Bar> {
    charts::radar_points(ranking)
        .into_iter()
        .map(|point| Bar {
            label: point.subject,
            value: point.value,
        })
        .collect()
}

fn render_overview(overview: &AnalyticsOverview) -> String {
    let rates = &overview.pass_rates;
    let weekly = &overview.weekly;

    [
        charts::render_bars("Attempts, last 7 days", &charts::bars(&overview.activity), BAR_WIDTH),
        charts::render_pie("Pass rate (all)", &charts::pie_slices(&rates.general)),
        charts::render_pie("Pass rate (course 1)", &charts::pie_slices(&rates.first_course)),
        charts::render_pie("Pass rate (course 2)", &charts::pie_slices(&rates.second_course)),
        charts::render_bars("Best topics", &radar_bars(&overview.tops.best), BAR_WIDTH),
        charts::render_bars("Weakest topics", &radar_bars(&overview.tops.worst), BAR_WIDTH),
        charts::render_bars("Weekly average (course 1)", &charts::bars(&weekly.first_course), BAR_WIDTH),
        charts::render_bars("Weekly average (course 2)", &charts::bars(&weekly.second_course), BAR_WIDTH),
    ]
    .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overview_renders_every_section() {
        let overview: AnalyticsOverview = serde_json::from_value(json!({
            "stats": {"alumnosRiesgoCount": 4, "excelenciaAcademica": 2},
            "graficoLinea": [{"fecha": "Lun", "intentos": 12}],
            "pasteles": {"general": [{"name": "Aprobados", "value": 30}, {"name": "Desaprobados", "value": 1}]},
            "tops": {"mejores": [{"name": "Sistemas de ecuaciones", "promedio": 18}]},
            "semanal": {"curso1": [{"semana": "S1", "promedio": 14.5}]}
        }))
        .unwrap();

        let text = render_overview(&overview);
        assert!(text.contains("Attempts, last 7 days"));
        assert!(text.contains("Aprobados 30 97%"));
        assert!(text.contains("Sistemas de ecu..."));
        assert!(text.contains("S1 | "));
        assert!(text.contains("Weakest topics\n  (no data)"));
    }
}
