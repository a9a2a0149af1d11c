//! Resource pages: dashboard, listings and deletion

use crate::Resource;
use crate::shell::Shell;
use anyhow::bail;
use llama_client::resources::{
    self, CareerService, CharacterService, CourseService, CycleService, InstitutionService,
    ItemTypeService, LessonService, QuestionService, StoreItemService, StudentOrder,
    StudentService, TeacherService, TopicService,
};
use llama_client::{CrudController, ResourceService, Route};
use llama_core::EntityId;
use llama_core::types::{
    ActivityEntry, Career, Character, Course, Cycle, Institution, ItemType, Lesson, Question,
    StoreItem, Student, Teacher, Topic,
};
use llama_core::utils::{format_date, format_duration, resolve_image_url};
use llama_views::{CellValue, Column, TableModel};
use std::io::{BufRead, Write};

/// Table controls of `list`
#[derive(Debug, Default)]
pub(crate) struct ListOptions {
    pub(crate) search: String,
    pub(crate) sort: Option<String>,
    pub(crate) descending: bool,
    pub(crate) ranking: Option<StudentOrder>,
}

pub(crate) async fn dashboard(shell: &Shell) -> anyhow::Result<()> {
    let summary = resources::dashboard(&shell.api)
        .await
        .map_err(|err| shell.failure(&err, "Failed to load the dashboard"))?;

    let metrics = &summary.metrics;
    println!("Students  {}", metrics.students);
    println!("Teachers  {}", metrics.teachers);
    println!("Lessons   {}", metrics.lessons);
    println!("Sales     {}", metrics.sales);
    println!();

    let mut table = TableModel::new(activity_columns());
    table.set_rows(summary.activity_log);
    print!("{}", table.render_text());
    Ok(())
}

fn activity_columns() -> Vec<Column<ActivityEntry>> {
    vec![
        Column::keyed("Student", "alumno", |a: &ActivityEntry| a.student.as_str().into()),
        Column::keyed("Email", "correo", |a: &ActivityEntry| a.email.as_str().into()),
        Column::keyed("Lesson", "leccion", |a: &ActivityEntry| a.lesson.as_str().into()),
        Column::keyed("Course", "curso", |a: &ActivityEntry| a.course.as_str().into()),
        Column::keyed("Score", "nota", |a: &ActivityEntry| a.score.into()),
        Column::display("Date", |a: &ActivityEntry| {
            a.date.as_deref().map(format_date).unwrap_or_default()
        }),
    ]
}

pub(crate) async fn list(
    shell: &Shell,
    resource: Resource,
    parent: Option<EntityId>,
    options: &ListOptions,
) -> anyhow::Result<()> {
    let parent = parent.unwrap_or_default();
    let host = shell.host.clone();

    match resource {
        Resource::Institutions => show(shell, InstitutionService, institution_columns(), options, |_| {}).await,
        Resource::Careers => {
            let service = CareerService { institution_id: parent };
            show(shell, service, career_columns(), options, |_| {}).await
        }
        Resource::Teachers => show(shell, TeacherService, teacher_columns(), options, |_| {}).await,
        Resource::Students => {
            let ranking = options.ranking.unwrap_or_default();
            show(shell, StudentService, student_columns(), options, |rows| {
                StudentService::order(rows, ranking);
            })
            .await
        }
        Resource::Cycles => show(shell, CycleService, cycle_columns(), options, |_| {}).await,
        Resource::Courses => show(shell, CourseService, course_columns(), options, |_| {}).await,
        Resource::Topics => {
            let service = TopicService { course_id: parent };
            show(shell, service, topic_columns(), options, |_| {}).await
        }
        Resource::Lessons => {
            let service = LessonService { topic_id: parent };
            show(shell, service, lesson_columns(), options, |_| {}).await
        }
        Resource::Questions => {
            let service = QuestionService { lesson_id: parent };
            show(shell, service, question_columns(), options, |_| {}).await
        }
        Resource::Store => show(shell, StoreItemService, store_columns(host), options, |_| {}).await,
        Resource::ItemTypes => show(shell, ItemTypeService, item_type_columns(), options, |_| {}).await,
        Resource::Characters => {
            show(shell, CharacterService, character_columns(host), options, |_| {}).await
        }
    }
}

async fn show<R: ResourceService>(
    shell: &Shell,
    service: R,
    columns: Vec<Column<R::Record>>,
    options: &ListOptions,
    prepare: impl FnOnce(&mut [R::Record]),
) -> anyhow::Result<()> {
    let mut page = CrudController::new(service, shell.api.clone());
    if let Some(notice) = page.load().await {
        if shell.navigator.current() == Route::Login {
            bail!("session expired; run `llama-admin login` again");
        }
        bail!(notice.message);
    }

    let mut rows = page.records().to_vec();
    prepare(rows.as_mut_slice());

    let mut table = TableModel::new(columns);
    table.set_rows(rows);
    table.set_search(options.search.as_str());

    if let Some(key) = options.sort.as_deref() {
        if !table.sort_by(key) {
            let keys: Vec<&str> = table.columns().iter().filter_map(Column::key).collect();
            bail!("cannot sort by '{key}'; sortable columns: {}", keys.join(", "));
        }
        if options.descending {
            table.sort_by(key);
        }
    }

    print!("{}", table.render_text());
    Ok(())
}

pub(crate) async fn delete(
    shell: &Shell,
    resource: Resource,
    parent: Option<EntityId>,
    id: EntityId,
    yes: bool,
) -> anyhow::Result<()> {
    let parent = parent.unwrap_or_default();

    match resource {
        Resource::Institutions => remove(shell, InstitutionService, id, yes).await,
        Resource::Careers => remove(shell, CareerService { institution_id: parent }, id, yes).await,
        Resource::Teachers => remove(shell, TeacherService, id, yes).await,
        Resource::Students => remove(shell, StudentService, id, yes).await,
        Resource::Cycles => remove(shell, CycleService, id, yes).await,
        Resource::Courses => remove(shell, CourseService, id, yes).await,
        Resource::Topics => remove(shell, TopicService { course_id: parent }, id, yes).await,
        Resource::Lessons => remove(shell, LessonService { topic_id: parent }, id, yes).await,
        Resource::Questions => remove(shell, QuestionService { lesson_id: parent }, id, yes).await,
        Resource::Store => remove(shell, StoreItemService, id, yes).await,
        Resource::ItemTypes => remove(shell, ItemTypeService, id, yes).await,
        Resource::Characters => remove(shell, CharacterService, id, yes).await,
    }
}

async fn remove<R: ResourceService>(
    shell: &Shell,
    service: R,
    id: EntityId,
    yes: bool,
) -> anyhow::Result<()> {
    let singular = service.kind().singular();
    let mut page = CrudController::new(service, shell.api.clone());

    let notice = page.delete(id, move || yes || confirm(&format!("Delete {singular} {id}?"))).await;
    match notice {
        None => println!("Cancelled"),
        Some(notice) if notice.is_error() => bail!(notice.message),
        Some(notice) => println!("{notice}"),
    }
    Ok(())
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

fn institution_columns() -> Vec<Column<Institution>> {
    vec![
        Column::keyed("ID", "id", |r: &Institution| r.id.into()),
        Column::keyed("Name", "nombre", |r: &Institution| r.name.as_str().into()),
        Column::keyed("Email domain", "dominio_correo", |r: &Institution| {
            r.email_domain.as_deref().into()
        }),
    ]
}

fn career_columns() -> Vec<Column<Career>> {
    vec![
        Column::keyed("ID", "id", |r: &Career| r.id.into()),
        Column::keyed("Name", "nombre", |r: &Career| r.name.as_str().into()),
    ]
}

fn teacher_columns() -> Vec<Column<Teacher>> {
    vec![
        Column::keyed("ID", "id", |r: &Teacher| r.id.into()),
        Column::keyed("Name", "nombre_completo", |r: &Teacher| r.full_name.as_str().into()),
        Column::keyed("Email", "correo", |r: &Teacher| r.email.as_str().into()),
        Column::keyed("Institution", "institucion", |r: &Teacher| r.institution.as_deref().into()),
        Column::keyed("Courses", "cursos", |r: &Teacher| r.courses.as_deref().into()),
    ]
}

fn student_columns() -> Vec<Column<Student>> {
    vec![
        Column::keyed("ID", "id", |r: &Student| r.id.into()),
        Column::keyed("Name", "nombre", |r: &Student| {
            format!("{} {}", r.first_name, r.last_name).trim().to_string().into()
        }),
        Column::keyed("Email", "correo_electronico", |r: &Student| r.email.as_str().into()),
        Column::keyed("XP", "puntos_experiencia", |r: &Student| r.experience.into()),
        Column::keyed("Gems", "gemas", |r: &Student| r.gems.into()),
    ]
}

fn cycle_columns() -> Vec<Column<Cycle>> {
    vec![
        Column::keyed("ID", "id", |r: &Cycle| r.id.into()),
        Column::keyed("Name", "nombre", |r: &Cycle| r.name.as_str().into()),
        Column::keyed("Number", "numero", |r: &Cycle| r.number.into()),
    ]
}

fn course_columns() -> Vec<Column<Course>> {
    vec![
        Column::keyed("ID", "id", |r: &Course| r.id.into()),
        Column::keyed("Name", "nombre_curso", |r: &Course| r.name.as_str().into()),
        Column::keyed("Cycle", "ciclo", |r: &Course| {
            r.cycle_name
                .as_deref()
                .map_or_else(|| r.cycle_id.into(), CellValue::from)
        }),
        Column::keyed("Description", "descripcion", |r: &Course| r.description.as_deref().into()),
    ]
}

fn topic_columns() -> Vec<Column<Topic>> {
    vec![
        Column::keyed("Order", "orden", |r: &Topic| r.order.into()),
        Column::keyed("Name", "nombre_tema", |r: &Topic| r.name.as_str().into()),
        Column::keyed("Week", "semana", |r: &Topic| r.week.into()),
        Column::keyed("Question", "titulo_pregunta", |r: &Topic| r.question_title.as_deref().into()),
    ]
}

fn lesson_columns() -> Vec<Column<Lesson>> {
    vec![
        Column::keyed("Order", "orden", |r: &Lesson| r.order.into()),
        Column::keyed("Title", "titulo_leccion", |r: &Lesson| r.title.as_str().into()),
        Column::keyed("Time", "tiempo_limite_segundos", |r: &Lesson| r.time_limit_secs.into())
            .with_renderer(|r: &Lesson| format_duration(r.time_limit_secs)),
        Column::keyed("Gems", "gemas", |r: &Lesson| r.gems.into()),
        Column::keyed("XP", "puntos_experiencia", |r: &Lesson| r.experience.into()),
    ]
}

fn question_columns() -> Vec<Column<Question>> {
    vec![
        Column::keyed("ID", "id", |r: &Question| r.id.into()),
        Column::keyed("Type", "tipo_pregunta", |r: &Question| r.kind.as_str().into()),
        Column::keyed("Statement", "enunciado", |r: &Question| r.statement.as_str().into()),
        Column::keyed("Points", "puntos", |r: &Question| r.points.into()),
        Column::display("Options", |r: &Question| r.options.len().to_string()),
    ]
}

fn store_columns(host: String) -> Vec<Column<StoreItem>> {
    vec![
        Column::keyed("ID", "id", |r: &StoreItem| r.id.into()),
        Column::keyed("Name", "nombre_item", |r: &StoreItem| r.name.as_str().into()),
        Column::keyed("Type", "tipo", |r: &StoreItem| r.type_name().into()),
        Column::keyed("Cost", "costo_gemas", |r: &StoreItem| r.cost_gems.into()),
        Column::display("Icon", move |r: &StoreItem| {
            resolve_image_url(&host, r.icon_url.as_deref())
        }),
    ]
}

fn item_type_columns() -> Vec<Column<ItemType>> {
    vec![
        Column::keyed("ID", "id", |r: &ItemType| r.id.into()),
        Column::keyed("Name", "nombre_tipo", |r: &ItemType| r.name.as_str().into()),
    ]
}

fn character_columns(host: String) -> Vec<Column<Character>> {
    vec![
        Column::keyed("ID", "id", |r: &Character| r.id.into()),
        Column::keyed("Name", "nombre", |r: &Character| r.name.as_str().into()),
        Column::keyed("Asset key", "asset_key", |r: &Character| r.asset_key.as_str().into()),
        Column::display("Image", move |r: &Character| {
            resolve_image_url(&host, r.base_image_url.as_deref())
        }),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_lesson_time_renders_as_duration_but_sorts_numerically() {
        let lessons: Vec<Lesson> = serde_json::from_value(json!([
            {"id": 1, "titulo_leccion": "Larga", "orden": 1, "tiempo_limite_segundos": 1200},
            {"id": 2, "titulo_leccion": "Corta", "orden": 2, "tiempo_limite_segundos": 95}
        ]))
        .unwrap();

        let mut table = TableModel::new(lesson_columns());
        table.set_rows(lessons);
        assert!(table.sort_by("tiempo_limite_segundos"));

        let text = table.render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("Corta") && lines[1].contains("1 min 35 s"));
        assert!(lines[2].contains("Larga") && lines[2].contains("20 min"));
    }

    #[test]
    fn test_character_image_column_resolves_legacy_paths() {
        let columns = character_columns("http://localhost:3000".to_string());
        let character: Character = serde_json::from_value(json!({
            "id": 1, "nombre": "Llama", "asset_key": "LLAMA", "url_imagen_base": "assets/llama.png"
        }))
        .unwrap();

        assert_eq!(
            columns[3].render(&character),
            "http://localhost:3000/personajes/llama.png"
        );
    }

    #[test]
    fn test_student_search_covers_full_name() {
        let students: Vec<Student> = serde_json::from_value(json!([
            {"id": 1, "nombre": "Ana", "apellido": "Quispe", "correo_electronico": "a@x.pe"},
            {"id": 2, "nombre": "Luis", "apellido": "Mamani", "correo_electronico": "l@x.pe"}
        ]))
        .unwrap();

        let mut table = TableModel::new(student_columns());
        table.set_rows(students);
        table.set_search("ana quis");
        assert_eq!(table.view().rows.len(), 1);
    }
}
