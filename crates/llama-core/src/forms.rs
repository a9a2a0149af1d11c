//! Form drafts submitted to the backend
//!
//! Drafts are validated locally before any request is made; a failing draft
//! never reaches the network.

use crate::types::{AnswerOption, EntityId, GuideStep, Question, QuestionKind};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use validator::Validate;

/// Highest point total a lesson's questions should reach
pub const LESSON_POINTS_CAP: i64 = 20;

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map_or_else(|| err.code.to_string(), ToString::to_string);
                    (field.to_string(), message)
                })
            })
            .collect();
        fields.sort();

        fields.into_iter().next().map_or_else(
            || Self::validation("form", "invalid input"),
            |(field, message)| Self::validation(field, message),
        )
    }
}

/// Run `validator` checks and convert the outcome
///
/// # Errors
///
/// Returns the first failing field (by name) as a validation error.
pub fn check<T: Validate>(draft: &T) -> Result<()> {
    draft.validate().map_err(Error::from)
}

/// An image picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent in the multipart part
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from in-memory bytes, guessing the MIME type from the name
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an image from disk
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// A draft submitted as `multipart/form-data`
pub trait MultipartDraft {
    /// Text parts in submission order
    fn text_parts(&self) -> Vec<(String, String)>;

    /// File parts in submission order
    fn file_parts(&self) -> Vec<(String, &ImageUpload)>;
}

/// Institution form
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct InstitutionDraft {
    /// Display name
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// E-mail domain
    #[serde(rename = "dominio_correo")]
    pub email_domain: String,
}

/// Career form
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CareerDraft {
    /// Display name
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Owning institution
    #[serde(rename = "institucion_id")]
    pub institution_id: EntityId,
}

/// Cycle form
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CycleDraft {
    /// Display name
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Ordering number
    #[serde(rename = "numero")]
    #[validate(range(min = 1, message = "Number must be positive"))]
    pub number: i64,
}

/// Course form
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CourseDraft {
    /// Course name
    #[serde(rename = "nombre_curso")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Description
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Cycle the course belongs to
    #[serde(rename = "ciclo_id")]
    #[validate(required(message = "Select a cycle"))]
    pub cycle_id: Option<EntityId>,
}

/// Topic form, submitted as multipart with up to three story images
#[derive(Debug, Clone, Default, Validate)]
pub struct TopicDraft {
    /// Owning course
    pub course_id: EntityId,
    /// Topic name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Position inside the course
    pub order: i64,
    /// Title of the challenge question
    pub question_title: String,
    /// Story introduction
    pub story_intro: String,
    /// Story climax
    pub story_climax: String,
    /// Story ending
    pub story_ending: String,
    /// Introduction image
    pub intro_image: Option<ImageUpload>,
    /// Climax image
    pub climax_image: Option<ImageUpload>,
    /// Ending image
    pub ending_image: Option<ImageUpload>,
}

impl MultipartDraft for TopicDraft {
    fn text_parts(&self) -> Vec<(String, String)> {
        vec![
            ("curso_id".to_string(), self.course_id.to_string()),
            ("nombre_tema".to_string(), self.name.clone()),
            ("orden".to_string(), self.order.to_string()),
            ("titulo_pregunta".to_string(), self.question_title.clone()),
            ("historia_introduccion".to_string(), self.story_intro.clone()),
            ("historia_nudo".to_string(), self.story_climax.clone()),
            ("historia_desenlace".to_string(), self.story_ending.clone()),
        ]
    }

    fn file_parts(&self) -> Vec<(String, &ImageUpload)> {
        [
            ("imagen_inicio", &self.intro_image),
            ("imagen_nudo", &self.climax_image),
            ("imagen_desenlace", &self.ending_image),
        ]
        .into_iter()
        .filter_map(|(name, image)| image.as_ref().map(|image| (name.to_string(), image)))
        .collect()
    }
}

/// Lesson form
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LessonDraft {
    /// Owning topic
    #[serde(rename = "tema_id")]
    pub topic_id: EntityId,
    /// Lesson title
    #[serde(rename = "titulo_leccion")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Position inside the topic
    #[serde(rename = "orden")]
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub order: i64,
    /// Time limit in seconds
    #[serde(rename = "tiempo_limite_segundos")]
    #[validate(range(min = 1, message = "Time limit must be positive"))]
    pub time_limit_secs: i64,
    /// Gems rewarded
    #[serde(rename = "gemas")]
    #[validate(range(min = 0, message = "Gems cannot be negative"))]
    pub gems: i64,
    /// Experience rewarded
    #[serde(rename = "puntos_experiencia")]
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience: i64,
}

impl LessonDraft {
    /// Empty form with the platform's default rewards
    #[must_use]
    pub fn new(topic_id: EntityId) -> Self {
        Self {
            topic_id,
            title: String::new(),
            order: 1,
            time_limit_secs: 1200,
            gems: 50,
            experience: 100,
        }
    }
}

/// Item category form
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ItemTypeDraft {
    /// Category name
    #[serde(rename = "nombre_tipo")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Store item form, submitted as multipart
#[derive(Debug, Clone, Validate)]
pub struct StoreItemDraft {
    /// Item name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Description
    pub description: String,
    /// Price in gems
    #[validate(range(min = 0, message = "Cost cannot be negative"))]
    pub cost_gems: i64,
    /// Category
    #[validate(required(message = "Select an item type"))]
    pub item_type_id: Option<EntityId>,
    /// Store icon
    pub icon: Option<ImageUpload>,
    /// Equipped variant per character asset key
    pub equipped_images: IndexMap<String, ImageUpload>,
}

impl Default for StoreItemDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            cost_gems: 100,
            item_type_id: None,
            icon: None,
            equipped_images: IndexMap::new(),
        }
    }
}

impl MultipartDraft for StoreItemDraft {
    fn text_parts(&self) -> Vec<(String, String)> {
        vec![
            ("nombre_item".to_string(), self.name.clone()),
            ("descripcion".to_string(), self.description.clone()),
            ("costo_gemas".to_string(), self.cost_gems.to_string()),
            (
                "tipo_item_id".to_string(),
                self.item_type_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
        ]
    }

    fn file_parts(&self) -> Vec<(String, &ImageUpload)> {
        let mut parts: Vec<(String, &ImageUpload)> = self
            .icon
            .iter()
            .map(|icon| ("icono".to_string(), icon))
            .collect();
        parts.extend(
            self.equipped_images
                .iter()
                .map(|(asset_key, image)| (format!("img_{asset_key}"), image)),
        );
        parts
    }
}

/// Character form, submitted as multipart
#[derive(Debug, Clone, Default, Validate)]
pub struct CharacterDraft {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Asset key; use [`normalize_asset_key`] before submitting
    #[validate(length(min = 1, message = "Asset key is required"))]
    pub asset_key: String,
    /// Short greeting
    pub short_message: String,
    /// Long greeting
    pub long_message: String,
    /// Base image, required on create
    pub image: Option<ImageUpload>,
}

impl CharacterDraft {
    /// Validate for creation, where the image is mandatory
    ///
    /// # Errors
    ///
    /// Returns a validation error when a field is missing.
    pub fn validate_for_create(&self) -> Result<()> {
        check(self)?;
        if self.image.is_none() {
            return Err(Error::validation("imagen", "The image is required"));
        }
        Ok(())
    }
}

impl MultipartDraft for CharacterDraft {
    fn text_parts(&self) -> Vec<(String, String)> {
        vec![
            ("nombre".to_string(), self.name.clone()),
            ("asset_key".to_string(), normalize_asset_key(&self.asset_key)),
            ("mensaje_corta".to_string(), self.short_message.clone()),
            ("mensaje_larga".to_string(), self.long_message.clone()),
        ]
    }

    fn file_parts(&self) -> Vec<(String, &ImageUpload)> {
        self.image
            .iter()
            .map(|image| ("imagen".to_string(), image))
            .collect()
    }
}

/// Upper-case an asset key and replace whitespace with `_`
#[must_use]
pub fn normalize_asset_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_uppercase()
}

/// Teacher registration form
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct TeacherDraft {
    /// First name
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    /// Last name
    #[serde(rename = "apellido")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    /// E-mail address
    #[serde(rename = "correo_electronico")]
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: String,
    /// Initial password
    #[serde(rename = "contrasena")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Institution the teacher belongs to
    #[serde(rename = "institucion_id")]
    #[validate(range(min = 1, message = "Select an institution"))]
    pub institution_id: EntityId,
}

/// One option being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionDraft {
    /// Option text
    pub texto: String,
    /// Whether it is the correct option
    pub es_correcta: bool,
    /// Existing image, kept on update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_imagen: Option<String>,
}

impl OptionDraft {
    fn blank() -> Self {
        Self::default()
    }

    fn fixed(text: &str, correct: bool) -> Self {
        Self {
            texto: text.to_string(),
            es_correcta: correct,
            url_imagen: None,
        }
    }
}

impl From<&AnswerOption> for OptionDraft {
    fn from(option: &AnswerOption) -> Self {
        Self {
            texto: option.text.clone(),
            es_correcta: option.is_correct,
            url_imagen: option.image_url.clone(),
        }
    }
}

/// One guide step being edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideStepDraft {
    /// Step title, defaults to `Paso N`
    pub title: String,
    /// Step text; blank steps are dropped
    pub text: String,
}

/// Question form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// Question type
    pub kind: QuestionKind,
    /// Statement
    pub statement: String,
    /// Points awarded
    pub points: i64,
    /// Options for choice kinds
    pub options: Vec<OptionDraft>,
    /// Solution guide
    pub guide: Vec<GuideStepDraft>,
    /// Correct answer for open questions
    pub open_answer: String,
}

/// JSON body of question create/update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionPayload {
    /// Statement
    pub enunciado: String,
    /// Question type
    pub tipo: QuestionKind,
    /// Points awarded
    pub puntos: i64,
    /// Options
    pub opciones: Vec<OptionDraft>,
    /// Cleaned, renumbered guide
    pub pasos_guia: Vec<GuideStep>,
    /// Question image, not edited here
    pub url_imagen_pregunta: Option<String>,
    /// Correct answer for open questions
    pub respuesta_correcta_abierta: Option<String>,
}

impl QuestionDraft {
    /// Fresh form for the given kind with its default options
    #[must_use]
    pub fn new(kind: QuestionKind) -> Self {
        let mut draft = Self {
            kind: QuestionKind::MultipleChoice,
            statement: String::new(),
            points: 5,
            options: Vec::new(),
            guide: vec![GuideStepDraft::default()],
            open_answer: String::new(),
        };
        draft.set_kind(kind);
        draft
    }

    /// Pre-fill the form from a stored question
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        let mut guide: Vec<GuideStepDraft> = normalize_guide(&question.guide)
            .into_iter()
            .map(|step| GuideStepDraft {
                title: step.titulo,
                text: step.texto,
            })
            .collect();
        if guide.is_empty() {
            guide.push(GuideStepDraft::default());
        }

        let (options, open_answer) = if question.kind == QuestionKind::OpenAnswer {
            (
                Vec::new(),
                question.open_answer.clone().unwrap_or_default(),
            )
        } else if question.options.is_empty() {
            (vec![OptionDraft::blank(), OptionDraft::blank()], String::new())
        } else {
            (
                question.options.iter().map(OptionDraft::from).collect(),
                String::new(),
            )
        };

        Self {
            kind: question.kind,
            statement: question.statement.clone(),
            points: if question.points > 0 { question.points } else { 5 },
            options,
            guide,
            open_answer,
        }
    }

    /// Switch the question type, resetting options the way the type requires
    pub fn set_kind(&mut self, kind: QuestionKind) {
        self.kind = kind;
        match kind {
            QuestionKind::TrueFalse => {
                self.options = vec![
                    OptionDraft::fixed("Verdadero", true),
                    OptionDraft::fixed("Falso", false),
                ];
            }
            QuestionKind::OpenAnswer => self.options.clear(),
            QuestionKind::MultipleChoice | QuestionKind::ImageSelection => {
                if self.options.is_empty() {
                    self.options = vec![OptionDraft::blank(), OptionDraft::blank()];
                }
            }
        }
    }

    /// Mark exactly one option as correct
    pub fn set_correct(&mut self, index: usize) {
        for (i, option) in self.options.iter_mut().enumerate() {
            option.es_correcta = i == index;
        }
    }

    /// Validate and build the request body
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first problem found.
    pub fn to_payload(&self) -> Result<QuestionPayload> {
        if self.statement.trim().is_empty() {
            return Err(Error::validation("enunciado", "The statement is missing"));
        }

        if self.kind == QuestionKind::OpenAnswer {
            if self.open_answer.trim().is_empty() {
                return Err(Error::validation(
                    "respuesta_correcta_abierta",
                    "Write the correct answer",
                ));
            }
        } else {
            if self.kind != QuestionKind::ImageSelection
                && self.options.iter().any(|option| option.texto.trim().is_empty())
            {
                return Err(Error::validation("opciones", "Fill in every option text"));
            }
            if !self.options.iter().any(|option| option.es_correcta) {
                return Err(Error::validation("opciones", "Mark the correct answer"));
            }
        }

        let pasos_guia = self
            .guide
            .iter()
            .filter(|step| !step.text.trim().is_empty())
            .zip(1_u32..)
            .map(|(step, number)| GuideStep {
                paso: number,
                titulo: if step.title.trim().is_empty() {
                    format!("Paso {number}")
                } else {
                    step.title.clone()
                },
                texto: step.text.clone(),
            })
            .collect();

        Ok(QuestionPayload {
            enunciado: self.statement.clone(),
            tipo: self.kind,
            puntos: self.points,
            opciones: if self.kind.has_options() {
                self.options.clone()
            } else {
                Vec::new()
            },
            pasos_guia,
            url_imagen_pregunta: None,
            respuesta_correcta_abierta: (self.kind == QuestionKind::OpenAnswer)
                .then(|| self.open_answer.clone()),
        })
    }
}

/// Point total of a lesson once a question is saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsCheck {
    /// Total after saving
    pub total: i64,
    /// Whether the total passes [`LESSON_POINTS_CAP`]
    pub exceeds_cap: bool,
}

/// Compute a lesson's point total when `editing` (if any) is replaced by `points`
#[must_use]
pub fn check_points(questions: &[Question], editing: Option<EntityId>, points: i64) -> PointsCheck {
    let others: i64 = questions
        .iter()
        .filter(|question| Some(question.id) != editing)
        .map(|question| question.points)
        .sum();
    let total = others + points;
    PointsCheck {
        total,
        exceeds_cap: total > LESSON_POINTS_CAP,
    }
}

/// Normalise a stored guide into numbered steps
///
/// Accepts the current array form, a JSON-encoded string of it, a plain
/// string (one step) and the old `{"1": "text"}` object form.
#[must_use]
pub fn normalize_guide(raw: &serde_json::Value) -> Vec<GuideStep> {
    use serde_json::Value;

    match raw {
        Value::Array(items) => items
            .iter()
            .zip(1_u32..)
            .map(|(item, number)| {
                let paso = item
                    .get("paso")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(number);
                let titulo = item
                    .get("titulo")
                    .and_then(Value::as_str)
                    .filter(|title| !title.is_empty())
                    .map_or_else(|| format!("Paso {paso}"), ToString::to_string);
                let texto = item
                    .get("texto")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                GuideStep { paso, titulo, texto }
            })
            .collect(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Array(_)) => normalize_guide(&parsed),
            _ if text.trim().is_empty() => Vec::new(),
            _ => vec![GuideStep {
                paso: 1,
                titulo: "Paso 1".to_string(),
                texto: text.clone(),
            }],
        },
        Value::Object(map) => map
            .values()
            .zip(1_u32..)
            .map(|(value, number)| GuideStep {
                paso: number,
                titulo: format!("Paso {number}"),
                texto: value
                    .as_str()
                    .map_or_else(|| value.to_string(), ToString::to_string),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn question(id: EntityId, points: i64) -> Question {
        serde_json::from_value(json!({
            "id": id,
            "tipo_pregunta": "opcion_multiple",
            "enunciado_pregunta": "2 + 2",
            "puntos_otorgados": points
        }))
        .unwrap()
    }

    #[test]
    fn test_course_requires_cycle() {
        let draft = CourseDraft {
            name: "Cálculo".to_string(),
            ..CourseDraft::default()
        };

        let err = check(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: cycle_id - Select a cycle");
    }

    #[test]
    fn test_store_item_requires_type() {
        let draft = StoreItemDraft {
            name: "Gorro".to_string(),
            ..StoreItemDraft::default()
        };
        assert!(check(&draft).is_err());

        let draft = StoreItemDraft {
            item_type_id: Some(2),
            ..draft
        };
        assert!(check(&draft).is_ok());
    }

    #[test]
    fn test_store_item_multipart_parts() {
        let mut draft = StoreItemDraft {
            name: "Gorro".to_string(),
            item_type_id: Some(2),
            icon: Some(ImageUpload::new("icon.png", vec![1, 2])),
            ..StoreItemDraft::default()
        };
        draft
            .equipped_images
            .insert("LLAMA_ROJA".to_string(), ImageUpload::new("roja.webp", vec![3]));

        let files: Vec<String> = draft.file_parts().into_iter().map(|(name, _)| name).collect();
        assert_eq!(files, vec!["icono", "img_LLAMA_ROJA"]);

        let texts = draft.text_parts();
        assert!(texts.contains(&("costo_gemas".to_string(), "100".to_string())));
        assert!(texts.contains(&("tipo_item_id".to_string(), "2".to_string())));
    }

    #[test]
    fn test_character_image_required_on_create() {
        let mut draft = CharacterDraft {
            name: "Llama Roja".to_string(),
            asset_key: "llama roja".to_string(),
            ..CharacterDraft::default()
        };
        assert!(draft.validate_for_create().is_err());

        draft.image = Some(ImageUpload::new("roja.png", vec![0]));
        assert!(draft.validate_for_create().is_ok());
        assert!(
            draft
                .text_parts()
                .contains(&("asset_key".to_string(), "LLAMA_ROJA".to_string()))
        );
    }

    #[rstest]
    #[case("llama roja", "LLAMA_ROJA")]
    #[case("Llama\tAzul  Pro", "LLAMA_AZUL__PRO")]
    #[case("KEY", "KEY")]
    fn test_normalize_asset_key(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_asset_key(raw), expected);
    }

    #[test]
    fn test_teacher_email_validated() {
        let draft = TeacherDraft {
            first_name: "Carla".to_string(),
            last_name: "Ríos".to_string(),
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
            institution_id: 1,
        };
        let err = check(&draft).unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(ImageUpload::new("a.PNG", vec![]).content_type, "image/png");
        assert_eq!(ImageUpload::new("a.jpeg", vec![]).content_type, "image/jpeg");
        assert_eq!(
            ImageUpload::new("a.bin", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_true_false_options_are_fixed() {
        let draft = QuestionDraft::new(QuestionKind::TrueFalse);
        assert_eq!(draft.options.len(), 2);
        assert_eq!(draft.options[0].texto, "Verdadero");
        assert!(draft.options[0].es_correcta);
        assert_eq!(draft.options[1].texto, "Falso");
    }

    #[test]
    fn test_question_requires_statement_and_correct_option() {
        let mut draft = QuestionDraft::new(QuestionKind::MultipleChoice);
        assert!(draft.to_payload().is_err());

        draft.statement = "¿Cuánto es 2 + 2?".to_string();
        draft.options[0].texto = "4".to_string();
        draft.options[1].texto = "5".to_string();
        let err = draft.to_payload().unwrap_err();
        assert!(err.to_string().contains("Mark the correct answer"));

        draft.set_correct(0);
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.opciones.len(), 2);
        assert!(payload.respuesta_correcta_abierta.is_none());
    }

    #[test]
    fn test_image_selection_allows_blank_option_text() {
        let mut draft = QuestionDraft::new(QuestionKind::ImageSelection);
        draft.statement = "Elige la figura".to_string();
        draft.set_correct(1);
        assert!(draft.to_payload().is_ok());
    }

    #[test]
    fn test_open_answer_payload() {
        let mut draft = QuestionDraft::new(QuestionKind::OpenAnswer);
        draft.statement = "Deriva x^2".to_string();
        assert!(draft.to_payload().is_err());

        draft.open_answer = "2x".to_string();
        let payload = draft.to_payload().unwrap();
        assert!(payload.opciones.is_empty());
        assert_eq!(payload.respuesta_correcta_abierta.as_deref(), Some("2x"));

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["tipo"], "respuesta_abierta");
    }

    #[test]
    fn test_guide_steps_cleaned_and_renumbered() {
        let mut draft = QuestionDraft::new(QuestionKind::OpenAnswer);
        draft.statement = "x".to_string();
        draft.open_answer = "y".to_string();
        draft.guide = vec![
            GuideStepDraft {
                title: String::new(),
                text: "   ".to_string(),
            },
            GuideStepDraft {
                title: String::new(),
                text: "Aplica la regla".to_string(),
            },
            GuideStepDraft {
                title: "Verifica".to_string(),
                text: "Sustituye".to_string(),
            },
        ];

        let steps = draft.to_payload().unwrap().pasos_guia;
        assert_eq!(
            steps,
            vec![
                GuideStep {
                    paso: 1,
                    titulo: "Paso 1".to_string(),
                    texto: "Aplica la regla".to_string()
                },
                GuideStep {
                    paso: 2,
                    titulo: "Verifica".to_string(),
                    texto: "Sustituye".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_points_check_excludes_edited_question() {
        let questions = vec![question(1, 5), question(2, 10), question(3, 5)];

        let check = check_points(&questions, None, 5);
        assert_eq!(check.total, 25);
        assert!(check.exceeds_cap);

        let check = check_points(&questions, Some(3), 5);
        assert_eq!(check.total, 20);
        assert!(!check.exceeds_cap);
    }

    #[rstest]
    #[case(json!([{"paso": 1, "titulo": "Inicio", "texto": "a"}]), vec![(1, "Inicio", "a")])]
    #[case(json!("[{\"titulo\": \"T\", \"texto\": \"b\"}]"), vec![(1, "T", "b")])]
    #[case(json!("solo texto"), vec![(1, "Paso 1", "solo texto")])]
    #[case(json!({"1": "uno", "2": "dos"}), vec![(1, "Paso 1", "uno"), (2, "Paso 2", "dos")])]
    #[case(json!(null), vec![])]
    fn test_normalize_guide_shapes(
        #[case] raw: serde_json::Value,
        #[case] expected: Vec<(u32, &str, &str)>,
    ) {
        let steps: Vec<(u32, String, String)> = normalize_guide(&raw)
            .into_iter()
            .map(|step| (step.paso, step.titulo, step.texto))
            .collect();
        let expected: Vec<(u32, String, String)> = expected
            .into_iter()
            .map(|(paso, titulo, texto)| (paso, titulo.to_string(), texto.to_string()))
            .collect();
        assert_eq!(steps, expected);
    }

    #[test]
    fn test_from_question_prefills_open_answer() {
        let stored: Question = serde_json::from_value(json!({
            "id": 4,
            "tipo_pregunta": "respuesta_abierta",
            "enunciado_pregunta": "¿Derivada de x?",
            "puntos_otorgados": "0",
            "respuesta_correcta_abierta": "1"
        }))
        .unwrap();

        let draft = QuestionDraft::from_question(&stored);
        assert_eq!(draft.points, 5);
        assert_eq!(draft.open_answer, "1");
        assert!(draft.options.is_empty());
        assert_eq!(draft.guide.len(), 1);
    }
}
