//! Typed records for the backend resources
//!
//! Field names follow the backend's JSON; Rust names are English with
//! `serde(rename)` mapping. Numeric fields accept either JSON numbers or
//! numeric strings, since several aggregates arrive as `NUMERIC` strings.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier type shared by every backend entity
pub type EntityId = i64;

/// Deserialization helpers for loosely typed backend numbers
pub mod flexible {
    use serde::{Deserialize, Deserializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Bool(bool),
    }

    #[allow(clippy::cast_precision_loss)]
    fn int_to_float(value: i64) -> f64 {
        value as f64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn float_to_int(value: f64) -> i64 {
        value as i64
    }

    fn to_float<E: de::Error>(raw: Raw) -> Result<f64, E> {
        match raw {
            Raw::Int(value) => Ok(int_to_float(value)),
            Raw::Float(value) => Ok(value),
            Raw::Bool(value) => Ok(if value { 1.0 } else { 0.0 }),
            Raw::Text(text) if text.trim().is_empty() => Ok(0.0),
            Raw::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, got '{text}'"))),
        }
    }

    /// Number or numeric string as `f64`
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Option::<Raw>::deserialize(deserializer)?.map_or(Ok(0.0), to_float)
    }

    /// Number or numeric string as `i64`, truncating fractions
    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(0),
            Some(Raw::Int(value)) => Ok(value),
            Some(other) => to_float(other).map(float_to_int),
        }
    }

    /// Any defaulted value, with an explicit `null` read as the default
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Optional number or numeric string as `i64`
    pub fn opt_integer<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Int(value)) => Ok(Some(value)),
            Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(other) => to_float(other).map(|value| Some(float_to_int(value))),
        }
    }
}

/// Role as the backend reports it: a numeric id or a role name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Role {
    /// Numeric role id (1 or 4 = admin, 2 or 5 = teacher, 3 = student)
    Id(i64),
    /// Role name
    Name(String),
}

/// Classified role used by the route guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// Platform administrator
    Admin,
    /// Teacher
    Teacher,
    /// Student
    Student,
    /// Anything the client does not recognise
    Unknown,
}

impl Role {
    /// Classify this role
    #[must_use]
    pub fn kind(&self) -> RoleKind {
        match self {
            Self::Id(1 | 4) => RoleKind::Admin,
            Self::Id(2 | 5) => RoleKind::Teacher,
            Self::Id(3) => RoleKind::Student,
            Self::Id(_) => RoleKind::Unknown,
            Self::Name(name) => match name.trim().to_lowercase().as_str() {
                "1" | "4" | "admin" | "administrador" | "administrator" | "admin nuevo" => {
                    RoleKind::Admin
                }
                "2" | "5" | "profesor" | "docente" | "teacher" | "profe nuevo" => {
                    RoleKind::Teacher
                }
                "3" | "estudiante" | "alumno" | "student" => RoleKind::Student,
                _ => RoleKind::Unknown,
            },
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Teacher => write!(f, "teacher"),
            Self::Student => write!(f, "student"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The user record held in the session
///
/// Unknown fields are kept verbatim so a persisted session rehydrates unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionUser {
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    /// First name
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name
    #[serde(rename = "apellido", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Login e-mail
    #[serde(
        rename = "correo_electronico",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,

    /// Role merged in from the login response
    #[serde(rename = "rol", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Remaining fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl SessionUser {
    /// Classified role, `Unknown` when absent
    #[must_use]
    pub fn role_kind(&self) -> RoleKind {
        self.role.as_ref().map_or(RoleKind::Unknown, Role::kind)
    }

    /// Name for greetings and `whoami`
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// E-mail address
    #[serde(rename = "correo_electronico")]
    pub email: String,
    /// Password
    #[serde(rename = "contrasena")]
    pub password: String,
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Authenticated user
    #[serde(rename = "usuario")]
    pub user: SessionUser,
    /// Role, delivered next to the user record
    #[serde(rename = "rol", default)]
    pub role: Option<Role>,
}

impl LoginResponse {
    /// Split into the session user (with the role merged in) and the token
    #[must_use]
    pub fn into_session(self) -> (SessionUser, String) {
        let mut user = self.user;
        if self.role.is_some() {
            user.role = self.role;
        }
        (user, self.token)
    }
}

/// A school or organisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Display name
    #[serde(rename = "nombre", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// E-mail domain used to attach students
    #[serde(rename = "dominio_correo", default)]
    pub email_domain: Option<String>,
}

/// An academic programme inside an institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Display name
    #[serde(rename = "nombre", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Owning institution
    #[serde(
        rename = "institucion_id",
        default,
        deserialize_with = "flexible::opt_integer"
    )]
    pub institution_id: Option<EntityId>,
}

/// An academic level used to order courses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Display name
    #[serde(rename = "nombre", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Ordering number
    #[serde(rename = "numero", default, deserialize_with = "flexible::integer")]
    pub number: i64,
}

/// A course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Course name
    #[serde(rename = "nombre_curso", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Free-text description
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    /// Cycle the course belongs to
    #[serde(rename = "ciclo_id", default, deserialize_with = "flexible::opt_integer")]
    pub cycle_id: Option<EntityId>,
    /// Cycle name computed by the backend
    #[serde(rename = "nombre_ciclo", default)]
    pub cycle_name: Option<String>,
    /// Whether students see the course locked
    #[serde(rename = "esta_bloqueado", default)]
    pub locked: Option<bool>,
}

/// A narrative unit inside a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Owning course
    #[serde(rename = "curso_id", default, deserialize_with = "flexible::opt_integer")]
    pub course_id: Option<EntityId>,
    /// Topic name
    #[serde(rename = "nombre_tema", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Position inside the course
    #[serde(rename = "orden", default, deserialize_with = "flexible::integer")]
    pub order: i64,
    /// Week label
    #[serde(rename = "semana", default, deserialize_with = "flexible::opt_integer")]
    pub week: Option<i64>,
    /// Title of the challenge question
    #[serde(rename = "titulo_pregunta", default)]
    pub question_title: Option<String>,
    /// Story introduction
    #[serde(rename = "historia_introduccion", default)]
    pub story_intro: Option<String>,
    /// Story climax
    #[serde(rename = "historia_nudo", default)]
    pub story_climax: Option<String>,
    /// Story ending
    #[serde(rename = "historia_desenlace", default)]
    pub story_ending: Option<String>,
    /// Introduction image
    #[serde(rename = "url_imagen_inicio", default)]
    pub intro_image_url: Option<String>,
    /// Climax image
    #[serde(rename = "url_imagen_nudo", default)]
    pub climax_image_url: Option<String>,
    /// Ending image
    #[serde(rename = "url_imagen_desenlace", default)]
    pub ending_image_url: Option<String>,
}

/// A quiz unit inside a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Owning topic
    #[serde(rename = "tema_id", default, deserialize_with = "flexible::opt_integer")]
    pub topic_id: Option<EntityId>,
    /// Lesson title
    #[serde(rename = "titulo_leccion", deserialize_with = "flexible::or_default")]
    pub title: String,
    /// Position inside the topic
    #[serde(rename = "orden", default, deserialize_with = "flexible::integer")]
    pub order: i64,
    /// Time limit in seconds
    #[serde(
        rename = "tiempo_limite_segundos",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub time_limit_secs: i64,
    /// Gems rewarded
    #[serde(rename = "gemas", default, deserialize_with = "flexible::integer")]
    pub gems: i64,
    /// Experience rewarded
    #[serde(
        rename = "puntos_experiencia",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub experience: i64,
    /// Questions, present on the detail endpoint
    #[serde(rename = "preguntas", default, deserialize_with = "flexible::or_default")]
    pub questions: Vec<Question>,
}

/// Question type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Several text options, one correct
    #[serde(rename = "opcion_multiple")]
    MultipleChoice,
    /// Fixed true/false pair
    #[serde(rename = "verdadero_falso")]
    TrueFalse,
    /// Free-text answer compared with a stored answer
    #[serde(rename = "respuesta_abierta")]
    OpenAnswer,
    /// Image options, one correct
    #[serde(rename = "seleccionar_imagen")]
    ImageSelection,
}

impl QuestionKind {
    /// Whether the question is answered by picking an option
    #[must_use]
    pub const fn has_options(self) -> bool {
        !matches!(self, Self::OpenAnswer)
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "opcion_multiple",
            Self::TrueFalse => "verdadero_falso",
            Self::OpenAnswer => "respuesta_abierta",
            Self::ImageSelection => "seleccionar_imagen",
        }
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opcion_multiple" => Ok(Self::MultipleChoice),
            "verdadero_falso" => Ok(Self::TrueFalse),
            "respuesta_abierta" => Ok(Self::OpenAnswer),
            "seleccionar_imagen" => Ok(Self::ImageSelection),
            other => Err(crate::Error::validation(
                "tipo",
                format!("unknown question type '{other}'"),
            )),
        }
    }
}

/// One answer option of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option text
    #[serde(rename = "texto_respuesta", default, deserialize_with = "flexible::or_default")]
    pub text: String,
    /// Whether this option is the correct one
    #[serde(rename = "es_correcta", default)]
    pub is_correct: bool,
    /// Option image
    #[serde(rename = "url_imagen", default)]
    pub image_url: Option<String>,
}

/// One step of a question's solution guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideStep {
    /// 1-based step number
    pub paso: u32,
    /// Step title
    pub titulo: String,
    /// Step text
    pub texto: String,
}

/// A quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Question type
    #[serde(rename = "tipo_pregunta")]
    pub kind: QuestionKind,
    /// Statement
    #[serde(rename = "enunciado_pregunta", default, deserialize_with = "flexible::or_default")]
    pub statement: String,
    /// Points awarded
    #[serde(
        rename = "puntos_otorgados",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub points: i64,
    /// Options for choice questions
    #[serde(rename = "opciones_respuesta", default, deserialize_with = "flexible::or_default")]
    pub options: Vec<AnswerOption>,
    /// Solution guide in whichever legacy shape it was stored
    #[serde(rename = "pasos_guia", default)]
    pub guide: serde_json::Value,
    /// Correct answer of an open question
    #[serde(rename = "respuesta_correcta_abierta", default)]
    pub open_answer: Option<String>,
}

/// A student as listed by `/admin/estudiantes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// First name
    #[serde(rename = "nombre", default, deserialize_with = "flexible::or_default")]
    pub first_name: String,
    /// Last name
    #[serde(rename = "apellido", default, deserialize_with = "flexible::or_default")]
    pub last_name: String,
    /// E-mail address
    #[serde(rename = "correo_electronico", default, deserialize_with = "flexible::or_default")]
    pub email: String,
    /// Accumulated experience
    #[serde(
        rename = "puntos_experiencia",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub experience: i64,
    /// Gem balance
    #[serde(rename = "gemas", default, deserialize_with = "flexible::integer")]
    pub gems: i64,
}

/// A teacher as listed by `/admin/profesores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Full name
    #[serde(rename = "nombre_completo", default, deserialize_with = "flexible::or_default")]
    pub full_name: String,
    /// E-mail address
    #[serde(rename = "correo", default, deserialize_with = "flexible::or_default")]
    pub email: String,
    /// Institution name
    #[serde(rename = "institucion", default)]
    pub institution: Option<String>,
    /// Course summary
    #[serde(rename = "cursos", default, deserialize_with = "text_or_list")]
    pub courses: Option<String>,
}

/// Accept a string, a list of strings or null
fn text_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Text(text)) => Some(text),
        Some(Raw::List(items)) => Some(items.join(", ")),
    })
}

/// A selectable avatar persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Display name
    #[serde(rename = "nombre", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Asset key that store items use for equipped variants
    #[serde(default, deserialize_with = "flexible::or_default")]
    pub asset_key: String,
    /// Short greeting
    #[serde(rename = "mensaje_corta", default)]
    pub short_message: Option<String>,
    /// Long greeting
    #[serde(rename = "mensaje_larga", default)]
    pub long_message: Option<String>,
    /// Base image
    #[serde(rename = "url_imagen_base", default)]
    pub base_image_url: Option<String>,
}

/// Category of store items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Category name
    #[serde(rename = "nombre_tipo", deserialize_with = "flexible::or_default")]
    pub name: String,
}

/// Nested category as embedded in store items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTypeRef {
    /// Category name
    #[serde(rename = "nombre_tipo", deserialize_with = "flexible::or_default")]
    pub name: String,
}

/// A purchasable cosmetic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Item name
    #[serde(rename = "nombre_item", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Description
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    /// Price in gems
    #[serde(rename = "costo_gemas", default, deserialize_with = "flexible::integer")]
    pub cost_gems: i64,
    /// Category id
    #[serde(
        rename = "tipo_item_id",
        default,
        deserialize_with = "flexible::opt_integer"
    )]
    pub item_type_id: Option<EntityId>,
    /// Embedded category
    #[serde(rename = "tipos_item", default)]
    pub item_type: Option<ItemTypeRef>,
    /// Store icon
    #[serde(rename = "url_icono_tienda", default)]
    pub icon_url: Option<String>,
    /// Equipped image per character asset key
    #[serde(
        rename = "url_imagenes_equipado",
        default,
        deserialize_with = "flexible::or_default"
    )]
    pub equipped_images: IndexMap<String, String>,
}

impl StoreItem {
    /// Category name, `Desconocido` when the backend did not embed one
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.item_type
            .as_ref()
            .map_or("Desconocido", |kind| kind.name.as_str())
    }
}

/// Dashboard headline counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Number of students
    #[serde(rename = "estudiantes", default, deserialize_with = "flexible::integer")]
    pub students: i64,
    /// Number of teachers
    #[serde(rename = "profesores", default, deserialize_with = "flexible::integer")]
    pub teachers: i64,
    /// Number of lessons
    #[serde(rename = "lecciones", default, deserialize_with = "flexible::integer")]
    pub lessons: i64,
    /// Number of store purchases
    #[serde(rename = "ventas", default, deserialize_with = "flexible::integer")]
    pub sales: i64,
}

/// One entry of the dashboard activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Attempt id
    #[serde(default, deserialize_with = "flexible::integer")]
    pub id: i64,
    /// Student name
    #[serde(rename = "alumno", default, deserialize_with = "flexible::or_default")]
    pub student: String,
    /// Student e-mail
    #[serde(rename = "correo", default, deserialize_with = "flexible::or_default")]
    pub email: String,
    /// Lesson title
    #[serde(rename = "leccion", default, deserialize_with = "flexible::or_default")]
    pub lesson: String,
    /// Course name
    #[serde(rename = "curso", default, deserialize_with = "flexible::or_default")]
    pub course: String,
    /// Score on the 0-20 scale
    #[serde(rename = "nota", default, deserialize_with = "flexible::number")]
    pub score: f64,
    /// Attempt timestamp as sent by the backend
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
}

/// `GET /admin/dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Headline counters
    #[serde(default, deserialize_with = "flexible::or_default")]
    pub metrics: DashboardMetrics,
    /// Latest attempts
    #[serde(rename = "activityLog", default, deserialize_with = "flexible::or_default")]
    pub activity_log: Vec<ActivityEntry>,
}

/// Headline report counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Students averaging below 13
    #[serde(
        rename = "alumnosRiesgoCount",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub at_risk_count: i64,
    /// Students averaging above 17
    #[serde(
        rename = "excelenciaAcademica",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub excellence_count: i64,
}

/// Daily attempt count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPoint {
    /// Day label
    #[serde(rename = "fecha", default, deserialize_with = "flexible::or_default")]
    pub date: String,
    /// Attempts on that day
    #[serde(rename = "intentos", default, deserialize_with = "flexible::integer")]
    pub attempts: i64,
}

/// Named value for pie charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    /// Slice name
    #[serde(default, deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Slice value
    #[serde(default, deserialize_with = "flexible::number")]
    pub value: f64,
}

/// Name with an average score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredName {
    /// Display name
    #[serde(default, alias = "nombre", deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Average on the 0-20 scale
    #[serde(rename = "promedio", default, deserialize_with = "flexible::number")]
    pub average: f64,
}

/// Weekly average of a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverage {
    /// Week label
    #[serde(rename = "semana", default, deserialize_with = "flexible::or_default")]
    pub week: String,
    /// Average on the 0-20 scale
    #[serde(rename = "promedio", default, deserialize_with = "flexible::number")]
    pub average: f64,
}

/// Pass/fail distributions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassRates {
    /// Whole platform
    #[serde(default, deserialize_with = "flexible::or_default")]
    pub general: Vec<NamedValue>,
    /// First-cycle course
    #[serde(rename = "curso1", default, deserialize_with = "flexible::or_default")]
    pub first_course: Vec<NamedValue>,
    /// Second-cycle course
    #[serde(rename = "curso2", default, deserialize_with = "flexible::or_default")]
    pub second_course: Vec<NamedValue>,
}

/// Best and worst topics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopRankings {
    /// Highest averages
    #[serde(rename = "mejores", default, deserialize_with = "flexible::or_default")]
    pub best: Vec<ScoredName>,
    /// Lowest averages
    #[serde(rename = "peores", default, deserialize_with = "flexible::or_default")]
    pub worst: Vec<ScoredName>,
}

/// Weekly averages per course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    /// First-cycle course
    #[serde(rename = "curso1", default, deserialize_with = "flexible::or_default")]
    pub first_course: Vec<WeeklyAverage>,
    /// Second-cycle course
    #[serde(rename = "curso2", default, deserialize_with = "flexible::or_default")]
    pub second_course: Vec<WeeklyAverage>,
}

/// `GET /admin/analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    /// Headline counters
    #[serde(default, deserialize_with = "flexible::or_default")]
    pub stats: ReportStats,
    /// Seven-day activity
    #[serde(rename = "graficoLinea", default, deserialize_with = "flexible::or_default")]
    pub activity: Vec<ActivityPoint>,
    /// Pass rates
    #[serde(rename = "pasteles", default, deserialize_with = "flexible::or_default")]
    pub pass_rates: PassRates,
    /// Best and worst topics
    #[serde(default, deserialize_with = "flexible::or_default")]
    pub tops: TopRankings,
    /// Weekly averages
    #[serde(rename = "semanal", default, deserialize_with = "flexible::or_default")]
    pub weekly: WeeklySeries,
}

/// One student row of the advanced report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
    /// Student id
    #[serde(default, deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Full name
    #[serde(rename = "nombre", default, deserialize_with = "flexible::or_default")]
    pub name: String,
    /// Institution name
    #[serde(rename = "institucion", default, deserialize_with = "flexible::or_default")]
    pub institution: String,
    /// Institution id
    #[serde(
        rename = "institucion_id",
        default,
        deserialize_with = "flexible::opt_integer"
    )]
    pub institution_id: Option<EntityId>,
    /// Career name
    #[serde(rename = "carrera", default, deserialize_with = "flexible::or_default")]
    pub career: String,
    /// Career id
    #[serde(rename = "carrera_id", default, deserialize_with = "flexible::opt_integer")]
    pub career_id: Option<EntityId>,
    /// Cycle name
    #[serde(rename = "ciclo", default, deserialize_with = "flexible::or_default")]
    pub cycle: String,
    /// Name of the assigned course
    #[serde(rename = "curso_asignado", default, deserialize_with = "flexible::or_default")]
    pub assigned_course: String,
    /// Completed lessons
    #[serde(
        rename = "lecciones_completadas",
        default,
        deserialize_with = "flexible::integer"
    )]
    pub completed_lessons: i64,
    /// Overall average on the 0-20 scale
    #[serde(rename = "promedio_global", default, deserialize_with = "flexible::number")]
    pub overall_average: f64,
    /// Backend's performance label
    #[serde(rename = "nivel_rendimiento", default, deserialize_with = "flexible::or_default")]
    pub performance_level: String,
}

/// Id/name pair from the report's master lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Identifier
    #[serde(deserialize_with = "flexible::integer")]
    pub id: EntityId,
    /// Display name
    #[serde(rename = "nombre", default, deserialize_with = "flexible::or_default")]
    pub name: String,
}

/// Master lists for the report filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterLists {
    /// Institutions
    #[serde(rename = "instituciones", default, deserialize_with = "flexible::or_default")]
    pub institutions: Vec<Choice>,
    /// Careers
    #[serde(rename = "carreras", default, deserialize_with = "flexible::or_default")]
    pub careers: Vec<Choice>,
    /// Courses
    #[serde(rename = "cursos", default, deserialize_with = "flexible::or_default")]
    pub courses: Vec<Choice>,
}

/// `GET /admin/analytics/advanced`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedAnalytics {
    /// Per-student detail
    #[serde(rename = "estudiantes", default, deserialize_with = "flexible::or_default")]
    pub students: Vec<StudentReport>,
    /// Average per institution
    #[serde(rename = "instituciones", default, deserialize_with = "flexible::or_default")]
    pub institutions: Vec<ScoredName>,
    /// Filter master lists
    #[serde(rename = "listas", default, deserialize_with = "flexible::or_default")]
    pub lists: MasterLists,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(1), RoleKind::Admin)]
    #[case(json!(2), RoleKind::Teacher)]
    #[case(json!(3), RoleKind::Student)]
    #[case(json!(4), RoleKind::Admin)]
    #[case(json!(5), RoleKind::Teacher)]
    #[case(json!(9), RoleKind::Unknown)]
    #[case(json!("admin"), RoleKind::Admin)]
    #[case(json!("Profesor"), RoleKind::Teacher)]
    #[case(json!("2"), RoleKind::Teacher)]
    #[case(json!("4"), RoleKind::Admin)]
    #[case(json!("5"), RoleKind::Teacher)]
    #[case(json!("Profe Nuevo"), RoleKind::Teacher)]
    #[case(json!("invitado"), RoleKind::Unknown)]
    fn test_role_classification(#[case] raw: serde_json::Value, #[case] expected: RoleKind) {
        let role: Role = serde_json::from_value(raw).unwrap();
        assert_eq!(role.kind(), expected);
    }

    #[test]
    fn test_login_response_merges_role() {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": "abc.def",
            "usuario": {"id": 7, "nombre": "Ana", "apellido": "Quispe", "foto": null},
            "rol": 1
        }))
        .unwrap();

        let (user, token) = response.into_session();
        assert_eq!(token, "abc.def");
        assert_eq!(user.role_kind(), RoleKind::Admin);
        assert_eq!(user.display_name(), "Ana Quispe");
        assert!(user.extra.contains_key("foto"));
    }

    #[test]
    fn test_session_user_round_trip_keeps_unknown_fields() {
        let raw = json!({"id": 3, "nombre": "Luis", "rol": "profesor", "institucion_id": 4});
        let user: SessionUser = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let report: StudentReport = serde_json::from_value(json!({
            "id": "12",
            "nombre": "Rosa",
            "promedio_global": "14.50",
            "lecciones_completadas": "8",
            "institucion_id": 2,
            "carrera_id": null
        }))
        .unwrap();

        assert_eq!(report.id, 12);
        assert_eq!(report.overall_average, 14.5);
        assert_eq!(report.completed_lessons, 8);
        assert_eq!(report.institution_id, Some(2));
        assert_eq!(report.career_id, None);
    }

    #[test]
    fn test_missing_collections_decode_empty() {
        let overview: AnalyticsOverview = serde_json::from_value(json!({})).unwrap();
        assert!(overview.activity.is_empty());
        assert!(overview.tops.best.is_empty());

        let advanced: AdvancedAnalytics =
            serde_json::from_value(json!({"listas": {"cursos": [{"id": 1, "nombre": "Cálculo"}]}}))
                .unwrap();
        assert!(advanced.students.is_empty());
        assert_eq!(advanced.lists.courses.len(), 1);
    }

    #[test]
    fn test_null_text_fields_decode_as_empty() {
        let advanced: AdvancedAnalytics = serde_json::from_value(json!({
            "estudiantes": [{
                "id": 4,
                "nombre": "Rosa",
                "institucion": null,
                "carrera": null,
                "ciclo": null,
                "curso_asignado": null,
                "nivel_rendimiento": null,
                "promedio_global": 15
            }],
            "instituciones": null,
            "listas": {"instituciones": null, "carreras": [], "cursos": null}
        }))
        .unwrap();

        let student = advanced.students.first().unwrap();
        assert_eq!(student.name, "Rosa");
        assert_eq!(student.career, "");
        assert_eq!(student.assigned_course, "");
        assert_eq!(student.overall_average, 15.0);
        assert!(advanced.institutions.is_empty());
        assert!(advanced.lists.courses.is_empty());

        let entry: ActivityEntry =
            serde_json::from_value(json!({"id": 1, "alumno": null, "curso": null})).unwrap();
        assert_eq!(entry.student, "");
        assert_eq!(entry.course, "");
    }

    #[test]
    fn test_required_names_still_required() {
        let missing = serde_json::from_value::<Institution>(json!({"id": 1}));
        assert!(missing.is_err());

        let null_name: Institution =
            serde_json::from_value(json!({"id": 1, "nombre": null})).unwrap();
        assert_eq!(null_name.name, "");
    }

    #[test]
    fn test_store_item_type_name_fallback() {
        let item: StoreItem = serde_json::from_value(json!({
            "id": 1,
            "nombre_item": "Gorro",
            "costo_gemas": 100,
            "url_imagenes_equipado": {"LLAMA_ROJA": "items/gorro_roja.png"}
        }))
        .unwrap();

        assert_eq!(item.type_name(), "Desconocido");
        assert_eq!(
            item.equipped_images.get("LLAMA_ROJA").map(String::as_str),
            Some("items/gorro_roja.png")
        );
    }

    #[test]
    fn test_teacher_courses_accept_list() {
        let teacher: Teacher = serde_json::from_value(json!({
            "id": 5,
            "nombre_completo": "Carla Ríos",
            "correo": "carla@uni.pe",
            "cursos": ["Cálculo", "Estadística"]
        }))
        .unwrap();

        assert_eq!(teacher.courses.as_deref(), Some("Cálculo, Estadística"));
    }
}
