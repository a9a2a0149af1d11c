//! Typed services for every backend resource
//!
//! Each service knows its endpoints, how to turn a draft into a request body
//! and which record type the list returns. [`crate::crud::CrudController`]
//! drives any of them through the same page lifecycle.

use crate::api_client::ApiClient;
use crate::{ClientError, Result};
use async_trait::async_trait;
use llama_core::forms::{
    self, CareerDraft, CharacterDraft, CourseDraft, CycleDraft, InstitutionDraft, ItemTypeDraft,
    LessonDraft, MultipartDraft, QuestionDraft, StoreItemDraft, TeacherDraft, TopicDraft,
};
use llama_core::types::{
    AdvancedAnalytics, AnalyticsOverview, Career, Character, Course, Cycle, DashboardSummary,
    Institution, ItemType, Lesson, LoginRequest, LoginResponse, Question, StoreItem, Student,
    Teacher, Topic,
};
use llama_core::EntityId;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cmp::Reverse;
use std::fmt;

/// Every resource the admin manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Institutions
    Institutions,
    /// Careers of an institution
    Careers,
    /// Academic cycles
    Cycles,
    /// Courses
    Courses,
    /// Topics of a course
    Topics,
    /// Lessons of a topic
    Lessons,
    /// Questions of a lesson
    Questions,
    /// Store items
    StoreItems,
    /// Store item categories
    ItemTypes,
    /// Playable characters
    Characters,
    /// Teachers
    Teachers,
    /// Students
    Students,
}

impl ResourceKind {
    /// Capitalised singular name used in notices
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Institutions => "Institution",
            Self::Careers => "Career",
            Self::Cycles => "Cycle",
            Self::Courses => "Course",
            Self::Topics => "Topic",
            Self::Lessons => "Lesson",
            Self::Questions => "Question",
            Self::StoreItems => "Item",
            Self::ItemTypes => "Item type",
            Self::Characters => "Character",
            Self::Teachers => "Teacher",
            Self::Students => "Student",
        }
    }

    /// Lower-case plural name
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Institutions => "institutions",
            Self::Careers => "careers",
            Self::Cycles => "cycles",
            Self::Courses => "courses",
            Self::Topics => "topics",
            Self::Lessons => "lessons",
            Self::Questions => "questions",
            Self::StoreItems => "store items",
            Self::ItemTypes => "item types",
            Self::Characters => "characters",
            Self::Teachers => "teachers",
            Self::Students => "students",
        }
    }

    /// Likely reason a delete was refused, for resources that own children
    #[must_use]
    pub const fn dependents_message(self) -> Option<&'static str> {
        match self {
            Self::Cycles => Some("Cannot delete: the cycle still has courses"),
            Self::Courses => Some("Cannot delete: the course may still have topics"),
            Self::Topics => Some("Cannot delete: the topic may still have lessons"),
            Self::Lessons => Some("Cannot delete: the lesson still has questions"),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

/// Request body of a create or update
#[derive(Clone, Copy)]
pub enum Payload<'a> {
    /// JSON body
    Json(&'a (dyn erased::SerializeSync + 'a)),
    /// `multipart/form-data` body
    Multipart(&'a (dyn MultipartDraft + Sync)),
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(_) => f.write_str("Payload::Json"),
            Self::Multipart(_) => f.write_str("Payload::Multipart"),
        }
    }
}

/// Object-safe serialization for JSON payloads
pub mod erased {
    /// A value that can render itself as JSON and be shared across tasks
    pub trait SerializeSync: Sync {
        /// JSON form of the value
        fn to_json(&self) -> serde_json::Result<serde_json::Value>;
    }

    impl<T: serde::Serialize + Sync> SerializeSync for T {
        fn to_json(&self) -> serde_json::Result<serde_json::Value> {
            serde_json::to_value(self)
        }
    }
}

/// A backend resource with list/create/update/delete endpoints
#[async_trait]
pub trait ResourceService: Send + Sync + fmt::Debug {
    /// Record returned by the list endpoint
    type Record: DeserializeOwned + Clone + Send + Sync + 'static;

    /// Form submitted on create and update
    type Draft: Send + Sync;

    /// Which resource this is
    fn kind(&self) -> ResourceKind;

    /// Identifier of a record
    fn record_id(record: &Self::Record) -> EntityId;

    /// Path of the list endpoint
    fn list_path(&self) -> String;

    /// Path of the create endpoint, `None` when creation is not offered
    fn create_path(&self) -> Option<String>;

    /// Path of one record, `None` when updates are not offered
    fn item_path(&self, id: EntityId) -> Option<String>;

    /// Path used to delete a record
    fn delete_path(&self, id: EntityId) -> Option<String> {
        self.item_path(id)
    }

    /// Validate `draft` and borrow it as a request body
    fn payload<'a>(&self, draft: &'a Self::Draft, creating: bool) -> Result<Payload<'a>>;

    /// Fetch the full list
    async fn list(&self, api: &ApiClient) -> Result<Vec<Self::Record>> {
        api.get(&self.list_path()).await
    }

    /// Create a record
    async fn create(&self, api: &ApiClient, draft: &Self::Draft) -> Result<()> {
        let path = self
            .create_path()
            .ok_or_else(|| unsupported(self.kind(), "created"))?;
        let payload = self.payload(draft, true)?;
        submit(api, &path, payload, true).await
    }

    /// Update a record
    async fn update(&self, api: &ApiClient, id: EntityId, draft: &Self::Draft) -> Result<()> {
        let path = self
            .item_path(id)
            .ok_or_else(|| unsupported(self.kind(), "updated"))?;
        let payload = self.payload(draft, false)?;
        submit(api, &path, payload, false).await
    }

    /// Delete a record
    async fn delete(&self, api: &ApiClient, id: EntityId) -> Result<()> {
        let path = self
            .delete_path(id)
            .ok_or_else(|| unsupported(self.kind(), "deleted"))?;
        api.delete(&path).await
    }
}

fn unsupported(kind: ResourceKind, operation: &'static str) -> ClientError {
    ClientError::Unsupported {
        resource: kind.plural().to_string(),
        operation,
    }
}

async fn submit(api: &ApiClient, path: &str, payload: Payload<'_>, creating: bool) -> Result<()> {
    let method = if creating { Method::POST } else { Method::PUT };
    match payload {
        Payload::Json(body) => api.write_json(method, path, &body.to_json()?).await,
        Payload::Multipart(form) => api.write_multipart(method, path, form).await,
    }
}

fn json<T: Serialize + Sync>(draft: &T) -> Payload<'_> {
    Payload::Json(draft)
}

/// `/instituciones`
#[derive(Debug, Clone, Copy, Default)]
pub struct InstitutionService;

#[async_trait]
impl ResourceService for InstitutionService {
    type Record = Institution;
    type Draft = InstitutionDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Institutions
    }

    fn record_id(record: &Institution) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "instituciones".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("instituciones".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("instituciones/{id}"))
    }

    fn payload<'a>(&self, draft: &'a InstitutionDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// Careers of one institution
#[derive(Debug, Clone, Copy)]
pub struct CareerService {
    /// Parent institution
    pub institution_id: EntityId,
}

#[async_trait]
impl ResourceService for CareerService {
    type Record = Career;
    type Draft = CareerDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Careers
    }

    fn record_id(record: &Career) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        format!("carreras/institucion/{}", self.institution_id)
    }

    fn create_path(&self) -> Option<String> {
        Some("carreras".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("carreras/{id}"))
    }

    fn payload<'a>(&self, draft: &'a CareerDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// `/ciclos`
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleService;

#[async_trait]
impl ResourceService for CycleService {
    type Record = Cycle;
    type Draft = CycleDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Cycles
    }

    fn record_id(record: &Cycle) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "ciclos".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("ciclos".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("ciclos/{id}"))
    }

    fn payload<'a>(&self, draft: &'a CycleDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// `/cursos`
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseService;

impl CourseService {
    /// Fetch one course
    pub async fn detail(&self, api: &ApiClient, id: EntityId) -> Result<Course> {
        api.get(&format!("cursos/{id}")).await
    }

    /// Courses together with the cycles their form picks from
    ///
    /// Both lists are requested concurrently; either failing fails the pair.
    pub async fn list_with_cycles(&self, api: &ApiClient) -> Result<(Vec<Course>, Vec<Cycle>)> {
        futures::try_join!(self.list(api), CycleService.list(api))
    }
}

#[async_trait]
impl ResourceService for CourseService {
    type Record = Course;
    type Draft = CourseDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Courses
    }

    fn record_id(record: &Course) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "cursos".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("cursos".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("cursos/{id}"))
    }

    fn payload<'a>(&self, draft: &'a CourseDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// Topics of one course
#[derive(Debug, Clone, Copy)]
pub struct TopicService {
    /// Parent course
    pub course_id: EntityId,
}

impl TopicService {
    /// Fetch one topic with its image URLs
    pub async fn detail(&self, api: &ApiClient, id: EntityId) -> Result<Topic> {
        api.get(&format!("temas/{id}")).await
    }

    /// The parent course and its topics, fetched concurrently
    pub async fn list_with_course(&self, api: &ApiClient) -> Result<(Course, Vec<Topic>)> {
        futures::try_join!(CourseService.detail(api, self.course_id), self.list(api))
    }
}

#[async_trait]
impl ResourceService for TopicService {
    type Record = Topic;
    type Draft = TopicDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Topics
    }

    fn record_id(record: &Topic) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        format!("cursos/{}/temario", self.course_id)
    }

    fn create_path(&self) -> Option<String> {
        Some("temas".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("temas/{id}"))
    }

    fn payload<'a>(&self, draft: &'a TopicDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(Payload::Multipart(draft))
    }
}

/// Lessons of one topic
#[derive(Debug, Clone, Copy)]
pub struct LessonService {
    /// Parent topic
    pub topic_id: EntityId,
}

impl LessonService {
    /// Fetch one lesson including its questions
    pub async fn detail(&self, api: &ApiClient, id: EntityId) -> Result<Lesson> {
        api.get(&format!("lecciones/{id}")).await
    }
}

#[async_trait]
impl ResourceService for LessonService {
    type Record = Lesson;
    type Draft = LessonDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Lessons
    }

    fn record_id(record: &Lesson) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        format!("temas/{}/lecciones", self.topic_id)
    }

    fn create_path(&self) -> Option<String> {
        Some("lecciones".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("lecciones/{id}"))
    }

    fn payload<'a>(&self, draft: &'a LessonDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// Questions of one lesson
///
/// The list comes from the lesson detail's `preguntas` field.
#[derive(Debug, Clone, Copy)]
pub struct QuestionService {
    /// Parent lesson
    pub lesson_id: EntityId,
}

/// A question draft after validation, ready to submit
#[derive(Debug, Clone)]
pub struct ValidatedQuestion(forms::QuestionPayload);

impl ValidatedQuestion {
    /// Validate a draft
    ///
    /// # Errors
    ///
    /// Returns the first validation problem of the draft.
    pub fn new(draft: &QuestionDraft) -> Result<Self> {
        Ok(Self(draft.to_payload()?))
    }

    /// The validated body
    #[must_use]
    pub const fn payload(&self) -> &forms::QuestionPayload {
        &self.0
    }
}

#[async_trait]
impl ResourceService for QuestionService {
    type Record = Question;
    type Draft = ValidatedQuestion;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Questions
    }

    fn record_id(record: &Question) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        format!("lecciones/{}", self.lesson_id)
    }

    fn create_path(&self) -> Option<String> {
        Some(format!("lecciones/{}/preguntas", self.lesson_id))
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("lecciones/preguntas/{id}"))
    }

    fn payload<'a>(&self, draft: &'a ValidatedQuestion, _creating: bool) -> Result<Payload<'a>> {
        Ok(json(&draft.0))
    }

    async fn list(&self, api: &ApiClient) -> Result<Vec<Question>> {
        let lesson: Lesson = api.get(&self.list_path()).await?;
        Ok(lesson.questions)
    }
}

/// `/tienda/items`
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreItemService;

impl StoreItemService {
    /// Items plus the categories and characters their form needs, fetched concurrently
    pub async fn list_with_context(
        &self,
        api: &ApiClient,
    ) -> Result<(Vec<StoreItem>, Vec<ItemType>, Vec<Character>)> {
        futures::try_join!(
            self.list(api),
            ItemTypeService.list(api),
            CharacterService.list(api)
        )
    }
}

#[async_trait]
impl ResourceService for StoreItemService {
    type Record = StoreItem;
    type Draft = StoreItemDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::StoreItems
    }

    fn record_id(record: &StoreItem) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "tienda/items".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("tienda/items".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("tienda/items/{id}"))
    }

    fn payload<'a>(&self, draft: &'a StoreItemDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(Payload::Multipart(draft))
    }
}

/// `/tienda/tipos`
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemTypeService;

#[async_trait]
impl ResourceService for ItemTypeService {
    type Record = ItemType;
    type Draft = ItemTypeDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::ItemTypes
    }

    fn record_id(record: &ItemType) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "tienda/tipos".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("tienda/tipos".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("tienda/tipos/{id}"))
    }

    fn payload<'a>(&self, draft: &'a ItemTypeDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// `/personajes`
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterService;

#[async_trait]
impl ResourceService for CharacterService {
    type Record = Character;
    type Draft = CharacterDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Characters
    }

    fn record_id(record: &Character) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "personajes".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("personajes".to_string())
    }

    fn item_path(&self, id: EntityId) -> Option<String> {
        Some(format!("personajes/{id}"))
    }

    fn payload<'a>(&self, draft: &'a CharacterDraft, creating: bool) -> Result<Payload<'a>> {
        if creating {
            draft.validate_for_create()?;
        } else {
            forms::check(draft)?;
        }
        Ok(Payload::Multipart(draft))
    }
}

/// `/admin/profesores`; teachers are created and deleted, never edited
#[derive(Debug, Clone, Copy, Default)]
pub struct TeacherService;

#[async_trait]
impl ResourceService for TeacherService {
    type Record = Teacher;
    type Draft = TeacherDraft;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Teachers
    }

    fn record_id(record: &Teacher) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "admin/profesores".to_string()
    }

    fn create_path(&self) -> Option<String> {
        Some("admin/profesores".to_string())
    }

    fn item_path(&self, _id: EntityId) -> Option<String> {
        None
    }

    fn delete_path(&self, id: EntityId) -> Option<String> {
        Some(format!("admin/users/{id}"))
    }

    fn payload<'a>(&self, draft: &'a TeacherDraft, _creating: bool) -> Result<Payload<'a>> {
        forms::check(draft)?;
        Ok(json(draft))
    }
}

/// Orderings offered on the students page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudentOrder {
    /// As returned by the backend
    #[default]
    All,
    /// Most experience first
    TopExperience,
    /// Most gems first
    TopGems,
}

/// `/admin/estudiantes`, read-only
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentService;

impl StudentService {
    /// Apply one of the page's orderings
    pub fn order(students: &mut [Student], order: StudentOrder) {
        match order {
            StudentOrder::All => {}
            StudentOrder::TopExperience => students.sort_by_key(|s| Reverse(s.experience)),
            StudentOrder::TopGems => students.sort_by_key(|s| Reverse(s.gems)),
        }
    }
}

#[async_trait]
impl ResourceService for StudentService {
    type Record = Student;
    type Draft = ();

    fn kind(&self) -> ResourceKind {
        ResourceKind::Students
    }

    fn record_id(record: &Student) -> EntityId {
        record.id
    }

    fn list_path(&self) -> String {
        "admin/estudiantes".to_string()
    }

    fn create_path(&self) -> Option<String> {
        None
    }

    fn item_path(&self, _id: EntityId) -> Option<String> {
        None
    }

    fn payload<'a>(&self, _draft: &'a (), _creating: bool) -> Result<Payload<'a>> {
        Err(unsupported(ResourceKind::Students, "edited"))
    }
}

/// Exchange credentials for a session
///
/// The caller stores the result with [`crate::SessionStore::login`].
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<LoginResponse> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    api.post("auth/login", &request).await
}

/// Landing metrics and recent activity
pub async fn dashboard(api: &ApiClient) -> Result<DashboardSummary> {
    api.get("admin/dashboard").await
}

/// Charts payload of the reports page
pub async fn analytics_overview(api: &ApiClient) -> Result<AnalyticsOverview> {
    api.get("admin/analytics").await
}

/// Per-student table and master lists of the reports page
pub async fn analytics_advanced(api: &ApiClient) -> Result<AdvancedAnalytics> {
    api.get("admin/analytics/advanced").await
}

/// Both analytics payloads, fetched concurrently
pub async fn reports(api: &ApiClient) -> Result<(AnalyticsOverview, AdvancedAnalytics)> {
    futures::try_join!(analytics_overview(api), analytics_advanced(api))
}
