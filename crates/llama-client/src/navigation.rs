//! Application routes and navigation

use llama_core::EntityId;
use parking_lot::RwLock;
use std::fmt;

/// Every page the admin shell can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Login form, the only public page
    Login,
    /// Landing metrics
    Dashboard,
    /// Institutions list
    Institutions,
    /// Careers of one institution
    Careers {
        /// Parent institution
        institution_id: EntityId,
    },
    /// Teachers list
    Teachers,
    /// Students list
    Students,
    /// Cycles list
    Cycles,
    /// Courses list
    Courses,
    /// Topics of one course
    Topics {
        /// Parent course
        course_id: EntityId,
    },
    /// Lessons of one topic
    Lessons {
        /// Parent topic
        topic_id: EntityId,
    },
    /// Questions of one lesson
    Questions {
        /// Parent lesson
        lesson_id: EntityId,
    },
    /// Store items
    Store,
    /// Store item categories
    ItemTypes,
    /// Playable characters
    Characters,
    /// Analytics reports
    Reports,
}

impl Route {
    /// Path of the route
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Institutions => "/instituciones".to_string(),
            Self::Careers { institution_id } => format!("/instituciones/{institution_id}/carreras"),
            Self::Teachers => "/profesores".to_string(),
            Self::Students => "/estudiantes".to_string(),
            Self::Cycles => "/ciclos".to_string(),
            Self::Courses => "/cursos".to_string(),
            Self::Topics { course_id } => format!("/cursos/{course_id}/temas"),
            Self::Lessons { topic_id } => format!("/temas/{topic_id}/lecciones"),
            Self::Questions { lesson_id } => format!("/lecciones/{lesson_id}/preguntas"),
            Self::Store => "/tienda".to_string(),
            Self::ItemTypes => "/tienda/categorias".to_string(),
            Self::Characters => "/personajes".to_string(),
            Self::Reports => "/reportes".to_string(),
        }
    }

    /// Parse a path back into a route
    ///
    /// `/usuarios` is an alias for the students page. Unknown paths fall back
    /// to the dashboard.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["login"] => Self::Login,
            ["instituciones"] => Self::Institutions,
            ["instituciones", raw, "carreras"] => {
                raw.parse().ok().map_or(Self::Dashboard, |institution_id| Self::Careers { institution_id })
            }
            ["profesores"] => Self::Teachers,
            ["estudiantes" | "usuarios"] => Self::Students,
            ["ciclos"] => Self::Cycles,
            ["cursos"] => Self::Courses,
            ["cursos", raw, "temas"] => {
                raw.parse().ok().map_or(Self::Dashboard, |course_id| Self::Topics { course_id })
            }
            ["temas", raw, "lecciones"] => {
                raw.parse().ok().map_or(Self::Dashboard, |topic_id| Self::Lessons { topic_id })
            }
            ["lecciones", raw, "preguntas"] => {
                raw.parse().ok().map_or(Self::Dashboard, |lesson_id| Self::Questions { lesson_id })
            }
            ["tienda"] => Self::Store,
            ["tienda", "categorias"] => Self::ItemTypes,
            ["personajes"] => Self::Characters,
            ["reportes"] => Self::Reports,
            _ => Self::Dashboard,
        }
    }

    /// Whether the route is reachable without a session
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where the user currently is, and how to move them
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Path of the current location
    fn current_path(&self) -> String;

    /// Move to `route`, replacing the current entry
    fn navigate(&self, route: Route);
}

/// In-process navigation history
#[derive(Debug)]
pub struct HistoryNavigator {
    history: RwLock<Vec<Route>>,
}

impl HistoryNavigator {
    /// Start at `initial`
    #[must_use]
    pub fn new(initial: Route) -> Self {
        Self {
            history: RwLock::new(vec![initial]),
        }
    }

    /// Current route
    #[must_use]
    pub fn current(&self) -> Route {
        self.history.read().last().copied().unwrap_or(Route::Dashboard)
    }

    /// Every visited route, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history.read().clone()
    }

    /// Push a route without replacing the current one
    pub fn push(&self, route: Route) {
        self.history.write().push(route);
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.current().path()
    }

    fn navigate(&self, route: Route) {
        tracing::debug!(to = %route, "navigating");
        let mut history = self.history.write();
        history.pop();
        history.push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Route::Login)]
    #[case(Route::Dashboard)]
    #[case(Route::Careers { institution_id: 4 })]
    #[case(Route::Topics { course_id: 12 })]
    #[case(Route::Lessons { topic_id: 3 })]
    #[case(Route::Questions { lesson_id: 99 })]
    #[case(Route::ItemTypes)]
    #[case(Route::Reports)]
    fn test_path_parses_back(#[case] route: Route) {
        assert_eq!(Route::from_path(&route.path()), route);
    }

    #[test]
    fn test_aliases_and_fallback() {
        assert_eq!(Route::from_path("/usuarios"), Route::Students);
        assert_eq!(Route::from_path("/nope"), Route::Dashboard);
        assert_eq!(Route::from_path("/cursos/abc/temas"), Route::Dashboard);
        assert_eq!(Route::from_path("/tienda/categorias/"), Route::ItemTypes);
    }

    #[test]
    fn test_history_navigator_replaces_current() {
        let nav = HistoryNavigator::new(Route::Courses);
        nav.push(Route::Topics { course_id: 1 });
        nav.navigate(Route::Login);

        assert_eq!(nav.current(), Route::Login);
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.history(), vec![Route::Courses, Route::Login]);
    }
}
