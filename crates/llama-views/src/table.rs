//! Generic searchable, sortable data table
//!
//! Columns are typed descriptors over a row type `T`. A column with a key
//! and an accessor takes part in search and sort; a column with only a
//! renderer is display-only. The filtered-then-sorted view is cached and
//! recomputed only after rows, search text or sort state change.

use std::cmp::Ordering;
use std::fmt;

/// Value a keyed column exposes for search and sort
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing or blank
    Empty,
    /// Boolean flag
    Bool(bool),
    /// Any numeric value
    Number(f64),
    /// Text
    Text(String),
}

impl CellValue {
    /// Text used for searching and display, `None` for empty cells
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Number(value) => Some(value.to_string()),
            Self::Text(text) if text.is_empty() => None,
            Self::Text(text) => Some(text.clone()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order used for sorting
    ///
    /// Values of different kinds order as empty, booleans, numbers, text.
    /// Numbers compare numerically and text compares lexicographically.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text().as_deref().unwrap_or(""))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CellValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl<V: Into<Self>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> CellValue + Send + Sync>;
type Renderer<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// One table column
pub struct Column<T> {
    label: String,
    key: Option<&'static str>,
    accessor: Option<Accessor<T>>,
    renderer: Option<Renderer<T>>,
}

impl<T> Column<T> {
    /// A searchable, sortable column reading `key` through `accessor`
    #[must_use]
    pub fn keyed(
        label: impl Into<String>,
        key: &'static str,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            key: Some(key),
            accessor: Some(Box::new(accessor)),
            renderer: None,
        }
    }

    /// A display-only column
    #[must_use]
    pub fn display(
        label: impl Into<String>,
        renderer: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            key: None,
            accessor: None,
            renderer: Some(Box::new(renderer)),
        }
    }

    /// Render cells with `renderer` instead of the raw value
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Header label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Field key, `None` for display-only columns
    #[must_use]
    pub const fn key(&self) -> Option<&'static str> {
        self.key
    }

    /// Whether the column takes part in search and sort
    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        self.key.is_some() && self.accessor.is_some()
    }

    /// Raw value of a row
    #[must_use]
    pub fn value(&self, row: &T) -> CellValue {
        self.accessor
            .as_ref()
            .map_or(CellValue::Empty, |accessor| accessor(row))
    }

    /// Rendered cell text
    #[must_use]
    pub fn render(&self, row: &T) -> String {
        self.renderer
            .as_ref()
            .map_or_else(|| self.value(row).to_string(), |renderer| renderer(row))
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("key", &self.key)
            .field("has_renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Active sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    /// Column key
    pub key: &'static str,
    /// Direction
    pub direction: SortDirection,
}

impl SortState {
    /// Next state after a click on `key`
    ///
    /// The same key flips ascending to descending and back; a different key
    /// starts ascending.
    #[must_use]
    pub fn toggled(current: Option<Self>, key: &'static str) -> Self {
        let direction = match current {
            Some(state) if state.key == key && state.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        Self { key, direction }
    }
}

/// Why a view has no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The table has no rows at all
    NoData,
    /// Rows exist but none match the search
    NoResults,
}

impl EmptyState {
    /// Message shown in place of the rows
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoData => "No records available.",
            Self::NoResults => "No results match your search.",
        }
    }
}

/// Per-row action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Open the row's children
    View,
    /// Edit the row
    Edit,
    /// Delete the row
    Delete,
}

type ActionHandler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Optional action callbacks
pub struct RowActions<T> {
    on_view: Option<ActionHandler<T>>,
    on_edit: Option<ActionHandler<T>>,
    on_delete: Option<ActionHandler<T>>,
}

impl<T> Default for RowActions<T> {
    fn default() -> Self {
        Self {
            on_view: None,
            on_edit: None,
            on_delete: None,
        }
    }
}

impl<T> RowActions<T> {
    /// Set the view handler
    #[must_use]
    pub fn on_view(mut self, handler: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_view = Some(Box::new(handler));
        self
    }

    /// Set the edit handler
    #[must_use]
    pub fn on_edit(mut self, handler: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_edit = Some(Box::new(handler));
        self
    }

    /// Set the delete handler
    #[must_use]
    pub fn on_delete(mut self, handler: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Box::new(handler));
        self
    }

    /// Actions that have a handler, in display order
    #[must_use]
    pub fn available(&self) -> Vec<RowAction> {
        [
            (RowAction::View, self.on_view.is_some()),
            (RowAction::Edit, self.on_edit.is_some()),
            (RowAction::Delete, self.on_delete.is_some()),
        ]
        .into_iter()
        .filter_map(|(action, present)| present.then_some(action))
        .collect()
    }

    /// Whether any action is configured
    #[must_use]
    pub const fn any(&self) -> bool {
        self.on_view.is_some() || self.on_edit.is_some() || self.on_delete.is_some()
    }

    fn handler(&self, action: RowAction) -> Option<&ActionHandler<T>> {
        match action {
            RowAction::View => self.on_view.as_ref(),
            RowAction::Edit => self.on_edit.as_ref(),
            RowAction::Delete => self.on_delete.as_ref(),
        }
    }
}

impl<T> fmt::Debug for RowActions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.available()).finish()
    }
}

/// Result of filtering and sorting
#[derive(Debug)]
pub struct TableView<'a, T> {
    /// Rows to show, in order
    pub rows: Vec<&'a T>,
    /// `Showing N record(s)`
    pub count_label: String,
    /// Set when `rows` is empty
    pub empty: Option<EmptyState>,
}

/// Table state: columns, rows, search text, sort and the cached view
pub struct TableModel<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    search: String,
    sort: Option<SortState>,
    actions: RowActions<T>,
    cache: Option<Vec<usize>>,
    recomputations: usize,
}

impl<T> TableModel<T> {
    /// Create a table over `columns` with no rows
    #[must_use]
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            search: String::new(),
            sort: None,
            actions: RowActions::default(),
            cache: None,
            recomputations: 0,
        }
    }

    /// Attach row actions
    #[must_use]
    pub fn with_actions(mut self, actions: RowActions<T>) -> Self {
        self.actions = actions;
        self
    }

    /// Replace every row
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.cache = None;
    }

    /// Change the search text
    pub fn set_search(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.search {
            self.search = query;
            self.cache = None;
        }
    }

    /// Click on a column header
    ///
    /// Returns `false` (and changes nothing) when no keyed column has `key`.
    pub fn sort_by(&mut self, key: &str) -> bool {
        let Some(key) = self
            .columns
            .iter()
            .filter(|column| column.is_keyed())
            .find_map(|column| column.key.filter(|k| *k == key))
        else {
            return false;
        };

        self.sort = Some(SortState::toggled(self.sort, key));
        self.cache = None;
        true
    }

    /// Set the sort state directly
    pub fn set_sort(&mut self, sort: Option<SortState>) {
        if sort != self.sort {
            self.sort = sort;
            self.cache = None;
        }
    }

    /// Columns
    #[must_use]
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// All rows, unfiltered
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Current sort
    #[must_use]
    pub const fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Current search text
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Whether an actions column is shown
    #[must_use]
    pub const fn has_actions(&self) -> bool {
        self.actions.any()
    }

    /// How many times the view has been computed
    #[must_use]
    pub const fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Invoke the handler for `action` on `row`
    ///
    /// Returns `false` when that action is not configured.
    pub fn dispatch(&self, action: RowAction, row: &T) -> bool {
        self.actions.handler(action).is_some_and(|handler| {
            handler(row);
            true
        })
    }

    /// Filtered and sorted rows
    pub fn view(&mut self) -> TableView<'_, T> {
        self.refresh();
        self.snapshot()
    }

    fn refresh(&mut self) {
        if self.cache.is_none() {
            self.cache = Some(self.compute());
            self.recomputations += 1;
        }
    }

    fn snapshot(&self) -> TableView<'_, T> {
        let rows: Vec<&T> = self
            .cache
            .iter()
            .flatten()
            .filter_map(|&index| self.rows.get(index))
            .collect();

        let empty = rows.is_empty().then(|| {
            if self.search.is_empty() {
                EmptyState::NoData
            } else {
                EmptyState::NoResults
            }
        });

        TableView {
            count_label: format!("Showing {} record(s)", rows.len()),
            rows,
            empty,
        }
    }

    fn matches(&self, row: &T, needle: &str) -> bool {
        self.columns
            .iter()
            .filter(|column| column.is_keyed())
            .filter_map(|column| column.value(row).as_text())
            .any(|text| text.to_lowercase().contains(needle))
    }

    fn compute(&self) -> Vec<usize> {
        let needle = self.search.to_lowercase();
        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&index| {
                needle.is_empty()
                    || self
                        .rows
                        .get(index)
                        .is_some_and(|row| self.matches(row, &needle))
            })
            .collect();

        if let Some(sort) = self.sort {
            if let Some(column) = self
                .columns
                .iter()
                .find(|column| column.is_keyed() && column.key == Some(sort.key))
            {
                let mut keyed: Vec<(usize, CellValue)> = indices
                    .iter()
                    .filter_map(|&index| self.rows.get(index).map(|row| (index, column.value(row))))
                    .collect();
                keyed.sort_by(|(_, a), (_, b)| match sort.direction {
                    SortDirection::Ascending => a.total_cmp(b),
                    SortDirection::Descending => b.total_cmp(a),
                });
                indices = keyed.into_iter().map(|(index, _)| index).collect();
            }
        }

        indices
    }

    /// Plain-text rendering: header, one line per row, then the count or the
    /// empty-state message
    pub fn render_text(&mut self) -> String {
        let has_actions = self.has_actions();
        let actions_cell = self
            .actions
            .available()
            .iter()
            .map(|action| match action {
                RowAction::View => "view",
                RowAction::Edit => "edit",
                RowAction::Delete => "delete",
            })
            .collect::<Vec<_>>()
            .join("/");

        let mut header: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let marker = match self.sort {
                    Some(sort) if column.key == Some(sort.key) => match sort.direction {
                        SortDirection::Ascending => " ^",
                        SortDirection::Descending => " v",
                    },
                    _ => "",
                };
                format!("{}{marker}", column.label)
            })
            .collect();
        if has_actions {
            header.push("Actions".to_string());
        }

        self.refresh();
        let view = self.snapshot();
        let mut lines: Vec<Vec<String>> = vec![header];
        for row in &view.rows {
            let mut cells: Vec<String> = self.columns.iter().map(|column| column.render(row)).collect();
            if has_actions {
                cells.push(actions_cell.clone());
            }
            lines.push(cells);
        }

        let widths: Vec<usize> = (0..lines.first().map_or(0, Vec::len))
            .map(|i| {
                lines
                    .iter()
                    .filter_map(|cells| cells.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for cells in &lines {
            let line = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push_str(view.empty.map_or(view.count_label.as_str(), |empty| -> &str { empty.message() }));
        out.push('\n');
        out
    }
}

impl<T> fmt::Debug for TableModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableModel")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("search", &self.search)
            .field("sort", &self.sort)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}
