//! Entity filtering
//!
//! Lists are narrowed in a fixed order: tab, status, free-text search, then
//! department. The department stage resolves each entity's department
//! reference against the forest and fails closed when it cannot.

use std::str::FromStr;

use serde::Serialize;

use crate::department::{DepartmentForest, DepartmentNode};
use crate::error::{AppError, AppResult};
use crate::permission::VisibilityScope;
use crate::status::{Classified, SimpleStatus};

/// How an entity points at its department: by id, by display name, or both
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepartmentRef<'a> {
    pub id: Option<i64>,
    pub name: Option<&'a str>,
}

impl<'a> DepartmentRef<'a> {
    pub fn new(id: Option<i64>, name: Option<&'a str>) -> Self {
        Self { id, name }
    }

    pub fn id(id: i64) -> Self {
        Self::new(Some(id), None)
    }

    pub fn name(name: &'a str) -> Self {
        Self::new(None, Some(name))
    }

    /// Resolve against the forest.
    ///
    /// An id is authoritative: an unknown id does not resolve even when a name
    /// is present. Name-only references match the first department with that
    /// exact name; this path exists for older endpoints and is ambiguous when
    /// names repeat.
    pub fn resolve<'f>(&self, forest: &'f DepartmentForest) -> Option<&'f DepartmentNode> {
        match (self.id, self.name) {
            (Some(id), _) => forest.get(id),
            (None, Some(name)) => {
                let node = forest.find_by_name(name);
                if node.is_some() {
                    tracing::trace!("Resolved department by name: {}", name);
                }
                node
            }
            (None, None) => None,
        }
    }
}

/// Entities tagged with a department
pub trait DepartmentScoped {
    fn department_ref(&self) -> DepartmentRef<'_>;
}

/// Entities with free-text searchable fields
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Explicit department filter selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepartmentFilter {
    #[default]
    All,
    Department(i64),
}

impl FromStr for DepartmentFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(DepartmentFilter::All);
        }
        s.parse::<i64>()
            .map(DepartmentFilter::Department)
            .map_err(|_| AppError::BadRequest(format!("invalid department filter: {}", s)))
    }
}

impl DepartmentFilter {
    /// Accept only departments the actor could pick from the dropdown
    pub fn restrict_to(self, forest: &DepartmentForest, scope: &VisibilityScope) -> AppResult<Self> {
        let DepartmentFilter::Department(id) = self else {
            return Ok(self);
        };
        if forest.get(id).is_none() {
            return Err(AppError::UnresolvedDepartment(id.to_string()));
        }
        if !scope.can_see(id) {
            tracing::warn!("Department filter {} is outside the visibility scope", id);
            return Err(AppError::Forbidden(format!("department {}", id)));
        }
        Ok(self)
    }
}

/// Case-insensitive substring match over the entity's search fields.
/// A blank query matches everything.
pub fn matches_search<T: Searchable + ?Sized>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Department stage of the pipeline.
///
/// - explicit department: keep entities resolved to that department or any
///   department beneath it
/// - no explicit department, limited scope: keep entities whose department is
///   visible
/// - no explicit department, full access: keep everything
///
/// Unresolvable entities are dropped from both scoped cases.
pub fn filter_by_department<'a, T, I>(
    items: I,
    forest: &DepartmentForest,
    scope: &VisibilityScope,
    filter: DepartmentFilter,
) -> Vec<&'a T>
where
    T: DepartmentScoped + 'a,
    I: IntoIterator<Item = &'a T>,
{
    match filter {
        DepartmentFilter::Department(selected) => items
            .into_iter()
            .filter(|item| {
                item.department_ref()
                    .resolve(forest)
                    .is_some_and(|node| node.is_within(selected))
            })
            .collect(),
        DepartmentFilter::All if !scope.has_full_access() => items
            .into_iter()
            .filter(|item| {
                item.department_ref()
                    .resolve(forest)
                    .is_some_and(|node| scope.can_see(node.id))
            })
            .collect(),
        DepartmentFilter::All => items.into_iter().collect(),
    }
}

type Predicate<'q, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'q>;

/// Filters for one list screen
pub struct ListQuery<'q, T> {
    tab: Option<Predicate<'q, T>>,
    status: Option<Predicate<'q, T>>,
    search: String,
    department: DepartmentFilter,
}

impl<'q, T> Default for ListQuery<'q, T> {
    fn default() -> Self {
        Self {
            tab: None,
            status: None,
            search: String::new(),
            department: DepartmentFilter::All,
        }
    }
}

impl<'q, T> ListQuery<'q, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'q) -> Self {
        self.tab = Some(Box::new(predicate));
        self
    }

    pub fn status(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'q) -> Self {
        self.status = Some(Box::new(predicate));
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    pub fn department(mut self, filter: DepartmentFilter) -> Self {
        self.department = filter;
        self
    }

    pub fn department_filter(&self) -> DepartmentFilter {
        self.department
    }
}

impl<'q, T: Classified + 'q> ListQuery<'q, T> {
    /// Status stage keyed on the simplified status
    pub fn simple_status(self, wanted: SimpleStatus) -> Self {
        self.status(move |item: &T| item.simple_status() == wanted)
    }
}

/// Result of running a list through the pipeline
#[derive(Debug)]
pub struct FilterOutcome<'a, T> {
    /// After tab, status and search; before the department stage
    pub before_department: Vec<&'a T>,
    /// Final list
    pub items: Vec<&'a T>,
}

impl<'q, T: DepartmentScoped + Searchable> ListQuery<'q, T> {
    /// Run `items` through tab, status, search and department stages, in that
    /// order.
    pub fn apply<'a>(
        &self,
        items: &'a [T],
        forest: &DepartmentForest,
        scope: &VisibilityScope,
    ) -> FilterOutcome<'a, T> {
        let before_department: Vec<&'a T> = items
            .iter()
            .filter(|item| self.tab.as_ref().map_or(true, |f| f(*item)))
            .filter(|item| self.status.as_ref().map_or(true, |f| f(*item)))
            .filter(|item| matches_search(*item, &self.search))
            .collect();
        let items = filter_by_department(
            before_department.iter().copied(),
            forest,
            scope,
            self.department,
        );
        FilterOutcome {
            before_department,
            items,
        }
    }
}

/// Count badges per simplified status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub not_started: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.not_started + self.in_progress + self.done
    }

    pub fn get(&self, status: SimpleStatus) -> usize {
        match status {
            SimpleStatus::NotStarted => self.not_started,
            SimpleStatus::InProgress => self.in_progress,
            SimpleStatus::Done => self.done,
        }
    }
}

pub fn status_counts<'a, T, I>(items: I) -> StatusCounts
where
    T: Classified + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, item| {
            match item.simple_status() {
                SimpleStatus::NotStarted => counts.not_started += 1,
                SimpleStatus::InProgress => counts.in_progress += 1,
                SimpleStatus::Done => counts.done += 1,
            }
            counts
        })
}
