//! Schedules (lịch công tác)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::filter::{DepartmentRef, DepartmentScoped, Searchable};
use crate::status::{classify, Classified, ScheduleStatuses, SimpleStatus};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(rename = "department", default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl DepartmentScoped for Schedule {
    fn department_ref(&self) -> DepartmentRef<'_> {
        DepartmentRef::new(self.department_id, self.department_name.as_deref())
    }
}

impl Searchable for Schedule {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.content.as_deref());
        fields.extend(self.location.as_deref());
        fields
    }
}

impl Classified for Schedule {
    fn simple_status(&self) -> SimpleStatus {
        classify::<ScheduleStatuses>(&self.status, std::iter::empty::<f64>())
    }
}
