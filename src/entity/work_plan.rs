//! Work plans (kế hoạch công tác) and their sub-tasks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{DepartmentRef, DepartmentScoped, Searchable};
use crate::status::{classify, overall_progress, Classified, SimpleStatus, WorkPlanStatuses};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPlanTask {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    /// Completion percentage, 0-100
    #[serde(default)]
    pub progress: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPlan {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(rename = "department", default)]
    pub department_name: Option<String>,
    /// Raw backend status (draft, pending, approved, ...)
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub tasks: Vec<WorkPlanTask>,
}

impl WorkPlan {
    /// Rounded mean of sub-task progress, 0 without tasks
    pub fn overall_progress(&self) -> i64 {
        overall_progress(self.tasks.iter().map(|t| t.progress))
    }
}

impl DepartmentScoped for WorkPlan {
    fn department_ref(&self) -> DepartmentRef<'_> {
        DepartmentRef::new(self.department_id, self.department_name.as_deref())
    }
}

impl Searchable for WorkPlan {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

impl Classified for WorkPlan {
    fn simple_status(&self) -> SimpleStatus {
        classify::<WorkPlanStatuses>(&self.status, self.tasks.iter().map(|t| t.progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(status: &str, progress: &[f64]) -> WorkPlan {
        WorkPlan {
            id: 1,
            title: "Kế hoạch tháng 5".to_string(),
            description: None,
            department_id: Some(2),
            department_name: None,
            status: status.to_string(),
            start_date: None,
            end_date: None,
            tasks: progress
                .iter()
                .map(|p| WorkPlanTask {
                    id: None,
                    title: String::new(),
                    assignee_id: None,
                    progress: *p,
                })
                .collect(),
        }
    }

    #[test]
    fn test_full_progress_overrides_approved() {
        assert_eq!(plan("approved", &[100.0]).simple_status(), SimpleStatus::Done);
    }

    #[test]
    fn test_partial_progress_overrides_completed() {
        let p = plan("completed", &[40.0, 60.0]);
        assert_eq!(p.overall_progress(), 50);
        assert_eq!(p.simple_status(), SimpleStatus::InProgress);
    }

    #[test]
    fn test_no_tasks_uses_backend_status() {
        assert_eq!(plan("completed", &[]).simple_status(), SimpleStatus::Done);
        assert_eq!(plan("draft", &[]).simple_status(), SimpleStatus::NotStarted);
    }

    #[test]
    fn test_parse_work_plan() {
        let json = r#"{
            "id": 4,
            "title": "Kế hoạch huấn luyện",
            "departmentId": 3,
            "status": "IN_PROGRESS",
            "startDate": "2024-05-01",
            "tasks": [{"title": "Chuẩn bị", "progress": 30}]
        }"#;
        let p: WorkPlan = serde_json::from_str(json).unwrap();
        assert_eq!(p.tasks.len(), 1);
        assert_eq!(p.simple_status(), SimpleStatus::InProgress);
    }
}
