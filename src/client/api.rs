//! Typed backend endpoints

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{decode, decode_page, Page, PageQuery, UserQuery};
use super::{ApiRequest, Transport};
use crate::assignment::AssignRequest;
use crate::compose::InternalDocumentRequest;
use crate::entity::department::DepartmentRecord;
use crate::entity::document::{DocumentType, IncomingDocument, MarkReadRequest, OutgoingDocument};
use crate::entity::schedule::Schedule;
use crate::entity::user::{Actor, UserRecord};
use crate::entity::work_plan::WorkPlan;
use crate::error::AppResult;

/// A CRUD collection on the backend
pub trait Resource: DeserializeOwned + Send {
    /// Collection path relative to the API base
    const PATH: &'static str;
}

impl Resource for IncomingDocument {
    const PATH: &'static str = "documents/incoming";
}

impl Resource for OutgoingDocument {
    const PATH: &'static str = "documents/outgoing";
}

impl Resource for WorkPlan {
    const PATH: &'static str = "work-plans";
}

impl Resource for Schedule {
    const PATH: &'static str = "schedules";
}

/// Backend API over any transport
#[derive(Clone, Debug)]
pub struct ApiClient<T> {
    transport: T,
    page_size: u32,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, page_size: u32) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current authenticated user
    pub async fn current_user(&self) -> AppResult<Actor> {
        decode(self.transport.execute(ApiRequest::get("users/me")).await?)
    }

    /// Every department, following pages until the last one
    pub async fn departments(&self) -> AppResult<Vec<DepartmentRecord>> {
        self.collect_pages("departments", Vec::new()).await
    }

    /// Direct children of one department
    pub async fn department_children(&self, id: i64) -> AppResult<Vec<DepartmentRecord>> {
        let value = self
            .transport
            .execute(ApiRequest::get(format!("departments/{}/children", id)))
            .await?;
        Ok(decode_page(value)?.content)
    }

    /// One page of `GET /users`
    pub async fn users(&self, query: &UserQuery) -> AppResult<Page<UserRecord>> {
        let mut request = ApiRequest::get("users");
        request.query = query.pairs();
        decode_page(self.transport.execute(request).await?)
    }

    /// All users, optionally limited to one department
    pub async fn all_users(&self, department_id: Option<i64>) -> AppResult<Vec<UserRecord>> {
        let mut extra = Vec::new();
        if let Some(id) = department_id {
            extra.push(("departmentId".to_string(), id.to_string()));
        }
        self.collect_pages("users", extra).await
    }

    /// One page of a CRUD collection
    pub async fn list<R: Resource>(&self, query: &PageQuery) -> AppResult<Page<R>> {
        let mut request = ApiRequest::get(R::PATH);
        request.query = query.pairs();
        decode_page(self.transport.execute(request).await?)
    }

    /// Every row of a CRUD collection
    pub async fn list_all<R: Resource>(&self) -> AppResult<Vec<R>> {
        self.collect_pages(R::PATH, Vec::new()).await
    }

    pub async fn get<R: Resource>(&self, id: i64) -> AppResult<R> {
        decode(
            self.transport
                .execute(ApiRequest::get(format!("{}/{}", R::PATH, id)))
                .await?,
        )
    }

    pub async fn create<R: Resource, B: Serialize + Sync>(&self, body: &B) -> AppResult<R> {
        let request = ApiRequest::post(R::PATH).json(body)?;
        decode(self.transport.execute(request).await?)
    }

    pub async fn update<R: Resource, B: Serialize + Sync>(&self, id: i64, body: &B) -> AppResult<R> {
        let request = ApiRequest::put(format!("{}/{}", R::PATH, id)).json(body)?;
        decode(self.transport.execute(request).await?)
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> AppResult<()> {
        self.transport
            .execute(ApiRequest::delete(format!("{}/{}", R::PATH, id)))
            .await?;
        Ok(())
    }

    /// `POST /{resource}/{id}/assign`
    pub async fn assign<R: Resource>(&self, id: i64, body: &AssignRequest) -> AppResult<()> {
        let request = ApiRequest::post(format!("{}/{}/assign", R::PATH, id)).json(body)?;
        self.transport.execute(request).await?;
        Ok(())
    }

    /// `POST /{resource}/{id}/approve`
    pub async fn approve<R: Resource>(&self, id: i64) -> AppResult<R> {
        let request = ApiRequest::post(format!("{}/{}/approve", R::PATH, id));
        decode(self.transport.execute(request).await?)
    }

    pub async fn start_work_plan(&self, id: i64) -> AppResult<WorkPlan> {
        let request = ApiRequest::post(format!("{}/{}/start", WorkPlan::PATH, id));
        decode(self.transport.execute(request).await?)
    }

    pub async fn complete_work_plan(&self, id: i64) -> AppResult<WorkPlan> {
        let request = ApiRequest::post(format!("{}/{}/complete", WorkPlan::PATH, id));
        decode(self.transport.execute(request).await?)
    }

    /// Ask the backend to recompute every work plan status
    pub async fn force_update_statuses(&self) -> AppResult<()> {
        let request = ApiRequest::post(format!("{}/force-update-statuses", WorkPlan::PATH));
        self.transport.execute(request).await?;
        Ok(())
    }

    pub async fn mark_read(&self, id: i64, document_type: DocumentType) -> AppResult<()> {
        let request = ApiRequest::post(format!("documents/{}/mark-read", id))
            .json(&MarkReadRequest { document_type })?;
        self.transport.execute(request).await?;
        Ok(())
    }

    /// Send a validated internal document
    pub async fn create_internal_document(
        &self,
        body: &InternalDocumentRequest,
    ) -> AppResult<OutgoingDocument> {
        self.create::<OutgoingDocument, _>(body).await
    }

    async fn collect_pages<R: DeserializeOwned>(
        &self,
        path: &str,
        extra: Vec<(String, String)>,
    ) -> AppResult<Vec<R>> {
        let mut items = Vec::new();
        let mut page = 0u32;
        loop {
            let mut request = ApiRequest::get(path);
            request.query = extra.clone();
            request.query.extend(PageQuery::new(page, self.page_size).pairs());

            let batch: Page<R> = decode_page(self.transport.execute(request).await?)?;
            let fetched = batch.content.len();
            items.extend(batch.content);
            page += 1;
            if fetched == 0 || page >= batch.total_pages {
                break;
            }
        }
        tracing::debug!("Fetched {} rows from {} in {} page(s)", items.len(), path, page);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Method;
    use crate::error::AppError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<ApiRequest>>,
        replies: Mutex<Vec<AppResult<Value>>>,
    }

    impl Recorder {
        fn replying(replies: Vec<AppResult<Value>>) -> Self {
            let mut replies = replies;
            replies.reverse();
            Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(replies),
            }
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn execute(&self, request: ApiRequest) -> AppResult<Value> {
            self.requests.lock().unwrap().push(request);
            self.replies.lock().unwrap().pop().unwrap_or(Ok(Value::Null))
        }
    }

    fn query_value<'a>(request: &'a ApiRequest, key: &str) -> Option<&'a str> {
        request
            .query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_departments_follow_pages() {
        let transport = Recorder::replying(vec![
            Ok(json!({"content": [{"id": 1, "name": "Cục"}], "totalPages": 2, "totalElements": 2})),
            Ok(json!({"data": {"content": [{"id": 2, "name": "Phòng", "parentId": 1}], "totalPages": 2}})),
        ]);
        let client = ApiClient::new(transport, 1);

        let departments = client.departments().await.unwrap();
        assert_eq!(departments.len(), 2);
        assert_eq!(departments[1].parent_id, Some(1));

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(query_value(&requests[0], "page"), Some("0"));
        assert_eq!(query_value(&requests[1], "page"), Some("1"));
        assert_eq!(query_value(&requests[1], "size"), Some("1"));
    }

    #[tokio::test]
    async fn test_all_users_passes_department() {
        let transport = Recorder::replying(vec![Ok(json!([{"id": 5, "username": "nv5", "departmentId": 3}]))]);
        let client = ApiClient::new(transport, 50);

        let users = client.all_users(Some(3)).await.unwrap();
        assert_eq!(users.len(), 1);
        let requests = client.transport().requests();
        assert_eq!(requests[0].path, "users");
        assert_eq!(query_value(&requests[0], "departmentId"), Some("3"));
    }

    #[tokio::test]
    async fn test_action_paths() {
        let client = ApiClient::new(Recorder::default(), 20);
        client.force_update_statuses().await.unwrap();
        client.mark_read(7, DocumentType::Incoming).await.unwrap();
        client.delete::<Schedule>(4).await.unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "work-plans/force-update-statuses");
        assert_eq!(requests[1].path, "documents/7/mark-read");
        assert_eq!(requests[1].body, Some(json!({"documentType": "INCOMING"})));
        assert_eq!(requests[2].method, Method::Delete);
        assert_eq!(requests[2].path, "schedules/4");
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let transport = Recorder::replying(vec![Err(AppError::Forbidden("no".into()))]);
        let client = ApiClient::new(transport, 20);
        let err = client.list_all::<WorkPlan>().await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
