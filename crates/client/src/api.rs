//! HTTP access to the timeline endpoints.

use async_trait::async_trait;
use db::models::{
    project_task::{CreateProjectTask, ProjectTask, UpdateProjectTask},
    project_timeline::{CreateProjectTimeline, ProjectTimeline, UpdateProjectTimeline},
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;
use utils::response::ErrorResponse;
use uuid::Uuid;

use crate::{config::ClientConfig, error::ClientError};

/// Timeline operations a view model needs.
#[async_trait]
pub trait TimelineApi: Send + Sync {
    async fn list_phases(&self, idea_id: Uuid) -> Result<Vec<ProjectTimeline>, ClientError>;

    async fn create_phase(
        &self,
        idea_id: Uuid,
        data: &CreateProjectTimeline,
    ) -> Result<ProjectTimeline, ClientError>;

    async fn update_phase(
        &self,
        idea_id: Uuid,
        data: &UpdateProjectTimeline,
    ) -> Result<ProjectTimeline, ClientError>;

    async fn delete_phase(&self, idea_id: Uuid, phase_id: Uuid) -> Result<(), ClientError>;

    async fn list_tasks(&self, idea_id: Uuid, phase_id: Uuid) -> Result<Vec<ProjectTask>, ClientError>;

    async fn create_task(
        &self,
        idea_id: Uuid,
        phase_id: Uuid,
        data: &CreateProjectTask,
    ) -> Result<ProjectTask, ClientError>;

    async fn update_task(
        &self,
        idea_id: Uuid,
        phase_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<ProjectTask, ClientError>;

    async fn delete_task(&self, idea_id: Uuid, phase_id: Uuid, task_id: Uuid) -> Result<(), ClientError>;
}

#[derive(Deserialize)]
struct PhaseEnvelope {
    phase: ProjectTimeline,
}

#[derive(Deserialize)]
struct PhasesEnvelope {
    phases: Vec<ProjectTimeline>,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: ProjectTask,
}

#[derive(Deserialize)]
struct TasksEnvelope {
    tasks: Vec<ProjectTask>,
}

#[derive(Deserialize)]
struct SuccessEnvelope {
    #[allow(dead_code)]
    success: bool,
}

#[derive(Debug, Clone)]
pub struct HttpTimelineApi {
    http: Client,
    base_url: String,
    user_id: Uuid,
}

impl HttpTimelineApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("founderflow-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            user_id: config.user_id,
        })
    }

    fn timeline_url(&self, idea_id: Uuid) -> String {
        format!("{}/api/business-plan/{}/timeline", self.base_url, idea_id)
    }

    fn tasks_url(&self, idea_id: Uuid, phase_id: Uuid) -> String {
        format!("{}/{}/tasks", self.timeline_url(idea_id), phase_id)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("x-user-id", self.user_id.to_string())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let res = request.send().await.map_err(map_reqwest_error)?;
        decode(res).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return res
            .json::<T>()
            .await
            .map_err(|e| ClientError::Serde(e.to_string()));
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    debug!(status = status.as_u16(), error = %message, "Timeline request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn map_reqwest_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(e.to_string())
    }
}

#[async_trait]
impl TimelineApi for HttpTimelineApi {
    async fn list_phases(&self, idea_id: Uuid) -> Result<Vec<ProjectTimeline>, ClientError> {
        let envelope: PhasesEnvelope = self
            .send(self.request(Method::GET, self.timeline_url(idea_id)))
            .await?;
        Ok(envelope.phases)
    }

    async fn create_phase(
        &self,
        idea_id: Uuid,
        data: &CreateProjectTimeline,
    ) -> Result<ProjectTimeline, ClientError> {
        let envelope: PhaseEnvelope = self
            .send(self.request(Method::POST, self.timeline_url(idea_id)).json(data))
            .await?;
        Ok(envelope.phase)
    }

    async fn update_phase(
        &self,
        idea_id: Uuid,
        data: &UpdateProjectTimeline,
    ) -> Result<ProjectTimeline, ClientError> {
        let envelope: PhaseEnvelope = self
            .send(self.request(Method::PUT, self.timeline_url(idea_id)).json(data))
            .await?;
        Ok(envelope.phase)
    }

    async fn delete_phase(&self, idea_id: Uuid, phase_id: Uuid) -> Result<(), ClientError> {
        let request = self
            .request(Method::DELETE, self.timeline_url(idea_id))
            .query(&[("phaseId", phase_id.to_string())]);
        let _: SuccessEnvelope = self.send(request).await?;
        Ok(())
    }

    async fn list_tasks(&self, idea_id: Uuid, phase_id: Uuid) -> Result<Vec<ProjectTask>, ClientError> {
        let envelope: TasksEnvelope = self
            .send(self.request(Method::GET, self.tasks_url(idea_id, phase_id)))
            .await?;
        Ok(envelope.tasks)
    }

    async fn create_task(
        &self,
        idea_id: Uuid,
        phase_id: Uuid,
        data: &CreateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        let envelope: TaskEnvelope = self
            .send(
                self.request(Method::POST, self.tasks_url(idea_id, phase_id))
                    .json(data),
            )
            .await?;
        Ok(envelope.task)
    }

    async fn update_task(
        &self,
        idea_id: Uuid,
        phase_id: Uuid,
        data: &UpdateProjectTask,
    ) -> Result<ProjectTask, ClientError> {
        let envelope: TaskEnvelope = self
            .send(
                self.request(Method::PUT, self.tasks_url(idea_id, phase_id))
                    .json(data),
            )
            .await?;
        Ok(envelope.task)
    }

    async fn delete_task(&self, idea_id: Uuid, phase_id: Uuid, task_id: Uuid) -> Result<(), ClientError> {
        let request = self
            .request(Method::DELETE, self.tasks_url(idea_id, phase_id))
            .query(&[("taskId", task_id.to_string())]);
        let _: SuccessEnvelope = self.send(request).await?;
        Ok(())
    }
}
