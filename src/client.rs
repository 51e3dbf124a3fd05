use serde::de::DeserializeOwned;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::models::{PortalPayload, WeeklySchedule};

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend rejected credentials for {url} (HTTP {status})")]
    Unauthorized { url: String, status: u16 },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("backend returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid identifier {0:?}")]
    InvalidId(String),
}

impl PortalError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PortalError::Timeout { .. } => "انتهت مهلة الاتصال بالخادم. حاول مرة أخرى.",
            PortalError::Client(_) | PortalError::Network { .. } => {
                "تعذر الاتصال بالخادم. تحقق من اتصالك بالإنترنت."
            }
            PortalError::Unauthorized { .. } => "انتهت صلاحية الجلسة. يرجى تسجيل الدخول مرة أخرى.",
            PortalError::NotFound { .. } | PortalError::InvalidId(_) => "البيانات المطلوبة غير موجودة.",
            PortalError::Status { .. } => "حدث خطأ في الخادم أثناء جلب البيانات.",
            PortalError::Decode { .. } => "تعذر قراءة البيانات المستلمة من الخادم.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

fn path_segment(id: &str) -> Result<&str, PortalError> {
    let trimmed = id.trim();
    let valid = !trimmed.is_empty()
        && !trimmed.chars().all(|c| c == '.')
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(trimmed)
    } else {
        Err(PortalError::InvalidId(id.to_string()))
    }
}

impl PortalClient {
    pub fn new(config: &ApiConfig) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(PortalError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub async fn fetch_portal(&self, student_id: &str) -> Result<PortalPayload, PortalError> {
        let id = path_segment(student_id)?;
        let payload: PortalPayload = self.get_json(&format!("students/{id}/portal")).await?;
        info!(
            student = %id,
            subjects = payload.subjects.len(),
            feedback = payload.recent_feedback.len(),
            "portal payload received"
        );
        Ok(payload)
    }

    pub async fn fetch_schedule(&self, class_id: &str) -> Result<WeeklySchedule, PortalError> {
        let id = path_segment(class_id)?;
        let schedule: WeeklySchedule = self.get_json(&format!("classes/{id}/schedule")).await?;
        info!(class = %id, entries = schedule.entries.len(), "weekly schedule received");
        Ok(schedule)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortalError> {
        let url = format!("{}/{}", self.base_url, path);
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("portal_request", %request_id, %url);

        async move {
            let mut request = self
                .http
                .get(&url)
                .header("X-Request-Id", request_id.to_string())
                .header(reqwest::header::ACCEPT, "application/json");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|source| {
                if source.is_timeout() {
                    PortalError::Timeout { url: url.clone() }
                } else {
                    PortalError::Network {
                        url: url.clone(),
                        source,
                    }
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                warn!(status = status.as_u16(), "backend returned an error status");
                return Err(match status.as_u16() {
                    401 | 403 => PortalError::Unauthorized {
                        url,
                        status: status.as_u16(),
                    },
                    404 => PortalError::NotFound { url },
                    code => PortalError::Status { url, status: code },
                });
            }

            let body = response.text().await.map_err(|source| PortalError::Network {
                url: url.clone(),
                source,
            })?;
            debug!(bytes = body.len(), "response body read");

            serde_json::from_str(&body).map_err(|source| PortalError::Decode { url, source })
        }
        .instrument(span)
        .await
    }
}
