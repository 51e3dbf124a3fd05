use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::client::PortalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    KeepPrevious,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug)]
pub struct ScreenState<T> {
    value: Option<T>,
    error: Option<String>,
    generation: u64,
    mounted: bool,
    loading: bool,
    policy: ErrorPolicy,
}

impl<T> ScreenState<T> {
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            value: None,
            error: None,
            generation: 0,
            mounted: true,
            loading: false,
            policy,
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
        }
    }

    // Only the newest ticket of a mounted screen may write back.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.mounted && ticket.generation == self.generation
    }

    pub fn complete(&mut self, ticket: FetchTicket, result: Result<T, PortalError>) -> Outcome {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                mounted = self.mounted,
                "discarding stale response"
            );
            return Outcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "fetch failed");
                self.error = Some(err.user_message().to_string());
                if self.policy == ErrorPolicy::Clear {
                    self.value = None;
                }
                Outcome::Failed
            }
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.loading = false;
        self.generation += 1;
    }

    #[cfg(test)]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self::new(ErrorPolicy::default())
    }
}

pub type SharedScreen<T> = Arc<Mutex<ScreenState<T>>>;

pub fn shared<T>(policy: ErrorPolicy) -> SharedScreen<T> {
    Arc::new(Mutex::new(ScreenState::new(policy)))
}

pub fn lock<T>(screen: &SharedScreen<T>) -> MutexGuard<'_, ScreenState<T>> {
    screen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn spawn_fetch<T, F>(screen: &SharedScreen<T>, fetch: F) -> tokio::task::JoinHandle<Outcome>
where
    T: Send + 'static,
    F: Future<Output = Result<T, PortalError>> + Send + 'static,
{
    let ticket = lock(screen).begin_fetch();
    let screen = Arc::clone(screen);
    tokio::spawn(async move {
        let result = fetch.await;
        lock(&screen).complete(ticket, result)
    })
}
