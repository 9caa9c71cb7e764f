//! Background request dispatch
//!
//! Each request runs on its own short-lived thread and reports back through
//! a channel the UI loop drains on every tick. Nothing is deduplicated or
//! cancelled; components decide which completions they still care about.

use super::api::{Api, ApiError, Payload, Request};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub type RequestId = u64;

/// Which component a request was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Dashboard,
    UseCases,
    Prompts,
    Activity,
    Results,
    Visualizer,
    Explorer,
    RunEval,
}

/// A finished request, successful or not
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: RequestId,
    pub origin: Origin,
    pub request: Request,
    pub result: Result<Payload, ApiError>,
}

enum Dispatch {
    Threaded,
    #[cfg(test)]
    Inline,
}

/// Fire-and-forget request spawner
pub struct Fetcher {
    api: Arc<dyn Api>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    next_id: RequestId,
    dispatch: Dispatch,
}

impl Fetcher {
    pub fn new(api: Arc<dyn Api>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            api,
            sender,
            receiver,
            next_id: 1,
            dispatch: Dispatch::Threaded,
        }
    }

    /// Run requests on the calling thread so completions are queued before
    /// `spawn` returns
    #[cfg(test)]
    pub fn inline(api: Arc<dyn Api>) -> Self {
        Self {
            dispatch: Dispatch::Inline,
            ..Self::new(api)
        }
    }

    /// Start a request and return its id. Ids increase monotonically.
    pub fn spawn(&mut self, origin: Origin, request: Request) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;

        tracing::debug!(id, ?origin, request = %request.describe(), "dispatching request");

        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        let job = move || {
            let result = api.execute(&request);
            tracing::debug!(id, ok = result.is_ok(), "request finished");
            let _ = sender.send(Completion {
                id,
                origin,
                request,
                result,
            });
        };

        match self.dispatch {
            Dispatch::Threaded => {
                thread::spawn(job);
            }
            #[cfg(test)]
            Dispatch::Inline => job(),
        }

        id
    }

    /// Number of requests spawned so far
    #[cfg(test)]
    pub fn issued(&self) -> u64 {
        self.next_id - 1
    }

    /// Collect every completion that has arrived, without blocking
    pub fn drain(&self) -> Vec<Completion> {
        self.receiver.try_iter().collect()
    }
}

/// Request ids a component is still waiting for
#[derive(Debug, Default)]
pub struct Tickets {
    open: HashSet<RequestId>,
}

impl Tickets {
    /// Spawn a request and remember its id
    pub fn spawn(&mut self, fetcher: &mut Fetcher, origin: Origin, request: Request) -> RequestId {
        let id = fetcher.spawn(origin, request);
        self.open.insert(id);
        id
    }

    /// True exactly once for an id that was issued and not forgotten
    pub fn redeem(&mut self, id: RequestId) -> bool {
        self.open.remove(&id)
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        !self.open.is_empty()
    }

    /// Forget everything outstanding; late replies will be ignored
    pub fn clear(&mut self) {
        self.open.clear();
    }
}

/// Fixed-interval schedule driven by the UI tick
///
/// The first deadline is one interval after `start`. When the loop falls
/// behind by more than an interval the schedule restarts from `now` instead
/// of firing a burst of catch-up requests.
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Whether a poll is due at `now`; advances the schedule when it is
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let next = due + self.interval;
        self.next_due = Some(if next <= now { now + self.interval } else { next });
        true
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&Request) -> Result<Payload, ApiError> + Send + Sync>;

    /// Canned backend that records every request it receives
    pub struct StubApi {
        responder: Responder,
        calls: Mutex<Vec<Request>>,
    }

    impl StubApi {
        pub fn new<F>(responder: F) -> Arc<Self>
        where
            F: Fn(&Request) -> Result<Payload, ApiError> + Send + Sync + 'static,
        {
            Arc::new(Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
            })
        }

        /// Every request fails as if the backend were down
        pub fn offline() -> Arc<Self> {
            Self::new(|_| Err(ApiError::Transport("connection refused".to_string())))
        }

        pub fn calls(&self) -> Vec<Request> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl Api for StubApi {
        fn execute(&self, request: &Request) -> Result<Payload, ApiError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(request.clone());
            }
            (self.responder)(request)
        }
    }
}
