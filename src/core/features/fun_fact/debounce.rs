use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::FunFactService;
use crate::shared::types::FunFactRequest;

/// Quiet period after the last input change before a fact is requested
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// What the fact panel shows.
///
/// `generation` increases with every input change; only the task started for
/// the current generation may write `fact` or `loading`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactDisplay {
    pub generation: u64,
    pub fact: Option<String>,
    pub loading: bool,
}

// The live token and the generation it belongs to change together.
#[derive(Debug, Default)]
struct TriggerState {
    display: FactDisplay,
    token: Option<CancellationToken>,
}

impl TriggerState {
    fn supersede(&mut self) -> (CancellationToken, u64) {
        let token = CancellationToken::new();
        if let Some(previous) = self.token.replace(token.clone()) {
            previous.cancel();
        }
        self.display.generation += 1;
        (token, self.display.generation)
    }

    fn update_if_current(&mut self, generation: u64, f: impl FnOnce(&mut FactDisplay)) {
        if self.display.generation == generation {
            f(&mut self.display);
        }
    }
}

/// Debounced, cancelable fun-fact requests for one converter form.
///
/// Each `trigger` supersedes the previous one: its token is cancelled and
/// anything it produces afterwards is discarded.
pub struct FactTrigger {
    service: Arc<FunFactService>,
    state: Arc<Mutex<TriggerState>>,
    debounce: Duration,
}

impl FactTrigger {
    pub fn new(service: Arc<FunFactService>) -> Self {
        Self::with_debounce(service, DEBOUNCE)
    }

    pub fn with_debounce(service: Arc<FunFactService>, debounce: Duration) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(TriggerState::default())),
            debounce,
        }
    }

    pub fn display(&self) -> FactDisplay {
        lock(&self.state).display.clone()
    }

    /// Input changed to something convertible: wait out the debounce, then fetch.
    pub fn trigger(&self, request: FunFactRequest) -> JoinHandle<()> {
        let (token, generation) = lock(&self.state).supersede();
        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }

            lock(&state).update_if_current(generation, |d| d.loading = true);

            let fact = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(generation, "fun fact request superseded");
                    return;
                }
                fact = service.annotate(&request) => fact,
            };

            lock(&state).update_if_current(generation, |d| {
                d.fact = fact;
                d.loading = false;
            });
        })
    }

    /// Input became empty or invalid: drop any pending request and the shown fact.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.supersede();
        state.display.fact = None;
        state.display.loading = false;
    }
}

impl Drop for FactTrigger {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.state).token.take() {
            token.cancel();
        }
    }
}

// Display state stays usable even if a writer panicked mid-update.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
