//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the assistant (with its pre-built LLM client) and the map of
//! open panels. Panels live only in memory; closing one drops it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::panel::Panel;
use crate::services::assistant::Assistant;

// =============================================================================
// PANEL ENTRY
// =============================================================================

/// An open panel plus the task running its in-flight request, if any.
pub struct PanelEntry {
    pub panel: Panel,
    pub task: Option<AbortHandle>,
}

impl PanelEntry {
    #[must_use]
    pub fn new(panel: Panel) -> Self {
        Self { panel, task: None }
    }

    /// Abort the running request task, if any.
    pub fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub panels: Arc<RwLock<HashMap<Uuid, PanelEntry>>>,
}

impl AppState {
    #[must_use]
    pub fn new(assistant: Assistant) -> Self {
        Self { assistant: Arc::new(assistant), panels: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::sync::Semaphore;

    use crate::llm::LlmGenerate;
    use crate::llm::types::{GenerateOptions, Generation, LlmError};
    use crate::services::assistant::AssistantSettings;

    /// Scripted LLM. Pops one reply per call; once the script runs out every
    /// call answers `"mock reply"`. Records every prompt it sees.
    pub struct MockLlm {
        replies: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
        prompts: Mutex<Vec<String>>,
        options: Mutex<Vec<GenerateOptions>>,
        gate: Option<Arc<Semaphore>>,
    }

    impl MockLlm {
        #[must_use]
        pub fn new(replies: Vec<Result<Option<String>, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
                options: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        #[must_use]
        pub fn text(text: &str) -> Self {
            Self::new(vec![Ok(Some(text.to_string()))])
        }

        #[must_use]
        pub fn failing() -> Self {
            Self::new(vec![Err(LlmError::ApiResponse { status: 503, body: "overloaded".into() })])
        }

        #[must_use]
        pub fn empty() -> Self {
            Self::new(vec![Ok(None)])
        }

        /// Each call blocks until the semaphore hands out a permit.
        #[must_use]
        pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn options(&self) -> Vec<GenerateOptions> {
            self.options.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmGenerate for MockLlm {
        async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Generation, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.options.lock().unwrap().push(*options);
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some("mock reply".into())));
            reply.map(|text| Generation {
                text,
                model: "mock".into(),
                stop_reason: "end_turn".into(),
                input_tokens: 0,
                output_tokens: 0,
            })
        }
    }

    #[must_use]
    pub fn assistant_with(llm: Arc<MockLlm>) -> Assistant {
        Assistant::new(Some(llm as Arc<dyn LlmGenerate>), AssistantSettings::default())
    }

    #[must_use]
    pub fn unconfigured_assistant() -> Assistant {
        Assistant::new(None, AssistantSettings::default())
    }

    #[must_use]
    pub fn test_app_state(llm: Arc<MockLlm>) -> AppState {
        AppState::new(assistant_with(llm))
    }
}
