//! Sequential synthesis orchestration.
//!
//! One job at a time: a new `speak` supersedes any in-flight job and
//! abandons its completion hook (last call wins). Runs are issued to the
//! backend strictly in order — run *i+1* waits for run *i*'s completion —
//! so audio never overlaps and the utterance order matches the text.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use beseda_core::config::SpeechConfig;
use beseda_core::types::{LanguageTag, Run};
use beseda_core::BesedaError;

use crate::backend::{SpeechBackend, UtteranceRequest};
use crate::segment::segment;
use crate::voices::select_voice;

/// Invoked exactly once when a job finishes naturally. Never invoked for a
/// job that was superseded or stopped.
pub type CompletionHook = Box<dyn FnOnce() + Send + 'static>;

/// Invoked at most once per job when synthesis fails.
pub type ErrorHook = Arc<dyn Fn(&BesedaError) + Send + Sync>;

/// Playback state of one synthesis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Playing(usize),
    Done,
    Cancelled,
    Failed,
}

/// Drives a speech backend one run at a time.
pub struct SpeechOrchestrator {
    backend: Arc<dyn SpeechBackend>,
    config: SpeechConfig,
    /// Generation counter: the active job id. Bumped by `speak` and `stop`,
    /// which turns stale completions into no-ops without locking.
    generation: Arc<AtomicU64>,
    speaking: Arc<AtomicBool>,
    on_error: Option<ErrorHook>,
}

impl SpeechOrchestrator {
    pub fn new(backend: Arc<dyn SpeechBackend>, config: SpeechConfig) -> Self {
        Self {
            backend,
            config,
            generation: Arc::new(AtomicU64::new(0)),
            speaking: Arc::new(AtomicBool::new(false)),
            on_error: None,
        }
    }

    /// Install an error hook. Without one, failures degrade to a silent
    /// completion so the conversation loop keeps going.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Segment `text` and speak it, run by run.
    ///
    /// Any in-flight job is cancelled first and its completion hook is
    /// abandoned. Empty input completes immediately without touching the
    /// backend.
    pub fn speak(&self, text: &str, on_complete: Option<CompletionHook>) {
        let job_id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.backend.cancel();

        if !self.backend.is_available() {
            debug!("speech backend unavailable, skipping synthesis");
            match &self.on_error {
                Some(hook) => hook(&BesedaError::Speech("synthesis backend unavailable".into())),
                None => {
                    if let Some(complete) = on_complete {
                        complete();
                    }
                }
            }
            return;
        }

        let runs = segment(text);
        if runs.is_empty() {
            if let Some(complete) = on_complete {
                complete();
            }
            return;
        }

        self.speaking.store(true, Ordering::SeqCst);

        let job = SynthesisJob {
            id: job_id,
            runs,
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
            generation: Arc::clone(&self.generation),
            speaking: Arc::clone(&self.speaking),
            on_error: self.on_error.clone(),
        };

        tokio::spawn(job.run(on_complete));
    }

    /// Stop the active job. Its completion hook is never invoked —
    /// cancellation is silent by contract.
    ///
    /// Returns synchronously; the backend's own stop may lag behind.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.backend.cancel();
        self.speaking.store(false, Ordering::SeqCst);
    }

    /// True from `speak` acceptance until natural completion or `stop`.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

/// One in-flight playback: ordered runs plus a cursor, owned by the
/// orchestrator task for the duration of the job. Never persisted.
struct SynthesisJob {
    id: u64,
    runs: Vec<Run>,
    backend: Arc<dyn SpeechBackend>,
    config: SpeechConfig,
    generation: Arc<AtomicU64>,
    speaking: Arc<AtomicBool>,
    on_error: Option<ErrorHook>,
}

impl SynthesisJob {
    /// A newer `speak` or an explicit `stop` has taken over the backend.
    fn superseded(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.id
    }

    fn preferred_voice(&self, language: LanguageTag) -> Option<&str> {
        match language {
            LanguageTag::Russian => self.config.russian_voice.as_deref(),
            LanguageTag::English => self.config.english_voice.as_deref(),
        }
    }

    async fn run(self, on_complete: Option<CompletionHook>) {
        let voices = self.backend.voices().await;

        let mut state = JobState::Playing(0);
        let mut failure: Option<anyhow::Error> = None;

        while let JobState::Playing(index) = state {
            if self.superseded() {
                state = JobState::Cancelled;
                continue;
            }

            let run = &self.runs[index];
            let voice = select_voice(&voices, run.language, self.preferred_voice(run.language));
            let request = UtteranceRequest {
                text: run.text.clone(),
                language: run.language,
                voice: voice.cloned(),
                rate: self.config.rate,
                pitch: self.config.pitch,
                volume: self.config.volume,
            };

            debug!(index, language = ?run.language, chars = run.text.len(), "issuing run");

            state = match self.backend.speak(&request).await {
                Ok(()) if index + 1 < self.runs.len() => JobState::Playing(index + 1),
                Ok(()) => JobState::Done,
                Err(e) => {
                    warn!(error = %e, index, "synthesis failed mid-job");
                    failure = Some(e);
                    JobState::Failed
                }
            };
        }

        // The last completion may have raced with a supersede.
        if self.superseded() {
            state = JobState::Cancelled;
        }

        match state {
            JobState::Cancelled => {
                // The abandoned hook must not fire; a newer job (or an
                // explicit stop) owns `speaking` now.
            }
            JobState::Done => {
                self.speaking.store(false, Ordering::SeqCst);
                if let Some(complete) = on_complete {
                    complete();
                }
            }
            JobState::Failed => {
                self.speaking.store(false, Ordering::SeqCst);
                if let Some(hook) = &self.on_error {
                    let message = failure
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "synthesis failed".into());
                    hook(&BesedaError::Speech(message));
                }
                // The turn still completes; the reply is just silent.
                if let Some(complete) = on_complete {
                    complete();
                }
            }
            JobState::Playing(_) => unreachable!("loop exits only in a terminal state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use crate::backend::VoiceInfo;

    use super::*;

    /// Backend that records calls and completes one utterance per permit.
    struct MockBackend {
        calls: Arc<Mutex<Vec<UtteranceRequest>>>,
        permits: Arc<Semaphore>,
        cancels: Arc<AtomicUsize>,
        available: bool,
        voice_list: Vec<VoiceInfo>,
    }

    impl MockBackend {
        fn new(available: bool) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                permits: Arc::new(Semaphore::new(0)),
                cancels: Arc::new(AtomicUsize::new(0)),
                available,
                voice_list: vec![
                    VoiceInfo {
                        id: "ru-anna".into(),
                        name: "Anna".into(),
                        locale: "ru-RU".into(),
                        high_quality: false,
                    },
                    VoiceInfo {
                        id: "en-basic".into(),
                        name: "Basic".into(),
                        locale: "en-US".into(),
                        high_quality: false,
                    },
                    VoiceInfo {
                        id: "en-premium".into(),
                        name: "Premium".into(),
                        locale: "en-US".into(),
                        high_quality: true,
                    },
                ],
            }
        }

        fn call_texts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|c| c.text.clone()).collect()
        }
    }

    #[async_trait]
    impl SpeechBackend for MockBackend {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn voices(&self) -> Vec<VoiceInfo> {
            self.voice_list.clone()
        }

        async fn speak(&self, utterance: &UtteranceRequest) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(utterance.clone());
            let permit = self.permits.acquire().await?;
            permit.forget();
            Ok(())
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..400 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met within timeout");
    }

    fn orchestrator(backend: &Arc<MockBackend>) -> SpeechOrchestrator {
        SpeechOrchestrator::new(
            Arc::clone(backend) as Arc<dyn SpeechBackend>,
            SpeechConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_runs_issued_sequentially_in_order() {
        let backend = Arc::new(MockBackend::new(true));
        let orch = orchestrator(&backend);

        backend.permits.add_permits(3);

        let (tx, rx) = tokio::sync::oneshot::channel();
        orch.speak(
            "один two три",
            Some(Box::new(move || {
                let _ = tx.send(());
            })),
        );
        assert!(orch.is_speaking());

        tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("completion hook never fired")
            .unwrap();

        assert_eq!(backend.call_texts(), vec!["один", " two", " три"]);
        assert!(!orch.is_speaking());
    }

    #[tokio::test]
    async fn test_voice_and_profile_applied_per_run() {
        let backend = Arc::new(MockBackend::new(true));
        let orch = orchestrator(&backend);

        backend.permits.add_permits(2);

        let (tx, rx) = tokio::sync::oneshot::channel();
        orch.speak(
            "Привет, hello",
            Some(Box::new(move || {
                let _ = tx.send(());
            })),
        );
        tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .unwrap()
            .unwrap();

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].voice.as_ref().unwrap().id, "ru-anna");
        // English prefers the higher-quality voice.
        assert_eq!(calls[1].voice.as_ref().unwrap().id, "en-premium");
        // Tutoring profile speaks slower than conversational speed.
        assert!(calls[0].rate < 1.0);
    }

    #[tokio::test]
    async fn test_next_run_waits_for_previous_completion() {
        let backend = Arc::new(MockBackend::new(true));
        let orch = orchestrator(&backend);

        orch.speak("раз two", None);

        let calls = Arc::clone(&backend.calls);
        wait_until(|| calls.lock().unwrap().len() == 1).await;

        // No permit released yet, so run 2 must not have been issued.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.calls.lock().unwrap().len(), 1);

        backend.permits.add_permits(1);
        let calls = Arc::clone(&backend.calls);
        wait_until(|| calls.lock().unwrap().len() == 2).await;
    }

    #[tokio::test]
    async fn test_stop_suppresses_completion_and_remaining_runs() {
        let backend = Arc::new(MockBackend::new(true));
        let orch = orchestrator(&backend);

        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        orch.speak(
            "раз two три",
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        // Let run 1 complete and run 2 get issued.
        let calls = Arc::clone(&backend.calls);
        wait_until(|| calls.lock().unwrap().len() == 1).await;
        backend.permits.add_permits(1);
        let calls = Arc::clone(&backend.calls);
        wait_until(|| calls.lock().unwrap().len() == 2).await;

        orch.stop();
        assert!(!orch.is_speaking());

        // Release run 2; run 3 must never be issued and the hook stays silent.
        backend.permits.add_permits(2);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(backend.calls.lock().unwrap().len(), 2);
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_new_speak_supersedes_and_abandons_old_hook() {
        let backend = Arc::new(MockBackend::new(true));
        let orch = orchestrator(&backend);

        let old_completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&old_completions);
        orch.speak(
            "старый",
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        let calls = Arc::clone(&backend.calls);
        wait_until(|| calls.lock().unwrap().len() == 1).await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        orch.speak(
            "new",
            Some(Box::new(move || {
                let _ = tx.send(());
            })),
        );

        backend.permits.add_permits(4);
        tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("new job's hook never fired")
            .unwrap();

        // The superseded job's hook was abandoned, not deferred.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(old_completions.load(Ordering::SeqCst), 0);
        assert!(backend.cancels.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_empty_input_completes_immediately() {
        let backend = Arc::new(MockBackend::new(true));
        let orch = orchestrator(&backend);

        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        orch.speak(
            "   ",
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(backend.calls.lock().unwrap().is_empty());
        assert!(!orch.is_speaking());
    }

    #[tokio::test]
    async fn test_unavailable_backend_without_hook_completes_silently() {
        let backend = Arc::new(MockBackend::new(false));
        let orch = orchestrator(&backend);

        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        orch.speak(
            "Привет",
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_backend_reports_through_error_hook() {
        let backend = Arc::new(MockBackend::new(false));
        let errors = Arc::new(AtomicUsize::new(0));
        let error_counter = Arc::clone(&errors);

        let orch = orchestrator(&backend).with_error_hook(Arc::new(move |_| {
            error_counter.fetch_add(1, Ordering::SeqCst);
        }));

        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        orch.speak(
            "Привет",
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        // With an error channel installed, completion is not faked.
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }
}
