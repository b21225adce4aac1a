//! Background classification so a slow model call never blocks the UI loop.
//!
//! A [`ClassificationJob`] owns one in-flight call. The caller polls it from
//! its event loop and commits the label to the store itself, on its own
//! thread. Cancelling marks the job: a call that has not started yet is
//! skipped, one already running finishes but its result is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::classifier::SentimentClassifier;
use crate::error::CoreError;
use crate::label::SentimentLabel;
use crate::store::{validate_input, Record, RecordStore};

#[derive(Debug)]
pub enum JobOutcome {
    Classified(SentimentLabel),
    Failed(CoreError),
    Cancelled,
}

pub struct ClassificationJob {
    raw: String,
    cancelled: Arc<AtomicBool>,
    rx: Receiver<Result<SentimentLabel, CoreError>>,
}

impl ClassificationJob {
    /// Starts classifying `raw` on a new thread. Blank input is rejected
    /// up front and no thread is spawned.
    pub fn spawn(
        classifier: Arc<dyn SentimentClassifier>,
        raw: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let raw = raw.into();
        validate_input(&raw)?;
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let input = raw.clone();
        let skip = Arc::clone(&cancelled);
        thread::spawn(move || {
            if skip.load(Ordering::SeqCst) {
                return;
            }
            let result = classifier.classify(&input);
            // The receiver is gone if the job was dropped; nothing to report to.
            let _ = tx.send(result);
        });
        debug!("[worker] classification job started");
        Ok(ClassificationJob { raw, cancelled, rx })
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Non-blocking check; `None` while the classifier is still running.
    pub fn poll(&self) -> Option<JobOutcome> {
        if self.is_cancelled() {
            return Some(JobOutcome::Cancelled);
        }
        match self.rx.try_recv() {
            Ok(result) => Some(self.outcome(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(JobOutcome::Failed(CoreError::unavailable(
                "classification worker stopped unexpectedly",
            ))),
        }
    }

    /// Appends the job's comment to `store` if classification succeeded.
    /// Failed and cancelled jobs leave the store untouched.
    pub fn commit<'s>(
        &self,
        outcome: JobOutcome,
        store: &'s mut RecordStore,
    ) -> Result<Option<&'s Record>, CoreError> {
        match outcome {
            JobOutcome::Classified(label) => store.append_classified(&self.raw, label).map(Some),
            JobOutcome::Failed(err) => Err(err),
            JobOutcome::Cancelled => Ok(None),
        }
    }

    fn outcome(&self, result: Result<SentimentLabel, CoreError>) -> JobOutcome {
        if self.is_cancelled() {
            return JobOutcome::Cancelled;
        }
        match result {
            Ok(label) => JobOutcome::Classified(label),
            Err(err) => JobOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn wait(job: &ClassificationJob) -> JobOutcome {
        loop {
            if let Some(outcome) = job.poll() {
                return outcome;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    struct Fixed(SentimentLabel);

    impl SentimentClassifier for Fixed {
        fn classify(&self, _text: &str) -> Result<SentimentLabel, CoreError> {
            Ok(self.0)
        }
    }

    /// Blocks until the test releases it, so cancellation can race the call.
    struct Gated {
        gate: Mutex<Receiver<()>>,
    }

    impl SentimentClassifier for Gated {
        fn classify(&self, _text: &str) -> Result<SentimentLabel, CoreError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(SentimentLabel::Positive)
        }
    }

    #[test]
    fn completed_job_commits_record() {
        let mut store = RecordStore::new();
        let job = ClassificationJob::spawn(Arc::new(Fixed(SentimentLabel::Neutral)), "Hola, ¿qué tal?")
            .unwrap();
        let outcome = wait(&job);
        let record = job.commit(outcome, &mut store).unwrap().unwrap();
        assert_eq!(record.text(), "Hola que tal");
        assert_eq!(record.label(), SentimentLabel::Neutral);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_input_never_spawns() {
        let result = ClassificationJob::spawn(Arc::new(Fixed(SentimentLabel::Neutral)), "  ");
        assert!(matches!(result, Err(CoreError::EmptyInput)));
    }

    #[test]
    fn cancelled_job_discards_result() {
        let (release, gate) = mpsc::channel();
        let classifier = Arc::new(Gated {
            gate: Mutex::new(gate),
        });
        let mut store = RecordStore::new();
        let job = ClassificationJob::spawn(classifier, "muy bien").unwrap();
        assert!(job.poll().is_none());
        job.cancel();
        let _ = release.send(());
        let outcome = job.poll().unwrap();
        assert!(matches!(outcome, JobOutcome::Cancelled));
        assert!(job.commit(outcome, &mut store).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn failure_is_reported_and_store_unchanged() {
        struct Offline;
        impl SentimentClassifier for Offline {
            fn classify(&self, _text: &str) -> Result<SentimentLabel, CoreError> {
                Err(CoreError::unavailable("offline"))
            }
        }
        let mut store = RecordStore::new();
        let job = ClassificationJob::spawn(Arc::new(Offline), "texto").unwrap();
        let waited = wait(&job);
        let err = job.commit(waited, &mut store).unwrap_err();
        assert!(matches!(err, CoreError::ClassificationUnavailable { .. }));
        assert!(store.is_empty());
    }
}
