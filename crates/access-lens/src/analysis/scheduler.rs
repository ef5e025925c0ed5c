use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Mutex as FlightGate;
use tracing::{debug, info, warn};

use super::{run_pipeline, AnalysisError, AnalysisResult};
use crate::audit::{RuleAuditor, RuleSet};

/// Serializes analyses of a single content cursor.
///
/// At most one audit runs per scheduler. Callers arriving while one is in
/// flight queue on a FIFO gate; once through, they re-check whether the content
/// they carry was just analyzed and, if so, reuse that result instead of
/// auditing again. A failed audit is never handed to the callers queued behind
/// it; each of them makes its own attempt.
pub struct AnalysisScheduler<A> {
    auditor: Arc<A>,
    rules: RuleSet,
    gate: FlightGate<()>,
    cursor: Mutex<AnalysisCursor>,
}

impl<A> AnalysisScheduler<A>
where
    A: RuleAuditor + 'static,
{
    pub fn new(auditor: Arc<A>, rules: RuleSet) -> Self {
        Self {
            auditor,
            rules,
            gate: FlightGate::new(()),
            cursor: Mutex::new(AnalysisCursor::default()),
        }
    }

    /// Analyze `content`, reusing the previous result when it is unchanged.
    pub async fn analyze(&self, content: &str) -> Result<AnalysisResult, AnalysisError> {
        if content.trim().is_empty() {
            return Err(AnalysisError::EmptyContent);
        }

        let sequence = {
            let mut cursor = self.cursor();
            if let Some(result) = cursor.cached(content) {
                debug!("content unchanged since last analysis");
                return Ok(result);
            }
            cursor.begin()
        };

        let _flight = self.gate.lock().await;

        if let Some(result) = self.cursor().cached(content) {
            debug!(sequence, "coalesced with the analysis that just completed");
            return Ok(result);
        }

        let result = run_pipeline(self.auditor.as_ref(), &self.rules, content).await?;

        if self.cursor().commit(sequence, content, &result) {
            info!(
                sequence,
                overall = result.score.overall,
                issues = result.issues.len(),
                "accessibility analysis completed"
            );
        } else {
            warn!(sequence, "discarding analysis superseded by a newer request");
        }

        Ok(result)
    }

    /// Most recently committed result, if any analysis has completed.
    pub fn latest(&self) -> Option<AnalysisResult> {
        self.cursor()
            .latest
            .as_ref()
            .map(|committed| committed.result.clone())
    }

    fn cursor(&self) -> MutexGuard<'_, AnalysisCursor> {
        self.cursor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug)]
struct CommittedAnalysis {
    content: String,
    result: AnalysisResult,
}

/// Last-started / last-committed bookkeeping. Commits are accepted by start
/// sequence, not by completion time.
#[derive(Debug, Default)]
struct AnalysisCursor {
    last_started: u64,
    last_committed: u64,
    latest: Option<CommittedAnalysis>,
}

impl AnalysisCursor {
    fn begin(&mut self) -> u64 {
        self.last_started += 1;
        self.last_started
    }

    fn cached(&self, content: &str) -> Option<AnalysisResult> {
        self.latest
            .as_ref()
            .filter(|committed| committed.content == content)
            .map(|committed| committed.result.clone())
    }

    fn commit(&mut self, sequence: u64, content: &str, result: &AnalysisResult) -> bool {
        if sequence <= self.last_committed {
            return false;
        }
        self.last_committed = sequence;
        self.latest = Some(CommittedAnalysis {
            content: content.to_string(),
            result: result.clone(),
        });
        true
    }
}
