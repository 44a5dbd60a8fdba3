use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::StreamExt;
use tokio::time::Instant;
use tsmatch_core::{
    CandidateResult, CandidateSource, EvaluationReport, MatchError, NormalizedSeries,
    cadence_mismatch, evaluate_one,
};

use super::util::{collapse_enumeration_errors, join_with_deadline};
use crate::Matcher;
use crate::core::tag_err;

type Planned = (Arc<dyn CandidateSource>, String);

impl Matcher {
    /// Enumerate, fetch, and score every candidate against `reference`.
    ///
    /// Behavior:
    /// - Every registered source is enumerated. A source that fails to enumerate
    ///   becomes a warning as long as at least one other source succeeded.
    /// - Candidates skipped by a source during enumeration are carried as warnings.
    /// - Candidate ids are unique across sources; the first registered source
    ///   keeps a duplicated id and the duplicate is recorded as a warning.
    /// - Fetches run concurrently up to `max_concurrency`, each bounded by
    ///   `fetch_timeout`. Fetch, normalization, and scoring failures are recorded
    ///   on that candidate's result.
    /// - When `request_timeout` is set and elapses, finished candidates keep
    ///   their results and the rest are recorded as `RequestTimeout` failures.
    /// - A normalized candidate whose sampling cadence differs from the
    ///   reference's is still scored and adds a `CadenceMismatch` warning.
    ///
    /// # Errors
    /// Returns an error only if every source failed to enumerate, or the
    /// deadline elapsed during enumeration.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tsmatch::pipeline::evaluate",
            skip(self, reference),
            fields(reference = %reference.source_id, sources = self.sources.len()),
        )
    )]
    pub async fn evaluate(
        &self,
        reference: &NormalizedSeries,
    ) -> Result<EvaluationReport, MatchError> {
        let deadline = self.cfg.request_timeout.map(|d| Instant::now() + d);
        let mut warnings = Vec::new();
        let planned = self.enumerate(&mut warnings).await?;
        let results = self
            .fetch_and_score(reference, planned, deadline, &mut warnings)
            .await;
        warnings.extend(cadence_warnings(reference, &results));
        Ok(EvaluationReport { results, warnings })
    }

    async fn enumerate(&self, warnings: &mut Vec<MatchError>) -> Result<Vec<Planned>, MatchError> {
        let tasks = self.sources.iter().map(|src| {
            let src = Arc::clone(src);
            async move {
                let listing = src
                    .list_candidates()
                    .await
                    .map_err(|e| tag_err(src.name(), e));
                (src, listing)
            }
        });
        let listed = join_with_deadline(tasks, self.cfg.request_timeout, "enumerate").await?;

        let mut planned: Vec<Planned> = Vec::new();
        let mut owner: HashMap<String, &'static str> = HashMap::new();
        let mut errors: Vec<MatchError> = Vec::new();
        for (src, listing) in listed {
            let enumeration = match listing {
                Ok(en) => en,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(source = src.name(), error = %e, "source enumeration failed");
                    errors.push(e);
                    continue;
                }
            };
            #[cfg(feature = "tracing")]
            for skipped in &enumeration.skipped {
                tracing::warn!(source = src.name(), error = %skipped, "candidate skipped");
            }
            warnings.extend(enumeration.skipped);

            for id in enumeration.candidates {
                if let Some(first) = owner.get(&id).copied() {
                    warnings.push(MatchError::validation(
                        id,
                        format!(
                            "duplicate candidate id from {}; keeping the one from {first}",
                            src.name()
                        ),
                    ));
                    continue;
                }
                owner.insert(id.clone(), src.name());
                planned.push((Arc::clone(&src), id));
            }
        }

        if errors.len() == self.sources.len() {
            return Err(collapse_enumeration_errors(errors));
        }
        warnings.extend(errors);
        Ok(planned)
    }

    async fn fetch_and_score(
        &self,
        reference: &NormalizedSeries,
        planned: Vec<Planned>,
        deadline: Option<Instant>,
        warnings: &mut Vec<MatchError>,
    ) -> Vec<CandidateResult> {
        let ids: Vec<String> = planned.iter().map(|(_, id)| id.clone()).collect();
        let fetch_timeout = self.cfg.fetch_timeout;
        let variance = self.cfg.variance;

        let tasks = planned.into_iter().map(|(src, id)| async move {
            let name = src.name();
            match Self::fetch_with_timeout(name, &id, fetch_timeout, src.fetch(&id)).await {
                Ok(series) => evaluate_one(reference, &id, &series, variance),
                Err(e) => {
                    let e = tag_err(name, e);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(candidate = %id, source = name, error = %e, "fetch failed");
                    CandidateResult::failed(id, e)
                }
            }
        });

        let mut results: Vec<CandidateResult> = Vec::with_capacity(ids.len());
        let mut stream = futures::stream::iter(tasks).buffer_unordered(self.cfg.max_concurrency);
        let drain = async {
            while let Some(r) = stream.next().await {
                results.push(r);
            }
        };
        let finished = match deadline {
            Some(at) => tokio::time::timeout_at(at, drain).await.is_ok(),
            None => {
                drain.await;
                true
            }
        };
        // Cancels whatever is still in flight
        drop(stream);

        if !finished {
            let done: HashSet<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
            let unfinished: Vec<CandidateResult> = ids
                .iter()
                .filter(|id| !done.contains(id.as_str()))
                .map(|id| CandidateResult::failed(id.clone(), MatchError::request_timeout("evaluate")))
                .collect();
            #[cfg(feature = "tracing")]
            tracing::warn!(
                unfinished = unfinished.len(),
                finished = results.len(),
                "request deadline elapsed during evaluation"
            );
            results.extend(unfinished);
            warnings.push(MatchError::request_timeout("evaluate"));
        }
        results
    }
}

/// One warning per normalized candidate sampled differently from the reference,
/// ordered by candidate id.
fn cadence_warnings(reference: &NormalizedSeries, results: &[CandidateResult]) -> Vec<MatchError> {
    let mut flagged: Vec<(&str, MatchError)> = results
        .iter()
        .filter_map(|r| {
            let normalized = r.normalized.as_ref()?;
            cadence_mismatch(&r.candidate_id, &reference.points, &normalized.points)
                .map(|w| (r.candidate_id.as_str(), w))
        })
        .collect();
    flagged.sort_by(|a, b| a.0.cmp(b.0));
    #[cfg(feature = "tracing")]
    for (id, _) in &flagged {
        tracing::warn!(candidate = id, "sampling cadence differs from reference; comparing positionally");
    }
    flagged.into_iter().map(|(_, w)| w).collect()
}

