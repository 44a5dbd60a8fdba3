use std::sync::Arc;

use tsmatch_core::{
    AnalysisReport, CandidateResult, ComparisonReport, EvaluationReport, MatchError,
    NormalizedSeries, RankedReport, SeriesRole, SeriesSink, TimeSeries, assemble, rank, rank_all,
};

use crate::Matcher;

impl Matcher {
    /// Run a complete analysis of `reference` against every candidate.
    ///
    /// Stages, in order: normalize and persist the reference, evaluate all
    /// candidates, persist each normalized candidate, rank every success,
    /// persist the ranking, assemble the top-K report, and render one chart
    /// per report entry.
    ///
    /// Persistence and rendering failures are collected in
    /// [`AnalysisReport::warnings`] and never change the ranking. Collaborator
    /// I/O runs on the blocking pool.
    ///
    /// # Errors
    /// - `InsufficientData` / `DegenerateSeries` if the reference cannot be normalized.
    /// - Enumeration failures as described on [`Matcher::evaluate`].
    /// - `NoValidCandidates` if no candidate could be scored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tsmatch::pipeline::run",
            skip(self, reference),
            fields(reference = %reference.id(), len = reference.len(), top_k = self.cfg.top_k),
        )
    )]
    pub async fn run(&self, reference: &TimeSeries) -> Result<AnalysisReport, MatchError> {
        let reference = self.normalize_reference(reference)?;
        let mut warnings: Vec<MatchError> = Vec::new();
        self.persist(
            vec![SinkWrite::Normalized(
                reference.as_ref().clone(),
                SeriesRole::Reference,
            )],
            &mut warnings,
        )
        .await;

        let EvaluationReport {
            results,
            warnings: eval_warnings,
        } = self.evaluate(&reference).await?;
        warnings.extend(eval_warnings);

        if self.cfg.persist_normalized {
            let writes = results
                .iter()
                .filter_map(|r| r.normalized.clone())
                .map(|n| SinkWrite::Normalized(n, SeriesRole::Candidate))
                .collect();
            self.persist(writes, &mut warnings).await;
        }

        let attempted = results.len();
        let (scored, failures): (Vec<CandidateResult>, Vec<CandidateResult>) =
            results.into_iter().partition(CandidateResult::is_scored);
        if scored.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(attempted, "no candidate could be scored");
            return Err(MatchError::NoValidCandidates { attempted });
        }

        let ranking = rank_all(Arc::clone(&reference), scored)?;
        self.persist(vec![SinkWrite::Ranking(ranking.clone())], &mut warnings)
            .await;

        let top = rank(
            Arc::clone(&reference),
            ranking.entries.iter().cloned(),
            self.cfg.top_k,
        )?;
        let report = assemble(&top, &reference.source_id);
        warnings.extend(self.render_all(&report).await);

        #[cfg(feature = "tracing")]
        tracing::info!(
            scored = ranking.entries.len(),
            failed = failures.len(),
            reported = report.entries.len(),
            warnings = warnings.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            ranking,
            report,
            failures,
            warnings,
        })
    }

    /// Hand `writes` to the sink in order, off the async workers.
    async fn persist(&self, writes: Vec<SinkWrite>, warnings: &mut Vec<MatchError>) {
        let Some(sink) = self.sink.as_ref().map(Arc::clone) else {
            return;
        };
        if writes.is_empty() {
            return;
        }
        let errors = Self::offload("persist", move || {
            writes
                .iter()
                .filter_map(|w| w.apply(sink.as_ref()).err())
                .collect::<Vec<_>>()
        })
        .await
        .unwrap_or_else(|e| vec![e]);
        #[cfg(feature = "tracing")]
        for e in &errors {
            tracing::warn!(error = %e, "persistence failed");
        }
        warnings.extend(errors);
    }

    /// Render one chart per report entry; each failure is returned as a warning.
    async fn render_all(&self, report: &ComparisonReport) -> Vec<MatchError> {
        let Some(renderer) = self.renderer.as_ref().map(Arc::clone) else {
            return Vec::new();
        };
        let report = report.clone();
        let errors = Self::offload("render", move || {
            report
                .entries
                .iter()
                .filter_map(|entry| renderer.render(entry, &report.reference_id).err())
                .collect::<Vec<_>>()
        })
        .await
        .unwrap_or_else(|e| vec![e]);
        #[cfg(feature = "tracing")]
        for e in &errors {
            tracing::warn!(error = %e, "chart rendering failed");
        }
        errors
    }
}

/// One unit of work for the sink.
enum SinkWrite {
    Normalized(NormalizedSeries, SeriesRole),
    Ranking(RankedReport),
}

impl SinkWrite {
    fn apply(&self, sink: &dyn SeriesSink) -> Result<(), MatchError> {
        match self {
            Self::Normalized(series, role) => sink.write_normalized(series, *role),
            Self::Ranking(ranking) => sink.write_ranking(ranking),
        }
    }
}
