use crate::config::RunOptions;
use crate::core::age_filter::{classify_entry, Age};
use crate::core::retry::{attempt_unpublish, AttemptOutcome};
use crate::core::stop::StopSignal;
use crate::domain::model::{
    ContentType, Decision, DecisionAction, Entry, EntryQuery, RunOutcome, RunReport, RunSummary,
    UnpublishRequest,
};
use crate::domain::ports::{CmsClient, Sleeper};
use crate::utils::error::{CmsError, Result};
use std::collections::HashSet;

/// Single sequential pass: list content types, list each type's entries,
/// unpublish the stale ones. One content type or entry failing never stops
/// the others; only a failed content type listing aborts the run.
pub struct Workflow<C: CmsClient, S: Sleeper> {
    client: C,
    sleeper: S,
    options: RunOptions,
    stop: StopSignal,
}

struct RunState {
    summary: RunSummary,
    decisions: Vec<Decision>,
    seen: HashSet<(String, String)>,
}

impl RunState {
    fn new() -> Self {
        Self {
            summary: RunSummary::default(),
            decisions: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn record(&mut self, content_type: &str, entry: &Entry, action: DecisionAction) {
        self.decisions.push(Decision {
            content_type: content_type.to_string(),
            entry_uid: entry.uid.clone(),
            title: entry.title.clone(),
            created_at: entry.created_at.clone(),
            action,
        });
    }

    fn finish(self, outcome: RunOutcome, fatal_error: Option<String>) -> RunReport {
        RunReport {
            outcome,
            summary: self.summary,
            decisions: self.decisions,
            fatal_error,
        }
    }
}

impl<C: CmsClient, S: Sleeper> Workflow<C, S> {
    pub fn new(client: C, sleeper: S, options: RunOptions) -> Self {
        Self {
            client,
            sleeper,
            options,
            stop: StopSignal::new(),
        }
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn run(&self) -> RunReport {
        let mode = self.options.mode;
        let mut state = RunState::new();

        tracing::info!(
            mode = %mode,
            threshold = %self.options.threshold.to_rfc3339(),
            environment = %self.options.environment,
            locale = %self.options.locale,
            "Starting unpublish run"
        );

        let content_types = match self.client.list_content_types().await {
            Ok(content_types) => content_types,
            Err(e) => {
                let err = CmsError::ContentTypeListError {
                    source: Box::new(e),
                };
                tracing::error!(mode = %mode, error = %err, "Aborting run");
                return state.finish(RunOutcome::AbortedFatal, Some(err.to_string()));
            }
        };

        let selected = self.select_content_types(content_types);
        state.summary.content_types = selected.len();
        tracing::info!(
            mode = %mode,
            "Content Types to Unpublish: {}",
            selected
                .iter()
                .map(|ct| ct.uid.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );

        for content_type in &selected {
            if self.stop.is_triggered() {
                return self.cancelled(state);
            }

            match self.process_content_type(&content_type.uid, &mut state).await {
                Ok(()) => {}
                Err(CmsError::CancelledError) => return self.cancelled(state),
                Err(e) => {
                    state.summary.content_type_failures += 1;
                    tracing::error!(
                        mode = %mode,
                        content_type = %content_type.uid,
                        error = %e,
                        "Skipping content type"
                    );
                }
            }
        }

        let outcome = if state.summary.has_errors() {
            RunOutcome::CompletedWithErrors
        } else {
            RunOutcome::Completed
        };
        tracing::info!(mode = %mode, outcome = ?outcome, "Run finished: {}", state.summary);
        state.finish(outcome, None)
    }

    /// Keeps the listing order; requested types the CMS does not know are dropped.
    fn select_content_types(&self, content_types: Vec<ContentType>) -> Vec<ContentType> {
        match &self.options.content_type_filter {
            Some(filter) => content_types
                .into_iter()
                .filter(|ct| filter.contains(&ct.uid))
                .collect(),
            None => content_types,
        }
    }

    fn entry_query(&self) -> EntryQuery {
        EntryQuery {
            environment: self.options.environment.clone(),
            created_before: self
                .options
                .server_side_filter
                .then_some(self.options.threshold),
        }
    }

    async fn process_content_type(&self, content_type: &str, state: &mut RunState) -> Result<()> {
        let entries = self
            .client
            .list_entries(content_type, &self.entry_query())
            .await
            .map_err(|e| CmsError::EntryListError {
                content_type: content_type.to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!(content_type, entries = entries.len(), "Fetched entries");

        for entry in &entries {
            if self.stop.is_triggered() {
                return Err(CmsError::CancelledError);
            }
            if !state.seen.insert((content_type.to_string(), entry.uid.clone())) {
                tracing::debug!(content_type, entry_uid = %entry.uid, "Entry already handled in this run");
                continue;
            }
            self.process_entry(content_type, entry, state).await?;
        }

        Ok(())
    }

    async fn process_entry(&self, content_type: &str, entry: &Entry, state: &mut RunState) -> Result<()> {
        let mode = self.options.mode;
        let locale = &self.options.locale;

        match classify_entry(entry, self.options.threshold) {
            Err(e) => {
                state.summary.malformed += 1;
                state.record(content_type, entry, DecisionAction::Malformed);
                tracing::warn!(
                    mode = %mode,
                    content_type,
                    entry_uid = %entry.uid,
                    error = %e,
                    "Skip [{}][{}][{}]. created_at is not a valid date",
                    locale,
                    entry.title,
                    entry.uid
                );
            }
            Ok(Age::Fresh) => {
                state.summary.skipped += 1;
                state.record(content_type, entry, DecisionAction::Skipped);
                tracing::info!(
                    mode = %mode,
                    content_type,
                    "Skip [{}][{}][{}]. Content was created after: {}",
                    locale,
                    entry.title,
                    entry.uid,
                    self.options.threshold.to_rfc3339()
                );
            }
            Ok(Age::Stale) => {
                state.summary.stale += 1;
                tracing::info!(
                    mode = %mode,
                    content_type,
                    "Unpublish [{}][{}][{}]. Content was created on: {}",
                    locale,
                    entry.title,
                    entry.uid,
                    entry.created_at
                );

                let request = UnpublishRequest {
                    content_type_uid: content_type.to_string(),
                    entry_uid: entry.uid.clone(),
                    environment: self.options.environment.clone(),
                    locale: locale.clone(),
                };

                match attempt_unpublish(
                    &self.client,
                    &self.sleeper,
                    &request,
                    mode,
                    &self.options.retry,
                    &self.stop,
                )
                .await
                {
                    Ok(AttemptOutcome::DryRun) => {
                        state.record(content_type, entry, DecisionAction::WouldUnpublish);
                    }
                    Ok(AttemptOutcome::Unpublished { .. }) => {
                        state.summary.unpublished += 1;
                        state.record(content_type, entry, DecisionAction::Unpublished);
                    }
                    Err(CmsError::CancelledError) => {
                        state.record(content_type, entry, DecisionAction::Interrupted);
                        return Err(CmsError::CancelledError);
                    }
                    Err(e) => {
                        state.summary.failed += 1;
                        state.record(content_type, entry, DecisionAction::Failed);
                        tracing::error!(
                            mode = %mode,
                            content_type,
                            entry_uid = %entry.uid,
                            error = %e,
                            "Unpublish [{}][{}][{}] :: Error",
                            locale,
                            entry.title,
                            entry.uid
                        );
                    }
                }
            }
        }

        Ok(())
    }

    fn cancelled(&self, state: RunState) -> RunReport {
        tracing::warn!(mode = %self.options.mode, "Run cancelled: {}", state.summary);
        state.finish(RunOutcome::Cancelled, None)
    }
}
