//! Progress transitions against a scripted backend.

mod support;

use std::sync::Arc;

use adoptly_common::assert_eventually_async;
use adoptly_common::resilience::MockClock;
use adoptly_core::{DashboardCache, ProgressTransitionHandler, TransitionError};
use adoptly_domain::fixtures::{sample_badge, sample_dashboard};
use adoptly_domain::{
    BadgeType, CacheSettings, FetchError, OpportunityType, TaskStatus, UpdateProgressResponse,
    ValidationError,
};
use support::api::ScriptedApi;
use support::{analysis, no_retry, WAIT};

fn setup() -> (Arc<ScriptedApi>, DashboardCache<MockClock>, ProgressTransitionHandler) {
    let api = ScriptedApi::new();
    let settings = no_retry(CacheSettings::dashboard());
    let cache = DashboardCache::with_clock(api.clone(), &settings, MockClock::new());
    let handler = ProgressTransitionHandler::new(api.clone());
    (api, cache, handler)
}

#[tokio::test]
async fn test_same_status_is_rejected_without_network_call() {
    let (api, cache, handler) = setup();
    let dashboard = cache.subscribe(analysis("a-1"));
    dashboard.load().await.unwrap();

    let result = handler
        .update_status(&dashboard, OpportunityType::DigitalPresence, TaskStatus::InProgress)
        .await;

    assert_eq!(
        result,
        Err(TransitionError::Validation(ValidationError::NoOp(TaskStatus::InProgress)))
    );
    assert_eq!(api.progress_calls(), 0);
}

#[tokio::test]
async fn test_implemented_is_terminal() {
    let (api, cache, handler) = setup();
    let mut snapshot = sample_dashboard("a-1");
    let gap = snapshot.gap_mut(OpportunityType::ValueCreation).unwrap();
    gap.status = TaskStatus::Implemented;
    gap.marked_date = Some(chrono::Utc::now());
    api.push_dashboard(Ok(snapshot));

    let dashboard = cache.subscribe(analysis("a-1"));
    dashboard.load().await.unwrap();

    for requested in [TaskStatus::NotStarted, TaskStatus::InProgress] {
        let err = handler
            .update_status(&dashboard, OpportunityType::ValueCreation, requested)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::Validation(ValidationError::TerminalState {
                from: TaskStatus::Implemented,
                to: requested,
            })
        );
    }
    assert_eq!(api.progress_calls(), 0);
}

#[tokio::test]
async fn test_inactive_and_unloaded_handles_are_rejected() {
    let (api, cache, handler) = setup();

    let inactive = cache.subscribe(None);
    let err = handler
        .update_status(&inactive, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap_err();
    assert_eq!(err, TransitionError::Validation(ValidationError::InactiveKey));

    let gate = api.gate_dashboard();
    let pending = cache.subscribe(analysis("a-1"));
    let err = handler
        .update_status(&pending, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::NotLoaded(id) if id.as_str() == "a-1"));
    assert_eq!(api.progress_calls(), 0);
    gate.notify_one();
}

#[tokio::test]
async fn test_unknown_gap_is_rejected() {
    let (api, cache, handler) = setup();
    let mut snapshot = sample_dashboard("a-1");
    snapshot.top_3_gaps.retain(|gap| gap.opportunity_type != OpportunityType::BusinessManagement);
    api.push_dashboard(Ok(snapshot));

    let dashboard = cache.subscribe(analysis("a-1"));
    dashboard.load().await.unwrap();

    let err = handler
        .update_status(&dashboard, OpportunityType::BusinessManagement, TaskStatus::InProgress)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransitionError::Validation(ValidationError::UnknownGap(
            OpportunityType::BusinessManagement
        ))
    );
}

#[tokio::test]
async fn test_completing_a_task_unlocks_two_badges_and_touches_one_gap() {
    let (api, cache, handler) = setup();
    api.push_progress(Ok(UpdateProgressResponse {
        message: "Task implemented".into(),
        new_status: TaskStatus::Implemented,
        badges_earned: vec![
            sample_badge(BadgeType::Momentum, false),
            sample_badge(BadgeType::QuickWin, false),
        ],
    }));

    let dashboard = cache.subscribe(analysis("a-1"));
    let before = dashboard.load().await.unwrap().unwrap();

    let outcome = handler
        .update_status(&dashboard, OpportunityType::DigitalPresence, TaskStatus::Implemented)
        .await
        .unwrap();

    assert!(outcome.honored);
    assert_eq!(outcome.new_status, TaskStatus::Implemented);
    assert_eq!(outcome.badges_earned.len(), 2);

    let after = dashboard.snapshot().unwrap();
    assert_eq!(after.earned_badges().count(), before.earned_badges().count() + 2);
    for badge_type in [BadgeType::Momentum, BadgeType::QuickWin] {
        let badge = after.badges.iter().find(|badge| badge.badge_type == badge_type).unwrap();
        assert!(badge.earned_at.is_some());
    }

    let gap = after.gap(OpportunityType::DigitalPresence).unwrap();
    assert_eq!(gap.status, TaskStatus::Implemented);
    assert!(gap.marked_date.is_some());
    for other in [OpportunityType::ValueCreation, OpportunityType::BusinessManagement] {
        assert_eq!(after.gap(other), before.gap(other));
    }
    assert_eq!(after.progress_summary.completion_percentage, 33.0);
    assert_eq!(api.dashboard_calls(), 1);
    assert_eq!(
        api.progress_requests(),
        vec![(
            analysis("a-1").unwrap(),
            OpportunityType::DigitalPresence,
            TaskStatus::Implemented
        )]
    );
}

#[tokio::test]
async fn test_http_failure_leaves_cached_status_unchanged() {
    let (api, cache, handler) = setup();
    api.push_progress(Err(FetchError::Http { status: 500, message: "boom".into() }));

    let dashboard = cache.subscribe(analysis("a-1"));
    let before = dashboard.load().await.unwrap().unwrap();

    let err = handler
        .update_status(&dashboard, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    let after = dashboard.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(
        after.gap(OpportunityType::ValueCreation).unwrap().status,
        TaskStatus::NotStarted
    );
    assert_eq!(api.dashboard_calls(), 1);
}

#[tokio::test]
async fn test_server_keeping_status_is_reconciled_not_failed() {
    let (api, cache, handler) = setup();
    for _ in 0..2 {
        api.push_progress(Ok(UpdateProgressResponse {
            message: "Status unchanged".into(),
            new_status: TaskStatus::NotStarted,
            badges_earned: Vec::new(),
        }));
    }

    let dashboard = cache.subscribe(analysis("a-1"));
    let before = dashboard.load().await.unwrap().unwrap();

    let first = handler
        .update_status(&dashboard, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap();
    let once = dashboard.snapshot().unwrap();
    let second = handler
        .update_status(&dashboard, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap();
    let twice = dashboard.snapshot().unwrap();

    assert!(!first.honored);
    assert!(!second.honored);
    assert_eq!(first.new_status, TaskStatus::NotStarted);
    assert_eq!(*once, *before);
    assert_eq!(*twice, *once);
}

#[tokio::test]
async fn test_server_choosing_another_status_wins() {
    let (api, cache, handler) = setup();
    api.push_progress(Ok(UpdateProgressResponse {
        message: "Moved to in progress first".into(),
        new_status: TaskStatus::InProgress,
        badges_earned: Vec::new(),
    }));

    let dashboard = cache.subscribe(analysis("a-1"));
    dashboard.load().await.unwrap();

    let outcome = handler
        .update_status(&dashboard, OpportunityType::BusinessManagement, TaskStatus::Implemented)
        .await
        .unwrap();

    assert!(!outcome.honored);
    let after = dashboard.snapshot().unwrap();
    let gap = after.gap(OpportunityType::BusinessManagement).unwrap();
    assert_eq!(gap.status, TaskStatus::InProgress);
    assert!(gap.marked_date.is_some());
    assert_eq!(after.progress_summary.tasks_in_progress, 2);
}

#[tokio::test]
async fn test_transition_during_revalidation_wins_over_late_fetch() {
    let (api, cache, handler) = setup();
    let dashboard = cache.subscribe(analysis("a-1"));
    dashboard.load().await.unwrap();

    let gate = api.gate_dashboard();
    let revalidation = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { dashboard.retry().await })
    };
    assert_eventually_async!(WAIT, async { api.dashboard_calls() == 2 });

    handler
        .update_status(&dashboard, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap();
    gate.notify_one();

    let settled = revalidation.await.unwrap().unwrap().unwrap();
    assert_eq!(
        settled.gap(OpportunityType::ValueCreation).unwrap().status,
        TaskStatus::InProgress
    );
    assert_eq!(
        dashboard.snapshot().unwrap().gap(OpportunityType::ValueCreation).unwrap().status,
        TaskStatus::InProgress
    );
    assert_eq!(cache.stats().discarded, 1);
}

#[tokio::test]
async fn test_handler_clock_stamps_marked_date() {
    let (api, cache, _) = setup();
    let clock = MockClock::new();
    clock.advance(std::time::Duration::from_secs(86_400));
    let handler = ProgressTransitionHandler::new(api.clone()).with_clock(clock);

    let dashboard = cache.subscribe(analysis("a-1"));
    dashboard.load().await.unwrap();
    handler
        .update_status(&dashboard, OpportunityType::ValueCreation, TaskStatus::InProgress)
        .await
        .unwrap();

    let stamped = dashboard.snapshot().unwrap();
    let marked = stamped.gap(OpportunityType::ValueCreation).unwrap().marked_date.unwrap();
    assert_eq!(marked.timestamp(), 86_400);
}
