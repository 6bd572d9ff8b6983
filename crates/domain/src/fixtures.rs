//! Sample snapshots for tests in this and downstream crates
//!
//! Enabled with the `test-fixtures` feature.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use chrono::{DateTime, Duration, Utc};

use crate::types::{
    AnalysisId, Badge, BadgeType, DashboardData, Gap, IdentityA1, MetricsSummary,
    OpportunityType, ProgressSummary, RecommendationData, ScoreA2, TaskStatus,
};

/// Fixed instant the samples are stamped with (2025-01-15T09:00:00Z)
pub fn sample_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_736_931_600)
}

pub fn sample_gap(opportunity: OpportunityType, status: TaskStatus) -> Gap {
    let (hours_per_week, summary, complexity, tool) = match opportunity {
        OpportunityType::DigitalPresence => {
            (2.0, "Website is not updated and has no booking flow", 3, "Website builder")
        }
        OpportunityType::ValueCreation => {
            (5.0, "Quotes are written by hand for every customer", 5, "Quote automation")
        }
        OpportunityType::BusinessManagement => {
            (3.5, "Invoices are chased manually each month", 2, "Accounting automation")
        }
    };

    Gap {
        opportunity_type: opportunity,
        hours_per_week,
        hours_per_year: hours_per_week * 48.0,
        problem_summary: summary.to_owned(),
        complexity,
        tool_hint: tool.to_owned(),
        status,
        marked_date: (status != TaskStatus::NotStarted).then(sample_time),
    }
}

pub fn sample_badge(badge_type: BadgeType, earned: bool) -> Badge {
    let (name, icon) = match badge_type {
        BadgeType::FirstStep => ("First Step", "🚀"),
        BadgeType::Momentum => ("Momentum", "🔥"),
        BadgeType::QuickWin => ("Quick Win", "⚡"),
        BadgeType::DigitalPioneer => ("Digital Pioneer", "🌐"),
        BadgeType::AiChampion => ("AI Champion", "🏆"),
    };

    Badge {
        badge_type,
        name: name.to_owned(),
        description: format!("Awarded for {name}"),
        icon: icon.to_owned(),
        earned_at: earned.then(sample_time),
    }
}

/// Dashboard with digital presence in progress, the other gaps not started,
/// and only the first-step badge earned
pub fn sample_dashboard(id: &str) -> DashboardData {
    let gaps = vec![
        sample_gap(OpportunityType::DigitalPresence, TaskStatus::InProgress),
        sample_gap(OpportunityType::ValueCreation, TaskStatus::NotStarted),
        sample_gap(OpportunityType::BusinessManagement, TaskStatus::NotStarted),
    ];
    let progress_summary = ProgressSummary::from_statuses(gaps.iter().map(|gap| gap.status));

    DashboardData {
        analysis_id: AnalysisId::new(id).expect("sample analysis id must not be blank"),
        identity_a1: IdentityA1 {
            company_name: "Bakkerij de Vries".to_owned(),
            industry: Some("Food & Beverage".to_owned()),
            employee_range: Some("10-49".to_owned()),
            location: Some("Utrecht".to_owned()),
            website: Some("https://bakkerijdevries.example".to_owned()),
        },
        score_a2: ScoreA2 {
            digital_presence: 42.5,
            value_creation: 61.0,
            business_management: 55.25,
            overall: 52.9,
        },
        top_3_gaps: gaps,
        progress_summary,
        metrics_summary: MetricsSummary {
            potential_hours_per_week: 10.5,
            potential_hours_per_year: 504.0,
            actual_hours_saved_per_week: 0.0,
            actual_hours_saved_per_year: 0.0,
            estimated_money_value: None,
        },
        badges: BadgeType::ALL
            .into_iter()
            .map(|badge_type| sample_badge(badge_type, badge_type == BadgeType::FirstStep))
            .collect(),
    }
}

pub fn sample_recommendation(opportunity: OpportunityType) -> RecommendationData {
    RecommendationData {
        next_task: sample_gap(opportunity, TaskStatus::NotStarted),
        reasoning: format!("{opportunity} has the best payoff for its complexity"),
        priority_score: 8.5,
    }
}
