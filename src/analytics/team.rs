use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::assessment::{CategoryAssessment, Tier};
use super::category::Category;
use crate::db::models::Team;

/// A category the team is losing ground in, with its (negative) gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementPriority {
    pub category: Category,
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    pub category: Category,
    pub tier: Tier,
}

/// Full category-by-category analysis of one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalysisResult {
    pub team_id: i64,
    pub team_name: String,
    /// Most weeks played in any single category
    pub weeks_analyzed: usize,
    pub assessments: BTreeMap<Category, CategoryAssessment>,
    /// Worst gap first
    pub improvement_priorities: Vec<ImprovementPriority>,
    /// Dominant before strong, display order within each
    pub strengths: Vec<Strength>,
}

impl TeamAnalysisResult {
    pub fn from_assessments(team: &Team, assessments: BTreeMap<Category, CategoryAssessment>) -> Self {
        let weeks_analyzed = assessments
            .values()
            .map(|a| a.weeks_played)
            .max()
            .unwrap_or(0);

        TeamAnalysisResult {
            team_id: team.team_id,
            team_name: team.name.clone(),
            weeks_analyzed,
            improvement_priorities: improvement_priorities(&assessments),
            strengths: strengths(&assessments),
            assessments,
        }
    }
}

/// Categories below the median winning value, most negative gap first.
pub fn improvement_priorities(
    assessments: &BTreeMap<Category, CategoryAssessment>,
) -> Vec<ImprovementPriority> {
    let mut priorities: Vec<ImprovementPriority> = assessments
        .values()
        .filter(|a| a.tier != Tier::NoData && a.gap < 0.0)
        .map(|a| ImprovementPriority {
            category: a.category,
            gap: a.gap,
        })
        .collect();
    priorities.sort_by(|a, b| a.gap.total_cmp(&b.gap));
    priorities
}

/// Strong and dominant categories, dominant first.
pub fn strengths(assessments: &BTreeMap<Category, CategoryAssessment>) -> Vec<Strength> {
    let mut strengths: Vec<Strength> = assessments
        .values()
        .filter(|a| a.tier.is_strength())
        .map(|a| Strength {
            category: a.category,
            tier: a.tier,
        })
        .collect();
    // Stable sort keeps display order within each tier.
    strengths.sort_by_key(|s| s.tier);
    strengths
}
