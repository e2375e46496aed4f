//! Generate human-readable explanations for match results.

use super::MatchDetail;

/// Generate a human-readable explanation from match details.
pub fn generate_explanation(details: &[MatchDetail]) -> String {
    if details.is_empty() {
        return "Possible match".to_string();
    }

    let mut parts = Vec::new();

    for detail in details {
        let part = match detail {
            MatchDetail::SkillsSatisfied { skills } => {
                if skills.len() == 1 {
                    format!("You have the required skill: {}", skills[0])
                } else {
                    format!("You have the required skills: {}", skills.join(", "))
                }
            }
            MatchDetail::SkillsMissing { skills } => format!("Missing: {}", skills.join(", ")),
            MatchDetail::MandatorySkillMissing { skills } => {
                format!("Requires {}", skills.join(", "))
            }
            MatchDetail::SimilarSkill {
                required, owned, ..
            } => format!("Your skill \"{}\" is close to \"{}\"", owned, required),
            MatchDetail::SkillLevel { level } => format!("Skill level: {}", level.label()),
            MatchDetail::WithinRange { distance_km } => format_distance(*distance_km),
            MatchDetail::OutOfRange {
                distance_km,
                max_km,
            } => format!(
                "{} away, beyond your {:.0} km radius",
                format_km(*distance_km),
                max_km
            ),
            MatchDetail::LocationUnknown => "Distance unknown".to_string(),
            MatchDetail::BudgetFits { budget } => format!("Budget: {:.0} credits", budget),
            MatchDetail::BudgetBelowMinimum { budget, minimum } => format!(
                "Budget {:.0} credits is under your minimum of {:.0}",
                budget, minimum
            ),
            MatchDetail::AvailableNow => "You are available now".to_string(),
            MatchDetail::Unavailable => "You are marked unavailable".to_string(),
            MatchDetail::UrgentTask => "Urgent request".to_string(),
            MatchDetail::PreferredCategory { category } => {
                format!("In your preferred category: {}", category)
            }
            MatchDetail::TrustedHelper { level } => {
                format!("Trusted helper ({})", level.label())
            }
        };
        parts.push(part);
    }

    parts.join("; ")
}

/// Format a distance as "Nearby" or "X away".
fn format_distance(distance_km: f64) -> String {
    if distance_km < 0.5 {
        "Nearby".to_string()
    } else {
        format!("{} away", format_km(distance_km))
    }
}

fn format_km(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{:.0} m", distance_km * 1000.0)
    } else {
        format!("{:.1} km", distance_km)
    }
}

/// Generate a one-line summary of a batch of matches.
pub fn summarize_matches(count: usize, has_location: bool, has_skills: bool) -> String {
    let mut parts = Vec::new();

    parts.push(format!("Found {} matches", count));

    if has_location {
        parts.push("ranked by distance".to_string());
    }

    if has_skills {
        parts.push("matched to your skills".to_string());
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{SkillLevel, TrustLevel};

    #[test]
    fn test_empty_details() {
        assert_eq!(generate_explanation(&[]), "Possible match");
    }

    #[test]
    fn test_single_skill() {
        let details = vec![MatchDetail::SkillsSatisfied {
            skills: vec!["Jardinage".to_string()],
        }];
        assert_eq!(
            generate_explanation(&details),
            "You have the required skill: Jardinage"
        );
    }

    #[test]
    fn test_multiple_details_joined() {
        let details = vec![
            MatchDetail::SkillsSatisfied {
                skills: vec!["Jardinage".to_string(), "Bricolage".to_string()],
            },
            MatchDetail::WithinRange { distance_km: 0.09 },
            MatchDetail::SkillLevel {
                level: SkillLevel::Expert,
            },
        ];
        assert_eq!(
            generate_explanation(&details),
            "You have the required skills: Jardinage, Bricolage; Nearby; Skill level: expert"
        );
    }

    #[test]
    fn test_distance_formatting() {
        assert_eq!(format_distance(0.2), "Nearby");
        assert_eq!(format_distance(0.75), "750 m away");
        assert_eq!(format_distance(3.26), "3.3 km away");
    }

    #[test]
    fn test_out_of_range() {
        let details = vec![MatchDetail::OutOfRange {
            distance_km: 392.4,
            max_km: 10.0,
        }];
        assert_eq!(
            generate_explanation(&details),
            "392.4 km away, beyond your 10 km radius"
        );
    }

    #[test]
    fn test_trusted_helper() {
        let details = vec![MatchDetail::TrustedHelper {
            level: TrustLevel::Ambassador,
        }];
        assert_eq!(generate_explanation(&details), "Trusted helper (ambassador)");
    }

    #[test]
    fn test_summarize() {
        assert_eq!(
            summarize_matches(5, true, true),
            "Found 5 matches, ranked by distance, matched to your skills"
        );
        assert_eq!(summarize_matches(3, false, false), "Found 3 matches");
    }
}
