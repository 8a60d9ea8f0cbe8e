//! Trip-package interest matching.
//!
//! Score = 3 * name hits + 2 * category hits + 1 * description hits across
//! the interest vector; ties break toward the cheaper package.

use crate::domain::model::TripPackage;

/// Counts weighted case-insensitive substring hits for the interests.
pub fn match_score(package: &TripPackage, interests: &[String]) -> u32 {
    let name = package.name.to_lowercase();
    let category = package.category.to_lowercase();
    let description = package.description.to_lowercase();

    interests
        .iter()
        .map(|interest| {
            let needle = interest.trim().to_lowercase();
            if needle.is_empty() {
                return 0;
            }
            let mut score = 0;
            if name.contains(&needle) {
                score += 3;
            }
            if category.contains(&needle) {
                score += 2;
            }
            if description.contains(&needle) {
                score += 1;
            }
            score
        })
        .sum()
}

/// Ranks packages by score descending, then total cost ascending.
pub fn rank_packages(packages: Vec<TripPackage>, interests: &[String]) -> Vec<(TripPackage, u32)> {
    let mut scored: Vec<(TripPackage, u32)> = packages
        .into_iter()
        .map(|p| {
            let s = match_score(&p, interests);
            (p, s)
        })
        .collect();
    scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then(a.price.amount.cmp(&b.price.amount)));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;

    fn package(name: &str, category: &str, description: &str, price: &str) -> TripPackage {
        TripPackage {
            id: 0,
            code: "PKG001".to_string(),
            name: name.to_string(),
            destination: "Lisbon".to_string(),
            category: category.to_string(),
            description: description.to_string(),
            duration_days: 7,
            price: Money::new(price.parse().unwrap(), "USD"),
        }
    }

    fn interests(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hits_are_weighted_3_2_1() {
        let p = package("Beach Escape", "beach", "A relaxing beach holiday", "900");
        assert_eq!(match_score(&p, &interests(&["beach"])), 6);
        assert_eq!(match_score(&p, &interests(&["relaxing"])), 1);
        assert_eq!(match_score(&p, &interests(&["beach", "relaxing"])), 7);
    }

    #[test]
    fn unmatched_interests_score_zero() {
        let p = package("City Lights", "culture", "Museums and nightlife", "700");
        assert_eq!(match_score(&p, &interests(&["skiing"])), 0);
    }

    #[test]
    fn ties_break_toward_cheaper_package() {
        let cheap = package("Beach Escape", "beach", "sun", "800");
        let costly = package("Beach Retreat", "beach", "sun", "1200");
        let ranked = rank_packages(vec![costly.clone(), cheap.clone()], &interests(&["beach"]));
        assert_eq!(ranked[0].0.name, "Beach Escape");
        assert_eq!(ranked[0].1, ranked[1].1);
    }

    #[test]
    fn higher_score_outranks_lower_price() {
        let strong = package("Safari Adventure", "adventure", "wild safari", "2000");
        let weak = package("City Break", "culture", "cheap adventure add-on", "300");
        let ranked = rank_packages(vec![weak, strong], &interests(&["adventure"]));
        assert_eq!(ranked[0].0.name, "Safari Adventure");
    }
}
