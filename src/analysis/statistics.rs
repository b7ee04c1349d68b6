use std::collections::BTreeMap;

use crate::model::{CategoryStats, SpaceRecord, SpaceStatistics, SpaceTypeStats};

/// Rounds to `places` decimals; exact ties go to the even digit, so 12.25
/// becomes 12.2.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Case-insensitive keyword match against the space name or type.
#[must_use]
pub fn is_circulation(space: &SpaceRecord, keywords: &[String]) -> bool {
    let name = space.name.to_lowercase();
    let space_type = space.space_type.to_lowercase();
    keywords.iter().any(|keyword| {
        let keyword = keyword.to_lowercase();
        name.contains(&keyword) || space_type.contains(&keyword)
    })
}

/// Totals, per-type grouping and the circulation/program split.
///
/// Sums run at full precision; only the reported figures are rounded
/// (areas and volumes to 2 decimals, percentages to 1).
#[must_use]
pub fn summarize(spaces: &[SpaceRecord], circulation_keywords: &[String]) -> SpaceStatistics {
    let total_area: f64 = spaces.iter().map(|s| s.area).sum();
    let total_volume: f64 = spaces.iter().map(|s| s.volume).sum();
    let average_height = if spaces.is_empty() {
        0.0
    } else {
        spaces.iter().map(|s| s.height).sum::<f64>() / spaces.len() as f64
    };

    let mut grouped: BTreeMap<String, (usize, f64, Vec<String>)> = BTreeMap::new();
    for space in spaces {
        let entry = grouped.entry(space.space_type.clone()).or_default();
        entry.0 += 1;
        entry.1 += space.area;
        entry.2.push(space.name.clone());
    }
    let space_types = grouped
        .into_iter()
        .map(|(space_type, (count, area, names))| {
            (
                space_type,
                SpaceTypeStats {
                    count,
                    total_area: round_to(area, 2),
                    spaces: names,
                },
            )
        })
        .collect();

    let (circulation, program): (Vec<&SpaceRecord>, Vec<&SpaceRecord>) = spaces
        .iter()
        .partition(|space| is_circulation(space, circulation_keywords));

    SpaceStatistics {
        total_area: round_to(total_area, 2),
        total_volume: round_to(total_volume, 2),
        average_height: round_to(average_height, 2),
        space_types,
        circulation: category(&circulation, total_area),
        program: category(&program, total_area),
    }
}

fn category(spaces: &[&SpaceRecord], total_area: f64) -> CategoryStats {
    let area: f64 = spaces.iter().map(|s| s.area).sum();
    let percentage = if total_area > 0.0 {
        round_to(area / total_area * 100.0, 1)
    } else {
        0.0
    };
    CategoryStats {
        count: spaces.len(),
        area: round_to(area, 2),
        percentage,
    }
}
