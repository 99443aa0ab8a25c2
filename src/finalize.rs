// 🔢 Tree Finalizer - deterministic ordering
//
// Two sort points only: areas by natural (numeric-aware) ID, cities by
// locale-aware name. Buildings and units keep source-row order.

use crate::entities::Area;
use std::cmp::Ordering;

// ============================================================================
// COMPARATORS
// ============================================================================

/// Numeric-aware string ordering: "2" < "10", "AISP 9" < "AISP 10"
///
/// Digit runs compare by value, other characters case-insensitively. Strings
/// equal under that rule fall back to plain byte order so the result is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ord = cmp_digit_runs(&l_run, &r_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = fold_char(l).cmp(&fold_char(r));
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Locale-aware name ordering: accents and case are ignored first
/// ("Água Branca" sorts among the A's), then plain order breaks ties.
pub fn collate_cmp(a: &str, b: &str) -> Ordering {
    let left = a.chars().map(fold_char);
    let right = b.chars().map(fold_char);
    left.cmp(right).then_with(|| a.cmp(b))
}

/// Lower-case and strip Latin diacritics
fn fold_char(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

// ============================================================================
// FINALIZE
// ============================================================================

/// Apply the two ordering contracts. Both sorts are stable.
pub fn finalize(mut areas: Vec<Area>) -> Vec<Area> {
    areas.sort_by(|a, b| natural_cmp(&a.id, &b.id));

    for area in &mut areas {
        area.cities.sort_by(|a, b| collate_cmp(&a.name, &b.name));
    }

    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Building, City};

    fn area(id: &str, cities: &[&str]) -> Area {
        let mut a = Area::new(id.into(), format!("AISP {}", id), String::new(), String::new());
        for name in cities {
            a.cities.push(City::new(name.to_string()));
        }
        a
    }

    #[test]
    fn test_natural_cmp_numbers() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
        assert_eq!(natural_cmp("AISP 9", "AISP 10"), Ordering::Less);
        assert_eq!(natural_cmp("1A", "1b"), Ordering::Less);
    }

    #[test]
    fn test_natural_cmp_is_total() {
        assert_eq!(natural_cmp("01", "1"), Ordering::Less);
        assert_eq!(natural_cmp("1", "01"), Ordering::Greater);
        assert_eq!(natural_cmp("7", "7"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_text_after_numbers() {
        let mut ids = vec!["No Area", "12", "3"];
        ids.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(ids, vec!["3", "12", "No Area"]);
    }

    #[test]
    fn test_collate_ignores_accents_and_case() {
        let mut names = vec!["Picos", "Água Branca", "teresina", "Altos", "Parnaíba"];
        names.sort_by(|a, b| collate_cmp(a, b));
        assert_eq!(names, vec!["Água Branca", "Altos", "Parnaíba", "Picos", "teresina"]);
    }

    #[test]
    fn test_areas_sorted_numerically() {
        let areas = finalize(vec![area("10", &[]), area("2", &[]), area("1", &[])]);
        let ids: Vec<&str> = areas.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_cities_sorted_within_area() {
        let areas = finalize(vec![area("1", &["Zeta", "Alpha"])]);
        let names: Vec<&str> = areas[0].cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_buildings_keep_insertion_order() {
        let mut a = area("1", &["Teresina"]);
        a.cities[0].buildings.push(Building::new("Zulu".into(), "Teresina".into()));
        a.cities[0].buildings.push(Building::new("Alfa".into(), "Teresina".into()));

        let areas = finalize(vec![a]);
        let names: Vec<&str> = areas[0].cities[0]
            .buildings
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zulu", "Alfa"]);
    }
}
