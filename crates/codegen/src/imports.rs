//! Import resolution for linked packaging.
//!
//! For one destination unit, the externally-homed names it references are
//! grouped by home unit. A home unit contributing more distinct names than
//! the configured threshold is imported wholesale; otherwise the names are
//! listed explicitly, in first-referenced order. Home units themselves
//! appear in first-referenced order, one import statement per home.

use std::collections::BTreeMap;

/// Render the import statements for a destination unit.
///
/// `references` are `(home unit, name)` pairs in first-referenced order,
/// already deduplicated by name.
pub fn import_lines(references: &[(String, String)], threshold: usize) -> Vec<String> {
    let mut home_order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (home, name) in references {
        let group = groups.entry(home).or_default();
        if group.is_empty() {
            home_order.push(home);
        }
        group.push(name);
    }

    home_order
        .into_iter()
        .map(|home| {
            let names = &groups[home];
            if names.len() > threshold {
                format!("import * from '{}'", home)
            } else {
                format!("import {{ {} }} from '{}'", names.join(", "), home)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(h, n)| (h.to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn test_named_list_at_threshold() {
        let lines = import_lines(
            &refs(&[
                ("people", "IPerson"),
                ("people", "IJob"),
                ("people", "IAddress"),
                ("people", "ITeam"),
            ]),
            4,
        );
        assert_eq!(
            lines,
            vec!["import { IPerson, IJob, IAddress, ITeam } from 'people'"]
        );
    }

    #[test]
    fn test_wildcard_above_threshold() {
        let lines = import_lines(
            &refs(&[
                ("people", "IPerson"),
                ("people", "IJob"),
                ("people", "IAddress"),
                ("people", "ITeam"),
                ("people", "IRole"),
            ]),
            4,
        );
        assert_eq!(lines, vec!["import * from 'people'"]);
    }

    #[test]
    fn test_one_statement_per_home_in_first_referenced_order() {
        let lines = import_lines(
            &refs(&[("zoo", "IAnimal"), ("aqua", "IFish"), ("zoo", "ICage")]),
            4,
        );
        assert_eq!(
            lines,
            vec![
                "import { IAnimal, ICage } from 'zoo'",
                "import { IFish } from 'aqua'",
            ]
        );
    }

    #[test]
    fn test_no_references_no_lines() {
        assert!(import_lines(&[], 4).is_empty());
    }
}
