//! The sampling driver: discovers a stable dependency set for a keyed table
//! and reduces it to a list of normalization groups.
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::columns::ColumnSet;
use crate::dep_graph::DependencyTree;
use crate::deps::DependencySet;
use crate::table::Table;

/// One candidate decomposed sub-table: a key, the additional columns that
/// depend on it, and the key of the parent table it nests under. Groups come
/// out in depth-first order, top table first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizationGroup {
    /// The determinant subset that keys this sub-table
    pub key: ColumnSet,
    /// The dependent columns stored alongside the key, sorted by name
    pub columns: Vec<String>,
    /// The parent group's key; `None` for the top-level group
    pub parent_key: Option<ColumnSet>,
}

impl NormalizationGroup {
    pub fn new(key: ColumnSet, columns: Vec<String>, parent_key: Option<ColumnSet>) -> Self {
        Self {
            key,
            columns,
            parent_key,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("key column {0:?} was not found in the table")]
    UnknownKeyColumn(String),
    #[error("key column {0:?} does not uniquely identify every row")]
    MalformedKey(String),
    #[error("the table has no rows to analyze")]
    EmptyTable,
}

/// Tunable constants for the iterative sampling loop: 1000-row samples,
/// four consecutive stable rounds, and one full-table pass for tables under
/// ten samples' worth of rows by default.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Rows drawn per sampling round
    pub sample_size: usize,
    /// Consecutive unchanged rounds required before the set is called stable
    pub stable_rounds: usize,
    /// Hard cap on sampling rounds; guarantees termination even when the
    /// dependency set never stabilizes
    pub max_rounds: usize,
    /// Tables with fewer than `sample_size * full_pass_factor` rows are
    /// analyzed in a single full-table pass
    pub full_pass_factor: usize,
    /// Fixed RNG seed for reproducible sampling
    pub seed: Option<u64>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            stable_rounds: 4,
            max_rounds: 100,
            full_pass_factor: 10,
            seed: None,
        }
    }
}

/// Discover the functional dependencies of `table`, keyed by `key_column`,
/// and emit the normalization groups of the simplified dependency tree.
///
/// Large tables are analyzed by repeated random sampling until the
/// dependency set survives [`NormalizeConfig::stable_rounds`] consecutive
/// re-analyses unchanged; when [`NormalizeConfig::max_rounds`] is exhausted
/// first, the last-computed set is used as-is since a partial normalization
/// is still useful.
pub fn normalize(
    table: &Table,
    key_column: &str,
    config: &NormalizeConfig,
) -> Result<Vec<NormalizationGroup>, NormalizeError> {
    if table.is_empty() {
        return Err(NormalizeError::EmptyTable);
    }
    match table.is_unique(key_column) {
        None => return Err(NormalizeError::UnknownKeyColumn(key_column.to_string())),
        Some(false) => return Err(NormalizeError::MalformedKey(key_column.to_string())),
        Some(true) => {}
    }

    let deps = discover_dependencies(table, config);
    tracing::debug!("stable dependency set:\n{deps}");

    let mut tree = DependencyTree::new();
    tree.build(&deps);
    tree.collapse_roots();
    tree.make_single_parent();
    tree.subsumes_children();

    let key = ColumnSet::single(key_column);
    let mut groups = tree.normalization_groups(Some(&key));
    if groups.is_empty() {
        // no usable dependency structure: everything stays in one table
        groups.push(NormalizationGroup::new(key.clone(), Vec::new(), None));
    }
    append_uncovered_columns(table, &mut groups);
    Ok(groups)
}

fn discover_dependencies(table: &Table, config: &NormalizeConfig) -> DependencySet {
    let mut deps = DependencySet::new(true);
    if table.len() < config.sample_size * config.full_pass_factor {
        deps.analyze(table);
        return deps;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut stable_seen = 0usize;
    for round in 1..=config.max_rounds {
        let sample = table.sample(config.sample_size, &mut rng);
        if deps.analyze(&sample) {
            stable_seen += 1;
            tracing::debug!(
                "round {round}: {} dependencies, stable for {stable_seen} rounds",
                deps.len()
            );
            if stable_seen >= config.stable_rounds {
                return deps;
            }
        } else {
            stable_seen = 0;
            tracing::debug!("round {round}: dependency set changed, {} remain", deps.len());
        }
    }
    tracing::warn!(
        "dependency set did not stabilize within {} rounds; using the last-computed set",
        config.max_rounds
    );
    deps
}

/// Sampling can leave a column outside every surviving dependency; tack the
/// stragglers onto the top-level group so the groups always span the table.
fn append_uncovered_columns(table: &Table, groups: &mut [NormalizationGroup]) {
    let Some(top) = groups.iter().position(|g| g.parent_key.is_none()) else {
        return;
    };
    let mut missing: Vec<String> = table
        .column_names()
        .filter(|&name| {
            !groups.iter().any(|g| {
                g.key.contains(name) || g.columns.iter().any(|c| c.as_str() == name)
            })
        })
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        tracing::debug!("appending uncovered columns to the top group: {missing:?}");
        groups[top].columns.append(&mut missing);
        groups[top].columns.sort();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cnset(names: &[&str]) -> ColumnSet {
        names.iter().copied().collect()
    }

    fn zip_rows(n: usize) -> Vec<Vec<String>> {
        // zip determines city and state; ids are unique
        (0..n)
            .map(|i| {
                let zip = i % 40;
                vec![
                    format!("{i}"),
                    format!("z{zip}"),
                    format!("c{}", zip % 17),
                    format!("s{}", zip % 5),
                ]
            })
            .collect()
    }

    fn zip_table(n: usize) -> Table {
        Table::from_rows(vec!["id", "zip", "city", "state"], zip_rows(n)).unwrap()
    }

    #[test]
    fn test_simple_fd_chain() {
        let groups = normalize(&zip_table(200), "id", &NormalizeConfig::default()).unwrap();
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].key, cnset(&["id"]));
        assert_eq!(groups[0].columns, vec!["zip".to_string()]);
        assert!(groups[0].parent_key.is_none());

        assert_eq!(groups[1].key, cnset(&["zip"]));
        assert_eq!(
            groups[1].columns,
            vec!["city".to_string(), "state".to_string()]
        );
        assert_eq!(groups[1].parent_key.as_ref(), Some(&cnset(&["id"])));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let table = Table::from_rows(
            vec!["id", "v"],
            vec![vec!["1", "x"], vec!["1", "y"], vec!["2", "z"]],
        )
        .unwrap();
        let err = normalize(&table, "id", &NormalizeConfig::default()).unwrap_err();
        assert_eq!(err, NormalizeError::MalformedKey("id".to_string()));
    }

    #[test]
    fn test_unknown_key_column() {
        let err = normalize(&zip_table(10), "missing", &NormalizeConfig::default()).unwrap_err();
        assert_eq!(err, NormalizeError::UnknownKeyColumn("missing".to_string()));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_rows(vec!["id"], Vec::<Vec<String>>::new()).unwrap();
        let err = normalize(&table, "id", &NormalizeConfig::default()).unwrap_err();
        assert_eq!(err, NormalizeError::EmptyTable);
    }

    #[test]
    fn test_sampling_loop_converges() {
        let config = NormalizeConfig {
            sample_size: 100,
            full_pass_factor: 10,
            seed: Some(7),
            ..Default::default()
        };
        // 2000 rows forces the iterative sampling path
        let groups = normalize(&zip_table(2000), "id", &config).unwrap();
        assert_eq!(groups[0].key, cnset(&["id"]));
        let zip_group = groups
            .iter()
            .find(|g| g.key == cnset(&["zip"]))
            .expect("zip group");
        assert!(zip_group.columns.contains(&"city".to_string()));
        assert!(zip_group.columns.contains(&"state".to_string()));
    }

    #[test]
    fn test_round_cap_falls_back_to_last_set() {
        let config = NormalizeConfig {
            sample_size: 100,
            full_pass_factor: 10,
            stable_rounds: 4,
            max_rounds: 1,
            seed: Some(11),
            ..Default::default()
        };
        // one round can never satisfy four stable rounds, but normalization
        // still completes with the last-computed dependency set
        let groups = normalize(&zip_table(2000), "id", &config).unwrap();
        assert!(!groups.is_empty());
        assert_eq!(groups[0].key, cnset(&["id"]));
    }
}
