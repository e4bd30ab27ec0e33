use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::data::document::CanonicalDocument;
use crate::errors::Result;
use crate::store::{DocumentSink, GroupCount, MemoryStore};

use super::{remove_if_exists, shape_osm, write_json_pretty, Etl};

pub const ETL_NAME: &str = "stats";
pub const OUTPUT_FILE_NAME: &str = "stats.json";

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct ContributorStats {
    pub unique_users: usize,
    pub total_contributions: usize,
    pub top_users: Vec<GroupCount>,
    /// Percentage of all contributions made by the ten most active users.
    pub top_10_share: f64,
    /// Percentage of all contributions made by the least active 90% of users.
    pub bottom_90_share: f64,
    pub single_contribution_users: usize,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct Stats {
    pub documents: usize,
    pub nodes: usize,
    pub ways: usize,
    pub contributors: ContributorStats,
    pub distinct_amenities: usize,
    pub top_amenities: Vec<GroupCount>,
    pub cuisines: Vec<GroupCount>,
    pub highways: Vec<GroupCount>,
    pub cities: Vec<GroupCount>,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

pub fn contributor_stats(users: Vec<GroupCount>) -> ContributorStats {
    let contributions: Vec<usize> = users.iter().map(|user| user.count).collect();
    let total = contributions.iter().sum();
    let bottom_start = contributions.len() / 10 + 1;

    ContributorStats {
        unique_users: contributions.len(),
        total_contributions: total,
        top_10_share: percentage(contributions.iter().take(10).sum(), total),
        bottom_90_share: percentage(contributions.iter().skip(bottom_start).sum(), total),
        single_contribution_users: contributions.iter().filter(|count| **count == 1).count(),
        top_users: users.into_iter().take(5).collect(),
    }
}

pub fn collect_stats(store: &MemoryStore) -> Stats {
    let amenities = store.group_count("amenity");
    Stats {
        documents: store.count(),
        nodes: store.count_where("type", "node"),
        ways: store.count_where("type", "way"),
        contributors: contributor_stats(store.group_count("created.user")),
        distinct_amenities: amenities.len(),
        top_amenities: amenities.into_iter().take(10).collect(),
        cuisines: store.group_count("cuisine"),
        highways: store.group_count("highway"),
        cities: store.group_count("address.city"),
    }
}

/// Loads the exported documents into a document store and runs the summary queries.
#[derive(Default)]
pub struct StatsEtl {
    store: MemoryStore,
}

impl StatsEtl {
    fn output_path(dir: &Path) -> PathBuf {
        dir.join(OUTPUT_FILE_NAME)
    }

    pub fn new() -> StatsEtl {
        StatsEtl::default()
    }
}

impl Etl for StatsEtl {
    type Input = Vec<CanonicalDocument>;
    type Output = Stats;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(Self::output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        remove_if_exists(&Self::output_path(dir))
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        shape_osm::read_documents(&shape_osm::documents_path(dir))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        self.store.drop_all();
        for document in tqdm::tqdm(input.iter()) {
            self.store.insert_one(document)?;
        }
        Ok(collect_stats(&self.store))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        info!(
            etl_name = ETL_NAME,
            documents = output.documents,
            nodes = output.nodes,
            ways = output.ways,
            unique_users = output.contributors.unique_users;
            "Collected statistics"
        );
        write_json_pretty(&Self::output_path(dir), &output)
    }
}
