//! Deterministic hyphy command-line construction (`GetCommand`).

use std::path::Path;

use crate::method_tag::MethodTag;
use crate::request::MethodRequestView;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub hyphy_path: String,
    pub data_dir: String,
    pub base_path: String,
}

/// Prefixes `path` with `data_dir` unless it is already absolute.
fn resolve_path(data_dir: &str, path: &str) -> String {
    if Path::new(path).is_absolute() {
        path.to_string()
    } else {
        format!("{}/{}", data_dir.trim_end_matches('/'), path)
    }
}

/// Builds the command line deterministically: same `(tag, view, config)`
/// always yields the same string, and flags appear only when their field
/// is non-default.
pub fn get_command(config: &CatalogConfig, tag: MethodTag, view: &dyn MethodRequestView) -> String {
    let mut parts = vec![config.hyphy_path.clone(), tag.as_str().to_string()];

    if !tag.is_tree_only() {
        if let Some(alignment) = view.alignment() {
            if !alignment.is_empty() {
                parts.push("--alignment".to_string());
                parts.push(resolve_path(&config.data_dir, alignment));
            }
        }
    }

    if let Some(tree) = view.tree() {
        if !tree.is_empty() {
            parts.push("--tree".to_string());
            parts.push(resolve_path(&config.data_dir, tree));
        }
    }

    if !view.branches().is_empty() {
        parts.push("--branches".to_string());
        parts.push(view.branches().join(","));
    }

    if let Some(ci) = view.ci() {
        if !ci.is_empty() {
            parts.push("--ci".to_string());
            parts.push(ci.to_string());
        }
    }

    if let Some(srv) = view.srv() {
        if !srv.is_empty() {
            parts.push("--srv".to_string());
            parts.push(srv.to_string());
        }
    }

    if let Some(genetic_code) = view.genetic_code() {
        if !genetic_code.is_empty() {
            parts.push("--genetic_code".to_string());
            parts.push(genetic_code.to_string());
        }
    }

    if let Some(rates) = view.rates() {
        if rates != 0 {
            parts.push("--rates".to_string());
            parts.push(rates.to_string());
        }
    }

    if let Some(syn_rates) = view.syn_rates() {
        if syn_rates != 0 {
            parts.push("--syn_rates".to_string());
            parts.push(syn_rates.to_string());
        }
    }

    if let Some(grid_size) = view.grid_size() {
        if grid_size != 0 {
            parts.push("--grid_size".to_string());
            parts.push(grid_size.to_string());
        }
    }

    if let Some(starting_points) = view.starting_points() {
        if starting_points != 0 {
            parts.push("--starting_points".to_string());
            parts.push(starting_points.to_string());
        }
    }

    if let Some(samples) = view.samples() {
        if samples != 0 {
            parts.push("--samples".to_string());
            parts.push(samples.to_string());
        }
    }

    if let Some(resample) = view.resample() {
        if resample != 0 {
            parts.push("--resample".to_string());
            parts.push(resample.to_string());
        }
    }

    parts.join(" ")
}
