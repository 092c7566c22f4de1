//! `GetOutputPath`/`GetLogPath`: deterministic paths under `base_path`.

use crate::command::CatalogConfig;

pub fn get_output_path(config: &CatalogConfig, job_id: &str) -> String {
    format!("{}/{}.json", config.base_path.trim_end_matches('/'), job_id)
}

pub fn get_log_path(config: &CatalogConfig, job_id: &str) -> String {
    format!("{}/{}.log", config.base_path.trim_end_matches('/'), job_id)
}
