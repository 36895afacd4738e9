//! Running container listing

use log::{debug, warn};

use crate::backend::ContainerBackend;
use crate::utils::ContainerRecord;

/// Running containers; a failing listing degrades to an empty one.
pub fn list_running_containers(backend: &dyn ContainerBackend) -> Vec<ContainerRecord> {
    match backend.list_containers() {
        Ok(containers) => containers,
        Err(e) => {
            warn!("could not list running containers: {}", e);
            Vec::new()
        }
    }
}

/// Parses `name<TAB>image` rows, dropping anything else.
pub fn parse_listing(out: &str) -> Vec<ContainerRecord> {
    out.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let row = parse_row(line);
            if row.is_none() {
                debug!("skipping malformed listing row {:?}", line);
            }
            row
        })
        .collect()
}

fn parse_row(line: &str) -> Option<ContainerRecord> {
    let (name, image) = line.trim_end_matches('\r').split_once('\t')?;
    let (name, image) = (name.trim(), image.trim());

    if name.is_empty() || image.is_empty() || image.contains(char::is_whitespace) {
        return None;
    }

    Some(ContainerRecord { name: name.to_string(), raw_image: image.to_string() })
}
