use devradar_model::{Dev, GeoRegion};
use devradar_session::ProfileLink;

/// One line per dev: name, id, techs, position and profile link if known.
/// Devs outside `view` (pushes keep arriving after the map moves) are marked.
pub fn dev_line(dev: &Dev, view: Option<&GeoRegion>) -> String {
    let at = dev.coordinates();
    let mut line = format!(
        "{} ({}) [{}] at {:.4},{:.4}",
        dev.display_name,
        dev.id,
        dev.tags_label(),
        at.latitude,
        at.longitude
    );
    if view.is_some_and(|region| !region.contains(at)) {
        line.push_str(" (outside view)");
    }
    if let Some(link) = ProfileLink::for_dev(dev) {
        line.push_str("  ");
        line.push_str(&link.url);
    }
    line
}

pub fn dev_json(dev: &Dev) -> anyhow::Result<String> {
    Ok(serde_json::to_string(dev)?)
}

pub fn devs_json(devs: &[Dev]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(devs)?)
}
