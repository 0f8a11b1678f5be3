//! Channel categorization

use super::snapshot::CategoryMap;
use crate::types::{Channel, Server};

/// Partition a channel list into display categories.
///
/// With a server, channels belonging to it are bucketed by their category
/// label in first-seen order; channels without a label are left out. Without
/// a server, the whole list goes under `direct_messages_label` unchanged.
pub fn group_channels(
    channels: Vec<Channel>,
    server: Option<&Server>,
    direct_messages_label: &str,
) -> CategoryMap {
    let mut grouped = CategoryMap::new();

    let Some(server) = server else {
        grouped.insert(direct_messages_label, channels);
        return grouped;
    };

    let mut categories: Vec<&str> = Vec::new();
    for channel in channels.iter().filter(|c| c.belongs_to(&server.name)) {
        if let Some(category) = channel.data.category_label() {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
    }

    for category in categories {
        let members: Vec<Channel> = channels
            .iter()
            .filter(|c| c.belongs_to(&server.name) && c.data.category_label() == Some(category))
            .cloned()
            .collect();
        grouped.insert(category, members);
    }

    grouped
}
