//! Subcommands of the `cadence` binary.

pub mod defaults;
pub mod jitter;
pub mod resolve;

use cadence_core::resources::ResourceList;

/// `cpu=200m memory=1Gi`, or `-` when nothing is set.
pub(crate) fn format_group(group: Option<&ResourceList>) -> String {
    let Some(group) = group else {
        return "-".to_string();
    };

    let parts: Vec<String> = [("cpu", group.cpu.as_ref()), ("memory", group.memory.as_ref())]
        .into_iter()
        .filter_map(|(name, quantity)| quantity.map(|q| format!("{}={}", name, q)))
        .collect();

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_group() {
        assert_eq!(format_group(None), "-");
        assert_eq!(format_group(Some(&ResourceList::default())), "-");

        let group = ResourceList {
            cpu: Some("200m".parse().unwrap()),
            memory: Some("1Gi".parse().unwrap()),
        };
        assert_eq!(format_group(Some(&group)), "cpu=200m memory=1Gi");
    }
}
