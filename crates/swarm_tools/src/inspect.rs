//! Tech tree listing and offline tick replay.

use std::path::Path;

use ron::ser::PrettyConfig;
use swarm_core::catalog::Catalog;
use swarm_core::command::Request;
use swarm_core::context::TickReport;
use swarm_core::error::Rejection;
use swarm_core::orchestrator::SwarmBot;
use swarm_core::sink::CommandSink;
use swarm_core::snapshot::WorldSnapshot;
use tracing::info;

use crate::error::{Result, ToolError};

/// One line per tech node, prerequisite-first.
///
/// ```text
///  3. SpawningPool       200m   0g  TechTree   Perimeter(Townhall)  <- Hatchery
/// ```
#[must_use]
pub fn tech_order(catalog: &Catalog) -> Vec<String> {
    catalog
        .nodes_in_order()
        .enumerate()
        .map(|(index, node)| {
            let requires = node
                .prerequisites
                .iter()
                .map(|p| format!("{p:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            let mut line = format!(
                "{:>2}. {:<18} {:>4}m {:>4}g  {:<10} {:?}",
                index + 1,
                format!("{:?}", node.structure),
                node.cost.minerals,
                node.cost.vespene,
                format!("{:?}", node.owner),
                node.placement,
            );
            if !requires.is_empty() {
                line.push_str("  <- ");
                line.push_str(&requires);
            }
            line
        })
        .collect()
}

/// Accepts every request and logs it; nothing is executed.
#[derive(Debug, Default)]
pub struct DryRunSink {
    accepted: usize,
}

impl DryRunSink {
    /// Requests accepted so far.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl CommandSink for DryRunSink {
    fn submit(&mut self, request: &Request) -> std::result::Result<(), Rejection> {
        self.accepted += 1;
        info!(actor = request.actor, action = ?request.action, "Would submit");
        Ok(())
    }
}

/// Read a snapshot saved as RON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_snapshot(path: &Path) -> Result<WorldSnapshot> {
    let text = std::fs::read_to_string(path).map_err(|source| ToolError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(ron::from_str(&text)?)
}

/// Run one tick of `bot` on `snapshot` against a [`DryRunSink`].
#[must_use]
pub fn decide(bot: &SwarmBot, snapshot: &WorldSnapshot) -> TickReport {
    let mut sink = DryRunSink::default();
    let report = bot.on_tick(snapshot, &mut sink);
    info!(
        tick = report.tick,
        phase = ?report.phase,
        accepted = sink.accepted(),
        "Dry run complete"
    );
    report
}

/// Pretty-print a report as RON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_report(report: &TickReport) -> Result<String> {
    Ok(ron::ser::to_string_pretty(report, PrettyConfig::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::catalog::UnitKind;
    use swarm_core::command::Action;
    use swarm_core::config::BotConfig;
    use swarm_test_utils::fixtures::opening;

    #[test]
    fn test_tech_order_lists_every_node_prerequisite_first() {
        let catalog = Catalog::standard().unwrap();
        let lines = tech_order(&catalog);

        assert_eq!(lines.len(), catalog.build_order().len());
        assert!(lines[0].contains("Hatchery"));
        let pool = lines.iter().position(|l| l.contains("SpawningPool")).unwrap();
        let den = lines.iter().position(|l| l.contains("HydraliskDen")).unwrap();
        assert!(pool < den);
        assert!(lines[den].ends_with("<- Lair"));
    }

    #[test]
    fn test_decide_on_opening_trains_a_drone() {
        let bot = SwarmBot::new(BotConfig::default()).unwrap();
        let report = decide(&bot, &opening().build());

        assert_eq!(report.issued.len(), 1);
        assert_eq!(report.issued[0].request.action, Action::Train(UnitKind::Drone));
    }

    #[test]
    fn test_rendered_report_reads_back() {
        let bot = SwarmBot::new(BotConfig::default()).unwrap();
        let report = decide(&bot, &opening().build());

        let text = render_report(&report).unwrap();
        let restored: TickReport = ron::from_str(&text).unwrap();
        assert_eq!(restored, report);
    }

    #[test]
    fn test_missing_snapshot_is_a_read_error() {
        let err = load_snapshot(Path::new("no/such/snapshot.ron")).unwrap_err();
        assert!(matches!(err, ToolError::Read { .. }));
    }
}
