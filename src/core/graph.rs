//! Evidence Graph Builder
//!
//! Turns the target's transaction list into a star graph: one target node,
//! one node per distinct counterparty (first-seen order), one edge from the
//! target to each counterparty carrying the aggregated flow.
//!
//! Classification per new counterparty:
//! 1. Known mixer   → `mixer`, high risk, raises `mixer_usage`
//! 2. Known exchange → `exchange`, raises `cex_interaction`
//! 3. Call data present → `contract`
//! 4. Otherwise → `wallet`

use std::collections::HashMap;
use tracing::debug;

use crate::models::config::ClassificationTables;
use crate::models::types::{
    CounterpartyAggregate, DetectedPattern, EvidenceGraph, GraphEdge, GraphNode, NodeKind,
    NodeMetrics, PatternKind, RiskIndicators, RiskLevel, Transaction,
};

/// Output of a single scan over the transaction list
#[derive(Debug, Clone, Default)]
pub struct GraphBuild {
    pub graph: EvidenceGraph,
    /// First-seen order
    pub counterparties: Vec<CounterpartyAggregate>,
    pub total_in: f64,
    pub total_out: f64,
    pub indicators: RiskIndicators,
    /// One `MixerInteraction` entry per mixer counterparty
    pub patterns: Vec<DetectedPattern>,
}

pub struct GraphBuilder<'a> {
    tables: &'a ClassificationTables,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(tables: &'a ClassificationTables) -> Self {
        Self { tables }
    }

    pub fn build(&self, target: &str, transactions: &[Transaction]) -> GraphBuild {
        let target_id = target.to_lowercase();
        let mut out = GraphBuild::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        out.graph.nodes.push(GraphNode {
            id: target_id.clone(),
            kind: NodeKind::Target,
            label: "Target Wallet".to_string(),
            risk_level: RiskLevel::Low,
            metrics: None,
        });

        for tx in transactions {
            let value = tx.value_eth();
            if tx.is_incoming(&target_id) {
                out.total_in += value;
            } else {
                out.total_out += value;
            }

            let counterparty = tx.counterparty(&target_id);
            // Self-transfers and creation txs without a resolved address stay out of the graph
            if counterparty.is_empty() || counterparty == target_id {
                continue;
            }

            let slot = match index.get(&counterparty) {
                Some(&slot) => slot,
                None => {
                    let node = self.classify(&counterparty, tx, &mut out);
                    out.graph.nodes.push(node);
                    out.counterparties.push(CounterpartyAggregate {
                        address: counterparty.clone(),
                        tx_count: 0,
                        total_value_eth: 0.0,
                    });
                    index.insert(counterparty, out.counterparties.len() - 1);
                    out.counterparties.len() - 1
                }
            };

            let aggregate = &mut out.counterparties[slot];
            aggregate.tx_count += 1;
            aggregate.total_value_eth += value;
        }

        for aggregate in &out.counterparties {
            let risk = match index.get(&aggregate.address) {
                // node 0 is the target, counterparty k sits at k + 1
                Some(&slot) if out.graph.nodes[slot + 1].risk_level == RiskLevel::High => {
                    RiskLevel::High
                }
                _ => RiskLevel::Low,
            };
            out.graph.edges.push(GraphEdge {
                source: target_id.clone(),
                target: aggregate.address.clone(),
                tx_count: aggregate.tx_count,
                total_value_eth: aggregate.total_value_eth,
                risk,
            });
        }

        self.attach_metrics(&mut out, transactions.len());

        debug!(
            "🕸️ Graph for {}: {} nodes, {} edges, in {:.4} / out {:.4}",
            target_id,
            out.graph.nodes.len(),
            out.graph.edges.len(),
            out.total_in,
            out.total_out
        );

        out
    }

    fn classify(&self, counterparty: &str, tx: &Transaction, out: &mut GraphBuild) -> GraphNode {
        let (kind, risk_level) = if self.tables.is_mixer(counterparty) {
            out.indicators.mixer_usage = true;
            out.patterns.push(DetectedPattern::new(
                PatternKind::MixerInteraction,
                format!("Interaction detected with known mixer: {}", counterparty),
            ));
            (NodeKind::Mixer, RiskLevel::High)
        } else if self.tables.is_exchange(counterparty) {
            out.indicators.cex_interaction = true;
            (NodeKind::Exchange, RiskLevel::Low)
        } else if tx.has_call_data() {
            (NodeKind::Contract, RiskLevel::Low)
        } else {
            (NodeKind::Wallet, RiskLevel::Low)
        };

        let prefix: String = counterparty.chars().take(8).collect();
        GraphNode {
            id: counterparty.to_string(),
            kind,
            label: format!("{} {}...", kind.as_str().to_uppercase(), prefix),
            risk_level,
            metrics: None,
        }
    }

    fn attach_metrics(&self, out: &mut GraphBuild, tx_count: usize) {
        let edge_metrics: HashMap<&str, NodeMetrics> = out
            .graph
            .edges
            .iter()
            .map(|e| {
                (
                    e.target.as_str(),
                    NodeMetrics {
                        tx_count: e.tx_count,
                        eth_volume: e.total_value_eth,
                        connection_count: 1,
                    },
                )
            })
            .collect();

        let target_metrics = NodeMetrics {
            tx_count,
            eth_volume: out.total_in + out.total_out,
            connection_count: out.counterparties.len(),
        };

        let mut resolved = Vec::with_capacity(out.graph.nodes.len());
        for node in &out.graph.nodes {
            resolved.push(match node.kind {
                NodeKind::Target => Some(target_metrics.clone()),
                _ => edge_metrics.get(node.id.as_str()).cloned(),
            });
        }
        for (node, metrics) in out.graph.nodes.iter_mut().zip(resolved) {
            node.metrics = metrics;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "0x1111111111111111111111111111111111111abc";
    const MIXER: &str = "0x910cbd523d972eb0a6f4cae4618ad62622b39dbf";
    const BINANCE: &str = "0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be";

    fn tx(from: &str, to: &str, wei: &str, input: &str) -> Transaction {
        Transaction {
            hash: format!("0x{}{}", from.len(), wei),
            from: from.to_string(),
            to: to.to_string(),
            value_wei: wei.to_string(),
            timestamp: 1_700_000_000,
            input_data: input.to_string(),
            is_error: false,
        }
    }

    #[test]
    fn test_empty_list_has_only_target() {
        let tables = ClassificationTables::default();
        let build = GraphBuilder::new(&tables).build(TARGET, &[]);
        assert_eq!(build.graph.nodes.len(), 1);
        assert!(build.graph.edges.is_empty());
        assert_eq!(build.total_in, 0.0);
        assert_eq!(build.total_out, 0.0);
        let metrics = build.graph.nodes[0].metrics.as_ref().unwrap();
        assert_eq!(metrics.tx_count, 0);
        assert_eq!(metrics.connection_count, 0);
    }

    #[test]
    fn test_one_node_per_counterparty_case_insensitive() {
        let tables = ClassificationTables::default();
        let other = "0xAbCdEf0000000000000000000000000000000001";
        let txs = vec![
            tx(other, TARGET, "1000000000000000000", "0x"),
            tx(TARGET, &other.to_lowercase(), "500000000000000000", "0x"),
            tx(&other.to_uppercase().replace("0X", "0x"), TARGET, "250000000000000000", "0x"),
        ];
        let build = GraphBuilder::new(&tables).build(TARGET, &txs);

        assert_eq!(build.graph.nodes.len(), 2);
        assert_eq!(build.graph.edges.len(), 1);
        assert_eq!(build.counterparties.len(), 1);
        assert_eq!(build.counterparties[0].tx_count, 3);
        assert!((build.total_in - 1.25).abs() < 1e-9);
        assert!((build.total_out - 0.5).abs() < 1e-9);
        assert!((build.counterparties[0].total_value_eth - 1.75).abs() < 1e-9);
        assert_eq!(build.graph.nodes.iter().filter(|n| n.kind == NodeKind::Target).count(), 1);
    }

    #[test]
    fn test_classification_and_indicators() {
        let tables = ClassificationTables::default();
        let contract = "0x2222222222222222222222222222222222222222";
        let txs = vec![
            tx(MIXER, TARGET, "1000000000000000000", "0x"),
            tx(TARGET, BINANCE, "1000000000000000000", "0x"),
            tx(TARGET, contract, "0", "0xa9059cbb00000000000000000000000000000000"),
        ];
        let build = GraphBuilder::new(&tables).build(TARGET, &txs);

        let mixer = build.graph.node(MIXER).unwrap();
        assert_eq!(mixer.kind, NodeKind::Mixer);
        assert_eq!(mixer.risk_level, RiskLevel::High);
        assert_eq!(build.graph.node(BINANCE).unwrap().kind, NodeKind::Exchange);
        assert_eq!(build.graph.node(contract).unwrap().kind, NodeKind::Contract);

        assert!(build.indicators.mixer_usage);
        assert!(build.indicators.cex_interaction);
        assert_eq!(build.patterns.len(), 1);
        assert_eq!(build.patterns[0].kind, PatternKind::MixerInteraction);

        let mixer_edge = build.graph.edges.iter().find(|e| e.target == MIXER).unwrap();
        assert_eq!(mixer_edge.risk, RiskLevel::High);
        let cex_edge = build.graph.edges.iter().find(|e| e.target == BINANCE).unwrap();
        assert_eq!(cex_edge.risk, RiskLevel::Low);
    }

    #[test]
    fn test_first_seen_order_and_metrics() {
        let tables = ClassificationTables::default();
        let a = "0x000000000000000000000000000000000000000a";
        let b = "0x000000000000000000000000000000000000000b";
        let txs = vec![
            tx(b, TARGET, "1000000000000000000", "0x"),
            tx(a, TARGET, "2000000000000000000", "0x"),
            tx(b, TARGET, "1000000000000000000", "0x"),
        ];
        let build = GraphBuilder::new(&tables).build(TARGET, &txs);

        let ids: Vec<&str> = build.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![TARGET, b, a]);

        let target = build.graph.nodes[0].metrics.as_ref().unwrap();
        assert_eq!(target.tx_count, 3);
        assert_eq!(target.connection_count, 2);
        assert!((target.eth_volume - 4.0).abs() < 1e-9);

        let b_metrics = build.graph.node(b).unwrap().metrics.as_ref().unwrap();
        assert_eq!(b_metrics.tx_count, 2);
        assert_eq!(b_metrics.connection_count, 1);
        assert!((b_metrics.eth_volume - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_value_counts_as_zero() {
        let tables = ClassificationTables::default();
        let other = "0x000000000000000000000000000000000000000a";
        let txs = vec![
            tx(other, TARGET, "garbage", "0x"),
            tx(other, TARGET, "1000000000000000000", "0x"),
        ];
        let build = GraphBuilder::new(&tables).build(TARGET, &txs);
        assert!((build.total_in - 1.0).abs() < 1e-9);
        assert!(build.total_in.is_finite());
    }

    #[test]
    fn test_non_ascii_counterparty_label() {
        let tables = ClassificationTables::default();
        let txs = vec![tx("0xabcdeé0000", TARGET, "1000000000000000000", "0x")];
        let build = GraphBuilder::new(&tables).build(TARGET, &txs);
        assert_eq!(build.graph.nodes.len(), 2);
        assert_eq!(build.graph.nodes[1].label, "WALLET 0xabcdeé...");
    }

    #[test]
    fn test_self_transfer_counted_but_not_a_node() {
        let tables = ClassificationTables::default();
        let txs = vec![tx(TARGET, TARGET, "1000000000000000000", "0x")];
        let build = GraphBuilder::new(&tables).build(TARGET, &txs);
        assert_eq!(build.graph.nodes.len(), 1);
        assert!((build.total_in - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_is_deterministic() {
        let tables = ClassificationTables::default();
        let txs = vec![
            tx(MIXER, TARGET, "1000000000000000000", "0x"),
            tx(TARGET, BINANCE, "3000000000000000000", "0x"),
        ];
        let first = GraphBuilder::new(&tables).build(TARGET, &txs);
        let second = GraphBuilder::new(&tables).build(TARGET, &txs);
        assert_eq!(
            serde_json::to_string(&first.graph).unwrap(),
            serde_json::to_string(&second.graph).unwrap()
        );
    }
}
