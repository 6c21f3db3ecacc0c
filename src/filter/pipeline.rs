//! Multi-pass extraction over a re-openable entity stream.
//!
//! Inclusion flows from nodes up to ways and relations, but a kept way also
//! pulls in its outside nodes. Since the stream only runs forward, each step
//! of that closure is one full traversal:
//!
//! 1. nodes: exact containment against the candidate polygons
//! 2. ways: keep ways touching an inside node, require their other nodes
//! 3. nodes: resolve the required nodes actually present in the stream
//! 4. relations: keep relations with a kept node or way member
//! 5. output: re-emit every kept entity in source order
//!
//! Relation members that are relations are not followed. Pass 3 changes no
//! selection: output keeps every required node, and the pass only counts which
//! of them exist so missing references can be reported.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use super::{ExtractReport, LocationStore, Membership, PassReport};
use crate::error::Result;
use crate::models::{BoundingBox, Entity, Kinds, Location, MemberId, NodeId, Relation};
use crate::pip::{Polygon, SpatialIndex};
use crate::stream::{EntitySink, EntitySource};

/// Tuning knobs for an extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Nodes tested for containment in parallel per batch
    pub batch_size: usize,
    /// Draw a progress spinner per pass
    pub progress: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            batch_size: 65_536,
            progress: true,
        }
    }
}

/// One traversal of the entity stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Nodes,
    Ways,
    RequiredNodes,
    Relations,
    Output,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::Nodes,
        Pass::Ways,
        Pass::RequiredNodes,
        Pass::Relations,
        Pass::Output,
    ];

    pub fn number(&self) -> usize {
        match self {
            Pass::Nodes => 1,
            Pass::Ways => 2,
            Pass::RequiredNodes => 3,
            Pass::Relations => 4,
            Pass::Output => 5,
        }
    }

    /// Kinds the pass consumes
    pub fn kinds(&self) -> Kinds {
        match self {
            Pass::Nodes | Pass::RequiredNodes => Kinds::NODES,
            Pass::Ways => Kinds::WAYS,
            Pass::Relations => Kinds::RELATIONS,
            Pass::Output => Kinds::ALL,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Pass::Nodes => "Locating nodes inside boundaries",
            Pass::Ways => "Selecting ways",
            Pass::RequiredNodes => "Resolving nodes required by ways",
            Pass::Relations => "Selecting relations",
            Pass::Output => "Writing output",
        }
    }
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pass {}/{}: {}",
            self.number(),
            Pass::ALL.len(),
            self.description()
        )
    }
}

/// Bookkeeping shared by every pass: progress, entity count, timing
struct PassRun {
    pass: Pass,
    pb: ProgressBar,
    entities: u64,
    started: Instant,
}

impl PassRun {
    fn start(pass: Pass, progress: bool) -> Self {
        info!("{}...", pass);

        let pb = if progress {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {msg} {pos} entities ({per_sec})",
            ) {
                pb.set_style(style);
            }
            pb.set_message(pass.to_string());
            pb
        } else {
            ProgressBar::hidden()
        };

        Self {
            pass,
            pb,
            entities: 0,
            started: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.entities += 1;
        self.pb.inc(1);
    }

    fn finish(self, report: &mut ExtractReport) {
        self.pb.finish_and_clear();
        report.passes.push(PassReport {
            pass: self.pass.to_string(),
            entities: self.entities,
            elapsed_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
    }
}

/// Geofenced extractor: boundary polygons plus their spatial index.
pub struct Extractor {
    polygons: Vec<Polygon>,
    index: SpatialIndex,
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self::with_options(polygons, ExtractOptions::default())
    }

    pub fn with_options(polygons: Vec<Polygon>, options: ExtractOptions) -> Self {
        info!(
            "Building spatial index for {} polygons...",
            polygons.len()
        );
        let index = SpatialIndex::from_polygons(&polygons);
        Self {
            polygons,
            index,
            options,
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Indices of every polygon containing `loc`
    pub fn containing(&self, loc: Location) -> impl Iterator<Item = usize> + '_ {
        self.index
            .query(loc)
            .filter(move |&i| self.polygons[i].contains(loc))
    }

    /// Inside any polygon
    pub fn contains(&self, loc: Location) -> bool {
        self.containing(loc).next().is_some()
    }

    /// Run every pass, writing kept entities to `sink`.
    pub fn run<S, W, L>(&self, source: &mut S, sink: &mut W, store: L) -> Result<ExtractReport>
    where
        S: EntitySource + ?Sized,
        W: EntitySink + ?Sized,
        L: LocationStore,
    {
        self.select(source, store)?.write(source, sink)
    }

    /// Run the selection passes (1 to 4) without writing anything.
    pub fn select<S, L>(&self, source: &mut S, store: L) -> Result<Selection<L>>
    where
        S: EntitySource + ?Sized,
        L: LocationStore,
    {
        let mut membership = Membership::new(store);
        let mut report = ExtractReport::for_polygons(self.polygons.iter().map(Polygon::name));

        self.node_pass(source, &mut membership, &mut report)?;
        self.way_pass(source, &mut membership, &mut report)?;
        self.required_node_pass(source, &mut membership, &mut report)?;
        self.relation_pass(source, &mut membership, &mut report)?;

        Ok(Selection {
            membership,
            report,
            progress: self.options.progress,
        })
    }

    fn node_pass<S, L>(
        &self,
        source: &mut S,
        membership: &mut Membership<L>,
        report: &mut ExtractReport,
    ) -> Result<()>
    where
        S: EntitySource + ?Sized,
        L: LocationStore,
    {
        let mut run = PassRun::start(Pass::Nodes, self.options.progress);
        let batch_size = self.options.batch_size.max(1);
        let mut batch: Vec<(NodeId, Location)> = Vec::with_capacity(batch_size);

        for entity in source.open(Pass::Nodes.kinds())? {
            run.tick();
            match entity? {
                Entity::Node(node) => {
                    report.nodes_seen += 1;
                    batch.push((node.id, node.location));
                    if batch.len() >= batch_size {
                        self.mark_node_batch(&mut batch, membership, report)?;
                    }
                }
                Entity::Way(_) | Entity::Relation(_) => {}
            }
        }
        self.mark_node_batch(&mut batch, membership, report)?;

        run.finish(report);
        info!(
            "Found {} of {} nodes inside {} polygons",
            report.nodes_inside,
            report.nodes_seen,
            self.polygons.len()
        );
        Ok(())
    }

    /// Containment tests run in parallel; marks are applied afterwards on this thread.
    fn mark_node_batch<L: LocationStore>(
        &self,
        batch: &mut Vec<(NodeId, Location)>,
        membership: &mut Membership<L>,
        report: &mut ExtractReport,
    ) -> Result<()> {
        let hits: Vec<(NodeId, Location, Vec<usize>)> = batch
            .par_iter()
            .filter_map(|&(id, loc)| {
                let polygons: Vec<usize> = self.containing(loc).collect();
                (!polygons.is_empty()).then_some((id, loc, polygons))
            })
            .collect();
        batch.clear();

        for (id, loc, polygons) in hits {
            if !membership.mark_inside_node(id, loc)? {
                continue;
            }
            report.nodes_inside += 1;
            match report.extent.as_mut() {
                Some(extent) => extent.extend(loc),
                None => report.extent = Some(BoundingBox::from_location(loc)),
            }
            for i in polygons {
                report.polygons[i].nodes_inside += 1;
            }
        }
        Ok(())
    }

    fn way_pass<S, L>(
        &self,
        source: &mut S,
        membership: &mut Membership<L>,
        report: &mut ExtractReport,
    ) -> Result<()>
    where
        S: EntitySource + ?Sized,
        L: LocationStore,
    {
        let mut run = PassRun::start(Pass::Ways, self.options.progress);
        let mut outside = Vec::new();

        for entity in source.open(Pass::Ways.kinds())? {
            run.tick();
            match entity? {
                Entity::Way(way) => {
                    report.ways_seen += 1;
                    outside.clear();
                    let mut touches_inside = false;
                    for &id in &way.nodes {
                        if membership.is_inside_node(id)? {
                            touches_inside = true;
                        } else {
                            outside.push(id);
                        }
                    }

                    if touches_inside {
                        if membership.mark_inside_way(way.id) {
                            report.ways_inside += 1;
                        }
                        for &id in &outside {
                            membership.mark_outside_required_node(id);
                        }
                    }
                }
                Entity::Node(_) | Entity::Relation(_) => {}
            }
        }

        report.outside_required_nodes = membership.outside_required_count() as u64;
        run.finish(report);
        info!(
            "Found {} of {} ways, requiring {} outside nodes",
            report.ways_inside, report.ways_seen, report.outside_required_nodes
        );
        Ok(())
    }

    fn required_node_pass<S, L>(
        &self,
        source: &mut S,
        membership: &mut Membership<L>,
        report: &mut ExtractReport,
    ) -> Result<()>
    where
        S: EntitySource + ?Sized,
        L: LocationStore,
    {
        let mut run = PassRun::start(Pass::RequiredNodes, self.options.progress);

        for entity in source.open(Pass::RequiredNodes.kinds())? {
            run.tick();
            match entity? {
                Entity::Node(node) => {
                    if membership.is_outside_required_node(node.id)
                        && !membership.is_inside_node(node.id)?
                    {
                        membership.mark_required_resolved(node.id);
                    }
                }
                Entity::Way(_) | Entity::Relation(_) => {}
            }
        }

        report.resolved_required_nodes = membership.resolved_required_count() as u64;
        report.dangling_node_refs = report
            .outside_required_nodes
            .saturating_sub(report.resolved_required_nodes);
        run.finish(report);
        info!(
            "Resolved {} of {} required nodes",
            report.resolved_required_nodes, report.outside_required_nodes
        );
        Ok(())
    }

    fn relation_pass<S, L>(
        &self,
        source: &mut S,
        membership: &mut Membership<L>,
        report: &mut ExtractReport,
    ) -> Result<()>
    where
        S: EntitySource + ?Sized,
        L: LocationStore,
    {
        let mut run = PassRun::start(Pass::Relations, self.options.progress);

        for entity in source.open(Pass::Relations.kinds())? {
            run.tick();
            match entity? {
                Entity::Relation(rel) => {
                    report.relations_seen += 1;
                    if has_kept_member(&rel, membership)? && membership.mark_inside_relation(rel.id)
                    {
                        report.relations_inside += 1;
                    }
                }
                Entity::Node(_) | Entity::Way(_) => {}
            }
        }

        run.finish(report);
        info!(
            "Found {} of {} relations",
            report.relations_inside, report.relations_seen
        );
        Ok(())
    }
}

fn has_kept_member<L: LocationStore>(rel: &Relation, membership: &Membership<L>) -> Result<bool> {
    for member in &rel.members {
        let kept = match member.id {
            MemberId::Node(id) => membership.keeps_node(id)?,
            MemberId::Way(id) => membership.is_inside_way(id),
            MemberId::Relation(_) => false,
        };
        if kept {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Result of the selection passes, ready to be written.
#[derive(Debug)]
pub struct Selection<L> {
    membership: Membership<L>,
    report: ExtractReport,
    progress: bool,
}

impl<L: LocationStore> Selection<L> {
    pub fn membership(&self) -> &Membership<L> {
        &self.membership
    }

    pub fn report(&self) -> &ExtractReport {
        &self.report
    }

    /// Output pass: emit kept entities in source order, then finalize the sink.
    pub fn write<S, W>(mut self, source: &mut S, sink: &mut W) -> Result<ExtractReport>
    where
        S: EntitySource + ?Sized,
        W: EntitySink + ?Sized,
    {
        let mut run = PassRun::start(Pass::Output, self.progress);

        for entity in source.open(Pass::Output.kinds())? {
            run.tick();
            let entity = entity?;
            let keep = match &entity {
                Entity::Node(node) => self.membership.keeps_node(node.id)?,
                Entity::Way(way) => self.membership.is_inside_way(way.id),
                Entity::Relation(rel) => self.membership.is_inside_relation(rel.id),
            };
            if !keep {
                continue;
            }

            sink.emit(&entity)?;
            match entity {
                Entity::Node(_) => self.report.emitted.nodes += 1,
                Entity::Way(_) => self.report.emitted.ways += 1,
                Entity::Relation(_) => self.report.emitted.relations += 1,
            }
        }
        sink.finalize()?;

        run.finish(&mut self.report);
        Ok(self.report)
    }
}
