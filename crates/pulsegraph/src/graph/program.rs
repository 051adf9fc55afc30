//! The program graph: a DAG of instructions and nested sub-programs.
//!
//! A [`ProgramGraph`] is bounded by two fixed sentinel nodes (input and
//! output); every other node holds exactly one [`Element`]. Instructions and
//! nested graphs are appended without edges, an external sequencing pass
//! encodes the alignment policy as precedence edges, and an external
//! scheduling pass fills the per-node time table. The rewrite primitives
//! defined here ([`ProgramGraph::remove_node_retain_edges`] and
//! [`ProgramGraph::inline_nested`]) are shared by the consolidation pass and
//! by [`ProgramGraph::flatten`].
use std::collections::{HashMap, HashSet};

use petgraph::algo::{has_path_connecting, is_isomorphic_matching};
use petgraph::graph::DiGraph;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

use crate::error::{Error, Result};
use crate::graph::Alignment;
use crate::instruction::{AcquireInstruction, GenericInstruction, Instruction};
use crate::model::{Frame, LogicalElement, MixedFrame};

/// Stable identifier of a node in a [`ProgramGraph`]. Ids survive removal of
/// other nodes; ids 0 and 1 are always the input and output sentinels.
pub type NodeId = petgraph::stable_graph::NodeIndex<u32>;

/// The payload of an interior node: a leaf instruction or a whole nested
/// program. A nested program is exclusively owned by its parent node.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Instruction(Instruction),
    Nested(ProgramGraph),
}

impl Element {
    /// The duration of the payload: the instruction's own duration, or the
    /// nested graph's critical-path duration (which may be unresolved).
    pub fn duration(&self) -> Option<u64> {
        match self {
            Element::Instruction(inst) => Some(inst.duration()),
            Element::Nested(graph) => graph.duration(),
        }
    }

    /// The instruction, if this payload is a leaf.
    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            Element::Instruction(inst) => Some(inst),
            Element::Nested(_) => None,
        }
    }

    /// The nested graph, if this payload is one.
    pub fn as_nested(&self) -> Option<&ProgramGraph> {
        match self {
            Element::Nested(graph) => Some(graph),
            Element::Instruction(_) => None,
        }
    }
}

impl From<Instruction> for Element {
    fn from(inst: Instruction) -> Self {
        Element::Instruction(inst)
    }
}

impl From<GenericInstruction> for Element {
    fn from(inst: GenericInstruction) -> Self {
        Element::Instruction(Instruction::Generic(inst))
    }
}

impl From<AcquireInstruction> for Element {
    fn from(inst: AcquireInstruction) -> Self {
        Element::Instruction(Instruction::Acquire(inst))
    }
}

impl From<ProgramGraph> for Element {
    fn from(graph: ProgramGraph) -> Self {
        Element::Nested(graph)
    }
}

/// Internal node payload: the sentinels never hold data.
#[derive(Clone, Debug, PartialEq)]
enum NodeKind {
    Input,
    Output,
    Element(Element),
}

/// A hierarchical DAG of timed instructions with one alignment policy and a
/// sparse per-node table of absolute start times.
#[derive(Clone, Debug)]
pub struct ProgramGraph {
    alignment: Alignment,
    dag: StableDiGraph<NodeKind, ()>,
    time_table: HashMap<NodeId, u64>,
}

impl ProgramGraph {
    /// Create an empty program with the given alignment; only the two
    /// sentinel nodes exist.
    pub fn new(alignment: Alignment) -> Self {
        let mut dag = StableDiGraph::default();
        dag.add_node(NodeKind::Input);
        dag.add_node(NodeKind::Output);
        Self {
            alignment,
            dag,
            time_table: HashMap::new(),
        }
    }

    /// The alignment policy of this graph.
    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Id of the input sentinel.
    pub fn input(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Id of the output sentinel.
    pub fn output(&self) -> NodeId {
        NodeId::new(1)
    }

    fn is_sentinel(&self, node: NodeId) -> bool {
        node == self.input() || node == self.output()
    }

    /// Append an element as a new node without edges and return its id.
    pub fn append(&mut self, element: impl Into<Element>) -> NodeId {
        self.dag.add_node(NodeKind::Element(element.into()))
    }

    /// Add a precedence edge. Duplicate edges are ignored; unknown nodes,
    /// self loops, and cycle-creating edges are rejected.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        if !self.dag.contains_node(from) || !self.dag.contains_node(to) {
            return Err(Error::MalformedProgram(format!(
                "can not add an edge between {} and {}: node not in the program",
                from.index(),
                to.index()
            )));
        }
        if from == to {
            return Err(Error::MalformedProgram(
                "an edge can not connect a node to itself".into(),
            ));
        }
        if self.dag.find_edge(from, to).is_some() {
            return Ok(());
        }
        if has_path_connecting(&self.dag, to, from, None) {
            return Err(Error::MalformedProgram(format!(
                "an edge from {} to {} would create a cycle",
                from.index(),
                to.index()
            )));
        }
        self.dag.add_edge(from, to, ());
        Ok(())
    }

    /// Ids of all interior nodes, in ascending id order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.dag
            .node_indices()
            .filter(|id| !self.is_sentinel(*id))
            .collect()
    }

    /// The payload of an interior node.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.dag.node_weight(node) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Mutable access to the payload of an interior node.
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match self.dag.node_weight_mut(node) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Iterate over `(id, payload)` for all interior nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Element)> + '_ {
        self.dag.node_indices().filter_map(move |id| match self.dag.node_weight(id) {
            Some(NodeKind::Element(element)) => Some((id, element)),
            _ => None,
        })
    }

    /// All interior payloads in node-id order (not execution order).
    pub fn elements(&self) -> Vec<&Element> {
        self.iter().map(|(_, element)| element).collect()
    }

    /// Number of interior nodes.
    pub fn element_count(&self) -> usize {
        self.dag.node_count() - 2
    }

    /// All edges as `(from, to)` pairs.
    pub fn edge_list(&self) -> Vec<(NodeId, NodeId)> {
        self.dag
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
            .collect()
    }

    /// Direct predecessors of a node.
    pub fn predecessors(&self, node: NodeId) -> Vec<NodeId> {
        self.dag
            .neighbors_directed(node, Direction::Incoming)
            .collect()
    }

    /// Direct successors of a node.
    pub fn successors(&self, node: NodeId) -> Vec<NodeId> {
        self.dag
            .neighbors_directed(node, Direction::Outgoing)
            .collect()
    }

    /// Assign the absolute start time of an interior node. Intended for the
    /// external scheduling pass.
    pub fn set_time(&mut self, node: NodeId, t0: u64) -> Result<()> {
        if self.is_sentinel(node) {
            return Err(Error::MalformedProgram(
                "sentinel nodes can not be scheduled".into(),
            ));
        }
        if !self.dag.contains_node(node) {
            return Err(Error::MalformedProgram(format!(
                "can not schedule node {}: node not in the program",
                node.index()
            )));
        }
        self.time_table.insert(node, t0);
        Ok(())
    }

    /// The absolute start time of a node, if assigned.
    pub fn time(&self, node: NodeId) -> Option<u64> {
        self.time_table.get(&node).copied()
    }

    /// Whether any interior node of this graph has an assigned start time.
    /// Nested graphs keep their own tables and are not inspected.
    pub fn has_scheduled_nodes(&self) -> bool {
        !self.time_table.is_empty()
    }

    /// Each interior node's time-table entry paired with its payload, in
    /// node-id order; sorted ascending by time iff every entry is assigned.
    pub fn scheduled_elements(&self) -> Vec<(Option<u64>, &Element)> {
        let mut listed: Vec<(Option<u64>, &Element)> = self
            .iter()
            .map(|(id, element)| (self.time(id), element))
            .collect();
        if listed.iter().all(|(t0, _)| t0.is_some()) {
            listed.sort_by_key(|entry| entry.0);
        }
        listed
    }

    /// Recursively list all instructions with their absolute start times,
    /// sorted ascending. Fails with [`Error::Unscheduled`] if any node on
    /// the way, including nested graphs, has no assigned time.
    pub fn scheduled_instructions(&self) -> Result<Vec<(u64, &Instruction)>> {
        let mut listed = Vec::new();
        self.collect_scheduled(0, &mut listed)?;
        listed.sort_by_key(|(t0, _)| *t0);
        Ok(listed)
    }

    fn collect_scheduled<'a>(
        &'a self,
        offset: u64,
        out: &mut Vec<(u64, &'a Instruction)>,
    ) -> Result<()> {
        for (id, element) in self.iter() {
            let Some(t0) = self.time(id) else {
                return Err(Error::Unscheduled(
                    "can not list scheduled instructions while sub-programs are unscheduled"
                        .into(),
                ));
            };
            match element {
                Element::Instruction(inst) => out.push((offset + t0, inst)),
                Element::Nested(sub) => sub.collect_scheduled(offset + t0, out)?,
            }
        }
        Ok(())
    }

    /// Top-level critical-path duration: the maximum of offset + duration
    /// over the output sentinel's direct predecessors. `None` while the
    /// output has no predecessors or any of them is unresolved.
    pub fn duration(&self) -> Option<u64> {
        let last_nodes = self.predecessors(self.output());
        if last_nodes.is_empty() {
            return None;
        }
        let mut end = 0u64;
        for node in last_nodes {
            let t0 = self.time(node)?;
            let duration = self.element(node)?.duration()?;
            end = end.max(t0 + duration);
        }
        Some(end)
    }

    /// Recursively collect every mixed frame referenced by a generic
    /// instruction. Fails with [`Error::MalformedProgram`] if any generic
    /// instruction is not yet bound to both a logical element and a frame.
    pub fn mixed_frames(&self) -> Result<HashSet<MixedFrame>> {
        let mut frames = HashSet::new();
        self.collect_mixed_frames(&mut frames)?;
        Ok(frames)
    }

    fn collect_mixed_frames(&self, out: &mut HashSet<MixedFrame>) -> Result<()> {
        for (_, element) in self.iter() {
            match element {
                Element::Instruction(Instruction::Generic(inst)) => {
                    match (inst.logical_element(), inst.frame()) {
                        (Some(le), Some(frame)) => {
                            out.insert(MixedFrame::new(le.clone(), frame.clone()));
                        }
                        _ => {
                            return Err(Error::MalformedProgram(
                                "the program contains instructions without a bound logical \
                                 element and frame; its mixed frames are not defined"
                                    .into(),
                            ))
                        }
                    }
                }
                Element::Instruction(Instruction::Acquire(_)) => {}
                Element::Nested(sub) => sub.collect_mixed_frames(out)?,
            }
        }
        Ok(())
    }

    /// Recursively collect every logical element referenced by an
    /// instruction, including acquired qubits. Unbound references are
    /// skipped.
    pub fn logical_elements(&self) -> HashSet<LogicalElement> {
        let mut elements = HashSet::new();
        self.collect_logical_elements(&mut elements);
        elements
    }

    fn collect_logical_elements(&self, out: &mut HashSet<LogicalElement>) {
        for (_, element) in self.iter() {
            match element {
                Element::Instruction(Instruction::Generic(inst)) => {
                    if let Some(le) = inst.logical_element() {
                        out.insert(le.clone());
                    }
                }
                Element::Instruction(Instruction::Acquire(inst)) => {
                    out.insert(inst.qubit().clone());
                }
                Element::Nested(sub) => sub.collect_logical_elements(out),
            }
        }
    }

    /// Recursively collect every frame referenced by a generic instruction.
    /// Unbound references are skipped.
    pub fn frames(&self) -> HashSet<Frame> {
        let mut frames = HashSet::new();
        self.collect_frames(&mut frames);
        frames
    }

    fn collect_frames(&self, out: &mut HashSet<Frame>) {
        for (_, element) in self.iter() {
            match element {
                Element::Instruction(Instruction::Generic(inst)) => {
                    if let Some(frame) = inst.frame() {
                        out.insert(frame.clone());
                    }
                }
                Element::Instruction(Instruction::Acquire(_)) => {}
                Element::Nested(sub) => sub.collect_frames(out),
            }
        }
    }

    /// Recursively collect the generic instructions addressed to a given
    /// mixed frame.
    pub fn instructions_by_mixed_frame(&self, mixed_frame: &MixedFrame) -> Vec<&GenericInstruction> {
        let mut found = Vec::new();
        self.collect_by_mixed_frame(mixed_frame, &mut found);
        found
    }

    fn collect_by_mixed_frame<'a>(
        &'a self,
        mixed_frame: &MixedFrame,
        out: &mut Vec<&'a GenericInstruction>,
    ) {
        for (_, element) in self.iter() {
            match element {
                Element::Instruction(Instruction::Generic(inst)) => {
                    if let (Some(le), Some(frame)) = (inst.logical_element(), inst.frame()) {
                        if mixed_frame.logical_element() == le && mixed_frame.frame() == frame {
                            out.push(inst);
                        }
                    }
                }
                Element::Instruction(Instruction::Acquire(_)) => {}
                Element::Nested(sub) => sub.collect_by_mixed_frame(mixed_frame, out),
            }
        }
    }

    /// Recursively collect acquisition instructions, optionally filtered by
    /// the acquired qubit.
    pub fn acquire_instructions(&self, qubit: Option<&LogicalElement>) -> Vec<&AcquireInstruction> {
        let mut found = Vec::new();
        self.collect_acquires(qubit, &mut found);
        found
    }

    fn collect_acquires<'a>(
        &'a self,
        qubit: Option<&LogicalElement>,
        out: &mut Vec<&'a AcquireInstruction>,
    ) {
        for (_, element) in self.iter() {
            match element {
                Element::Instruction(Instruction::Acquire(inst)) => {
                    if qubit.is_none() || qubit == Some(inst.qubit()) {
                        out.push(inst);
                    }
                }
                Element::Instruction(Instruction::Generic(_)) => {}
                Element::Nested(sub) => sub.collect_acquires(qubit, out),
            }
        }
    }

    /// Delete an interior node, reconnecting every predecessor directly to
    /// every successor. The sentinels are never removable.
    pub fn remove_node_retain_edges(&mut self, node: NodeId) -> Result<()> {
        if self.is_sentinel(node) {
            return Err(Error::MalformedProgram(
                "the input and output sentinels can not be removed".into(),
            ));
        }
        if !self.dag.contains_node(node) {
            return Err(Error::MalformedProgram(format!(
                "can not remove node {}: node not in the program",
                node.index()
            )));
        }
        self.bridge_and_remove(node);
        Ok(())
    }

    fn bridge_and_remove(&mut self, node: NodeId) {
        let preds = self.predecessors(node);
        let succs = self.successors(node);
        for pred in preds {
            for succ in &succs {
                self.connect(pred, *succ);
            }
        }
        self.dag.remove_node(node);
        self.time_table.remove(&node);
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        if from != to && self.dag.find_edge(from, to).is_none() {
            self.dag.add_edge(from, to, ());
        }
    }

    /// Replace a node holding a nested graph by the nested graph's own
    /// DAG: splice its nodes and edges in at the node's position, rewire the
    /// parent's incoming and outgoing edges through the copies of the nested
    /// sentinels, and drop those copies with their through-edges retained.
    ///
    /// If the replaced node carried a time-table entry, every spliced node's
    /// entry becomes that offset plus its own local offset; a spliced node
    /// missing a local offset fails with [`Error::Unscheduled`]. Returns the
    /// mapping from the nested graph's interior ids to their new ids.
    pub fn inline_nested(&mut self, node: NodeId) -> Result<HashMap<NodeId, NodeId>> {
        if !matches!(
            self.dag.node_weight(node),
            Some(NodeKind::Element(Element::Nested(_)))
        ) {
            return Err(Error::MalformedProgram(format!(
                "node {} does not hold a nested program",
                node.index()
            )));
        }

        let preds = self.predecessors(node);
        let succs = self.successors(node);
        let initial_time = self.time_table.remove(&node);

        let Some(NodeKind::Element(Element::Nested(sub))) = self.dag.remove_node(node) else {
            return Err(Error::MalformedProgram(format!(
                "node {} does not hold a nested program",
                node.index()
            )));
        };
        let sub_input = sub.input();
        let sub_output = sub.output();
        let ProgramGraph {
            dag: mut sub_dag,
            time_table: sub_times,
            ..
        } = sub;

        let sub_edges: Vec<(NodeId, NodeId)> = sub_dag
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
            .collect();
        let sub_ids: Vec<NodeId> = sub_dag.node_indices().collect();

        let mut mapping: HashMap<NodeId, NodeId> = HashMap::with_capacity(sub_ids.len());
        for old in sub_ids {
            if let Some(weight) = sub_dag.remove_node(old) {
                mapping.insert(old, self.dag.add_node(weight));
            }
        }
        for (from, to) in sub_edges {
            if let (Some(&from), Some(&to)) = (mapping.get(&from), mapping.get(&to)) {
                self.connect(from, to);
            }
        }

        let (Some(&spliced_input), Some(&spliced_output)) =
            (mapping.get(&sub_input), mapping.get(&sub_output))
        else {
            return Err(Error::MalformedProgram(
                "the nested program is missing its sentinel nodes".into(),
            ));
        };
        for pred in preds {
            self.connect(pred, spliced_input);
        }
        for succ in succs {
            self.connect(spliced_output, succ);
        }

        if let Some(offset) = initial_time {
            for (old, new) in &mapping {
                if *old == sub_input || *old == sub_output {
                    continue;
                }
                let Some(local) = sub_times.get(old) else {
                    return Err(Error::Unscheduled(
                        "can not lift the time table of a nested program that is not fully \
                         scheduled"
                            .into(),
                    ));
                };
                self.time_table.insert(*new, offset + local);
            }
        }

        self.bridge_and_remove(spliced_input);
        self.bridge_and_remove(spliced_output);

        mapping.remove(&sub_input);
        mapping.remove(&sub_output);
        Ok(mapping)
    }

    /// Remove and return the payload of the only interior node. Fails unless
    /// the graph holds exactly one element.
    pub fn take_sole_element(&mut self) -> Result<Element> {
        let ids = self.node_ids();
        let [id] = ids.as_slice() else {
            return Err(Error::MalformedProgram(format!(
                "expected exactly one element, found {}",
                ids.len()
            )));
        };
        let id = *id;
        self.time_table.remove(&id);
        match self.dag.remove_node(id) {
            Some(NodeKind::Element(element)) => Ok(element),
            _ => Err(Error::MalformedProgram(
                "the sole interior node holds no payload".into(),
            )),
        }
    }

    /// Return a flattened copy: every nested sub-graph recursively inlined,
    /// with each nested node's local offset added to the parent offset at
    /// the substitution point. See [`ProgramGraph::flatten_in_place`].
    pub fn flatten(&self) -> Result<ProgramGraph> {
        let mut flat = self.clone();
        flat.flatten_in_place()?;
        Ok(flat)
    }

    /// Flatten this graph in place. Each nested graph is recursively
    /// flattened first and then spliced into the parent via
    /// [`ProgramGraph::inline_nested`]. Fails with [`Error::Unscheduled`]
    /// when a scheduled parent node holds a nested graph that is not fully
    /// scheduled.
    pub fn flatten_in_place(&mut self) -> Result<()> {
        for id in self.node_ids() {
            let Some(Element::Nested(sub)) = self.element_mut(id) else {
                continue;
            };
            sub.flatten_in_place()?;
            self.inline_nested(id)?;
        }
        Ok(())
    }
}

/// Structural equality: equal alignment policies and isomorphic DAGs under
/// node-payload equality. Node ids may differ; time tables are excluded.
impl PartialEq for ProgramGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.alignment != other.alignment {
            return false;
        }
        // The VF2 matcher wants compact indices; holes left by node removal
        // are squeezed out by the conversion.
        let lhs: DiGraph<NodeKind, ()> = DiGraph::from(self.dag.clone());
        let rhs: DiGraph<NodeKind, ()> = DiGraph::from(other.dag.clone());
        is_isomorphic_matching(&lhs, &rhs, |a, b| a == b, |_, _| true)
    }
}
