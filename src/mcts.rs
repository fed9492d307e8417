//! Monte Carlo Tree Search with the UCT tree policy.
//!
//! Every iteration runs the four classic phases to completion:
//! selection, expansion, a uniform-random rollout, and backpropagation.
//! Nodes live in an arena owned by [`Tree`]; parents are referenced by
//! index, so the tree has no ownership cycles and is dropped in one piece
//! once the move has been chosen.

use std::cmp::Reverse;

use log::{debug, trace};
use rand::{seq::SliceRandom, Rng};

use crate::config::{MctsConfig, Perspective};
use crate::error::{Error, Result};
use crate::game::Game;

/// Keeps unvisited children finite but overwhelmingly attractive in the UCT score.
const EPSILON: f64 = 1e-6;

/// Index of a node inside its [`Tree`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Clone, Debug)]
pub struct Node<G: Game> {
    state: G,
    /// Move that led here from the parent. `None` for the root.
    last_move: Option<G::Move>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visit_count: usize,
    value_sum: f64,
}

impl<G: Game> Node<G> {
    fn new(state: G, last_move: Option<G::Move>, parent: Option<NodeId>) -> Self {
        Self {
            state,
            last_move,
            parent,
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
        }
    }

    pub fn state(&self) -> &G {
        &self.state
    }

    pub fn last_move(&self) -> Option<G::Move> {
        self.last_move
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn visit_count(&self) -> usize {
        self.visit_count
    }

    pub fn value_sum(&self) -> f64 {
        self.value_sum
    }

    /// Average credited result, 0.0 for a node that was never visited.
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    /// UCT score of this node as a child of a parent with `parent_visits` visits.
    fn uct_score(&self, parent_visits: usize, exploration_constant: f64) -> f64 {
        let visits = self.visit_count as f64 + EPSILON;
        let exploit = self.value_sum / visits;
        let explore = ((parent_visits as f64 + 1.0).ln() / visits).sqrt();
        exploit + exploration_constant * explore
    }
}

/// Search tree rooted at the position being decided.
#[derive(Clone, Debug)]
pub struct Tree<G: Game> {
    nodes: Vec<Node<G>>,
}

impl<G: Game> Tree<G> {
    pub fn new(root: G) -> Self {
        Self {
            nodes: vec![Node::new(root, None, None)],
        }
    }

    /// # Panics
    /// Panics if `id` was not handed out by this tree.
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node<G> {
        self.get(NodeId::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<G>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    fn add_child(&mut self, parent: NodeId, state: G, last_move: G::Move) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(state, Some(last_move), Some(parent)));
        self.get_mut(parent).children.push(id);
        id
    }

    fn is_fully_expanded(&self, id: NodeId) -> bool {
        let node = self.get(id);
        node.children.len() == node.state.legal_moves().len()
    }

    /// Child with the highest UCT score. Ties go to the child expanded first.
    pub fn best_child(&self, id: NodeId, exploration_constant: f64) -> Option<NodeId> {
        let node = self.get(id);
        node.children
            .iter()
            .map(|&child| {
                let score = self
                    .get(child)
                    .uct_score(node.visit_count, exploration_constant);
                (child, score)
            })
            .fold(None::<(NodeId, f64)>, |best, (child, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((child, score)),
            })
            .map(|(child, _)| child)
    }

    /// Descends from the root through fully expanded nodes and stops at the
    /// first node that still has an untried move, or at a terminal one.
    pub fn select(&self, exploration_constant: f64) -> NodeId {
        let mut id = NodeId::ROOT;
        while !self.get(id).state.is_terminal() && self.is_fully_expanded(id) {
            match self.best_child(id, exploration_constant) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    /// Adds a child for the first legal move whose resulting position is not
    /// in the tree under `id` yet. Returns `id` itself when nothing is left
    /// to add, which is always the case for terminal positions.
    pub fn expand(&mut self, id: NodeId) -> Result<NodeId> {
        let state = self.get(id).state.clone();
        if state.is_terminal() {
            return Ok(id);
        }

        for mv in state.legal_moves() {
            let next = state.apply_move(mv)?;
            let known = self
                .get(id)
                .children
                .iter()
                .any(|&child| self.get(child).state == next);
            if !known {
                return Ok(self.add_child(id, next, mv));
            }
        }
        Ok(id)
    }

    /// Walks from `leaf` up to the root, counting a visit and crediting
    /// `result` on every node along the way.
    pub fn backpropagate(&mut self, leaf: NodeId, result: f64, perspective: Perspective) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let parent = self.get(id).parent;
            let credit = match (perspective, parent) {
                (Perspective::Mover, Some(parent)) => {
                    result * self.get(parent).state.perspective()
                }
                _ => result,
            };

            let node = self.get_mut(id);
            node.visit_count += 1;
            node.value_sum += credit;
            current = parent;
        }
    }

    /// Move leading to the most visited root child. The first such child
    /// wins a tie.
    pub fn best_move(&self) -> Result<G::Move> {
        self.root()
            .children
            .iter()
            .map(|&child| self.get(child))
            // min_by_key keeps the first of equal keys
            .min_by_key(|node| Reverse(node.visit_count))
            .and_then(|node| node.last_move)
            .ok_or(Error::NoLegalMove)
    }
}

/// Plays uniformly random moves from `state` until the game ends and
/// returns its result.
pub fn rollout<G: Game, R: Rng + ?Sized>(state: &G, rng: &mut R) -> Result<f64> {
    let mut state = state.clone();
    while !state.is_terminal() {
        let moves = state.legal_moves();
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        state = state.apply_move(mv)?;
    }
    Ok(state.result().unwrap_or(0.0))
}

pub struct Mcts {
    config: MctsConfig,
}

impl Mcts {
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }

    /// Builds a search tree for `root` and hands it back for inspection.
    pub fn run<G: Game, R: Rng + ?Sized>(&self, root: &G, rng: &mut R) -> Result<Tree<G>> {
        let MctsConfig {
            iterations,
            exploration_constant,
            perspective,
        } = self.config;

        if iterations == 0 {
            return Err(Error::InvalidIterationCount(iterations));
        }
        if root.is_terminal() {
            return Err(Error::NoLegalMove);
        }

        let mut tree = Tree::new(root.clone());
        for iteration in 0..iterations {
            let selected = tree.select(exploration_constant);
            let leaf = tree.expand(selected)?;
            let result = rollout(tree.get(leaf).state(), rng)?;
            trace!(
                "iteration {}: leaf {:?} after {:?}, rollout result {}",
                iteration,
                leaf,
                tree.get(leaf).last_move(),
                result
            );
            tree.backpropagate(leaf, result, perspective);
        }
        Ok(tree)
    }

    /// Runs a full search from `root` and returns the recommended move.
    pub fn search<G: Game, R: Rng + ?Sized>(&self, root: &G, rng: &mut R) -> Result<G::Move> {
        let tree = self.run(root, rng)?;
        let best_move = tree.best_move()?;

        debug!(
            "picked {:?} after {} iterations, {} nodes",
            best_move,
            self.config.iterations,
            tree.len()
        );
        for &child in tree.root().children() {
            let node = tree.get(child);
            debug!(
                "  {:?}: visits {}, value {:.3}",
                node.last_move(),
                node.visit_count(),
                node.mean_value()
            );
        }
        Ok(best_move)
    }
}

/// Searches `root` for `iterations` passes with the default exploration
/// constant and the absolute backpropagation perspective.
pub fn search<G: Game, R: Rng + ?Sized>(
    root: &G,
    iterations: usize,
    rng: &mut R,
) -> Result<G::Move> {
    Mcts::new(MctsConfig::with_iterations(iterations)).search(root, rng)
}
