use crate::body::Body;
use tracing::trace;
use ultraviolet::Vec2;

/// Axis-aligned rectangle covered by a quadtree node.
/// `(x, y)` is the top-left corner; y grows downwards.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The vertical and horizontal split lines of the region.
    pub fn midpoint(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Determines which quadrant fully contains a disc of `radius` at `pos`.
    /// Returns an index from 0 to 3:
    /// 0: Top-Right, 1: Top-Left, 2: Bottom-Left, 3: Bottom-Right.
    ///
    /// Returns `None` when the disc's bounding box touches or straddles either
    /// midpoint; such a body has to stay at the node owning this region.
    pub fn find_quadrant(&self, pos: Vec2, radius: f32) -> Option<usize> {
        let mid = self.midpoint();

        let top = pos.y + radius < mid.y;
        let bottom = pos.y - radius > mid.y;
        let left = pos.x + radius < mid.x;
        let right = pos.x - radius > mid.x;

        match (top, bottom, left, right) {
            (true, _, _, true) => Some(0),
            (true, _, true, _) => Some(1),
            (_, true, true, _) => Some(2),
            (_, true, _, true) => Some(3),
            _ => None,
        }
    }

    /// Divides the region into 4 quadrants, in `find_quadrant` order.
    /// Quadrant sizes are rounded down to whole units.
    pub fn subdivide(&self) -> [Region; 4] {
        let w = (self.width / 2.0).floor();
        let h = (self.height / 2.0).floor();
        let (x, y) = (self.x, self.y);

        [
            Region::new(x + w, y, w, h),
            Region::new(x, y, w, h),
            Region::new(x, y + h, w, h),
            Region::new(x + w, y + h, w, h),
        ]
    }

    /// Quadrants (in `find_quadrant` order) whose side of the midpoints the
    /// box `min..max` reaches, touching included.
    ///
    /// Decided from the midpoints alone, like `find_quadrant`, so a body stored
    /// in a quadrant is always reachable even where the floored child regions
    /// leave a strip uncovered.
    pub fn quadrants_reached(&self, min: Vec2, max: Vec2) -> [bool; 4] {
        let mid = self.midpoint();

        let top = min.y <= mid.y;
        let bottom = max.y >= mid.y;
        let left = min.x <= mid.x;
        let right = max.x >= mid.x;

        [top && right, top && left, bottom && left, bottom && right]
    }

    /// True if the box `min..max` lies inside this region.
    pub fn contains(&self, min: Vec2, max: Vec2) -> bool {
        min.x >= self.x
            && max.x <= self.x + self.width
            && min.y >= self.y
            && max.y <= self.y + self.height
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    /// Depth from the root (root = 0).
    pub level: u32,
    /// Spatial bounds of the node.
    pub region: Region,
    /// Pool indices of the bodies stored directly at this node.
    pub bodies: Vec<u32>,
    /// Index of the first of the four children in the nodes array (0 if leaf).
    pub children: u32,
}

impl Node {
    pub fn new(level: u32, region: Region) -> Self {
        Self {
            level,
            region,
            bodies: Vec::new(),
            children: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children == 0
    }

    pub fn is_branch(&self) -> bool {
        self.children != 0
    }
}

/// Region quadtree used as the collision broad phase.
///
/// Bodies are referenced by their index in the caller's body slice. Every
/// body lives at exactly one node: the deepest node with a quadrant that
/// fully contains it. Nodes live in a flat vector; children of a node are
/// always allocated as four consecutive entries.
#[derive(Debug, Clone)]
pub struct Quadtree {
    /// Bodies a node holds before it tries to split.
    pub capacity: usize,
    /// Nodes at this depth never split and may exceed `capacity`.
    pub max_depth: u32,
    /// Linearized tree nodes. `nodes[ROOT]` always exists.
    pub nodes: Vec<Node>,
}

impl Quadtree {
    pub const ROOT: usize = 0;
    pub const DEFAULT_CAPACITY: usize = 4;
    pub const DEFAULT_MAX_DEPTH: u32 = 12;

    pub fn new(region: Region) -> Self {
        Self::with_limits(region, Self::DEFAULT_CAPACITY, Self::DEFAULT_MAX_DEPTH)
    }

    pub fn with_limits(region: Region, capacity: usize, max_depth: u32) -> Self {
        Self {
            capacity,
            max_depth,
            nodes: vec![Node::new(0, region)],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    /// Drops every node below the root and empties the root's body list.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[Self::ROOT];
        root.bodies.clear();
        root.children = 0;
    }

    /// Creates the four children of `node` and returns the index of the first.
    /// Bodies already stored at `node` are left where they are.
    /// Splitting a branch is a no-op.
    pub fn split(&mut self, node: usize) -> usize {
        if self.nodes[node].is_branch() {
            return self.nodes[node].children as usize;
        }

        let children = self.nodes.len();
        let level = self.nodes[node].level + 1;
        let quads = self.nodes[node].region.subdivide();

        self.nodes[node].children = children as u32;
        self.nodes.extend(quads.into_iter().map(|quad| Node::new(level, quad)));

        trace!(node, level, "split quadtree node");
        children
    }

    /// Quadrant of `node` that fully contains `body`, if any.
    pub fn find_quadrant(&self, node: usize, body: &Body) -> Option<usize> {
        self.nodes[node].region.find_quadrant(body.pos, body.radius())
    }

    /// Inserts body `id` (an index into `bodies`) starting at the root.
    pub fn insert(&mut self, id: u32, bodies: &[Body]) {
        self.insert_at(Self::ROOT, id, bodies);
    }

    fn insert_at(&mut self, node: usize, id: u32, bodies: &[Body]) {
        let body = &bodies[id as usize];

        if self.nodes[node].is_branch() {
            if let Some(quadrant) = self.find_quadrant(node, body) {
                let child = self.nodes[node].children as usize + quadrant;
                self.insert_at(child, id, bodies);
                return;
            }
        }

        self.nodes[node].bodies.push(id);

        let n = &self.nodes[node];
        if n.bodies.len() <= self.capacity || n.level >= self.max_depth {
            return;
        }

        let children = self.split(node);
        let region = self.nodes[node].region;

        // Collect first, then reinsert, so the list is never walked while it shrinks.
        let mut moved = Vec::new();
        self.nodes[node].bodies.retain(|&other| {
            let b = &bodies[other as usize];
            match region.find_quadrant(b.pos, b.radius()) {
                Some(quadrant) => {
                    moved.push((children + quadrant, other));
                    false
                }
                None => true,
            }
        });

        for (child, other) in moved {
            self.insert_at(child, other, bodies);
        }
    }

    /// Collects the bodies that may overlap `body`.
    ///
    /// Walks from the root towards the deepest node with a quadrant fully
    /// containing `body`, collecting every list along the path. Sibling
    /// quadrants are not visited, so two overlapping bodies that sit in two
    /// different children of the same node do not see each other. The
    /// result includes `body` itself when it is stored in the tree.
    pub fn retrieve(&self, body: &Body, out: &mut Vec<u32>) {
        let mut node = Self::ROOT;

        loop {
            let n = &self.nodes[node];
            out.extend_from_slice(&n.bodies);

            if n.is_leaf() {
                break;
            }
            match n.region.find_quadrant(body.pos, body.radius()) {
                Some(quadrant) => node = n.children as usize + quadrant,
                None => break,
            }
        }
    }

    /// Collects the bodies stored in every quadrant the bounding box of `body`
    /// reaches, siblings included. Costs more than
    /// [`retrieve`](Self::retrieve) but finds pairs split across quadrants.
    pub fn retrieve_overlapping(&self, body: &Body, out: &mut Vec<u32>) {
        let (min, max) = body.bounds();
        let mut stack = vec![Self::ROOT];

        while let Some(node) = stack.pop() {
            let n = &self.nodes[node];
            out.extend_from_slice(&n.bodies);

            if n.is_branch() {
                let first = n.children as usize;
                let reached = n.region.quadrants_reached(min, max);
                for (quadrant, &hit) in reached.iter().enumerate() {
                    if hit {
                        stack.push(first + quadrant);
                    }
                }
            }
        }
    }

    /// Regions of all nodes, parents before children. Used for debug overlays.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.nodes.iter().map(|n| n.region)
    }

    /// Number of bodies stored across all nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.bodies.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.bodies.is_empty())
    }
}
