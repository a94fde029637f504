//!
//! # Circuit Data Model
//!
//! Library masters ([Primitive]s and [TerminalTemplate]s), their placed instances
//! ([Block]s and [Terminal]s), and the [Net]s connecting instance pins.
//!
//! Masters live in [SlotMap]s and are referenced by key.
//! Instances live in append-only vectors and are referenced by dense integer ids,
//! which double as array-indices into the placer's per-instance column tables.
//! Pins name their owner with a tagged [PinOwner], never by reference.
//!

// Std-Lib
use std::collections::HashMap;

// Crates.io
use derive_more::From;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// Local Imports
use crate::error::{PlaceError, PlaceResult};
use crate::utils::enumstr;

/// # Location Integer Type-Alias
///
/// Used for block positions and master shapes, in layout grid units.
pub type Int = isize;

// Create key-types for each master type stored in [SlotMap]s
new_key_type! {
    /// Keys for [Primitive] entries
    pub struct PrimitiveKey;
    /// Keys for [TerminalTemplate] entries
    pub struct TerminalTemplateKey;
}

enumstr!(
    /// # Instance Fix Modes
    /// Whether, and along which axes, the placer may move an instance.
    FixMode {
        Free: "FREE",
        FixedXY: "FIXED_XY",
        SlideEdge: "SLIDE_EDGE",
    }
);
impl Default for FixMode {
    fn default() -> Self {
        Self::Free
    }
}

enumstr!(
    /// # Layout Edges
    /// The side of the layout rectangle an I/O terminal is expected to sit on.
    Edge {
        Left: "LEFT",
        Right: "RIGHT",
        Bottom: "BOTTOM",
        Top: "TOP",
    }
);
impl Edge {
    /// The axis along which a terminal on this edge slides
    pub fn slide_dir(self) -> Dir {
        match self {
            Self::Bottom | Self::Top => Dir::Horiz,
            Self::Left | Self::Right => Dir::Vert,
        }
    }
}

/// Direction Enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Horiz,
    Vert,
}

/// # Point in real-valued layout-space
/// Used for pin offsets and terminal positions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
    /// Get the coordinate associated with direction `dir`
    pub fn coord(&self, dir: Dir) -> f64 {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
}
impl From<(f64, f64)> for Point {
    fn from(xy: (f64, f64)) -> Self {
        Self::new(xy.0, xy.1)
    }
}

/// # Point on the integer layout grid
/// Used for block positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: Int,
    pub y: Int,
}
impl GridPoint {
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Get the coordinate associated with direction `dir`
    pub fn coord(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
}
impl From<(Int, Int)> for GridPoint {
    fn from(xy: (Int, Int)) -> Self {
        Self::new(xy.0, xy.1)
    }
}
impl From<GridPoint> for Point {
    fn from(p: GridPoint) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// # Rectangular Master Shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: Int,
    pub height: Int,
}
impl Size {
    pub fn new(width: Int, height: Int) -> Self {
        Self { width, height }
    }
    /// Get the extent in direction `dir`
    pub fn extent(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.width,
            Dir::Vert => self.height,
        }
    }
}
impl From<(Int, Int)> for Size {
    fn from(wh: (Int, Int)) -> Self {
        Self::new(wh.0, wh.1)
    }
}

/// # Pin Template
/// A named connection point, offset from its instance's lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PinTemplate {
    pub name: String,
    pub offset: Point,
}
impl PinTemplate {
    pub fn new(name: impl Into<String>, offset: impl Into<Point>) -> Self {
        Self {
            name: name.into(),
            offset: offset.into(),
        }
    }
}

/// Common interface of library masters: a named shape with ordered pin templates.
pub trait Master {
    fn name(&self) -> &str;
    fn shape(&self) -> Size;
    fn pins(&self) -> &[PinTemplate];
    /// Index of the pin template named `name`, if there is one
    fn pin_index(&self, name: &str) -> Option<usize>;
}

/// Build a pin-name to pin-index lookup
fn pin_name_index(pins: &[PinTemplate]) -> HashMap<String, usize> {
    pins.iter()
        .enumerate()
        .map(|(idx, pin)| (pin.name.clone(), idx))
        .collect()
}

/// # Primitive Library Master
#[derive(Debug, Clone)]
pub struct Primitive {
    pub name: String,
    pub shape: Size,
    pub pins: Vec<PinTemplate>,
    pin_index: HashMap<String, usize>,
}
impl Primitive {
    /// Create a new [Primitive]
    pub fn new(name: impl Into<String>, shape: impl Into<Size>, pins: Vec<PinTemplate>) -> Self {
        let pin_index = pin_name_index(&pins);
        Self {
            name: name.into(),
            shape: shape.into(),
            pins,
            pin_index,
        }
    }
}
impl Master for Primitive {
    fn name(&self) -> &str {
        &self.name
    }
    fn shape(&self) -> Size {
        self.shape
    }
    fn pins(&self) -> &[PinTemplate] {
        &self.pins
    }
    fn pin_index(&self, name: &str) -> Option<usize> {
        self.pin_index.get(name).copied()
    }
}

/// # Terminal Slide Range
/// Bounds on a slideable terminal's coordinate along its edge.
/// The all-zero range means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideRange {
    pub min: f64,
    pub max: f64,
}
impl SlideRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    pub fn is_unset(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }
}

/// # Terminal Template
/// Library master for I/O pads.
#[derive(Debug, Clone)]
pub struct TerminalTemplate {
    pub name: String,
    pub shape: Size,
    pub pins: Vec<PinTemplate>,
    /// Fix mode of instances which do not override it
    pub default_fix: FixMode,
    /// Expected layout edge
    pub edge: Edge,
    /// Slide range of instances which do not override it
    pub default_slide: SlideRange,
    pin_index: HashMap<String, usize>,
}
impl TerminalTemplate {
    /// Create a new [TerminalTemplate], fixed by default
    pub fn new(
        name: impl Into<String>,
        shape: impl Into<Size>,
        pins: Vec<PinTemplate>,
        edge: Edge,
    ) -> Self {
        let pin_index = pin_name_index(&pins);
        Self {
            name: name.into(),
            shape: shape.into(),
            pins,
            default_fix: FixMode::FixedXY,
            edge,
            default_slide: SlideRange::default(),
            pin_index,
        }
    }
    /// Set the default fix mode. Consumes and returns `self` for chaining.
    pub fn with_fix(mut self, fix: FixMode) -> Self {
        self.default_fix = fix;
        self
    }
    /// Set the default slide range. Consumes and returns `self` for chaining.
    pub fn with_slide(mut self, slide: SlideRange) -> Self {
        self.default_slide = slide;
        self
    }
}
impl Master for TerminalTemplate {
    fn name(&self) -> &str {
        &self.name
    }
    fn shape(&self) -> Size {
        self.shape
    }
    fn pins(&self) -> &[PinTemplate] {
        &self.pins
    }
    fn pin_index(&self, name: &str) -> Option<usize> {
        self.pin_index.get(name).copied()
    }
}

/// Dense index of a [Block], in [0, number of blocks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
pub struct BlockId(pub usize);
impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}
/// Dense index of a [Terminal]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
pub struct TerminalId(pub usize);
impl TerminalId {
    pub fn index(self) -> usize {
        self.0
    }
}
/// Dense index of a [Net]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
pub struct NetId(pub usize);
impl NetId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The instance owning a [PinInst]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinOwner {
    Block(BlockId),
    Terminal(TerminalId),
}

/// # Pin Instance
/// A pin of a specific [Block] or [Terminal]: its owner plus the index of its [PinTemplate].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinInst {
    owner: PinOwner,
    template: usize,
}
impl PinInst {
    pub fn owner(&self) -> PinOwner {
        self.owner
    }
    /// Index into the owner master's pin templates
    pub fn template(&self) -> usize {
        self.template
    }
}

/// # Block
/// Placement instance of a [Primitive].
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    /// Lower-left corner, on the layout grid
    pub position: GridPoint,
    pub fix: FixMode,
    master: PrimitiveKey,
    index: BlockId,
    pins: Vec<PinInst>,
}
impl Block {
    pub fn master(&self) -> PrimitiveKey {
        self.master
    }
    pub fn index(&self) -> BlockId {
        self.index
    }
    /// One pin per master pin template, in template order
    pub fn pins(&self) -> &[PinInst] {
        &self.pins
    }
}

/// # Terminal
/// I/O pad instance of a [TerminalTemplate]. Immovable unless its fix mode says otherwise.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub name: String,
    pub position: Point,
    pub fix: FixMode,
    pub edge: Edge,
    pub slide: SlideRange,
    template: TerminalTemplateKey,
    index: TerminalId,
    pins: Vec<PinInst>,
}
impl Terminal {
    pub fn template(&self) -> TerminalTemplateKey {
        self.template
    }
    pub fn index(&self) -> TerminalId {
        self.index
    }
    pub fn pins(&self) -> &[PinInst] {
        &self.pins
    }
    /// Boolean indication of whether the placer may move this terminal
    pub fn is_movable(&self) -> bool {
        self.fix != FixMode::FixedXY
    }
}

/// # Net
/// A named, ordered collection of pins.
#[derive(Debug, Clone)]
pub struct Net {
    pub name: String,
    pins: Vec<PinInst>,
}
impl Net {
    pub fn pins(&self) -> &[PinInst] {
        &self.pins
    }
}

///
/// # Circuit Data
///
/// Owns all masters, instances, and nets of a placement problem.
/// Instances and nets are only appended, so their ids stay valid until [CircuitData::clear].
///
#[derive(Debug, Clone, Default)]
pub struct CircuitData {
    primitives: SlotMap<PrimitiveKey, Primitive>,
    terminal_templates: SlotMap<TerminalTemplateKey, TerminalTemplate>,
    blocks: Vec<Block>,
    terminals: Vec<Terminal>,
    nets: Vec<Net>,
    primitive_by_name: HashMap<String, PrimitiveKey>,
    template_by_name: HashMap<String, TerminalTemplateKey>,
}
impl CircuitData {
    /// Create a new and empty [CircuitData]
    pub fn new() -> Self {
        Self::default()
    }
    /// Remove everything: masters, instances, nets, and lookup indices.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add a [Primitive] master
    pub fn add_primitive(&mut self, prim: Primitive) -> PrimitiveKey {
        let name = prim.name.clone();
        let key = self.primitives.insert(prim);
        if self.primitive_by_name.insert(name.clone(), key).is_some() {
            log::warn!("[add_primitive] duplicate primitive {}, later definition wins", name);
        }
        key
    }
    /// Add a [TerminalTemplate] master
    pub fn add_terminal_template(&mut self, tmpl: TerminalTemplate) -> TerminalTemplateKey {
        let name = tmpl.name.clone();
        let key = self.terminal_templates.insert(tmpl);
        if self.template_by_name.insert(name.clone(), key).is_some() {
            log::warn!(
                "[add_terminal_template] duplicate template {}, later definition wins",
                name
            );
        }
        key
    }
    /// Rebuild the primitive name-index, and each primitive's pin-name index
    pub fn build_primitive_index(&mut self) {
        self.primitive_by_name.clear();
        for (key, prim) in self.primitives.iter_mut() {
            prim.pin_index = pin_name_index(&prim.pins);
            self.primitive_by_name.insert(prim.name.clone(), key);
        }
    }
    /// Rebuild the terminal-template name-index, and each template's pin-name index
    pub fn build_terminal_template_index(&mut self) {
        self.template_by_name.clear();
        for (key, tmpl) in self.terminal_templates.iter_mut() {
            tmpl.pin_index = pin_name_index(&tmpl.pins);
            self.template_by_name.insert(tmpl.name.clone(), key);
        }
    }
    pub fn primitive(&self, key: PrimitiveKey) -> Option<&Primitive> {
        self.primitives.get(key)
    }
    pub fn primitive_named(&self, name: &str) -> Option<PrimitiveKey> {
        self.primitive_by_name.get(name).copied()
    }
    pub fn terminal_template(&self, key: TerminalTemplateKey) -> Option<&TerminalTemplate> {
        self.terminal_templates.get(key)
    }
    pub fn terminal_template_named(&self, name: &str) -> Option<TerminalTemplateKey> {
        self.template_by_name.get(name).copied()
    }
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.values()
    }
    pub fn terminal_templates(&self) -> impl Iterator<Item = &TerminalTemplate> {
        self.terminal_templates.values()
    }

    ///
    /// Instantiate [Primitive] `master` as a new [Block] at `pos`.
    ///
    /// Fails with [PlaceError::NotFound], creating nothing, if no primitive is named `master`.
    ///
    pub fn add_block(
        &mut self,
        name: impl Into<String>,
        master: &str,
        pos: impl Into<GridPoint>,
    ) -> PlaceResult<BlockId> {
        let key = match self.primitive_named(master) {
            Some(key) => key,
            None => {
                log::warn!("[add_block] master not found: {}", master);
                return Err(PlaceError::not_found("primitive", master));
            }
        };
        let index = BlockId(self.blocks.len());
        let npins = self.primitives[key].pins.len();
        let pins = (0..npins)
            .map(|template| PinInst {
                owner: PinOwner::Block(index),
                template,
            })
            .collect();
        self.blocks.push(Block {
            name: name.into(),
            position: pos.into(),
            fix: FixMode::Free,
            master: key,
            index,
            pins,
        });
        Ok(index)
    }
    ///
    /// Instantiate [TerminalTemplate] `template` as a new [Terminal] at `pos`.
    ///
    /// The fix mode defaults to the template's when `fix` is [None].
    /// The slide range defaults to the template's when `slide` is [None] or unset.
    /// Fails with [PlaceError::NotFound], creating nothing, if no template is named `template`.
    ///
    pub fn add_terminal(
        &mut self,
        name: impl Into<String>,
        template: &str,
        pos: impl Into<Point>,
        fix: Option<FixMode>,
        slide: Option<SlideRange>,
    ) -> PlaceResult<TerminalId> {
        let key = match self.terminal_template_named(template) {
            Some(key) => key,
            None => {
                log::warn!("[add_terminal] template not found: {}", template);
                return Err(PlaceError::not_found("terminal template", template));
            }
        };
        let tmpl = &self.terminal_templates[key];
        let index = TerminalId(self.terminals.len());
        let slide = match slide {
            Some(s) if !s.is_unset() => s,
            _ => tmpl.default_slide,
        };
        let pins = (0..tmpl.pins.len())
            .map(|template| PinInst {
                owner: PinOwner::Terminal(index),
                template,
            })
            .collect();
        let terminal = Terminal {
            name: name.into(),
            position: pos.into(),
            fix: fix.unwrap_or(tmpl.default_fix),
            edge: tmpl.edge,
            slide,
            template: key,
            index,
            pins,
        };
        self.terminals.push(terminal);
        Ok(index)
    }
    /// Add a [Net] connecting `pins`.
    /// Fails if any pin does not belong to an instance of this circuit.
    pub fn add_net(
        &mut self,
        name: impl Into<String>,
        pins: impl IntoIterator<Item = PinInst>,
    ) -> PlaceResult<NetId> {
        let name = name.into();
        let pins: Vec<PinInst> = pins.into_iter().collect();
        for pin in pins.iter() {
            let valid = match pin.owner {
                PinOwner::Block(b) => self
                    .blocks
                    .get(b.0)
                    .map_or(false, |blk| pin.template < blk.pins.len()),
                PinOwner::Terminal(t) => self
                    .terminals
                    .get(t.0)
                    .map_or(false, |term| pin.template < term.pins.len()),
            };
            if !valid {
                return Err(PlaceError::not_found("pin", format!("{:?} on net {}", pin, name)));
            }
        }
        let id = NetId(self.nets.len());
        self.nets.push(Net { name, pins });
        Ok(id)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }
    pub fn terminal(&self, id: TerminalId) -> &Terminal {
        &self.terminals[id.0]
    }
    pub fn terminal_mut(&mut self, id: TerminalId) -> &mut Terminal {
        &mut self.terminals[id.0]
    }
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.0]
    }
    /// Find a block by instance name
    pub fn block_named(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.name == name).map(|b| b.index)
    }
    /// Find a terminal by instance name
    pub fn terminal_named(&self, name: &str) -> Option<TerminalId> {
        self.terminals.iter().find(|t| t.name == name).map(|t| t.index)
    }

    /// Get the [Primitive] master of block `id`
    pub fn master(&self, id: BlockId) -> &Primitive {
        &self.primitives[self.blocks[id.0].master]
    }
    /// Get the [TerminalTemplate] of terminal `id`
    pub fn template_of(&self, id: TerminalId) -> &TerminalTemplate {
        &self.terminal_templates[self.terminals[id.0].template]
    }
    /// Get the shape of block `id`
    pub fn block_size(&self, id: BlockId) -> Size {
        self.master(id).shape
    }
    pub fn block_width(&self, id: BlockId) -> Int {
        self.block_size(id).width
    }
    pub fn block_height(&self, id: BlockId) -> Int {
        self.block_size(id).height
    }
    /// Look up pin `pin` of block `id` by name
    pub fn block_pin(&self, id: BlockId, pin: &str) -> PlaceResult<PinInst> {
        let blk = self
            .blocks
            .get(id.0)
            .ok_or_else(|| PlaceError::not_found("block", format!("{:?}", id)))?;
        match self.primitives[blk.master].pin_index(pin) {
            Some(idx) => Ok(blk.pins[idx]),
            None => Err(PlaceError::not_found("pin", format!("{}/{}", blk.name, pin))),
        }
    }
    /// Look up pin `pin` of terminal `id` by name
    pub fn terminal_pin(&self, id: TerminalId, pin: &str) -> PlaceResult<PinInst> {
        let term = self
            .terminals
            .get(id.0)
            .ok_or_else(|| PlaceError::not_found("terminal", format!("{:?}", id)))?;
        match self.terminal_templates[term.template].pin_index(pin) {
            Some(idx) => Ok(term.pins[idx]),
            None => Err(PlaceError::not_found("pin", format!("{}/{}", term.name, pin))),
        }
    }
    /// Get the [PinTemplate] defining `pin`
    pub fn pin_template(&self, pin: &PinInst) -> &PinTemplate {
        match pin.owner {
            PinOwner::Block(b) => &self.master(b).pins[pin.template],
            PinOwner::Terminal(t) => &self.template_of(t).pins[pin.template],
        }
    }
    /// Get a "instance/pin" style name for `pin`
    pub fn pin_name(&self, pin: &PinInst) -> String {
        let owner = match pin.owner {
            PinOwner::Block(b) => &self.blocks[b.0].name,
            PinOwner::Terminal(t) => &self.terminals[t.0].name,
        };
        format!("{}/{}", owner, self.pin_template(pin).name)
    }
    /// Absolute position of `pin`: its owner's position plus its template offset
    pub fn pin_position(&self, pin: &PinInst) -> Point {
        let offset = self.pin_template(pin).offset;
        let origin: Point = match pin.owner {
            PinOwner::Block(b) => self.blocks[b.0].position.into(),
            PinOwner::Terminal(t) => self.terminals[t.0].position,
        };
        Point::new(origin.x + offset.x, origin.y + offset.y)
    }
}
