//!
//! # Circuit Files
//!
//! Serializable description of a placement problem: library masters, instances, and nets.
//! [CircuitSpec] is plain [serde] data, loadable from JSON, YAML, or TOML.
//! It is converted to and from [CircuitData] via the circuit's own factory methods,
//! so loaded circuits pass the same master and pin validation as programmatically built ones.
//!
//! Net pins are named `INSTANCE/PIN`, where `INSTANCE` is a block or terminal name.
//!
//! ```yaml
//! name: pair
//! primitives:
//!   - name: UNIT
//!     width: 1
//!     height: 1
//!     pins:
//!       - { name: C, x: 0.5, y: 0.5 }
//! blocks:
//!   - { name: A, master: UNIT, x: 0, y: 0 }
//!   - { name: B, master: UNIT, x: 0, y: 0 }
//! nets:
//!   - { name: N_AB, pins: [A/C, B/C] }
//! ```
//!

// Std-Lib
use std::collections::HashMap;
use std::path::Path;

// Crates.io
use serde::{Deserialize, Serialize};

// Local Imports
use crate::circuit::{CircuitData, Edge, FixMode, Int, PinInst, PinOwner, PinTemplate};
use crate::circuit::{Primitive, SlideRange, TerminalTemplate};
use crate::error::{PlaceError, PlaceResult};
use crate::utils::{ErrorContext, ErrorHelper, SerdeFile, SerializationFormat, Unwrapper};

/// Pin template: a name and an offset from the instance origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Primitive master
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveSpec {
    pub name: String,
    pub width: Int,
    pub height: Int,
    #[serde(default)]
    pub pins: Vec<PinSpec>,
}

/// Terminal template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalTemplateSpec {
    pub name: String,
    pub width: Int,
    pub height: Int,
    pub edge: Edge,
    /// Default fix mode of instances. Fixed if unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide: Option<SlideRange>,
    #[serde(default)]
    pub pins: Vec<PinSpec>,
}

/// Block instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub name: String,
    pub master: String,
    #[serde(default)]
    pub x: Int,
    #[serde(default)]
    pub y: Int,
    #[serde(default)]
    pub fix: FixMode,
}

/// Terminal instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSpec {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Overrides the template's fix mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixMode>,
    /// Overrides the template's slide range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide: Option<SlideRange>,
}

/// Net, with pins named `INSTANCE/PIN`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSpec {
    pub name: String,
    #[serde(default)]
    pub pins: Vec<String>,
}

/// # Circuit Description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub primitives: Vec<PrimitiveSpec>,
    #[serde(default)]
    pub terminal_templates: Vec<TerminalTemplateSpec>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub terminals: Vec<TerminalSpec>,
    #[serde(default)]
    pub nets: Vec<NetSpec>,
}
impl SerdeFile for CircuitSpec {}

impl CircuitSpec {
    /// Build a [CircuitData]. Fails with [PlaceError::Import] on any unresolvable reference.
    pub fn build(&self) -> PlaceResult<CircuitData> {
        CircuitImporter::import(self)
    }
    /// Describe `circuit`, including its current placement
    pub fn from_circuit(name: impl Into<String>, circuit: &CircuitData) -> Self {
        let pins = |pins: &[PinTemplate]| -> Vec<PinSpec> {
            pins.iter()
                .map(|p| PinSpec {
                    name: p.name.clone(),
                    x: p.offset.x,
                    y: p.offset.y,
                })
                .collect()
        };
        Self {
            name: name.into(),
            primitives: circuit
                .primitives()
                .map(|p| PrimitiveSpec {
                    name: p.name.clone(),
                    width: p.shape.width,
                    height: p.shape.height,
                    pins: pins(&p.pins),
                })
                .collect(),
            terminal_templates: circuit
                .terminal_templates()
                .map(|t| TerminalTemplateSpec {
                    name: t.name.clone(),
                    width: t.shape.width,
                    height: t.shape.height,
                    edge: t.edge,
                    fix: Some(t.default_fix),
                    slide: Some(t.default_slide).filter(|s| !s.is_unset()),
                    pins: pins(&t.pins),
                })
                .collect(),
            blocks: circuit
                .blocks()
                .iter()
                .map(|b| BlockSpec {
                    name: b.name.clone(),
                    master: circuit.master(b.index()).name.clone(),
                    x: b.position.x,
                    y: b.position.y,
                    fix: b.fix,
                })
                .collect(),
            terminals: circuit
                .terminals()
                .iter()
                .map(|t| TerminalSpec {
                    name: t.name.clone(),
                    template: circuit.template_of(t.index()).name.clone(),
                    x: t.position.x,
                    y: t.position.y,
                    fix: Some(t.fix),
                    slide: Some(t.slide).filter(|s| !s.is_unset()),
                })
                .collect(),
            nets: circuit
                .nets()
                .iter()
                .map(|n| NetSpec {
                    name: n.name.clone(),
                    pins: n.pins().iter().map(|p| circuit.pin_name(p)).collect(),
                })
                .collect(),
        }
    }
}

impl CircuitData {
    /// Load a circuit from file `fname`, in format `fmt`
    pub fn open(fname: impl AsRef<Path>, fmt: SerializationFormat) -> PlaceResult<Self> {
        let spec: CircuitSpec = fmt.open(fname)?;
        spec.build()
    }
    /// Load a circuit from string `txt`, in format `fmt`
    pub fn from_str(txt: &str, fmt: SerializationFormat) -> PlaceResult<Self> {
        let spec: CircuitSpec = fmt.from_str(txt)?;
        spec.build()
    }
    /// Save the circuit, including its current placement, to file `fname`
    pub fn save(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> PlaceResult<()> {
        let name = fname
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        CircuitSpec::from_circuit(name, self).save(fmt, fname)?;
        Ok(())
    }
}

/// # Circuit Importer
/// Builds a [CircuitData] from a [CircuitSpec], tracking context for error reporting.
struct CircuitImporter {
    circuit: CircuitData,
    ctx: Vec<ErrorContext>,
    /// Instance names, shared among blocks and terminals
    instances: HashMap<String, PinOwner>,
}
impl CircuitImporter {
    fn import(spec: &CircuitSpec) -> PlaceResult<CircuitData> {
        let mut this = Self {
            circuit: CircuitData::new(),
            ctx: vec![ErrorContext::Circuit(spec.name.clone())],
            instances: HashMap::new(),
        };
        for prim in spec.primitives.iter() {
            this.import_primitive(prim)?;
        }
        for tmpl in spec.terminal_templates.iter() {
            this.import_terminal_template(tmpl)?;
        }
        for blk in spec.blocks.iter() {
            this.import_block(blk)?;
        }
        for term in spec.terminals.iter() {
            this.import_terminal(term)?;
        }
        for net in spec.nets.iter() {
            this.import_net(net)?;
        }
        log::debug!(
            "Imported circuit `{}`: {} blocks, {} terminals, {} nets",
            spec.name,
            this.circuit.num_blocks(),
            this.circuit.terminals().len(),
            this.circuit.nets().len()
        );
        Ok(this.circuit)
    }
    fn import_pins(&self, pins: &[PinSpec]) -> PlaceResult<Vec<PinTemplate>> {
        let mut names = std::collections::HashSet::new();
        let mut rv = Vec::with_capacity(pins.len());
        for pin in pins {
            self.assert(
                names.insert(pin.name.as_str()),
                format!("duplicate pin `{}`", pin.name),
            )?;
            rv.push(PinTemplate::new(pin.name.clone(), (pin.x, pin.y)));
        }
        Ok(rv)
    }
    fn import_primitive(&mut self, spec: &PrimitiveSpec) -> PlaceResult<()> {
        self.ctx.push(ErrorContext::Primitive(spec.name.clone()));
        self.assert(
            spec.width > 0 && spec.height > 0,
            format!("invalid shape {}x{}", spec.width, spec.height),
        )?;
        let pins = self.import_pins(&spec.pins)?;
        let shape = (spec.width, spec.height);
        self.circuit
            .add_primitive(Primitive::new(spec.name.clone(), shape, pins));
        self.ctx.pop();
        Ok(())
    }
    fn import_terminal_template(&mut self, spec: &TerminalTemplateSpec) -> PlaceResult<()> {
        self.ctx.push(ErrorContext::TerminalTemplate(spec.name.clone()));
        let pins = self.import_pins(&spec.pins)?;
        let shape = (spec.width, spec.height);
        let mut tmpl = TerminalTemplate::new(spec.name.clone(), shape, pins, spec.edge);
        if let Some(fix) = spec.fix {
            tmpl = tmpl.with_fix(fix);
        }
        if let Some(slide) = spec.slide {
            self.assert(
                slide.min <= slide.max,
                format!("empty slide range [{}, {}]", slide.min, slide.max),
            )?;
            tmpl = tmpl.with_slide(slide);
        }
        self.circuit.add_terminal_template(tmpl);
        self.ctx.pop();
        Ok(())
    }
    /// Check that instance name `name` is not yet taken
    fn check_instance_name(&self, name: &str) -> PlaceResult<()> {
        self.assert(
            !self.instances.contains_key(name),
            format!("duplicate instance name `{}`", name),
        )
    }
    fn import_block(&mut self, spec: &BlockSpec) -> PlaceResult<()> {
        self.ctx.push(ErrorContext::Block(spec.name.clone()));
        self.check_instance_name(&spec.name)?;
        let id = self
            .circuit
            .add_block(spec.name.clone(), &spec.master, (spec.x, spec.y))
            .unwrapper(self, format!("unknown primitive `{}`", spec.master))?;
        self.circuit.block_mut(id).fix = spec.fix;
        self.instances.insert(spec.name.clone(), PinOwner::Block(id));
        self.ctx.pop();
        Ok(())
    }
    fn import_terminal(&mut self, spec: &TerminalSpec) -> PlaceResult<()> {
        self.ctx.push(ErrorContext::Terminal(spec.name.clone()));
        self.check_instance_name(&spec.name)?;
        let id = self
            .circuit
            .add_terminal(
                spec.name.clone(),
                &spec.template,
                (spec.x, spec.y),
                spec.fix,
                spec.slide,
            )
            .unwrapper(self, format!("unknown terminal template `{}`", spec.template))?;
        let slide = self.circuit.terminal(id).slide;
        self.assert(
            slide.min <= slide.max,
            format!("empty slide range [{}, {}]", slide.min, slide.max),
        )?;
        self.instances.insert(spec.name.clone(), PinOwner::Terminal(id));
        self.ctx.pop();
        Ok(())
    }
    fn import_net(&mut self, spec: &NetSpec) -> PlaceResult<()> {
        self.ctx.push(ErrorContext::Net(spec.name.clone()));
        let pins = spec
            .pins
            .iter()
            .map(|p| self.import_pin_ref(p))
            .collect::<PlaceResult<Vec<_>>>()?;
        self.circuit.add_net(spec.name.clone(), pins)?;
        self.ctx.pop();
        Ok(())
    }
    /// Resolve an `INSTANCE/PIN` reference
    fn import_pin_ref(&self, txt: &str) -> PlaceResult<PinInst> {
        let (inst, pin) = txt
            .rsplit_once('/')
            .unwrapper(self, format!("invalid pin reference `{}`, expected INSTANCE/PIN", txt))?;
        let owner = self
            .instances
            .get(inst)
            .copied()
            .unwrapper(self, format!("unknown instance `{}`", inst))?;
        let rv = match owner {
            PinOwner::Block(b) => self.circuit.block_pin(b, pin),
            PinOwner::Terminal(t) => self.circuit.terminal_pin(t, pin),
        };
        rv.unwrapper(self, format!("unknown pin `{}`", txt))
    }
}
impl ErrorHelper for CircuitImporter {
    type Error = PlaceError;
    fn err(&self, msg: impl Into<String>) -> PlaceError {
        PlaceError::Import {
            message: msg.into(),
            stack: self.ctx.clone(),
        }
    }
}
