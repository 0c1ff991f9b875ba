//! Content stream interpreter.
//!
//! Walks tokenized operators, maintaining the graphics state stack, the text
//! state, and the current path, and reports every shown glyph and painted path
//! to a [`ContentHandler`]. Form XObjects are interpreted recursively with
//! their own resources.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Stream};
use pdfregions_core::{Ctm, PaintOp, Point};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::font::LoadedFont;
use crate::handler::{CharEvent, ContentHandler, PathEvent};
use crate::lopdf_backend::{number, resolve, stream_bytes};
use crate::path_builder::PathBuilder;
use crate::text_state::{TextParams, TextState};
use crate::tokenizer::{Operand, Operator, tokenize};

/// Options controlling content stream interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// How deeply Form XObjects may nest. Deeper forms are skipped.
    pub max_recursion_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
        }
    }
}

/// The parts of the graphics state the interpreter tracks.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Ctm,
    line_width: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Ctm::identity(),
            line_width: 1.0,
        }
    }
}

/// Fonts loaded for one content stream, keyed by resource name.
type FontCache = HashMap<String, LoadedFont>;

pub struct Interpreter<'a> {
    doc: &'a Document,
    options: &'a ExtractOptions,
    handler: &'a mut dyn ContentHandler,
    gstate: GraphicsState,
    stack: Vec<(GraphicsState, TextParams)>,
    text: TextState,
    path: PathBuilder,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        doc: &'a Document,
        options: &'a ExtractOptions,
        handler: &'a mut dyn ContentHandler,
    ) -> Self {
        Self {
            doc,
            options,
            handler,
            gstate: GraphicsState::default(),
            stack: Vec::new(),
            text: TextState::new(),
            path: PathBuilder::new(),
        }
    }

    /// Interpret a page content stream with the page's resources.
    pub fn run(&mut self, content: &[u8], resources: &Dictionary) -> Result<(), BackendError> {
        self.interpret(content, resources, 0)
    }

    fn interpret(
        &mut self,
        content: &[u8],
        resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        if depth > self.options.max_recursion_depth {
            warn!(
                depth,
                limit = self.options.max_recursion_depth,
                "form XObject nesting too deep, skipping"
            );
            return Ok(());
        }

        let (operators, error) = tokenize(content);
        if let Some(e) = error {
            warn!(
                error = %e,
                operators = operators.len(),
                "malformed content stream, interpreting the readable part"
            );
        }
        let mut fonts = FontCache::new();
        for op in &operators {
            self.apply(op, resources, &mut fonts, depth)?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        op: &Operator,
        resources: &Dictionary,
        fonts: &mut FontCache,
        depth: usize,
    ) -> Result<(), BackendError> {
        match op.name.as_str() {
            // Graphics state
            "q" => self
                .stack
                .push((self.gstate.clone(), self.text.params.clone())),
            "Q" => match self.stack.pop() {
                Some((gstate, params)) => {
                    self.gstate = gstate;
                    self.text.params = params;
                }
                None => debug!("unbalanced Q ignored"),
            },
            "cm" => {
                if let Some([a, b, c, d, e, f]) = op.numbers::<6>() {
                    self.gstate.ctm = Ctm::new(a, b, c, d, e, f).concat(&self.gstate.ctm);
                }
            }
            "w" => {
                if let Some(w) = op.f64_at(0) {
                    self.gstate.line_width = w;
                }
            }

            // Text objects and state
            "BT" => self.text.begin_text(),
            "ET" => self.text.end_text(),
            "Tf" => {
                if let (Some(name), Some(size)) =
                    (op.operands.first().and_then(Operand::as_name), op.f64_at(1))
                {
                    self.text.set_font(name, size);
                }
            }
            "Tc" => set(op, &mut self.text.params.char_spacing),
            "Tw" => set(op, &mut self.text.params.word_spacing),
            "Tz" => set(op, &mut self.text.params.h_scaling),
            "TL" => set(op, &mut self.text.params.leading),
            "Ts" => set(op, &mut self.text.params.rise),
            // Render mode does not hide text from extraction.
            "Tr" => {}

            // Text positioning
            "Td" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.text.move_text_position(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.text.move_text_position_and_set_leading(tx, ty);
                }
            }
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = op.numbers::<6>() {
                    self.text.set_text_matrix(Ctm::new(a, b, c, d, e, f));
                }
            }
            "T*" => self.text.move_to_next_line(),

            // Text showing
            "Tj" => {
                if let Some(bytes) = op.operands.first().and_then(Operand::as_bytes) {
                    let font = self.font(resources, fonts);
                    self.show_string(bytes, font);
                }
            }
            "'" => {
                self.text.move_to_next_line();
                if let Some(bytes) = op.operands.first().and_then(Operand::as_bytes) {
                    let font = self.font(resources, fonts);
                    self.show_string(bytes, font);
                }
            }
            "\"" => {
                if let Some([aw, ac]) = op.numbers::<2>() {
                    self.text.params.word_spacing = aw;
                    self.text.params.char_spacing = ac;
                }
                self.text.move_to_next_line();
                if let Some(bytes) = op.operands.get(2).and_then(Operand::as_bytes) {
                    let font = self.font(resources, fonts);
                    self.show_string(bytes, font);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = op.operands.first() {
                    let font = self.font(resources, fonts);
                    for item in items {
                        match item {
                            Operand::String(bytes) => self.show_string(bytes, font),
                            other => {
                                if let Some(adjustment) = other.as_f64() {
                                    let tx = self.text.adjustment_displacement(adjustment);
                                    self.text.advance(tx);
                                }
                            }
                        }
                    }
                }
            }

            // Path construction
            "m" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    let p = self.user_point(x, y);
                    self.path.move_to(p);
                }
            }
            "l" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    let p = self.user_point(x, y);
                    self.path.line_to(p);
                }
            }
            "c" => {
                if let Some([x1, y1, x2, y2, x3, y3]) = op.numbers::<6>() {
                    let (c1, c2, end) = (
                        self.user_point(x1, y1),
                        self.user_point(x2, y2),
                        self.user_point(x3, y3),
                    );
                    self.path.curve_to(c1, c2, end);
                }
            }
            "v" => {
                if let Some([x2, y2, x3, y3]) = op.numbers::<4>() {
                    let (c2, end) = (self.user_point(x2, y2), self.user_point(x3, y3));
                    let c1 = self.path.current_point().unwrap_or(c2);
                    self.path.curve_to(c1, c2, end);
                }
            }
            "y" => {
                if let Some([x1, y1, x3, y3]) = op.numbers::<4>() {
                    let (c1, end) = (self.user_point(x1, y1), self.user_point(x3, y3));
                    self.path.curve_to(c1, end, end);
                }
            }
            "h" => self.path.close(),
            "re" => {
                if let Some([x, y, w, h]) = op.numbers::<4>() {
                    self.path.rect([
                        self.user_point(x, y),
                        self.user_point(x + w, y),
                        self.user_point(x + w, y + h),
                        self.user_point(x, y + h),
                    ]);
                }
            }

            // Path painting
            "S" => self.paint(PaintOp::Stroke),
            "s" => {
                self.path.close();
                self.paint(PaintOp::Stroke);
            }
            "f" | "F" | "f*" => self.paint(PaintOp::Fill),
            "B" | "B*" => self.paint(PaintOp::FillAndStroke),
            "b" | "b*" => {
                self.path.close();
                self.paint(PaintOp::FillAndStroke);
            }
            "n" => self.path.clear(),

            // XObjects
            "Do" => {
                if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                    self.do_xobject(name, resources, depth)?;
                }
            }

            // Clipping, color, marked content, inline images and the rest do
            // not affect text positions.
            _ => {}
        }
        Ok(())
    }

    fn user_point(&self, x: f64, y: f64) -> Point {
        self.gstate.ctm.transform_point(Point::new(x, y))
    }

    /// The current font, loaded from `resources` on first use.
    fn font<'c>(&self, resources: &Dictionary, fonts: &'c mut FontCache) -> &'c LoadedFont {
        let name = &self.text.params.font_name;
        let doc = self.doc;
        fonts.entry(name.clone()).or_insert_with(|| {
            let dict = resources
                .get(b"Font")
                .ok()
                .and_then(|o| resolve(doc, o).as_dict().ok())
                .and_then(|all| all.get(name.as_bytes()).ok())
                .and_then(|o| resolve(doc, o).as_dict().ok());
            match dict {
                Some(dict) => LoadedFont::from_dict(doc, dict).unwrap_or_else(|e| {
                    warn!(font = %name, error = %e, "unusable font, using defaults");
                    LoadedFont::fallback(name)
                }),
                None => {
                    warn!(font = %name, "font not found in resources, using defaults");
                    LoadedFont::fallback(name)
                }
            }
        })
    }

    fn show_string(&mut self, bytes: &[u8], font: &LoadedFont) {
        let metrics = font.metrics();
        for code in font.codes(bytes) {
            let width = font.width(code);
            let trm = self.text.rendering_matrix(&self.gstate.ctm);

            let tx = self.text.glyph_displacement(width, font.is_word_space(code));
            self.text.advance(tx);
            let advance_end = self
                .text
                .text_matrix()
                .concat(&self.gstate.ctm)
                .transform_point(Point::new(0.0, self.text.params.rise));

            self.handler.on_char(CharEvent {
                code,
                text: font.decode(code),
                font_name: font.base_name.clone(),
                trm,
                width,
                ascent: metrics.ascent(),
                descent: metrics.descent(),
                advance_end,
            });
        }
    }

    fn paint(&mut self, paint: PaintOp) {
        let subpaths = self.path.take();
        if subpaths.is_empty() {
            return;
        }
        let ctm = &self.gstate.ctm;
        let scale = ctm.a.hypot(ctm.b);
        self.handler.on_path_painted(PathEvent {
            subpaths,
            paint,
            line_width: self.gstate.line_width * scale,
        });
    }

    fn do_xobject(
        &mut self,
        name: &str,
        resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        let doc = self.doc;
        let stream = resources
            .get(b"XObject")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|all| all.get(name.as_bytes()).ok())
            .and_then(|o| resolve(doc, o).as_stream().ok());
        let Some(stream) = stream else {
            warn!(xobject = %name, "XObject not found in resources");
            return Ok(());
        };

        match stream.dict.get(b"Subtype").and_then(|o| o.as_name()) {
            Ok(b"Form") => self.run_form(name, stream, resources, depth),
            _ => Ok(()),
        }
    }

    fn run_form(
        &mut self,
        name: &str,
        stream: &Stream,
        parent_resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        let doc = self.doc;
        let content = stream_bytes(stream)?;
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .unwrap_or(parent_resources);

        self.stack
            .push((self.gstate.clone(), self.text.params.clone()));
        if let Ok(matrix) = stream.dict.get(b"Matrix").and_then(|o| o.as_array()) {
            let values: Vec<f64> = matrix.iter().filter_map(number).collect();
            if let [a, b, c, d, e, f] = values[..] {
                self.gstate.ctm = Ctm::new(a, b, c, d, e, f).concat(&self.gstate.ctm);
            }
        }

        debug!(xobject = %name, depth = depth + 1, "interpreting form XObject");
        let result = self.interpret(&content, resources, depth + 1);

        if let Some((gstate, params)) = self.stack.pop() {
            self.gstate = gstate;
            self.text.params = params;
        }
        result
    }
}

fn set(op: &Operator, slot: &mut f64) {
    if let Some(v) = op.f64_at(0) {
        *slot = v;
    }
}
