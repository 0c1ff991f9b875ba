//! Text state for the content stream interpreter.
//!
//! Tracks the PDF text state parameters (Tc, Tw, Tz, TL, Tf, Ts), the text
//! object (BT/ET), and the text and line matrices moved by Tm, Td, TD and T*.

use pdfregions_core::Ctm;

/// Text state parameters that belong to the graphics state and are saved and
/// restored by `q`/`Q`. The matrices are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Character spacing (Tc), unscaled text space units.
    pub char_spacing: f64,
    /// Word spacing (Tw), applied after single-byte code 32.
    pub word_spacing: f64,
    /// Horizontal scaling (Tz) as a percentage.
    pub h_scaling: f64,
    /// Leading (TL).
    pub leading: f64,
    /// Resource name of the current font (the `/F1` in `/F1 12 Tf`).
    pub font_name: String,
    pub font_size: f64,
    /// Text rise (Ts).
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextState {
    pub params: TextParams,
    in_text_object: bool,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Ctm {
        &self.line_matrix
    }

    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn h_scale(&self) -> f64 {
        self.params.h_scaling / 100.0
    }

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
        self.in_text_object = true;
    }

    /// `ET`.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tf`.
    pub fn set_font(&mut self, font_name: impl Into<String>, font_size: f64) {
        self.params.font_name = font_name.into();
        self.params.font_size = font_size;
    }

    /// `Tm`: replace (not concatenate) both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: translate the line matrix and start a new line there.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty);
        self.line_matrix = translation.concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: same as `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`: same as `0 -TL Td`.
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Move the text matrix `tx` text space units along the baseline.
    pub fn advance(&mut self, tx: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0);
        self.text_matrix = translation.concat(&self.text_matrix);
    }

    /// Horizontal displacement after showing a glyph of width `w0`
    /// (glyph space, 1/1000 em).
    pub fn glyph_displacement(&self, w0: f64, is_space: bool) -> f64 {
        let word_spacing = if is_space {
            self.params.word_spacing
        } else {
            0.0
        };
        ((w0 / 1000.0) * self.params.font_size + self.params.char_spacing + word_spacing)
            * self.h_scale()
    }

    /// Displacement for a numeric TJ adjustment (thousandths of an em;
    /// positive moves left).
    pub fn adjustment_displacement(&self, adjustment: f64) -> f64 {
        -(adjustment / 1000.0) * self.params.font_size * self.h_scale()
    }

    /// Text rendering matrix for the current position:
    /// `[Tfs*Th 0 0 Tfs 0 Trise] x Tm x CTM`.
    pub fn rendering_matrix(&self, ctm: &Ctm) -> Ctm {
        let p = &self.params;
        Ctm::new(p.font_size * self.h_scale(), 0.0, 0.0, p.font_size, 0.0, p.rise)
            .concat(&self.text_matrix)
            .concat(ctm)
    }
}
