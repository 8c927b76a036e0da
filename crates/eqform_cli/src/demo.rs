//! Built-in demo equation and frame snapshots

use anyhow::{Context, Result};
use eqform::{Equation, EquationConfig, FormOptions, Phrase, PropertyPatch};
use eqform_core::{Color, Element, FontSpec, SceneElement};
use eqform_layout::{FixedAdvanceMetrics, FractionOptions};
use serde::Serialize;

/// Forms of the demo, in series order
pub const FORMS: [&str; 3] = ["sum", "solved", "halved"];

/// `a + b = c`, `a = c - b`, `a = (c - b) / 2`
pub fn build(config: EquationConfig, advance: f32) -> Result<Equation> {
    let mut eq = Equation::with_metrics(config, FixedAdvanceMetrics::new(advance));
    for name in ["a", "b", "c"] {
        eq.add_element(Element::text(name, name));
    }
    for name in ["+", "=", "-", "2"] {
        eq.add_element(Element::text(name, name).with_font(FontSpec::default().normal()));
    }
    eq.add_element(Element::bar("v"));

    eq.add_form(
        "sum",
        vec!["a", "+", "b", "=", "c"],
        FormOptions::new().with_description("Start with the sum"),
    )
    .context("laying out form 'sum'")?;
    eq.add_form(
        "solved",
        vec!["a", "=", "c", "-", "b"],
        FormOptions::new()
            .with_description("Move b across the equals sign")
            .with_mod("b", PropertyPatch::color(Color::RED)),
    )
    .context("laying out form 'solved'")?;
    eq.add_form(
        "halved",
        Phrase::seq([
            Phrase::elem("a"),
            Phrase::elem("="),
            Phrase::frac(vec!["c", "-", "b"], "2", Some("v")).with_fraction_options(FractionOptions {
                width_ratio: 1.1,
                ..FractionOptions::default()
            }),
        ]),
        FormOptions::new().with_description("Divide the right side by two"),
    )
    .context("laying out form 'halved'")?;
    Ok(eq)
}

#[derive(Debug, Serialize)]
pub struct ElementState {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub opacity: f32,
}

#[derive(Debug, Serialize)]
pub struct Frame {
    pub time: f32,
    pub form: Option<String>,
    pub animating: bool,
    /// Visible elements only
    pub elements: Vec<ElementState>,
}

impl Frame {
    pub fn capture(eq: &Equation, time: f32) -> Self {
        let scene = eq.scene();
        let elements = scene
            .iter()
            .filter(|(_, e)| e.is_visible())
            .map(|(id, e)| {
                let t = e.transform();
                ElementState {
                    name: scene.name_of(id).unwrap_or_default().to_string(),
                    x: t.translation.x,
                    y: t.translation.y,
                    scale_x: t.scale.x,
                    scale_y: t.scale.y,
                    rotation: t.rotation,
                    opacity: e.opacity(),
                }
            })
            .collect();
        Self {
            time,
            form: eq.current_form_name().map(str::to_string),
            animating: eq.is_animating(),
            elements,
        }
    }
}
