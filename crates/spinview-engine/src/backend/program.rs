use std::collections::HashMap;

use crate::view::ViewError;

/// Shader program description handed to [`RenderBackend::link_program`](super::RenderBackend::link_program).
///
/// Compilation happens in the backend; the name tables describe what the
/// source declares so slots can be looked up by name afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub label: &'a str,

    /// WGSL source containing both entry points.
    pub wgsl: &'a str,

    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,

    /// Attribute name → vertex input location.
    pub attributes: &'a [(&'a str, u32)],

    /// Uniform name → binding in bind group 0. Each uniform is one `mat4x4<f32>`.
    pub uniforms: &'a [(&'a str, u32)],

    /// Opt into depth testing when the view has a depth buffer.
    pub depth_test: bool,
}

/// Owned, validated name tables of a linked program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInterface {
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, u32>,
    depth_test: bool,
}

impl ProgramInterface {
    /// Builds the interface, rejecting duplicate names or locations.
    pub fn from_source(source: &ProgramSource<'_>) -> Result<Self, ViewError> {
        let attributes = table(source.label, "attribute", source.attributes)?;
        let uniforms = table(source.label, "uniform", source.uniforms)?;
        Ok(Self {
            attributes,
            uniforms,
            depth_test: source.depth_test,
        })
    }

    #[inline]
    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    #[inline]
    pub fn uniform(&self, name: &str) -> Option<u32> {
        self.uniforms.get(name).copied()
    }

    /// Uniform bindings in ascending order.
    pub fn uniform_bindings(&self) -> Vec<u32> {
        let mut b: Vec<u32> = self.uniforms.values().copied().collect();
        b.sort_unstable();
        b
    }

    #[inline]
    pub fn depth_test(&self) -> bool {
        self.depth_test
    }
}

fn table(
    label: &str,
    what: &str,
    entries: &[(&str, u32)],
) -> Result<HashMap<String, u32>, ViewError> {
    let mut out = HashMap::with_capacity(entries.len());
    for &(name, location) in entries {
        if out.values().any(|&l| l == location) {
            return Err(ViewError::ProgramLink(format!(
                "{label}: {what} location {location} is declared twice"
            )));
        }
        if out.insert(name.to_owned(), location).is_some() {
            return Err(ViewError::ProgramLink(format!(
                "{label}: {what} `{name}` is declared twice"
            )));
        }
    }
    Ok(out)
}
