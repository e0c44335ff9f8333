//! WGSL shader programs with entry-point discovery.

use crate::error::{EngineError, EngineResult};

/// Entry points found in a WGSL source, first declaration per stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    pub vertex: Option<String>,
    pub fragment: Option<String>,
}

/// Parses `source` and lists its vertex and fragment entry points.
///
/// A source that does not parse is a `Shader` error naming `label`.
pub fn entry_points(label: &str, source: &str) -> EngineResult<EntryPoints> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|err| EngineError::shader(label, err.emit_to_string(source)))?;

    let mut found = EntryPoints::default();
    for entry in &module.entry_points {
        let slot = match entry.stage {
            naga::ShaderStage::Vertex => &mut found.vertex,
            naga::ShaderStage::Fragment => &mut found.fragment,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(entry.name.clone());
        }
    }
    Ok(found)
}

/// A compiled shader module plus its entry points.
///
/// A vertex entry is required. A missing fragment entry is not an error; the
/// program is then used for depth/stencil-only passes.
#[derive(Debug)]
pub struct Program {
    label: String,
    module: wgpu::ShaderModule,
    vertex: String,
    fragment: Option<String>,
}

impl Program {
    pub fn new(device: &wgpu::Device, label: &str, source: &str) -> EngineResult<Self> {
        let entries = entry_points(label, source)?;
        let Some(vertex) = entries.vertex else {
            return Err(EngineError::shader(label, "no @vertex entry point"));
        };

        if entries.fragment.is_none() {
            log::debug!("shader `{label}` has no fragment stage");
        }

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(Self {
            label: label.to_owned(),
            module,
            vertex,
            fragment: entries.fragment,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex
    }

    pub fn fragment_entry(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> EntryPoints {
        entry_points("test", source).unwrap()
    }

    const VS: &str = "-> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
    const FS: &str = "-> @location(0) vec4<f32> { return vec4<f32>(1.0); }";

    #[test]
    fn finds_both_stages() {
        let src = r#"
            @vertex
            fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(p, 1.0);
            }

            @fragment fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0);
            }
        "#;
        let e = scan(src);
        assert_eq!(e.vertex.as_deref(), Some("vs_main"));
        assert_eq!(e.fragment.as_deref(), Some("fs_main"));
    }

    #[test]
    fn missing_fragment_is_absent() {
        let e = scan(&format!("@vertex fn vs_shadow() {VS}"));
        assert_eq!(e.vertex.as_deref(), Some("vs_shadow"));
        assert!(e.fragment.is_none());
    }

    #[test]
    fn commented_entries_are_ignored() {
        let src = format!(
            r#"
            // @fragment fn fs_line() {FS}
            /* @fragment
               fn fs_block() {FS} */
            @vertex fn vs() {VS}
            fn helper() {{}}
        "#
        );
        let e = scan(&src);
        assert_eq!(e.vertex.as_deref(), Some("vs"));
        assert!(e.fragment.is_none());
    }

    #[test]
    fn entries_split_across_lines_are_found() {
        let src = format!(
            r#"
            @vertex
            fn
            vs_split() {VS}
            @fragment
            fn
            fs_split() {FS}
        "#
        );
        let e = scan(&src);
        assert_eq!(e.vertex.as_deref(), Some("vs_split"));
        assert_eq!(e.fragment.as_deref(), Some("fs_split"));
    }

    #[test]
    fn plain_functions_and_compute_are_skipped() {
        let src = format!(
            r#"
            fn lit(n: vec3<f32>) -> f32 {{ return 1.0; }}
            @compute @workgroup_size(64) fn cs_main() {{}}
            @fragment fn fs() {FS}
        "#
        );
        let e = scan(&src);
        assert!(e.vertex.is_none());
        assert_eq!(e.fragment.as_deref(), Some("fs"));
    }

    #[test]
    fn first_declaration_wins() {
        let src = format!("@vertex fn a() {VS} @vertex fn b() {VS}");
        assert_eq!(scan(&src).vertex.as_deref(), Some("a"));
    }

    #[test]
    fn unparsable_source_is_a_shader_error() {
        let err = entry_points("broken", "@vertex fn vs( {").unwrap_err();
        assert!(matches!(err, EngineError::Shader { ref label, .. } if label == "broken"));
    }
}
