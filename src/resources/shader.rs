//! Runtime WGSL compilation for the blur passes.
//!
//! The blur stages are plain files under the asset root, so a broken edit
//! shows up as a construction error carrying the compiler messages instead
//! of a wgpu panic later on.

use std::fmt::Write;

use anyhow::bail;

/// One compiler message with its position in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub kind: &'static str,
    pub line: u32,
    pub column: u32,
    pub text: String,
}

impl From<&wgpu::CompilationMessage> for LogLine {
    fn from(message: &wgpu::CompilationMessage) -> Self {
        let kind = match message.message_type {
            wgpu::CompilationMessageType::Error => "error",
            wgpu::CompilationMessageType::Warning => "warning",
            wgpu::CompilationMessageType::Info => "info",
        };
        let (line, column) = message
            .location
            .map_or((0, 0), |l| (l.line_number, l.line_position));
        Self {
            kind,
            line,
            column,
            text: message.message.clone(),
        }
    }
}

/// Format messages as `kind line:col message`, one per line.
pub fn render_log(lines: &[LogLine]) -> String {
    let mut out = String::new();
    for l in lines {
        let _ = writeln!(out, "{} {}:{} {}", l.kind, l.line, l.column, l.text);
    }
    out
}

/// Build a module inside a validation error scope.
///
/// Scopes form a stack on the device, so compile one module at a time.
pub async fn compile_shader(
    device: &wgpu::Device,
    source: String,
    path: &str,
    label: &str,
) -> anyhow::Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let info = module.get_compilation_info().await;
    let scope_error = device.pop_error_scope().await;

    let log = info.messages.iter().map(LogLine::from).collect::<Vec<_>>();
    let failed = log.iter().any(|l| l.kind == "error");
    if failed || scope_error.is_some() {
        let mut text = render_log(&log);
        if let Some(e) = scope_error {
            let _ = writeln!(text, "{e}");
        }
        bail!("shader {path} failed to compile:\n{text}");
    }
    if !log.is_empty() {
        log::warn!("shader {path}:\n{}", render_log(&log));
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_are_formatted_per_message() {
        let log = [
            LogLine {
                kind: "error",
                line: 3,
                column: 14,
                text: "unknown identifier `u_radius`".into(),
            },
            LogLine {
                kind: "warning",
                line: 9,
                column: 1,
                text: "unused variable".into(),
            },
        ];
        assert_eq!(
            render_log(&log),
            "error 3:14 unknown identifier `u_radius`\nwarning 9:1 unused variable\n"
        );
    }

    #[test]
    fn empty_log_is_empty() {
        assert_eq!(render_log(&[]), "");
    }
}
