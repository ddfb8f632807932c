use std::fs;
use std::process::Command;

use thiserror::Error;

use crate::config::CompilerConfig;
use crate::converter::SemanticRule;

const VANILLA_HEADER: &str = "/* Generated vanilla CSS */\n/* Converted from Tailwind CSS */\n\n";

const TAILWIND_CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
module.exports = {
  content: ["./input.css"],
  theme: {
    extend: {},
  },
  plugins: [],
}
"#;

const TAILWIND_DIRECTIVES: &str =
    "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n";

/// Turns `@apply` CSS into plain CSS.
pub trait CssCompiler {
    fn compile(&self, apply_css: &str) -> Result<String, CompileError>;
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0} not found. Please install Node.js and npm")]
    MissingCommand(String),

    #[error("compiler I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("compilation failed: {command} exited with {status}\nOutput: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

/// Runs the Tailwind CLI (`npx tailwindcss` by default) inside a scratch
/// directory holding a minimal config and the input stylesheet.
#[derive(Debug, Clone)]
pub struct TailwindCli {
    command: String,
    args: Vec<String>,
}

impl TailwindCli {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl CssCompiler for TailwindCli {
    fn compile(&self, apply_css: &str) -> Result<String, CompileError> {
        let program = which::which(&self.command)
            .map_err(|_| CompileError::MissingCommand(self.command.clone()))?;

        let workdir = tempfile::tempdir()?;
        let config_path = workdir.path().join("tailwind.config.js");
        let input_path = workdir.path().join("input.css");
        let output_path = workdir.path().join("output.css");
        fs::write(&config_path, TAILWIND_CONFIG)?;
        fs::write(&input_path, format!("{}{}", TAILWIND_DIRECTIVES, apply_css))?;

        tracing::debug!("running {} {}", self.command, self.args.join(" "));
        let output = Command::new(&program)
            .args(&self.args)
            .arg("-i")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .arg("--config")
            .arg(&config_path)
            .arg("--minify")
            .current_dir(workdir.path())
            .output()?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(CompileError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(fs::read_to_string(&output_path)?)
    }
}

/// Compiles `apply_css` and keeps only the blocks that mention `rules`.
pub fn compile_rules(
    compiler: &dyn CssCompiler,
    apply_css: &str,
    rules: &[SemanticRule],
) -> Result<String, CompileError> {
    let compiled = compiler.compile(apply_css)?;
    let selectors: Vec<String> = rules.iter().map(SemanticRule::selector).collect();
    Ok(extract_component_css(&compiled, &selectors))
}

/// Drops the framework's base layer from compiled output: top-level blocks
/// are kept only when they reference one of `selectors`. Returns an empty
/// string when nothing matches.
pub fn extract_component_css(compiled: &str, selectors: &[String]) -> String {
    let kept: Vec<&str> = top_level_blocks(compiled)
        .into_iter()
        .filter(|block| selectors.iter().any(|selector| mentions(block, selector)))
        .collect();
    if kept.is_empty() {
        return String::new();
    }
    format!("{}{}\n", VANILLA_HEADER, kept.join("\n\n"))
}

/// Splits a stylesheet into brace-balanced top-level blocks, skipping
/// comments.
fn top_level_blocks(css: &str) -> Vec<&str> {
    let bytes = css.as_bytes();
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index..].starts_with(b"/*") {
            index = css[index + 2..]
                .find("*/")
                .map(|end| index + 2 + end + 2)
                .unwrap_or(bytes.len());
            continue;
        }
        match bytes[index] {
            b'{' => depth += 1,
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        blocks.push(css[begin..=index].trim());
                    }
                }
            }
            byte if depth == 0 && start.is_none() && !byte.is_ascii_whitespace() => {
                start = Some(index);
            }
            _ => {}
        }
        index += 1;
    }
    blocks
}

/// `.card` matches `.card{` and `.card:hover` but not `.card-body`.
fn mentions(block: &str, selector: &str) -> bool {
    block.match_indices(selector).any(|(at, _)| {
        block[at + selector.len()..]
            .chars()
            .next()
            .is_none_or(|next| !(next.is_ascii_alphanumeric() || next == '-' || next == '_'))
    })
}

#[cfg(test)]
mod tests {
    use super::{CompileError, CssCompiler, TailwindCli, compile_rules, extract_component_css};
    use crate::config::CompilerConfig;
    use crate::converter::SemanticRule;
    use pretty_assertions::assert_eq;

    struct Echo;

    impl CssCompiler for Echo {
        fn compile(&self, apply_css: &str) -> Result<String, CompileError> {
            Ok(format!("*,:after{{box-sizing:border-box}}.ignored{{color:red}}{}", apply_css))
        }
    }

    fn selectors(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| format!(".{}", name)).collect()
    }

    #[test]
    fn keeps_only_component_blocks() {
        let compiled = "/*! tailwindcss v3.4.1 | MIT License */\
*,:after,:before{box-sizing:border-box}\
.otp-button{background-color:#2563eb}.otp-button:hover{background-color:#1d4ed8}\
.otp-button-icon{width:1rem}@media (min-width:768px){.otp-root{display:grid}}";
        assert_eq!(
            extract_component_css(compiled, &selectors(&["otp-button", "otp-root"])),
            "/* Generated vanilla CSS */\n/* Converted from Tailwind CSS */\n\n\
.otp-button{background-color:#2563eb}\n\n\
.otp-button:hover{background-color:#1d4ed8}\n\n\
@media (min-width:768px){.otp-root{display:grid}}\n"
        );
    }

    #[test]
    fn nothing_matching_yields_empty_output() {
        assert_eq!(extract_component_css("body{margin:0}", &selectors(&["card"])), "");
    }

    #[test]
    fn compile_rules_filters_compiler_output() {
        let rules = vec![SemanticRule {
            name: "card-container".to_string(),
            element: "div".to_string(),
            declarations: Vec::new(),
            original_classes: "p-4".to_string(),
        }];
        let css = compile_rules(&Echo, ".card-container{padding:1rem}", &rules).expect("compile");
        assert!(css.contains(".card-container{padding:1rem}"));
        assert!(!css.contains("ignored"));
    }

    #[test]
    fn missing_command_is_reported() {
        let compiler = TailwindCli::new(&CompilerConfig {
            enabled: true,
            command: "semcss-missing-compiler-binary".to_string(),
            args: Vec::new(),
        });
        let err = compiler.compile(".a{}").expect_err("missing command");
        assert!(matches!(err, CompileError::MissingCommand(_)));
        assert_eq!(
            err.to_string(),
            "semcss-missing-compiler-binary not found. Please install Node.js and npm"
        );
    }

    #[cfg(unix)]
    #[test]
    fn runs_command_in_scratch_directory() {
        // `sh -c script -i input -o output ...` binds $1 to the input and $3 to the output.
        let compiler = TailwindCli::new(&CompilerConfig {
            enabled: true,
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "test -f tailwind.config.js && cp \"$1\" \"$3\"".to_string(),
            ],
        });
        let out = compiler.compile(".card { @apply p-4; }").expect("compile");
        assert_eq!(
            out,
            "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n.card { @apply p-4; }"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_captures_output() {
        let compiler = TailwindCli::new(&CompilerConfig {
            enabled: true,
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
        });
        let err = compiler.compile(".a{}").expect_err("failure");
        match err {
            CompileError::Failed { command, output, .. } => {
                assert_eq!(command, "sh");
                assert_eq!(output, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
