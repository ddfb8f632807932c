use semcss::{Command, ConvertArgs, ScanArgs, run};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const OTP_COMPONENT: &str = "import React from 'react';

export function Otp() {
  return (
    <div className=\"flex min-h-screen justify-center\">
      <button className=\"bg-blue-600 hover:bg-blue-700 px-4\">Go</button>
    </div>
  );
}
";

const LANDING_PAGE: &str =
    "<html><head></head><body><div class=\"hero p-4 flex\">x</div></body></html>";

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dirs");
    }
    fs::write(path, contents).expect("write source");
}

fn convert_args(input: &Path, output: &Path) -> ConvertArgs {
    ConvertArgs {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        verbose: false,
        config: None,
        compile: false,
        ai: false,
        minify: false,
        ignore: Vec::new(),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {}", path.display(), err))
}

#[test]
fn converts_a_source_tree() {
    let temp = tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let out = temp.path().join("out");
    write(&src.join("components/qwik-otp.tsx"), OTP_COMPONENT);
    write(&src.join("index.html"), LANDING_PAGE);
    write(&src.join("plain.html"), "<p>no classes</p>");
    write(&src.join("notes.md"), "# ignored");

    run(Command::Convert(convert_args(&src, &out))).expect("convert should succeed");

    let module_css = read(&out.join("components/qwik-otp.module.css"));
    assert!(module_css.starts_with("/* Generated CSS Module */"));
    assert!(module_css.contains(
        ".otp-root {\n  display: flex;\n  justify-content: center;\n  min-height: 100vh;\n}"
    ));
    assert!(module_css.contains(".otp-button {\n  background-color: #2563eb;"));
    assert!(module_css.contains(".otp-button:hover {\n  background-color: #1d4ed8;\n}"));

    let component = read(&out.join("components/qwik-otp.tsx"));
    assert!(component.starts_with(
        "import React from 'react';\nimport styles from './qwik-otp.module.css';\n"
    ));
    assert!(component.contains("<div className={styles[\"otp-root\"]}>"));
    assert!(component.contains("<button className={styles[\"otp-button\"]}>Go</button>"));

    let page_css = read(&out.join("index.css"));
    assert!(page_css.contains("padding: 1rem;"));
    let page = read(&out.join("index.html"));
    assert!(page.contains("<link rel=\"stylesheet\" href=\"./index.css\">"));
    assert!(page.contains("<div class=\"hero "));
    assert!(!page.contains("p-4"));

    assert_eq!(read(&out.join("plain.html")), "<p>no classes</p>");
    assert!(!out.join("plain.css").exists());
    assert!(!out.join("notes.md").exists());
}

#[test]
fn converts_a_single_file_with_minified_output() {
    let temp = tempdir().expect("tempdir");
    let source = temp.path().join("product-card.tsx");
    let out = temp.path().join("dist");
    write(
        &source,
        "export const Card = () => <div className=\"rounded-lg shadow-md p-6 custom\">x</div>;\n",
    );

    let mut args = convert_args(&source, &out);
    args.minify = true;
    run(Command::Convert(args)).expect("convert should succeed");

    let css = read(&out.join("product-card.module.css"));
    assert!(!css.contains("/*"));
    assert!(css.contains("{padding:1.5rem;border-radius:0.5rem;"));
    let markup = read(&out.join("product-card.tsx"));
    assert!(
        markup.starts_with("import styles from './product-card.module.css';\nexport const Card")
    );
    assert!(markup.contains("className={[\"custom\", "));
}

#[test]
fn generated_names_do_not_depend_on_other_files() {
    let temp = tempdir().expect("tempdir");
    let src = temp.path().join("src");
    write(&src.join("a.html"), "<div class=\"relative\">a</div>");
    write(&src.join("b.html"), "<div class=\"relative\">b</div>");

    let together = temp.path().join("together");
    run(Command::Convert(convert_args(&src, &together))).expect("convert directory");
    let alone = temp.path().join("alone");
    run(Command::Convert(convert_args(&src.join("b.html"), &alone))).expect("convert file");

    let css = read(&together.join("b.css"));
    assert!(css.contains(".b-element-1 {\n  position: relative;\n}"));
    assert_eq!(css, read(&alone.join("b.css")));
    assert_eq!(read(&together.join("b.html")), read(&alone.join("b.html")));
}

#[test]
fn hand_authored_classes_only_are_copied_unchanged() {
    let temp = tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let out = temp.path().join("out");
    let widget = "export const Widget = () => <div className=\"widget\">w</div>;\n";
    write(&src.join("Widget.tsx"), widget);

    run(Command::Convert(convert_args(&src, &out))).expect("convert should succeed");

    assert_eq!(read(&out.join("Widget.tsx")), widget);
    assert!(!out.join("Widget.module.css").exists());
}

#[test]
fn compile_writes_apply_and_theme_even_when_the_compiler_is_missing() {
    let temp = tempdir().expect("tempdir");
    let src = temp.path().join("src");
    let out = temp.path().join("out");
    let config = temp.path().join("semcss.toml");
    write(&src.join("qwik-otp.tsx"), OTP_COMPONENT);
    write(
        &config,
        "[compiler]\ncommand = \"semcss-missing-compiler-binary\"\nargs = []\n",
    );

    let mut args = convert_args(&src, &out);
    args.compile = true;
    args.config = Some(config);
    run(Command::Convert(args)).expect("convert should succeed without a compiler");

    let apply_css = read(&out.join("qwik-otp.apply.css"));
    assert!(
        apply_css.contains(".otp-button {\n  @apply bg-blue-600 hover:bg-blue-700 pl-4 pr-4;\n}")
    );
    let theme_css = read(&out.join("qwik-otp.theme.css"));
    assert!(theme_css.starts_with("/* Theme variables for otp component */"));
    assert!(theme_css.contains("--color-blue-600: #2563eb;"));
    assert!(!out.join("qwik-otp.compiled.css").exists());
}

#[test]
fn configured_palette_feeds_conversion() {
    let temp = tempdir().expect("tempdir");
    let src = temp.path().join("page.html");
    let out = temp.path().join("out");
    let config = temp.path().join("theme.toml");
    write(&src, "<section class=\"bg-brand-500 p-2\"></section>");
    write(&config, "[theme.colors.brand]\n500 = \"#ff0066\"\n");

    let mut args = convert_args(&src, &out);
    args.config = Some(config);
    run(Command::Convert(args)).expect("convert should succeed");

    assert!(read(&out.join("page.css")).contains("background-color: #ff0066;"));
}

#[test]
fn missing_input_is_an_error() {
    let temp = tempdir().expect("tempdir");
    let err = run(Command::Convert(convert_args(
        &temp.path().join("nope"),
        &temp.path().join("out"),
    )))
    .expect_err("missing input");
    assert!(err.message.starts_with("path not found"));
}

#[test]
fn scan_does_not_write_anything() {
    let temp = tempdir().expect("tempdir");
    let src = temp.path().join("src");
    write(&src.join("qwik-otp.tsx"), OTP_COMPONENT);

    run(Command::Scan(ScanArgs {
        input: src.clone(),
        verbose: false,
        config: None,
        ignore: Vec::new(),
    }))
    .expect("scan should succeed");

    let entries: Vec<_> = fs::read_dir(&src).expect("read dir").collect();
    assert_eq!(entries.len(), 1);
}
