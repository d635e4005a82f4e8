// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **some** content.\n\n- Bullet point\n  - Nested item\n- [ ] Open task\n- [/] Task in progress\n\n1. First\n1. Second\n\n> A quote\n> over two lines\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n![Diagram](attachments/diagram.png)\n\n---\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_task_list(items: usize) -> String {
    (0..items)
        .map(|i| match i % 3 {
            0 => format!("- [ ] task {i}\n"),
            1 => format!("- [/] task {i}\n"),
            _ => format!("- [x] task {i}\n"),
        })
        .collect()
}
