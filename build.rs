use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=frontend/dist");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is not set");
    let dist_path = Path::new(&manifest_dir).join("frontend/dist");

    // rust-embed 要求目录存在，未构建前端时写入占位页面
    if !dist_path.join("index.html").exists() {
        println!("cargo:warning=frontend/dist not found, embedding a placeholder page");
        create_placeholder(&dist_path);
    }
}

fn create_placeholder(dist_path: &Path) {
    fs::create_dir_all(dist_path.join("assets")).expect("Failed to create frontend/dist/assets");

    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>EduCRM - frontend not built</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 560px; margin: 96px auto; text-align: center; }
        code { background: #f1f3f4; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>EduCRM</h1>
    <p>The API is running, but the web client has not been built.</p>
    <p><code>cd frontend &amp;&amp; bun install &amp;&amp; bun run build</code></p>
</body>
</html>"#;

    fs::write(dist_path.join("index.html"), html).expect("Failed to write placeholder index.html");
}
